//! Person profile model.
//!
//! A person is the physical human behind one or more principals. It is
//! never authenticatable on its own — authentication always goes
//! through a [`Principal`](crate::models::principal::Principal) scoped
//! to one installed domain.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Person {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Person {
    /// Display name, computed on demand.
    ///
    /// Callers that persist a denormalized display name invoke this
    /// explicitly before saving; nothing recomputes it as a hidden
    /// save-time side effect.
    pub fn full_name(&self) -> String {
        full_name(&self.first_name, &self.last_name)
    }
}

/// Compose a display name from name parts, trimming stray whitespace.
pub fn full_name(first_name: &str, last_name: &str) -> String {
    let first = first_name.trim();
    let last = last_name.trim();
    match (first.is_empty(), last.is_empty()) {
        (true, true) => String::new(),
        (false, true) => first.to_string(),
        (true, false) => last.to_string(),
        (false, false) => format!("{first} {last}"),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePerson {
    pub first_name: String,
    pub last_name: String,
}
