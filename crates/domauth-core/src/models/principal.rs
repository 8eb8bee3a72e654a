//! Principal domain model.
//!
//! A principal is one authenticatable identity scoped to exactly one
//! installed domain. The same person may hold several principals, one
//! per domain, each with its own password. The `(email,
//! installed_domain_id)` pair is unique.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Principal {
    pub id: Uuid,
    /// The person profile behind this identity.
    pub person_id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub installed_domain_id: Uuid,
    /// At most one role per principal, as a direct optional foreign
    /// key. No pivot table, no attach/detach guards.
    pub role_id: Option<Uuid>,
    pub banned: bool,
    pub banned_at: Option<DateTime<Utc>>,
    pub ban_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub created_by: Option<Uuid>,
    pub updated_at: DateTime<Utc>,
    pub updated_by: Option<Uuid>,
}

impl Principal {
    pub fn is_banned(&self) -> bool {
        self.banned
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePrincipal {
    pub person_id: Uuid,
    pub email: String,
    /// Raw password (hashed with Argon2id before storage).
    pub password: String,
    pub installed_domain_id: Uuid,
    pub role_id: Option<Uuid>,
    pub created_by: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdatePrincipal {
    pub email: Option<String>,
    /// `Some(Some(id))` = assign, `Some(None)` = clear, `None` = no change.
    pub role_id: Option<Option<Uuid>>,
    pub updated_by: Option<Uuid>,
}
