//! Role domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Role {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    /// Seeded lookup roles that admin tooling must not delete.
    pub protected: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRole {
    pub name: String,
    pub description: String,
    pub protected: bool,
}

/// The fixed role set seeded at install time.
pub const DEFAULT_ROLES: &[(&str, &str)] = &[
    ("Owner", "Full control of the installation"),
    ("Super Administrator", "All administrative functions"),
    ("Administrator", "Day-to-day administrative functions"),
];
