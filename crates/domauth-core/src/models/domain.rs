//! Installed domain model.
//!
//! One installed domain is one deployed front-end/back-end application
//! instance sharing the underlying database. A principal's credentials
//! are only valid against the domain it belongs to.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstalledDomain {
    pub id: Uuid,
    /// Unique human-readable title, e.g. `app.example.com`. Fixed per
    /// deployment and used to scope credential lookups.
    pub title: String,
    pub description: String,
    pub enabled: bool,
    /// Seeded records that admin tooling must not delete.
    pub protected: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateInstalledDomain {
    pub title: String,
    pub description: String,
    pub enabled: bool,
    pub protected: bool,
}
