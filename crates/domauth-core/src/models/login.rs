//! Login token ledger model.
//!
//! A login token is server-side proof that a principal is currently
//! logged in, independent of and supplementary to the client session.
//! A principal may hold several concurrent tokens (one per device).
//! The row's `updated_at` doubles as last-activity for the inactivity
//! sweep.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginToken {
    pub id: Uuid,
    pub principal_id: Uuid,
    /// Opaque random token, 43 base64url chars, unique-indexed.
    pub token: String,
    /// Optional correlation id set by callers that trace a login
    /// across services.
    pub uuid: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub created_by: Uuid,
    /// Refreshed on every authenticated request (keep-alive).
    pub updated_at: DateTime<Utc>,
    pub updated_by: Uuid,
    pub locked_at: Option<DateTime<Utc>>,
    pub locked_by: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateLoginToken {
    pub principal_id: Uuid,
    pub token: String,
    pub uuid: Option<Uuid>,
    pub created_by: Uuid,
}
