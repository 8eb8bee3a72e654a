//! Error types for the domauth system.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomauthError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Entity already exists: {entity}")]
    AlreadyExists { entity: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Cryptography error: {0}")]
    Crypto(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type DomauthResult<T> = Result<T, DomauthError>;

impl DomauthError {
    /// True for the absence of a record, as opposed to an
    /// infrastructure failure.
    ///
    /// The guard uses this to normalize lookup misses to "anonymous"
    /// while still propagating store failures.
    pub fn is_not_found(&self) -> bool {
        matches!(self, DomauthError::NotFound { .. })
    }
}
