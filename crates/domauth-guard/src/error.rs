//! Guard error types.
//!
//! Expected authentication outcomes are never errors — the guard
//! returns `Ok(None)` or `Ok(false)` for those. Only problems that a
//! caller can act on (malformed stored hashes, store failures) are
//! surfaced.

use domauth_core::error::DomauthError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GuardError {
    #[error("cryptography error: {0}")]
    Crypto(String),
}

impl From<GuardError> for DomauthError {
    fn from(err: GuardError) -> Self {
        match err {
            GuardError::Crypto(msg) => DomauthError::Crypto(msg),
        }
    }
}
