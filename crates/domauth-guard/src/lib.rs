//! domauth Guard — the session authentication guard and its
//! login-token lifecycle.
//!
//! The guard is constructed per request and is generic over the
//! credential store, the login-token ledger, and the client session
//! store, so it carries no cross-request state of its own: everything
//! shared lives in the ledger and the session, which are the actual
//! concurrency boundaries.

pub mod config;
pub mod error;
pub mod guard;
pub mod password;
pub mod policy;
pub mod session;
pub mod sweep;
pub mod token;

pub use config::GuardConfig;
pub use error::GuardError;
pub use guard::{AttemptThrottle, Guard, NoThrottle};
pub use session::MemorySession;
pub use sweep::Sweeper;
