//! domauth core — domain models, repository seams, and shared error
//! types for the multi-domain identity system.
//!
//! This crate carries no I/O of its own. Persistence lives behind the
//! repository traits in [`repository`]; the client session store lives
//! behind [`session::SessionStore`]. The authentication guard in
//! `domauth-guard` is generic over both, so the core stays testable
//! without a database.

pub mod error;
pub mod models;
pub mod repository;
pub mod session;

pub use error::{DomauthError, DomauthResult};
