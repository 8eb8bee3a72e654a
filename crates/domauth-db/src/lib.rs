//! domauth Database — SurrealDB connection management and repository
//! implementations.
//!
//! This crate provides:
//! - Connection management ([`DbManager`], [`DbConfig`])
//! - Schema initialization and migrations ([`run_migrations`])
//! - Install-time seeding ([`seed_default_roles`], [`ensure_installed_domain`])
//! - Error types ([`DbError`])
//! - SurrealDB implementations of the `domauth-core` repository traits

mod connection;
mod error;
pub mod repository;
mod schema;
mod seed;

pub use connection::{DbConfig, DbManager};
pub use error::DbError;
pub use schema::{run_migrations, schema_v1};
pub use seed::{ensure_installed_domain, seed_default_roles};
