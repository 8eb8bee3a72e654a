//! Domain models for domauth.
//!
//! These are the core types shared across all crates.

pub mod domain;
pub mod login;
pub mod person;
pub mod principal;
pub mod role;
