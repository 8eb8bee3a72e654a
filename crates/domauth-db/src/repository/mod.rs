//! SurrealDB repository implementations.

mod domain;
mod login;
mod person;
mod principal;
mod role;

pub use domain::SurrealInstalledDomainRepository;
pub use login::SurrealLoginRepository;
pub use person::SurrealPersonRepository;
pub use principal::{SurrealPrincipalRepository, hash_password, verify_password};
pub use role::SurrealRoleRepository;
