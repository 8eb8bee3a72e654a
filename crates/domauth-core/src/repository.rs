//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. Lookup misses are reported as
//! [`DomauthError::NotFound`](crate::error::DomauthError::NotFound);
//! the guard maps those to "anonymous" and lets every other error
//! propagate as an infrastructure failure.

use uuid::Uuid;

use crate::error::DomauthResult;
use crate::models::{
    domain::{CreateInstalledDomain, InstalledDomain},
    login::{CreateLoginToken, LoginToken},
    person::{CreatePerson, Person},
    principal::{CreatePrincipal, Principal, UpdatePrincipal},
    role::{CreateRole, Role},
};

/// Pagination parameters for list queries.
#[derive(Debug, Clone)]
pub struct Pagination {
    pub offset: u64,
    pub limit: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 50,
        }
    }
}

/// A paginated result set.
#[derive(Debug, Clone)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub offset: u64,
    pub limit: u64,
}

// ---------------------------------------------------------------------------
// Person profiles
// ---------------------------------------------------------------------------

pub trait PersonRepository: Send + Sync {
    fn create(&self, input: CreatePerson) -> impl Future<Output = DomauthResult<Person>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = DomauthResult<Person>> + Send;
    fn list(
        &self,
        pagination: Pagination,
    ) -> impl Future<Output = DomauthResult<PaginatedResult<Person>>> + Send;
}

// ---------------------------------------------------------------------------
// Installed domains
// ---------------------------------------------------------------------------

pub trait InstalledDomainRepository: Send + Sync {
    fn create(
        &self,
        input: CreateInstalledDomain,
    ) -> impl Future<Output = DomauthResult<InstalledDomain>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = DomauthResult<InstalledDomain>> + Send;
    /// Exact match on the unique domain title.
    fn get_by_title(
        &self,
        title: &str,
    ) -> impl Future<Output = DomauthResult<InstalledDomain>> + Send;
    fn list(
        &self,
        pagination: Pagination,
    ) -> impl Future<Output = DomauthResult<PaginatedResult<InstalledDomain>>> + Send;
}

// ---------------------------------------------------------------------------
// Roles
// ---------------------------------------------------------------------------

pub trait RoleRepository: Send + Sync {
    fn create(&self, input: CreateRole) -> impl Future<Output = DomauthResult<Role>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = DomauthResult<Role>> + Send;
    fn get_by_name(&self, name: &str) -> impl Future<Output = DomauthResult<Role>> + Send;
    fn list(
        &self,
        pagination: Pagination,
    ) -> impl Future<Output = DomauthResult<PaginatedResult<Role>>> + Send;
}

// ---------------------------------------------------------------------------
// Principals (the credential store)
// ---------------------------------------------------------------------------

pub trait PrincipalRepository: Send + Sync {
    fn create(
        &self,
        input: CreatePrincipal,
    ) -> impl Future<Output = DomauthResult<Principal>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = DomauthResult<Principal>> + Send;
    /// Credential lookup key: caller-supplied email combined with the
    /// serving deployment's fixed domain title — never a client-supplied
    /// domain.
    fn get_by_email_and_domain(
        &self,
        email: &str,
        domain_title: &str,
    ) -> impl Future<Output = DomauthResult<Principal>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdatePrincipal,
    ) -> impl Future<Output = DomauthResult<Principal>> + Send;
    /// Replace the stored password hash with a hash of `new_password`.
    fn set_password(
        &self,
        id: Uuid,
        new_password: &str,
        updated_by: Option<Uuid>,
    ) -> impl Future<Output = DomauthResult<()>> + Send;
    /// Stamp the ban triple. Re-banning re-stamps `banned_at`.
    fn ban(
        &self,
        id: Uuid,
        reason: &str,
        banned_by: Option<Uuid>,
    ) -> impl Future<Output = DomauthResult<Principal>> + Send;
    /// Clear the ban triple.
    fn unban(
        &self,
        id: Uuid,
        unbanned_by: Option<Uuid>,
    ) -> impl Future<Output = DomauthResult<Principal>> + Send;
    fn list_by_domain(
        &self,
        installed_domain_id: Uuid,
        pagination: Pagination,
    ) -> impl Future<Output = DomauthResult<PaginatedResult<Principal>>> + Send;
}

// ---------------------------------------------------------------------------
// Login token ledger
// ---------------------------------------------------------------------------

pub trait LoginRepository: Send + Sync {
    /// Insert a fresh ledger row. Concurrent creates for different
    /// principals do not interfere.
    fn create(
        &self,
        input: CreateLoginToken,
    ) -> impl Future<Output = DomauthResult<LoginToken>> + Send;

    /// Exact-match token lookup; the per-request hot path, served by a
    /// unique index on `token`.
    fn get_by_token(&self, token: &str) -> impl Future<Output = DomauthResult<LoginToken>> + Send;

    /// Keep-alive: refresh `updated_at`/`updated_by` on the matching
    /// row. A no-op, not an error, when the row is already gone (race
    /// with a concurrent logout or sweep).
    fn touch(
        &self,
        token: &str,
        principal_id: Uuid,
    ) -> impl Future<Output = DomauthResult<()>> + Send;

    /// Remove at most one row. A no-op when the row was already
    /// removed.
    fn delete_by_token(&self, token: &str) -> impl Future<Output = DomauthResult<()>> + Send;

    /// Bulk delete for the ban cascade; returns the number of rows
    /// removed.
    fn delete_all_for_principal(
        &self,
        principal_id: Uuid,
    ) -> impl Future<Output = DomauthResult<u64>> + Send;

    /// Delete every row whose `updated_at` is older than
    /// `now - threshold_minutes`; returns the number removed. Safe to
    /// run concurrently with login/logout traffic — the predicate is
    /// evaluated per row, so a row touched after the cutoff survives.
    fn sweep_inactive(
        &self,
        threshold_minutes: u64,
    ) -> impl Future<Output = DomauthResult<u64>> + Send;

    fn count_for_principal(
        &self,
        principal_id: Uuid,
    ) -> impl Future<Output = DomauthResult<u64>> + Send;
}
