//! Install-time seeding.
//!
//! The role lookup set and the serving domain's record are provisioned
//! once, at install. Seeded records carry `protected = true` so admin
//! tooling refuses to delete them; there are no hardcoded
//! do-not-delete id lists anywhere.

use domauth_core::error::{DomauthError, DomauthResult};
use domauth_core::models::domain::{CreateInstalledDomain, InstalledDomain};
use domauth_core::models::role::{CreateRole, DEFAULT_ROLES};
use domauth_core::repository::{InstalledDomainRepository, RoleRepository};
use surrealdb::{Connection, Surreal};
use tracing::info;

use crate::repository::{SurrealInstalledDomainRepository, SurrealRoleRepository};

/// Create the default role set if absent. Idempotent.
pub async fn seed_default_roles<C: Connection>(db: &Surreal<C>) -> DomauthResult<()> {
    let repo = SurrealRoleRepository::new(db.clone());

    for (name, description) in DEFAULT_ROLES {
        match repo.get_by_name(name).await {
            Ok(_) => {}
            Err(DomauthError::NotFound { .. }) => {
                repo.create(CreateRole {
                    name: (*name).into(),
                    description: (*description).into(),
                    protected: true,
                })
                .await?;
                info!(role = name, "Seeded default role");
            }
            Err(e) => return Err(e),
        }
    }

    Ok(())
}

/// Look up the serving domain by title, creating a protected record on
/// first run. Idempotent.
pub async fn ensure_installed_domain<C: Connection>(
    db: &Surreal<C>,
    title: &str,
) -> DomauthResult<InstalledDomain> {
    let repo = SurrealInstalledDomainRepository::new(db.clone());

    match repo.get_by_title(title).await {
        Ok(domain) => Ok(domain),
        Err(DomauthError::NotFound { .. }) => {
            let domain = repo
                .create(CreateInstalledDomain {
                    title: title.into(),
                    description: format!("Installed domain {title}"),
                    enabled: true,
                    protected: true,
                })
                .await?;
            info!(domain = title, "Registered installed domain");
            Ok(domain)
        }
        Err(e) => Err(e),
    }
}
