//! Role and ban policy.
//!
//! Authorization checks run after the guard has resolved an identity.
//! Banning does not touch the guard at all: it deletes the banned
//! principal's ledger rows, so every later resolution fails at the
//! token lookup. The ban therefore takes effect on the next request,
//! not mid-request, and costs no extra per-request query.

use domauth_core::error::DomauthResult;
use domauth_core::models::principal::Principal;
use domauth_core::repository::{LoginRepository, PrincipalRepository, RoleRepository};
use tracing::info;
use uuid::Uuid;

/// Case-insensitive check of the principal's single attached role.
///
/// `false` when the principal has no role, the role record is gone, or
/// the name does not match. No wildcard roles.
pub async fn has_role<R: RoleRepository>(
    role_repo: &R,
    principal: &Principal,
    role_name: &str,
) -> DomauthResult<bool> {
    let Some(role_id) = principal.role_id else {
        return Ok(false);
    };

    match role_repo.get_by_id(role_id).await {
        Ok(role) => Ok(role.name.eq_ignore_ascii_case(role_name)),
        Err(e) if e.is_not_found() => Ok(false),
        Err(e) => Err(e),
    }
}

/// Ban a principal and revoke every one of its active logins.
///
/// Returns the number of ledger rows removed. The ban triple is
/// stamped first so a crash between the two steps leaves the principal
/// banned with logins that the next sweep or logout clears.
pub async fn ban_principal<P, L>(
    principal_repo: &P,
    login_repo: &L,
    principal_id: Uuid,
    reason: &str,
    banned_by: Option<Uuid>,
) -> DomauthResult<u64>
where
    P: PrincipalRepository,
    L: LoginRepository,
{
    principal_repo.ban(principal_id, reason, banned_by).await?;
    let revoked = login_repo.delete_all_for_principal(principal_id).await?;

    info!(principal = %principal_id, revoked, "principal banned, active logins revoked");
    Ok(revoked)
}

/// Lift a ban. Existing logins were already revoked at ban time; the
/// principal simply logs in again.
pub async fn unban_principal<P: PrincipalRepository>(
    principal_repo: &P,
    principal_id: Uuid,
    unbanned_by: Option<Uuid>,
) -> DomauthResult<()> {
    principal_repo.unban(principal_id, unbanned_by).await?;
    info!(principal = %principal_id, "principal unbanned");
    Ok(())
}
