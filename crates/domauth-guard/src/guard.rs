//! The authentication guard state machine.
//!
//! Per request the guard moves `Unresolved → Resolving → {Authenticated,
//! Anonymous}`. The only request-scoped state is the resolved-principal
//! cache and the sticky logged-out flag; everything durable lives in
//! the session store and the login-token ledger.
//!
//! Failure semantics: every lookup miss resolves to anonymous
//! (`Ok(None)` / `Ok(false)`). Only infrastructure failures propagate
//! as errors.

use domauth_core::error::{DomauthError, DomauthResult};
use domauth_core::models::login::CreateLoginToken;
use domauth_core::models::principal::Principal;
use domauth_core::repository::{LoginRepository, PrincipalRepository};
use domauth_core::session::SessionStore;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::GuardConfig;
use crate::password;
use crate::token::{self, LOGIN_TOKEN_KEY};

/// Caller-supplied hook notified of failed login attempts.
///
/// Rate limiting itself is the serving layer's concern; the guard only
/// reports, and reports identically for every failure cause.
pub trait AttemptThrottle: Send + Sync {
    fn record_failure(&self, email: &str);
}

/// Throttle that ignores every report.
pub struct NoThrottle;

impl AttemptThrottle for NoThrottle {
    fn record_failure(&self, _email: &str) {}
}

/// Session authentication guard, constructed per request.
pub struct Guard<P, L, S>
where
    P: PrincipalRepository,
    L: LoginRepository,
    S: SessionStore,
{
    principal_repo: P,
    login_repo: L,
    session: S,
    config: GuardConfig,
    /// Session key for the principal id, derived from the guard name.
    identity_key: String,
    throttle: Box<dyn AttemptThrottle>,
    /// Resolved identity for the remainder of this request.
    current: Option<Principal>,
    /// Sticky: once `logout()` ran in this request scope, resolution
    /// stays anonymous even if session data looks valid.
    logged_out: bool,
}

impl<P, L, S> Guard<P, L, S>
where
    P: PrincipalRepository,
    L: LoginRepository,
    S: SessionStore,
{
    pub fn new(principal_repo: P, login_repo: L, session: S, config: GuardConfig) -> Self {
        let identity_key = token::identity_session_key(&config.guard_name);
        Self {
            principal_repo,
            login_repo,
            session,
            config,
            identity_key,
            throttle: Box::new(NoThrottle),
            current: None,
            logged_out: false,
        }
    }

    /// Replace the failed-attempt hook.
    pub fn with_throttle(mut self, throttle: Box<dyn AttemptThrottle>) -> Self {
        self.throttle = throttle;
        self
    }

    /// Session key under which this guard stores the principal id.
    pub fn identity_key(&self) -> &str {
        &self.identity_key
    }

    pub fn session(&self) -> &S {
        &self.session
    }

    /// Release the session, e.g. to hand it to the next request's
    /// guard in tests.
    pub fn into_session(self) -> S {
        self.session
    }

    /// Resolve the identity for this request.
    ///
    /// Anonymous when: a logout already happened in this request, the
    /// session lacks either key, the token has no ledger row (revoked,
    /// banned, swept, or never issued), the ledger row belongs to a
    /// different principal than the session claims, or the principal
    /// record is gone.
    pub async fn current_principal(&mut self) -> DomauthResult<Option<Principal>> {
        if self.logged_out {
            return Ok(None);
        }
        if let Some(principal) = &self.current {
            return Ok(Some(principal.clone()));
        }

        let Some(id_value) = self.session.get(&self.identity_key) else {
            return Ok(None);
        };
        let Some(login_token) = self.session.get(LOGIN_TOKEN_KEY) else {
            return Ok(None);
        };
        let Ok(principal_id) = Uuid::parse_str(&id_value) else {
            // Corrupt session data reads as "not logged in".
            return Ok(None);
        };

        let record = match self.login_repo.get_by_token(&login_token).await {
            Ok(record) => record,
            Err(e) if e.is_not_found() => return Ok(None),
            Err(e) => return Err(e),
        };
        if record.principal_id != principal_id {
            // Session and ledger disagree about who owns this token.
            return Ok(None);
        }

        let principal = match self.principal_repo.get_by_id(principal_id).await {
            Ok(principal) => principal,
            Err(e) if e.is_not_found() => return Ok(None),
            Err(e) => return Err(e),
        };

        // Keep-alive is best effort: a failed touch must not fail the
        // resolution.
        if let Err(e) = self.login_repo.touch(&login_token, principal_id).await {
            warn!(error = %e, "login keep-alive touch failed");
        }

        debug!(principal = %principal.id, guard = %self.config.guard_name, "request authenticated");
        self.current = Some(principal.clone());
        Ok(Some(principal))
    }

    /// Check email + password against the credential store, scoped to
    /// this deployment's domain.
    ///
    /// `false` for unknown email, wrong password, wrong domain, and
    /// banned principal alike.
    pub async fn validate_credentials(&self, email: &str, password: &str) -> DomauthResult<bool> {
        Ok(self.lookup_credentials(email, password).await?.is_some())
    }

    async fn lookup_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> DomauthResult<Option<Principal>> {
        let principal = match self
            .principal_repo
            .get_by_email_and_domain(email, &self.config.domain_title)
            .await
        {
            Ok(principal) => principal,
            Err(e) if e.is_not_found() => {
                // Burn the same Argon2 cost as a mismatch so a missing
                // record is not observable through response timing.
                password::verify_against_dummy(password, self.config.pepper.as_deref());
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        let valid = password::verify_password(
            password,
            &principal.password_hash,
            self.config.pepper.as_deref(),
        )
        .map_err(DomauthError::from)?;

        if !valid || principal.is_banned() {
            return Ok(None);
        }

        Ok(Some(principal))
    }

    /// Validate credentials and, on success, log the principal in.
    ///
    /// The return value never distinguishes "no such user" from "wrong
    /// password" from "wrong domain".
    pub async fn attempt(&mut self, email: &str, password: &str) -> DomauthResult<bool> {
        match self.lookup_credentials(email, password).await? {
            Some(principal) => {
                self.login(principal).await?;
                Ok(true)
            }
            None => {
                self.throttle.record_failure(email);
                debug!(guard = %self.config.guard_name, "login attempt failed");
                Ok(false)
            }
        }
    }

    /// Log a principal in: mint a token, rotate the session id, write
    /// the two session keys, insert the ledger row.
    ///
    /// Calling twice simply issues a second token: two ledger rows,
    /// session keys overwritten.
    pub async fn login(&mut self, principal: Principal) -> DomauthResult<()> {
        let login_token = token::generate_login_token();

        // Rotate before writing identity: session-fixation defense.
        self.session.regenerate_id(true);
        self.session
            .put(&self.identity_key, principal.id.to_string());
        self.session.put(LOGIN_TOKEN_KEY, login_token.clone());

        self.login_repo
            .create(CreateLoginToken {
                principal_id: principal.id,
                token: login_token,
                uuid: None,
                created_by: principal.id,
            })
            .await?;

        debug!(principal = %principal.id, guard = %self.config.guard_name, "logged in");
        self.logged_out = false;
        self.current = Some(principal);
        Ok(())
    }

    /// Log out: delete the ledger row for the session's token, clear
    /// both session keys, and pin this request to anonymous.
    ///
    /// Idempotent — a second call finds no token and no row, which is
    /// fine.
    pub async fn logout(&mut self) -> DomauthResult<()> {
        if let Some(login_token) = self.session.get(LOGIN_TOKEN_KEY) {
            // Already-deleted rows (concurrent logout or sweep) are a
            // tolerated race inside delete_by_token.
            self.login_repo.delete_by_token(&login_token).await?;
        }

        self.session.remove(&self.identity_key);
        self.session.remove(LOGIN_TOKEN_KEY);
        self.current = None;
        self.logged_out = true;

        debug!(guard = %self.config.guard_name, "logged out");
        Ok(())
    }

    /// Administrative login path: skip credential validation, then
    /// behave exactly like [`login`](Self::login), session-id rotation
    /// included.
    ///
    /// `Ok(None)` when no such principal exists.
    pub async fn login_using_id(&mut self, principal_id: Uuid) -> DomauthResult<Option<Principal>> {
        let principal = match self.principal_repo.get_by_id(principal_id).await {
            Ok(principal) => principal,
            Err(e) if e.is_not_found() => return Ok(None),
            Err(e) => return Err(e),
        };

        self.login(principal.clone()).await?;
        Ok(Some(principal))
    }

    /// One-off system identity: resolves the principal for this
    /// request only. No session writes, no ledger row — nothing
    /// persists past the request.
    pub async fn once_using_id(&mut self, principal_id: Uuid) -> DomauthResult<Option<Principal>> {
        let principal = match self.principal_repo.get_by_id(principal_id).await {
            Ok(principal) => principal,
            Err(e) if e.is_not_found() => return Ok(None),
            Err(e) => return Err(e),
        };

        self.logged_out = false;
        self.current = Some(principal.clone());
        Ok(Some(principal))
    }
}
