//! Integration tests for the authentication guard using in-memory
//! SurrealDB.
//!
//! Each test plays out one or more "requests": a fresh `Guard` is
//! built per request, and the session travels between requests via
//! `into_session()`, the way a cookie-backed session would.

use chrono::{Duration, Utc};
use domauth_core::models::person::CreatePerson;
use domauth_core::models::principal::{CreatePrincipal, Principal, UpdatePrincipal};
use domauth_core::repository::{
    LoginRepository, PersonRepository, PrincipalRepository, RoleRepository,
};
use domauth_core::session::SessionStore;
use domauth_db::repository::{
    SurrealLoginRepository, SurrealPersonRepository, SurrealPrincipalRepository,
    SurrealRoleRepository,
};
use domauth_guard::guard::Guard;
use domauth_guard::token::LOGIN_TOKEN_KEY;
use domauth_guard::{GuardConfig, MemorySession, Sweeper, policy};
use surrealdb::Surreal;
use surrealdb::engine::local::Mem;
use uuid::Uuid;

type Db = surrealdb::engine::local::Db;
type TestGuard = Guard<SurrealPrincipalRepository<Db>, SurrealLoginRepository<Db>, MemorySession>;

const DOMAIN_A: &str = "auth.example.com";
const PASSWORD: &str = "correct-horse-battery";

/// Helper: spin up in-memory DB, run migrations, seed roles, register
/// the serving domain, and create one principal.
async fn setup() -> (Surreal<Db>, Principal) {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    domauth_db::run_migrations(&db).await.unwrap();
    domauth_db::seed_default_roles(&db).await.unwrap();
    let domain = domauth_db::ensure_installed_domain(&db, DOMAIN_A)
        .await
        .unwrap();

    let person = SurrealPersonRepository::new(db.clone())
        .create(CreatePerson {
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
        })
        .await
        .unwrap();

    let principal = SurrealPrincipalRepository::new(db.clone())
        .create(CreatePrincipal {
            person_id: person.id,
            email: "ada@example.com".into(),
            password: PASSWORD.into(),
            installed_domain_id: domain.id,
            role_id: None,
            created_by: None,
        })
        .await
        .unwrap();

    (db, principal)
}

/// One request's guard over the given session, serving `domain_title`.
fn guard_for(db: &Surreal<Db>, session: MemorySession, domain_title: &str) -> TestGuard {
    Guard::new(
        SurrealPrincipalRepository::new(db.clone()),
        SurrealLoginRepository::new(db.clone()),
        session,
        GuardConfig {
            domain_title: domain_title.into(),
            ..Default::default()
        },
    )
}

fn guard(db: &Surreal<Db>, session: MemorySession) -> TestGuard {
    guard_for(db, session, DOMAIN_A)
}

fn login_repo(db: &Surreal<Db>) -> SurrealLoginRepository<Db> {
    SurrealLoginRepository::new(db.clone())
}

/// Backdate a ledger row's `updated_at`, simulating idle time.
async fn backdate(db: &Surreal<Db>, token: &str, minutes: i64) {
    let ts = Utc::now() - Duration::minutes(minutes);
    db.query("UPDATE login SET updated_at = $ts WHERE token = $login_token")
        .bind(("ts", ts))
        .bind(("login_token", token.to_string()))
        .await
        .unwrap()
        .check()
        .unwrap();
}

#[tokio::test]
async fn attempt_then_resolve_on_next_request() {
    let (db, principal) = setup().await;

    let mut first = guard(&db, MemorySession::new());
    assert!(first.attempt("ada@example.com", PASSWORD).await.unwrap());
    assert_eq!(
        first.current_principal().await.unwrap().unwrap().id,
        principal.id
    );

    // Exactly one ledger row for the new login.
    assert_eq!(
        login_repo(&db)
            .count_for_principal(principal.id)
            .await
            .unwrap(),
        1
    );

    // Next request over the same session resolves the same identity.
    let mut second = guard(&db, first.into_session());
    let resolved = second.current_principal().await.unwrap().unwrap();
    assert_eq!(resolved.id, principal.id);
    assert_eq!(resolved.email, "ada@example.com");
}

#[tokio::test]
async fn failed_attempts_are_indistinguishable() {
    let (db, _principal) = setup().await;
    domauth_db::ensure_installed_domain(&db, "other.example.com")
        .await
        .unwrap();

    // Wrong password, unknown email, and wrong domain all come back as
    // a plain `false` — same value, no error to tell them apart.
    let mut g = guard(&db, MemorySession::new());
    assert!(!g.attempt("ada@example.com", "wrong-password").await.unwrap());
    assert!(!g.attempt("nobody@example.com", PASSWORD).await.unwrap());
    assert!(g.current_principal().await.unwrap().is_none());

    let wrong_domain = guard_for(&db, MemorySession::new(), "other.example.com");
    assert!(
        !wrong_domain
            .validate_credentials("ada@example.com", PASSWORD)
            .await
            .unwrap()
    );
}

#[tokio::test]
async fn failed_attempt_writes_nothing() {
    let (db, principal) = setup().await;

    let mut g = guard(&db, MemorySession::new());
    assert!(!g.attempt("ada@example.com", "wrong-password").await.unwrap());

    assert_eq!(
        login_repo(&db)
            .count_for_principal(principal.id)
            .await
            .unwrap(),
        0
    );
    let session = g.into_session();
    assert!(session.get(LOGIN_TOKEN_KEY).is_none());
}

#[tokio::test]
async fn banned_principal_cannot_authenticate() {
    let (db, principal) = setup().await;

    SurrealPrincipalRepository::new(db.clone())
        .ban(principal.id, "abuse", None)
        .await
        .unwrap();

    let mut g = guard(&db, MemorySession::new());
    // Same `false` as a wrong password.
    assert!(!g.attempt("ada@example.com", PASSWORD).await.unwrap());
}

#[tokio::test]
async fn revoked_token_resolves_anonymous() {
    let (db, _principal) = setup().await;

    let mut g = guard(&db, MemorySession::new());
    assert!(g.attempt("ada@example.com", PASSWORD).await.unwrap());

    let session = g.into_session();
    let token = session.get(LOGIN_TOKEN_KEY).unwrap();
    login_repo(&db).delete_by_token(&token).await.unwrap();

    // Session still carries both keys, but the ledger row is gone.
    let mut next = guard(&db, session);
    assert!(next.current_principal().await.unwrap().is_none());
}

#[tokio::test]
async fn token_owned_by_another_principal_resolves_anonymous() {
    let (db, _principal) = setup().await;

    let mut g = guard(&db, MemorySession::new());
    assert!(g.attempt("ada@example.com", PASSWORD).await.unwrap());
    let identity_key = g.identity_key().to_string();

    // Tampered session: identity key now claims a different principal
    // than the ledger row for this token.
    let mut session = g.into_session();
    session.put(&identity_key, Uuid::new_v4().to_string());

    let mut next = guard(&db, session);
    assert!(next.current_principal().await.unwrap().is_none());
}

#[tokio::test]
async fn ban_revokes_every_active_login() {
    let (db, principal) = setup().await;

    // Two devices, two sessions, two ledger rows.
    let mut device_a = guard(&db, MemorySession::new());
    assert!(device_a.attempt("ada@example.com", PASSWORD).await.unwrap());
    let mut device_b = guard(&db, MemorySession::new());
    assert!(device_b.attempt("ada@example.com", PASSWORD).await.unwrap());

    let principal_repo = SurrealPrincipalRepository::new(db.clone());
    let revoked = policy::ban_principal(
        &principal_repo,
        &login_repo(&db),
        principal.id,
        "abuse",
        None,
    )
    .await
    .unwrap();
    assert_eq!(revoked, 2);
    assert_eq!(
        login_repo(&db)
            .count_for_principal(principal.id)
            .await
            .unwrap(),
        0
    );

    // Both sessions go anonymous on their next request.
    let mut next_a = guard(&db, device_a.into_session());
    assert!(next_a.current_principal().await.unwrap().is_none());
    let mut next_b = guard(&db, device_b.into_session());
    assert!(next_b.current_principal().await.unwrap().is_none());

    // Unban does not resurrect revoked logins; a fresh attempt works.
    policy::unban_principal(&principal_repo, principal.id, None)
        .await
        .unwrap();
    let mut fresh = guard(&db, MemorySession::new());
    assert!(fresh.attempt("ada@example.com", PASSWORD).await.unwrap());
}

#[tokio::test]
async fn logout_is_idempotent_and_pins_the_request_anonymous() {
    let (db, principal) = setup().await;

    let mut g = guard(&db, MemorySession::new());
    assert!(g.attempt("ada@example.com", PASSWORD).await.unwrap());
    let identity_key = g.identity_key().to_string();

    g.logout().await.unwrap();
    assert!(g.current_principal().await.unwrap().is_none());
    assert_eq!(
        login_repo(&db)
            .count_for_principal(principal.id)
            .await
            .unwrap(),
        0
    );

    // Second logout finds no token and no row; still Ok.
    g.logout().await.unwrap();

    let session = g.into_session();
    assert!(session.get(&identity_key).is_none());
    assert!(session.get(LOGIN_TOKEN_KEY).is_none());
}

#[tokio::test]
async fn logout_then_login_again_in_one_request() {
    let (db, principal) = setup().await;

    let mut g = guard(&db, MemorySession::new());
    assert!(g.attempt("ada@example.com", PASSWORD).await.unwrap());
    g.logout().await.unwrap();
    assert!(g.current_principal().await.unwrap().is_none());

    // A new successful attempt lifts the logged-out pin.
    assert!(g.attempt("ada@example.com", PASSWORD).await.unwrap());
    assert_eq!(
        g.current_principal().await.unwrap().unwrap().id,
        principal.id
    );
}

#[tokio::test]
async fn login_rotates_the_session_id() {
    let (db, _principal) = setup().await;

    let mut g = guard(&db, MemorySession::new());
    let pre_login_id = g.session().id().to_string();

    assert!(g.attempt("ada@example.com", PASSWORD).await.unwrap());

    assert_ne!(g.session().id(), pre_login_id);
}

#[tokio::test]
async fn second_login_issues_a_second_token() {
    let (db, principal) = setup().await;

    let mut g = guard(&db, MemorySession::new());
    assert!(g.attempt("ada@example.com", PASSWORD).await.unwrap());
    let first_token = g.session().get(LOGIN_TOKEN_KEY).unwrap();

    assert!(g.attempt("ada@example.com", PASSWORD).await.unwrap());
    let second_token = g.session().get(LOGIN_TOKEN_KEY).unwrap();

    assert_ne!(first_token, second_token);
    assert_eq!(
        login_repo(&db)
            .count_for_principal(principal.id)
            .await
            .unwrap(),
        2
    );
}

#[tokio::test]
async fn login_using_id_skips_credentials_but_persists() {
    let (db, principal) = setup().await;

    let mut g = guard(&db, MemorySession::new());
    let logged_in = g.login_using_id(principal.id).await.unwrap().unwrap();
    assert_eq!(logged_in.id, principal.id);

    // Survives into the next request like a password login.
    let mut next = guard(&db, g.into_session());
    assert_eq!(
        next.current_principal().await.unwrap().unwrap().id,
        principal.id
    );
}

#[tokio::test]
async fn login_using_unknown_id_is_none() {
    let (db, _principal) = setup().await;

    let mut g = guard(&db, MemorySession::new());
    assert!(g.login_using_id(Uuid::new_v4()).await.unwrap().is_none());
    assert!(g.current_principal().await.unwrap().is_none());
}

#[tokio::test]
async fn once_using_id_does_not_outlive_the_request() {
    let (db, principal) = setup().await;

    let mut g = guard(&db, MemorySession::new());
    let resolved = g.once_using_id(principal.id).await.unwrap().unwrap();
    assert_eq!(resolved.id, principal.id);

    // Visible for the rest of this request.
    assert_eq!(
        g.current_principal().await.unwrap().unwrap().id,
        principal.id
    );

    // But nothing was written: no session keys, no ledger row.
    assert_eq!(
        login_repo(&db)
            .count_for_principal(principal.id)
            .await
            .unwrap(),
        0
    );
    let session = g.into_session();
    assert!(session.get(LOGIN_TOKEN_KEY).is_none());

    let mut next = guard(&db, session);
    assert!(next.current_principal().await.unwrap().is_none());
}

#[tokio::test]
async fn sweep_logs_out_idle_sessions_only() {
    let (db, principal) = setup().await;

    let mut idle = guard(&db, MemorySession::new());
    assert!(idle.attempt("ada@example.com", PASSWORD).await.unwrap());
    let idle_token = idle.session().get(LOGIN_TOKEN_KEY).unwrap();

    let mut active = guard(&db, MemorySession::new());
    assert!(active.attempt("ada@example.com", PASSWORD).await.unwrap());

    backdate(&db, &idle_token, 11).await;

    let sweeper = Sweeper::new(login_repo(&db), 10);
    assert_eq!(sweeper.run_once().await.unwrap(), 1);

    let mut idle_next = guard(&db, idle.into_session());
    assert!(idle_next.current_principal().await.unwrap().is_none());
    let mut active_next = guard(&db, active.into_session());
    assert!(active_next.current_principal().await.unwrap().is_some());

    assert_eq!(
        login_repo(&db)
            .count_for_principal(principal.id)
            .await
            .unwrap(),
        1
    );
}

#[tokio::test]
async fn resolution_touch_keeps_the_login_alive() {
    let (db, _principal) = setup().await;

    let mut g = guard(&db, MemorySession::new());
    assert!(g.attempt("ada@example.com", PASSWORD).await.unwrap());
    let token = g.session().get(LOGIN_TOKEN_KEY).unwrap();

    // Nine minutes idle, then one request lands.
    backdate(&db, &token, 9).await;
    let mut next = guard(&db, g.into_session());
    assert!(next.current_principal().await.unwrap().is_some());

    // The touch reset the clock; a ten-minute sweep removes nothing.
    let sweeper = Sweeper::new(login_repo(&db), 10);
    assert_eq!(sweeper.run_once().await.unwrap(), 0);

    let mut after_sweep = guard(&db, next.into_session());
    assert!(after_sweep.current_principal().await.unwrap().is_some());
}

#[tokio::test]
async fn has_role_matches_case_insensitively() {
    let (db, principal) = setup().await;
    let role_repo = SurrealRoleRepository::new(db.clone());
    let owner = role_repo.get_by_name("Owner").await.unwrap();

    let principal = SurrealPrincipalRepository::new(db.clone())
        .update(
            principal.id,
            UpdatePrincipal {
                role_id: Some(Some(owner.id)),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert!(policy::has_role(&role_repo, &principal, "owner").await.unwrap());
    assert!(policy::has_role(&role_repo, &principal, "OWNER").await.unwrap());
    assert!(
        !policy::has_role(&role_repo, &principal, "Administrator")
            .await
            .unwrap()
    );
}

#[tokio::test]
async fn principal_without_role_has_no_role() {
    let (db, principal) = setup().await;
    let role_repo = SurrealRoleRepository::new(db.clone());

    assert!(!policy::has_role(&role_repo, &principal, "Owner").await.unwrap());
}

#[tokio::test]
async fn same_email_in_two_domains_scopes_credentials() {
    let (db, principal) = setup().await;
    let domain_b = domauth_db::ensure_installed_domain(&db, "other.example.com")
        .await
        .unwrap();

    // Same person, same email, different domain, different password.
    SurrealPrincipalRepository::new(db.clone())
        .create(CreatePrincipal {
            person_id: principal.person_id,
            email: "ada@example.com".into(),
            password: "other-domain-secret".into(),
            installed_domain_id: domain_b.id,
            role_id: None,
            created_by: None,
        })
        .await
        .unwrap();

    let guard_a = guard(&db, MemorySession::new());
    assert!(
        guard_a
            .validate_credentials("ada@example.com", PASSWORD)
            .await
            .unwrap()
    );
    assert!(
        !guard_a
            .validate_credentials("ada@example.com", "other-domain-secret")
            .await
            .unwrap()
    );

    let guard_b = guard_for(&db, MemorySession::new(), "other.example.com");
    assert!(
        guard_b
            .validate_credentials("ada@example.com", "other-domain-secret")
            .await
            .unwrap()
    );
    assert!(
        !guard_b
            .validate_credentials("ada@example.com", PASSWORD)
            .await
            .unwrap()
    );
}

#[tokio::test]
async fn corrupt_session_identity_resolves_anonymous() {
    let (db, _principal) = setup().await;

    let mut g = guard(&db, MemorySession::new());
    assert!(g.attempt("ada@example.com", PASSWORD).await.unwrap());
    let identity_key = g.identity_key().to_string();

    let mut session = g.into_session();
    session.put(&identity_key, "not-a-uuid".into());

    let mut next = guard(&db, session);
    assert!(next.current_principal().await.unwrap().is_none());
}
