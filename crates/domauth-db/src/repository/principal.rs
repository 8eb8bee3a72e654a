//! SurrealDB implementation of [`PrincipalRepository`].
//!
//! Password hashing uses Argon2id with OWASP-recommended parameters
//! (memory: 19 MiB, iterations: 2, parallelism: 1). Salt is randomly
//! generated per hash. An optional pepper (server-side secret) can be
//! provided at construction time.

use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHasher};
use chrono::{DateTime, Utc};
use domauth_core::error::DomauthResult;
use domauth_core::models::principal::{CreatePrincipal, Principal, UpdatePrincipal};
use domauth_core::repository::{PaginatedResult, Pagination, PrincipalRepository};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
struct PrincipalRow {
    person_id: String,
    email: String,
    password_hash: String,
    installed_domain_id: String,
    role_id: Option<String>,
    banned: bool,
    banned_at: Option<DateTime<Utc>>,
    ban_reason: Option<String>,
    created_at: DateTime<Utc>,
    created_by: Option<String>,
    updated_at: DateTime<Utc>,
    updated_by: Option<String>,
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct PrincipalRowWithId {
    record_id: String,
    person_id: String,
    email: String,
    password_hash: String,
    installed_domain_id: String,
    role_id: Option<String>,
    banned: bool,
    banned_at: Option<DateTime<Utc>>,
    ban_reason: Option<String>,
    created_at: DateTime<Utc>,
    created_by: Option<String>,
    updated_at: DateTime<Utc>,
    updated_by: Option<String>,
}

fn parse_uuid(field: &str, value: &str) -> Result<Uuid, DbError> {
    Uuid::parse_str(value).map_err(|e| DbError::Migration(format!("invalid {field} UUID: {e}")))
}

fn parse_opt_uuid(field: &str, value: Option<String>) -> Result<Option<Uuid>, DbError> {
    value.map(|v| parse_uuid(field, &v)).transpose()
}

impl PrincipalRow {
    fn into_principal(self, id: Uuid) -> Result<Principal, DbError> {
        Ok(Principal {
            id,
            person_id: parse_uuid("person", &self.person_id)?,
            email: self.email,
            password_hash: self.password_hash,
            installed_domain_id: parse_uuid("domain", &self.installed_domain_id)?,
            role_id: parse_opt_uuid("role", self.role_id)?,
            banned: self.banned,
            banned_at: self.banned_at,
            ban_reason: self.ban_reason,
            created_at: self.created_at,
            created_by: parse_opt_uuid("created_by", self.created_by)?,
            updated_at: self.updated_at,
            updated_by: parse_opt_uuid("updated_by", self.updated_by)?,
        })
    }
}

impl PrincipalRowWithId {
    fn try_into_principal(self) -> Result<Principal, DbError> {
        let id = parse_uuid("principal", &self.record_id)?;
        Ok(Principal {
            id,
            person_id: parse_uuid("person", &self.person_id)?,
            email: self.email,
            password_hash: self.password_hash,
            installed_domain_id: parse_uuid("domain", &self.installed_domain_id)?,
            role_id: parse_opt_uuid("role", self.role_id)?,
            banned: self.banned,
            banned_at: self.banned_at,
            ban_reason: self.ban_reason,
            created_at: self.created_at,
            created_by: parse_opt_uuid("created_by", self.created_by)?,
            updated_at: self.updated_at,
            updated_by: parse_opt_uuid("updated_by", self.updated_by)?,
        })
    }
}

/// Row struct for count queries.
#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

/// Hash a password with Argon2id using OWASP-recommended parameters.
///
/// If a pepper is provided, it is prepended to the password before
/// hashing. The salt is randomly generated for each call.
pub fn hash_password(password: &str, pepper: Option<&str>) -> Result<String, DbError> {
    // OWASP ASVS recommended: m=19456 (19 MiB), t=2, p=1
    let params = argon2::Params::new(19456, 2, 1, None)
        .map_err(|e| DbError::Migration(format!("argon2 params error: {e}")))?;
    let argon2 = Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params);

    let peppered: String;
    let input = match pepper {
        Some(p) => {
            peppered = format!("{p}{password}");
            peppered.as_bytes()
        }
        None => password.as_bytes(),
    };

    let salt = SaltString::generate(&mut argon2::password_hash::rand_core::OsRng);
    let hash = argon2
        .hash_password(input, &salt)
        .map_err(|e| DbError::Migration(format!("password hash error: {e}")))?;

    Ok(hash.to_string())
}

/// Verify a password against an Argon2id hash.
///
/// Counterpart to [`hash_password`] for checking a candidate password
/// against a stored hash, e.g. in provisioning tools and tests. The
/// guard's request path carries its own verifier.
pub fn verify_password(password: &str, hash: &str, pepper: Option<&str>) -> Result<bool, DbError> {
    use argon2::PasswordVerifier;

    let peppered: String;
    let input = match pepper {
        Some(p) => {
            peppered = format!("{p}{password}");
            peppered.as_bytes()
        }
        None => password.as_bytes(),
    };

    let parsed_hash = argon2::PasswordHash::new(hash)
        .map_err(|e| DbError::Migration(format!("invalid hash format: {e}")))?;

    let argon2 = Argon2::default();
    match argon2.verify_password(input, &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(DbError::Migration(format!("verify error: {e}"))),
    }
}

/// SurrealDB implementation of the Principal repository — the
/// credential store.
#[derive(Clone)]
pub struct SurrealPrincipalRepository<C: Connection> {
    db: Surreal<C>,
    /// Optional server-side pepper for password hashing.
    pepper: Option<String>,
}

impl<C: Connection> SurrealPrincipalRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db, pepper: None }
    }

    pub fn with_pepper(db: Surreal<C>, pepper: String) -> Self {
        Self {
            db,
            pepper: Some(pepper),
        }
    }
}

impl<C: Connection> PrincipalRepository for SurrealPrincipalRepository<C> {
    async fn create(&self, input: CreatePrincipal) -> DomauthResult<Principal> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let password_hash = hash_password(&input.password, self.pepper.as_deref())?;

        let result = self
            .db
            .query(
                "CREATE type::record('principal', $id) SET \
                 person_id = $person_id, \
                 email = $email, \
                 password_hash = $password_hash, \
                 installed_domain_id = $installed_domain_id, \
                 role_id = $role_id, \
                 banned = false, \
                 banned_at = NONE, \
                 ban_reason = NONE, \
                 created_by = $created_by, \
                 updated_by = $created_by",
            )
            .bind(("id", id_str.clone()))
            .bind(("person_id", input.person_id.to_string()))
            .bind(("email", input.email))
            .bind(("password_hash", password_hash))
            .bind((
                "installed_domain_id",
                input.installed_domain_id.to_string(),
            ))
            .bind(("role_id", input.role_id.map(|r| r.to_string())))
            .bind(("created_by", input.created_by.map(|c| c.to_string())))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        let rows: Vec<PrincipalRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "principal".into(),
            id: id_str,
        })?;

        Ok(row.into_principal(id)?)
    }

    async fn get_by_id(&self, id: Uuid) -> DomauthResult<Principal> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('principal', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<PrincipalRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "principal".into(),
            id: id_str,
        })?;

        Ok(row.into_principal(id)?)
    }

    async fn get_by_email_and_domain(
        &self,
        email: &str,
        domain_title: &str,
    ) -> DomauthResult<Principal> {
        // Resolve the domain title to its record id first; the title
        // is deployment configuration, never client input.
        let mut domain_result = self
            .db
            .query(
                "SELECT VALUE meta::id(id) FROM installed_domain \
                 WHERE title = $title",
            )
            .bind(("title", domain_title.to_string()))
            .await
            .map_err(DbError::from)?;

        let domain_ids: Vec<String> = domain_result.take(0).map_err(DbError::from)?;
        let domain_id = domain_ids.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "installed_domain".into(),
            id: format!("title={domain_title}"),
        })?;

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM principal \
                 WHERE installed_domain_id = $domain_id \
                 AND email = $email",
            )
            .bind(("domain_id", domain_id))
            .bind(("email", email.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<PrincipalRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "principal".into(),
            id: format!("email={email}"),
        })?;

        Ok(row.try_into_principal()?)
    }

    async fn update(&self, id: Uuid, input: UpdatePrincipal) -> DomauthResult<Principal> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.email.is_some() {
            sets.push("email = $email");
        }
        if input.role_id.is_some() {
            sets.push("role_id = $role_id");
        }
        if input.updated_by.is_some() {
            sets.push("updated_by = $updated_by");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('principal', $id) SET {}",
            sets.join(", ")
        );

        let mut builder = self.db.query(&query).bind(("id", id_str.clone()));

        if let Some(email) = input.email {
            builder = builder.bind(("email", email));
        }
        if let Some(role_id) = input.role_id {
            // Option<Option<Uuid>>: Some(Some(v)) = assign, Some(None) = clear
            builder = builder.bind(("role_id", role_id.map(|r| r.to_string())));
        }
        if let Some(updated_by) = input.updated_by {
            builder = builder.bind(("updated_by", updated_by.to_string()));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        let rows: Vec<PrincipalRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "principal".into(),
            id: id_str,
        })?;

        Ok(row.into_principal(id)?)
    }

    async fn set_password(
        &self,
        id: Uuid,
        new_password: &str,
        updated_by: Option<Uuid>,
    ) -> DomauthResult<()> {
        let password_hash = hash_password(new_password, self.pepper.as_deref())?;

        self.db
            .query(
                "UPDATE type::record('principal', $id) SET \
                 password_hash = $password_hash, \
                 updated_at = time::now(), \
                 updated_by = $updated_by",
            )
            .bind(("id", id.to_string()))
            .bind(("password_hash", password_hash))
            .bind(("updated_by", updated_by.map(|u| u.to_string())))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }

    async fn ban(
        &self,
        id: Uuid,
        reason: &str,
        banned_by: Option<Uuid>,
    ) -> DomauthResult<Principal> {
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "UPDATE type::record('principal', $id) SET \
                 banned = true, \
                 banned_at = time::now(), \
                 ban_reason = $reason, \
                 updated_at = time::now(), \
                 updated_by = $banned_by",
            )
            .bind(("id", id_str.clone()))
            .bind(("reason", reason.to_string()))
            .bind(("banned_by", banned_by.map(|b| b.to_string())))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        let rows: Vec<PrincipalRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "principal".into(),
            id: id_str,
        })?;

        Ok(row.into_principal(id)?)
    }

    async fn unban(&self, id: Uuid, unbanned_by: Option<Uuid>) -> DomauthResult<Principal> {
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "UPDATE type::record('principal', $id) SET \
                 banned = false, \
                 banned_at = NONE, \
                 ban_reason = NONE, \
                 updated_at = time::now(), \
                 updated_by = $unbanned_by",
            )
            .bind(("id", id_str.clone()))
            .bind(("unbanned_by", unbanned_by.map(|u| u.to_string())))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        let rows: Vec<PrincipalRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "principal".into(),
            id: id_str,
        })?;

        Ok(row.into_principal(id)?)
    }

    async fn list_by_domain(
        &self,
        installed_domain_id: Uuid,
        pagination: Pagination,
    ) -> DomauthResult<PaginatedResult<Principal>> {
        let domain_str = installed_domain_id.to_string();

        let mut count_result = self
            .db
            .query(
                "SELECT count() AS total FROM principal \
                 WHERE installed_domain_id = $domain_id GROUP ALL",
            )
            .bind(("domain_id", domain_str.clone()))
            .await
            .map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM principal \
                 WHERE installed_domain_id = $domain_id \
                 ORDER BY created_at ASC \
                 LIMIT $limit START $offset",
            )
            .bind(("domain_id", domain_str))
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<PrincipalRowWithId> = result.take(0).map_err(DbError::from)?;

        let items = rows
            .into_iter()
            .map(|row| row.try_into_principal())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }
}
