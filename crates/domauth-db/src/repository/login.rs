//! SurrealDB implementation of [`LoginRepository`].
//!
//! The `login` table is the server-side ledger of active logins. One
//! row per token, unique-indexed on `token` because `get_by_token` runs
//! on every authenticated request. `touch`, `delete_by_token`, and
//! `sweep_inactive` all tolerate the row vanishing underneath them —
//! a concurrent logout or sweep is a benign race, not an error.

use chrono::{DateTime, Duration, Utc};
use domauth_core::error::DomauthResult;
use domauth_core::models::login::{CreateLoginToken, LoginToken};
use domauth_core::repository::LoginRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct LoginRow {
    principal_id: String,
    token: String,
    uuid: Option<String>,
    created_at: DateTime<Utc>,
    created_by: String,
    updated_at: DateTime<Utc>,
    updated_by: String,
    locked_at: Option<DateTime<Utc>>,
    locked_by: Option<String>,
}

#[derive(Debug, SurrealValue)]
struct LoginRowWithId {
    record_id: String,
    principal_id: String,
    token: String,
    uuid: Option<String>,
    created_at: DateTime<Utc>,
    created_by: String,
    updated_at: DateTime<Utc>,
    updated_by: String,
    locked_at: Option<DateTime<Utc>>,
    locked_by: Option<String>,
}

fn parse_uuid(field: &str, value: &str) -> Result<Uuid, DbError> {
    Uuid::parse_str(value).map_err(|e| DbError::Migration(format!("invalid {field} UUID: {e}")))
}

fn parse_opt_uuid(field: &str, value: Option<String>) -> Result<Option<Uuid>, DbError> {
    value.map(|v| parse_uuid(field, &v)).transpose()
}

impl LoginRow {
    fn into_login(self, id: Uuid) -> Result<LoginToken, DbError> {
        Ok(LoginToken {
            id,
            principal_id: parse_uuid("principal", &self.principal_id)?,
            token: self.token,
            uuid: parse_opt_uuid("correlation", self.uuid)?,
            created_at: self.created_at,
            created_by: parse_uuid("created_by", &self.created_by)?,
            updated_at: self.updated_at,
            updated_by: parse_uuid("updated_by", &self.updated_by)?,
            locked_at: self.locked_at,
            locked_by: parse_opt_uuid("locked_by", self.locked_by)?,
        })
    }
}

impl LoginRowWithId {
    fn try_into_login(self) -> Result<LoginToken, DbError> {
        let id = parse_uuid("login", &self.record_id)?;
        Ok(LoginToken {
            id,
            principal_id: parse_uuid("principal", &self.principal_id)?,
            token: self.token,
            uuid: parse_opt_uuid("correlation", self.uuid)?,
            created_at: self.created_at,
            created_by: parse_uuid("created_by", &self.created_by)?,
            updated_at: self.updated_at,
            updated_by: parse_uuid("updated_by", &self.updated_by)?,
            locked_at: self.locked_at,
            locked_by: parse_opt_uuid("locked_by", self.locked_by)?,
        })
    }
}

#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

/// SurrealDB implementation of the login token ledger.
#[derive(Clone)]
pub struct SurrealLoginRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealLoginRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    async fn count_where(&self, clause: &str, binding: (&'static str, String)) -> DomauthResult<u64> {
        let query = format!("SELECT count() AS total FROM login WHERE {clause} GROUP ALL");
        let mut result = self
            .db
            .query(&query)
            .bind(binding)
            .await
            .map_err(DbError::from)?;
        let rows: Vec<CountRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows.first().map(|r| r.total).unwrap_or(0))
    }
}

impl<C: Connection> LoginRepository for SurrealLoginRepository<C> {
    async fn create(&self, input: CreateLoginToken) -> DomauthResult<LoginToken> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();
        let created_by = input.created_by.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('login', $id) SET \
                 principal_id = $principal_id, \
                 token = $login_token, \
                 uuid = $uuid, \
                 created_by = $created_by, \
                 updated_by = $created_by",
            )
            .bind(("id", id_str.clone()))
            .bind(("principal_id", input.principal_id.to_string()))
            .bind(("login_token", input.token))
            .bind(("uuid", input.uuid.map(|u| u.to_string())))
            .bind(("created_by", created_by))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        let rows: Vec<LoginRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "login".into(),
            id: id_str,
        })?;

        Ok(row.into_login(id)?)
    }

    async fn get_by_token(&self, token: &str) -> DomauthResult<LoginToken> {
        let token_owned = token.to_string();

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM login \
                 WHERE token = $login_token",
            )
            .bind(("login_token", token_owned.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<LoginRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "login".into(),
            id: format!("token={token_owned}"),
        })?;

        Ok(row.try_into_login()?)
    }

    async fn touch(&self, token: &str, principal_id: Uuid) -> DomauthResult<()> {
        // Zero matching rows is fine: the token was logged out or
        // swept between lookup and touch.
        self.db
            .query(
                "UPDATE login SET \
                 updated_at = time::now(), \
                 updated_by = $principal_id \
                 WHERE token = $login_token",
            )
            .bind(("login_token", token.to_string()))
            .bind(("principal_id", principal_id.to_string()))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }

    async fn delete_by_token(&self, token: &str) -> DomauthResult<()> {
        self.db
            .query("DELETE login WHERE token = $login_token")
            .bind(("login_token", token.to_string()))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }

    async fn delete_all_for_principal(&self, principal_id: Uuid) -> DomauthResult<u64> {
        let principal_str = principal_id.to_string();

        // Count first, then delete.
        let total = self
            .count_where(
                "principal_id = $principal_id",
                ("principal_id", principal_str.clone()),
            )
            .await?;

        self.db
            .query("DELETE login WHERE principal_id = $principal_id")
            .bind(("principal_id", principal_str))
            .await
            .map_err(DbError::from)?;

        Ok(total)
    }

    async fn sweep_inactive(&self, threshold_minutes: u64) -> DomauthResult<u64> {
        let cutoff = Utc::now() - Duration::minutes(threshold_minutes as i64);

        let mut count_result = self
            .db
            .query(
                "SELECT count() AS total FROM login \
                 WHERE updated_at < $cutoff GROUP ALL",
            )
            .bind(("cutoff", cutoff))
            .await
            .map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        // The predicate re-evaluates per row at delete time, so a row
        // touched after the cutoff snapshot survives.
        self.db
            .query("DELETE login WHERE updated_at < $cutoff")
            .bind(("cutoff", cutoff))
            .await
            .map_err(DbError::from)?;

        Ok(total)
    }

    async fn count_for_principal(&self, principal_id: Uuid) -> DomauthResult<u64> {
        self.count_where(
            "principal_id = $principal_id",
            ("principal_id", principal_id.to_string()),
        )
        .await
    }
}
