//! SurrealDB implementation of [`RoleRepository`].

use chrono::{DateTime, Utc};
use domauth_core::error::DomauthResult;
use domauth_core::models::role::{CreateRole, Role};
use domauth_core::repository::{PaginatedResult, Pagination, RoleRepository};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct RoleRow {
    name: String,
    description: String,
    protected: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct RoleRowWithId {
    record_id: String,
    name: String,
    description: String,
    protected: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl RoleRow {
    fn into_role(self, id: Uuid) -> Role {
        Role {
            id,
            name: self.name,
            description: self.description,
            protected: self.protected,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl RoleRowWithId {
    fn try_into_role(self) -> Result<Role, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Migration(format!("invalid UUID: {e}")))?;
        Ok(Role {
            id,
            name: self.name,
            description: self.description,
            protected: self.protected,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

/// SurrealDB implementation of the Role repository.
#[derive(Clone)]
pub struct SurrealRoleRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealRoleRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> RoleRepository for SurrealRoleRepository<C> {
    async fn create(&self, input: CreateRole) -> DomauthResult<Role> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('role', $id) SET \
                 name = $name, \
                 description = $description, \
                 protected = $protected",
            )
            .bind(("id", id_str.clone()))
            .bind(("name", input.name))
            .bind(("description", input.description))
            .bind(("protected", input.protected))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        let rows: Vec<RoleRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "role".into(),
            id: id_str,
        })?;

        Ok(row.into_role(id))
    }

    async fn get_by_id(&self, id: Uuid) -> DomauthResult<Role> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('role', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<RoleRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "role".into(),
            id: id_str,
        })?;

        Ok(row.into_role(id))
    }

    async fn get_by_name(&self, name: &str) -> DomauthResult<Role> {
        let name_owned = name.to_string();

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM role \
                 WHERE name = $name",
            )
            .bind(("name", name_owned.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<RoleRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "role".into(),
            id: format!("name={name_owned}"),
        })?;

        Ok(row.try_into_role()?)
    }

    async fn list(&self, pagination: Pagination) -> DomauthResult<PaginatedResult<Role>> {
        let mut count_result = self
            .db
            .query("SELECT count() AS total FROM role GROUP ALL")
            .await
            .map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM role \
                 ORDER BY name ASC \
                 LIMIT $limit START $offset",
            )
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<RoleRowWithId> = result.take(0).map_err(DbError::from)?;

        let items = rows
            .into_iter()
            .map(|row| row.try_into_role())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }
}
