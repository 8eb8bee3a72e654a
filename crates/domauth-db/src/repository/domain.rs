//! SurrealDB implementation of [`InstalledDomainRepository`].

use chrono::{DateTime, Utc};
use domauth_core::error::DomauthResult;
use domauth_core::models::domain::{CreateInstalledDomain, InstalledDomain};
use domauth_core::repository::{InstalledDomainRepository, PaginatedResult, Pagination};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct DomainRow {
    title: String,
    description: String,
    enabled: bool,
    protected: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct DomainRowWithId {
    record_id: String,
    title: String,
    description: String,
    enabled: bool,
    protected: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl DomainRow {
    fn into_domain(self, id: Uuid) -> InstalledDomain {
        InstalledDomain {
            id,
            title: self.title,
            description: self.description,
            enabled: self.enabled,
            protected: self.protected,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl DomainRowWithId {
    fn try_into_domain(self) -> Result<InstalledDomain, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Migration(format!("invalid UUID: {e}")))?;
        Ok(InstalledDomain {
            id,
            title: self.title,
            description: self.description,
            enabled: self.enabled,
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

/// SurrealDB implementation of the InstalledDomain repository.
#[derive(Clone)]
pub struct SurrealInstalledDomainRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealInstalledDomainRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> InstalledDomainRepository for SurrealInstalledDomainRepository<C> {
    async fn create(&self, input: CreateInstalledDomain) -> DomauthResult<InstalledDomain> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('installed_domain', $id) SET \
                 title = $title, \
                 description = $description, \
                 enabled = $enabled, \
                 protected = $protected",
            )
            .bind(("id", id_str.clone()))
            .bind(("title", input.title))
            .bind(("description", input.description))
            .bind(("enabled", input.enabled))
            .bind(("protected", input.protected))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        let rows: Vec<DomainRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "installed_domain".into(),
            id: id_str,
        })?;

        Ok(row.into_domain(id))
    }

    async fn get_by_id(&self, id: Uuid) -> DomauthResult<InstalledDomain> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('installed_domain', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<DomainRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "installed_domain".into(),
            id: id_str,
        })?;

        Ok(row.into_domain(id))
    }

    async fn get_by_title(&self, title: &str) -> DomauthResult<InstalledDomain> {
        let title_owned = title.to_string();

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM installed_domain \
                 WHERE title = $title",
            )
            .bind(("title", title_owned.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<DomainRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "installed_domain".into(),
            id: format!("title={title_owned}"),
        })?;

        Ok(row.try_into_domain()?)
    }

    async fn list(
        &self,
        pagination: Pagination,
    ) -> DomauthResult<PaginatedResult<InstalledDomain>> {
        let mut count_result = self
            .db
            .query("SELECT count() AS total FROM installed_domain GROUP ALL")
            .await
            .map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM installed_domain \
                 ORDER BY created_at ASC \
                 LIMIT $limit START $offset",
            )
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<DomainRowWithId> = result.take(0).map_err(DbError::from)?;

        let items = rows
            .into_iter()
            .map(|row| row.try_into_domain())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }
}
