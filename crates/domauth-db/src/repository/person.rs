//! SurrealDB implementation of [`PersonRepository`].

use chrono::{DateTime, Utc};
use domauth_core::error::DomauthResult;
use domauth_core::models::person::{CreatePerson, Person};
use domauth_core::repository::{PaginatedResult, Pagination, PersonRepository};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct PersonRow {
    first_name: String,
    last_name: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct PersonRowWithId {
    record_id: String,
    first_name: String,
    last_name: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl PersonRow {
    fn into_person(self, id: Uuid) -> Person {
        Person {
            id,
            first_name: self.first_name,
            last_name: self.last_name,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl PersonRowWithId {
    fn try_into_person(self) -> Result<Person, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Migration(format!("invalid UUID: {e}")))?;
        Ok(Person {
            id,
            first_name: self.first_name,
            last_name: self.last_name,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

/// SurrealDB implementation of the Person repository.
#[derive(Clone)]
pub struct SurrealPersonRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealPersonRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> PersonRepository for SurrealPersonRepository<C> {
    async fn create(&self, input: CreatePerson) -> DomauthResult<Person> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('person', $id) SET \
                 first_name = $first_name, \
                 last_name = $last_name",
            )
            .bind(("id", id_str.clone()))
            .bind(("first_name", input.first_name))
            .bind(("last_name", input.last_name))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        let rows: Vec<PersonRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "person".into(),
            id: id_str,
        })?;

        Ok(row.into_person(id))
    }

    async fn get_by_id(&self, id: Uuid) -> DomauthResult<Person> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('person', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<PersonRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "person".into(),
            id: id_str,
        })?;

        Ok(row.into_person(id))
    }

    async fn list(&self, pagination: Pagination) -> DomauthResult<PaginatedResult<Person>> {
        let mut count_result = self
            .db
            .query("SELECT count() AS total FROM person GROUP ALL")
            .await
            .map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM person \
                 ORDER BY created_at ASC \
                 LIMIT $limit START $offset",
            )
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<PersonRowWithId> = result.take(0).map_err(DbError::from)?;

        let items = rows
            .into_iter()
            .map(|row| row.try_into_person())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }
}
