//! Schema definitions and migration runner for SurrealDB.
//!
//! All table definitions use SCHEMAFULL mode for data integrity.
//! UUIDs are stored as strings. Timestamps default to `time::now()`.

use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::info;

use crate::error::DbError;

// -----------------------------------------------------------------------
// Migration tracking
// -----------------------------------------------------------------------

const MIGRATION_TABLE_DDL: &str = "\
DEFINE TABLE IF NOT EXISTS _migration SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS version ON TABLE _migration TYPE int;
DEFINE FIELD IF NOT EXISTS name ON TABLE _migration TYPE string;
DEFINE FIELD IF NOT EXISTS applied_at ON TABLE _migration TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_migration_version ON TABLE _migration \
    COLUMNS version UNIQUE;
";

#[derive(Debug, SurrealValue)]
struct MigrationRecord {
    version: u32,
    #[allow(dead_code)]
    name: String,
}

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

static MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "initial_schema",
    sql: SCHEMA_V1,
}];

// -----------------------------------------------------------------------
// Schema v1 — initial table definitions
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
-- =======================================================================
-- Persons (profiles, non-authenticatable)
-- =======================================================================
DEFINE TABLE person SCHEMAFULL;
DEFINE FIELD first_name ON TABLE person TYPE string;
DEFINE FIELD last_name ON TABLE person TYPE string;
DEFINE FIELD created_at ON TABLE person TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE person TYPE datetime \
    DEFAULT time::now();

-- =======================================================================
-- Installed domains
-- =======================================================================
DEFINE TABLE installed_domain SCHEMAFULL;
DEFINE FIELD title ON TABLE installed_domain TYPE string;
DEFINE FIELD description ON TABLE installed_domain TYPE string;
DEFINE FIELD enabled ON TABLE installed_domain TYPE bool DEFAULT true;
DEFINE FIELD protected ON TABLE installed_domain TYPE bool \
    DEFAULT false;
DEFINE FIELD created_at ON TABLE installed_domain TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE installed_domain TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_domain_title ON TABLE installed_domain \
    COLUMNS title UNIQUE;

-- =======================================================================
-- Roles (fixed lookup set, seeded at install)
-- =======================================================================
DEFINE TABLE role SCHEMAFULL;
DEFINE FIELD name ON TABLE role TYPE string;
DEFINE FIELD description ON TABLE role TYPE string;
DEFINE FIELD protected ON TABLE role TYPE bool DEFAULT false;
DEFINE FIELD created_at ON TABLE role TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE role TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_role_name ON TABLE role COLUMNS name UNIQUE;

-- =======================================================================
-- Principals (one authenticatable identity per person per domain)
-- =======================================================================
DEFINE TABLE principal SCHEMAFULL;
DEFINE FIELD person_id ON TABLE principal TYPE string;
DEFINE FIELD email ON TABLE principal TYPE string;
DEFINE FIELD password_hash ON TABLE principal TYPE string;
DEFINE FIELD installed_domain_id ON TABLE principal TYPE string;
DEFINE FIELD role_id ON TABLE principal TYPE option<string>;
DEFINE FIELD banned ON TABLE principal TYPE bool DEFAULT false;
DEFINE FIELD banned_at ON TABLE principal TYPE option<datetime>;
DEFINE FIELD ban_reason ON TABLE principal TYPE option<string>;
DEFINE FIELD created_at ON TABLE principal TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD created_by ON TABLE principal TYPE option<string>;
DEFINE FIELD updated_at ON TABLE principal TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_by ON TABLE principal TYPE option<string>;
DEFINE INDEX idx_principal_email_domain ON TABLE principal \
    COLUMNS installed_domain_id, email UNIQUE;
DEFINE INDEX idx_principal_person ON TABLE principal \
    COLUMNS person_id;

-- =======================================================================
-- Login token ledger (one row per active login)
-- =======================================================================
DEFINE TABLE login SCHEMAFULL;
DEFINE FIELD principal_id ON TABLE login TYPE string;
DEFINE FIELD token ON TABLE login TYPE string;
DEFINE FIELD uuid ON TABLE login TYPE option<string>;
DEFINE FIELD created_at ON TABLE login TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD created_by ON TABLE login TYPE string;
DEFINE FIELD updated_at ON TABLE login TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_by ON TABLE login TYPE string;
DEFINE FIELD locked_at ON TABLE login TYPE option<datetime>;
DEFINE FIELD locked_by ON TABLE login TYPE option<string>;
DEFINE INDEX idx_login_token ON TABLE login COLUMNS token UNIQUE;
DEFINE INDEX idx_login_principal ON TABLE login COLUMNS principal_id;
DEFINE INDEX idx_login_updated ON TABLE login COLUMNS updated_at;
";

// -----------------------------------------------------------------------
// Public API
// -----------------------------------------------------------------------

/// Run all pending migrations against the given SurrealDB client.
///
/// Creates a `_migration` tracking table on first run, then applies
/// each migration whose version exceeds the current maximum.
/// All DEFINE statements are idempotent so re-running is safe.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    // Ensure migration tracking table exists (idempotent).
    db.query(MIGRATION_TABLE_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Migration(e.to_string()))?;

    // Determine current schema version.
    let mut result = db
        .query("SELECT * FROM _migration ORDER BY version DESC LIMIT 1")
        .await?;
    let records: Vec<MigrationRecord> = result.take(0)?;
    let current_version = records.first().map(|m| m.version).unwrap_or(0);

    for migration in MIGRATIONS {
        if migration.version > current_version {
            info!(
                version = migration.version,
                name = migration.name,
                "Applying migration"
            );
            db.query(migration.sql).await?.check().map_err(|e| {
                DbError::Migration(format!(
                    "Migration v{} '{}' failed: {}",
                    migration.version, migration.name, e,
                ))
            })?;

            // Record the applied migration.
            db.query(
                "CREATE _migration SET version = $version, \
                 name = $name",
            )
            .bind(("version", migration.version))
            .bind(("name", migration.name))
            .await?
            .check()
            .map_err(|e| {
                DbError::Migration(format!(
                    "Failed to record migration v{}: {}",
                    migration.version, e,
                ))
            })?;

            info!(
                version = migration.version,
                "Migration applied successfully"
            );
        }
    }

    Ok(())
}

/// Returns the raw schema DDL for version 1.
///
/// Exposed for testing with in-memory SurrealDB instances that
/// bypass the migration runner.
pub fn schema_v1() -> &'static str {
    SCHEMA_V1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_v1_is_nonempty() {
        assert!(!SCHEMA_V1.is_empty());
    }

    #[test]
    fn migrations_are_ordered() {
        for window in MIGRATIONS.windows(2) {
            assert!(
                window[0].version < window[1].version,
                "Migrations must be in ascending version order"
            );
        }
    }
}
