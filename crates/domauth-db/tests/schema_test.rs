//! Integration tests for schema initialization using in-memory SurrealDB.

use surrealdb::Surreal;
use surrealdb::engine::local::Mem;

#[tokio::test]
async fn schema_migration_applies_successfully() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();

    domauth_db::run_migrations(&db).await.unwrap();

    // Verify that key tables exist by querying INFO FOR DB.
    let mut result = db.query("INFO FOR DB").await.unwrap();
    let info: Option<surrealdb_types::Value> = result.take(0).unwrap();
    let info = info.expect("INFO FOR DB should return a value");
    let info_str = format!("{:?}", info);

    assert!(info_str.contains("person"), "missing person table");
    assert!(
        info_str.contains("installed_domain"),
        "missing installed_domain table"
    );
    assert!(info_str.contains("role"), "missing role table");
    assert!(info_str.contains("principal"), "missing principal table");
    assert!(info_str.contains("login"), "missing login table");

    // Verify migration was recorded.
    assert!(info_str.contains("_migration"), "missing _migration table");
}

#[tokio::test]
async fn migration_is_idempotent() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();

    // Run twice — should not fail.
    domauth_db::run_migrations(&db).await.unwrap();
    domauth_db::run_migrations(&db).await.unwrap();

    // Verify only one migration record exists.
    let mut result = db.query("SELECT * FROM _migration").await.unwrap();
    let records: Vec<surrealdb_types::Value> = result.take(0).unwrap();
    assert_eq!(records.len(), 1, "expected exactly one migration record");
}

#[tokio::test]
async fn unique_index_prevents_duplicate_login_tokens() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();

    domauth_db::run_migrations(&db).await.unwrap();

    db.query(
        "CREATE login SET \
         principal_id = 'p-1', \
         token = 'tok-dup', \
         uuid = NONE, \
         created_by = 'p-1', \
         updated_by = 'p-1'",
    )
    .await
    .unwrap()
    .check()
    .unwrap();

    // Second row with the same token — should fail.
    let result = db
        .query(
            "CREATE login SET \
             principal_id = 'p-2', \
             token = 'tok-dup', \
             uuid = NONE, \
             created_by = 'p-2', \
             updated_by = 'p-2'",
        )
        .await
        .unwrap()
        .check();

    assert!(result.is_err(), "duplicate login token should be rejected");
}

#[tokio::test]
async fn unique_index_prevents_duplicate_domain_titles() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();

    domauth_db::run_migrations(&db).await.unwrap();

    db.query(
        "CREATE installed_domain SET \
         title = 'auth.example.com', \
         description = 'first', \
         enabled = true, \
         protected = false",
    )
    .await
    .unwrap()
    .check()
    .unwrap();

    let result = db
        .query(
            "CREATE installed_domain SET \
             title = 'auth.example.com', \
             description = 'second', \
             enabled = true, \
             protected = false",
        )
        .await
        .unwrap()
        .check();

    assert!(result.is_err(), "duplicate domain title should be rejected");
}
