//! Connection layer for the SurrealDB backing store.
//!
//! A process opens one [`DbManager`] at startup and clones its client
//! handle into every repository. Settings come from [`DbConfig`],
//! either built in code or read from the `DOMAUTH_DB_*` environment
//! variables.

use surrealdb::Surreal;
use surrealdb::engine::remote::ws::{Client, Ws};
use surrealdb::opt::auth::Root;
use tracing::info;

/// Connection settings for the backing store.
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Host and port of the SurrealDB endpoint, e.g. `127.0.0.1:8000`.
    pub url: String,
    pub namespace: String,
    pub database: String,
    pub username: String,
    pub password: String,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url: "127.0.0.1:8000".into(),
            namespace: "domauth".into(),
            database: "main".into(),
            username: "root".into(),
            password: "root".into(),
        }
    }
}

impl DbConfig {
    /// Read settings from `DOMAUTH_DB_URL`, `DOMAUTH_DB_NAMESPACE`,
    /// `DOMAUTH_DB_DATABASE`, `DOMAUTH_DB_USERNAME`, and
    /// `DOMAUTH_DB_PASSWORD`, keeping the default for anything unset.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(url) = std::env::var("DOMAUTH_DB_URL") {
            config.url = url;
        }
        if let Ok(namespace) = std::env::var("DOMAUTH_DB_NAMESPACE") {
            config.namespace = namespace;
        }
        if let Ok(database) = std::env::var("DOMAUTH_DB_DATABASE") {
            config.database = database;
        }
        if let Ok(username) = std::env::var("DOMAUTH_DB_USERNAME") {
            config.username = username;
        }
        if let Ok(password) = std::env::var("DOMAUTH_DB_PASSWORD") {
            config.password = password;
        }
        config
    }
}

/// Holds the process-wide SurrealDB client.
#[derive(Clone)]
pub struct DbManager {
    db: Surreal<Client>,
}

impl DbManager {
    /// Open a WebSocket connection, authenticate as root, and select
    /// the configured namespace and database.
    pub async fn connect(config: &DbConfig) -> Result<Self, surrealdb::Error> {
        let db = Surreal::new::<Ws>(&config.url).await?;

        db.signin(Root {
            username: config.username.clone(),
            password: config.password.clone(),
        })
        .await?;

        db.use_ns(&config.namespace)
            .use_db(&config.database)
            .await?;

        info!(
            url = %config.url,
            ns = %config.namespace,
            db = %config.database,
            "SurrealDB connection established"
        );

        Ok(Self { db })
    }

    /// Shared client handle; repositories clone it.
    pub fn client(&self) -> &Surreal<Client> {
        &self.db
    }
}
