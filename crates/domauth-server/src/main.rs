//! domauth Server — sweeper daemon.
//!
//! Connects to SurrealDB, applies migrations, seeds the role lookup
//! set and the serving domain record, then sweeps inactive login
//! tokens on an interval until interrupted.

use std::time::Duration;

use domauth_db::repository::SurrealLoginRepository;
use domauth_db::{DbConfig, DbManager};
use domauth_guard::Sweeper;
use tracing_subscriber::EnvFilter;

/// Runtime configuration, read from the environment.
#[derive(Debug, Clone)]
struct SweeperConfig {
    db: DbConfig,
    /// Title of the installed domain this deployment serves.
    domain_title: String,
    /// Login tokens idle longer than this are removed.
    inactivity_threshold_minutes: u64,
    /// Seconds between sweep runs.
    sweep_interval_secs: u64,
}

impl SweeperConfig {
    fn from_env() -> Self {
        Self {
            db: DbConfig::from_env(),
            domain_title: std::env::var("DOMAUTH_DOMAIN_TITLE")
                .unwrap_or_else(|_| "localhost".into()),
            inactivity_threshold_minutes: std::env::var("DOMAUTH_SWEEP_THRESHOLD_MINUTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),
            sweep_interval_secs: std::env::var("DOMAUTH_SWEEP_INTERVAL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(60),
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("domauth=info".parse().unwrap()),
        )
        .json()
        .init();

    let config = SweeperConfig::from_env();
    tracing::info!(
        domain = %config.domain_title,
        threshold_minutes = config.inactivity_threshold_minutes,
        interval_secs = config.sweep_interval_secs,
        "Starting domauth sweeper"
    );

    let manager = match DbManager::connect(&config.db).await {
        Ok(manager) => manager,
        Err(e) => {
            tracing::error!(error = %e, "Failed to connect to SurrealDB");
            std::process::exit(1);
        }
    };
    let db = manager.client().clone();

    if let Err(e) = domauth_db::run_migrations(&db).await {
        tracing::error!(error = %e, "Migrations failed");
        std::process::exit(1);
    }
    if let Err(e) = domauth_db::seed_default_roles(&db).await {
        tracing::error!(error = %e, "Role seeding failed");
        std::process::exit(1);
    }
    if let Err(e) = domauth_db::ensure_installed_domain(&db, &config.domain_title).await {
        tracing::error!(error = %e, "Domain registration failed");
        std::process::exit(1);
    }

    let sweeper = Sweeper::new(
        SurrealLoginRepository::new(db),
        config.inactivity_threshold_minutes,
    );

    let mut interval = tokio::time::interval(Duration::from_secs(config.sweep_interval_secs));
    loop {
        tokio::select! {
            _ = interval.tick() => {
                if let Err(e) = sweeper.run_once().await {
                    tracing::error!(error = %e, "Sweep failed");
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Shutting down domauth sweeper");
                break;
            }
        }
    }
}
