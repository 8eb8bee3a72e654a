//! Inactivity sweep over the login-token ledger.
//!
//! Driven by an external scheduler (the server binary's interval
//! timer, or cron). Safe to run while login/logout traffic continues:
//! a row touched after the sweep's cutoff survives.

use domauth_core::error::DomauthResult;
use domauth_core::repository::LoginRepository;
use tracing::info;

/// Periodic sweeper for inactive login tokens.
pub struct Sweeper<L: LoginRepository> {
    login_repo: L,
    threshold_minutes: u64,
}

impl<L: LoginRepository> Sweeper<L> {
    pub fn new(login_repo: L, threshold_minutes: u64) -> Self {
        Self {
            login_repo,
            threshold_minutes,
        }
    }

    /// Delete every ledger row idle longer than the threshold; returns
    /// the number removed.
    pub async fn run_once(&self) -> DomauthResult<u64> {
        let removed = self
            .login_repo
            .sweep_inactive(self.threshold_minutes)
            .await?;

        if removed > 0 {
            info!(
                removed,
                threshold_minutes = self.threshold_minutes,
                "swept inactive login tokens"
            );
        }
        Ok(removed)
    }
}
