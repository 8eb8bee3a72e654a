//! Guard configuration.

/// Configuration for the authentication guard.
///
/// The domain title is deployment configuration: it scopes every
/// credential lookup to the installed domain this process serves, and
/// is never taken from client input.
#[derive(Debug, Clone)]
pub struct GuardConfig {
    /// Name of this guard instance; part of the derived session key,
    /// so two guards on one session do not collide.
    pub guard_name: String,
    /// Title of the installed domain this deployment serves.
    pub domain_title: String,
    /// Optional pepper prepended to passwords before Argon2id
    /// verification; must match the pepper used when hashing.
    pub pepper: Option<String>,
    /// Login tokens idle longer than this are removed by the sweep
    /// (default: 10 minutes).
    pub inactivity_threshold_minutes: u64,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            guard_name: "web".into(),
            domain_title: String::new(),
            pepper: None,
            inactivity_threshold_minutes: 10,
        }
    }
}
