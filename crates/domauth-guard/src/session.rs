//! In-memory session store.
//!
//! Production deployments adapt their framework's session to
//! [`SessionStore`]; this implementation backs tests and single-process
//! tools.

use std::collections::HashMap;

use domauth_core::session::SessionStore;
use rand::Rng;
use rand::distr::Alphanumeric;

fn random_session_id() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(40)
        .map(char::from)
        .collect()
}

/// HashMap-backed [`SessionStore`].
#[derive(Debug, Clone)]
pub struct MemorySession {
    id: String,
    values: HashMap<String, String>,
}

impl MemorySession {
    pub fn new() -> Self {
        Self {
            id: random_session_id(),
            values: HashMap::new(),
        }
    }
}

impl Default for MemorySession {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore for MemorySession {
    fn id(&self) -> &str {
        &self.id
    }

    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn put(&mut self, key: &str, value: String) {
        self.values.insert(key.to_string(), value);
    }

    fn remove(&mut self, key: &str) -> Option<String> {
        self.values.remove(key)
    }

    fn regenerate_id(&mut self, _destroy_old: bool) {
        // Attributes survive the rotation; there is no backing store
        // holding a copy under the old id to destroy.
        self.id = random_session_id();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_get_remove_roundtrip() {
        let mut session = MemorySession::new();
        session.put("k", "v".into());
        assert_eq!(session.get("k").as_deref(), Some("v"));
        assert_eq!(session.remove("k").as_deref(), Some("v"));
        assert_eq!(session.get("k"), None);
    }

    #[test]
    fn regenerate_rotates_id_and_keeps_values() {
        let mut session = MemorySession::new();
        session.put("k", "v".into());
        let old_id = session.id().to_string();

        session.regenerate_id(true);

        assert_ne!(session.id(), old_id);
        assert_eq!(session.get("k").as_deref(), Some("v"));
    }
}
