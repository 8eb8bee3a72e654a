//! The client session seam.
//!
//! The session store is owned by the serving framework, not by this
//! core. The guard only needs an opaque key-value view of it plus the
//! ability to rotate the session id after a privilege change. Exactly
//! two logical keys are used: the guard-scoped identity key and the
//! fixed login-token key.

/// Narrow interface over a framework-managed, per-client session.
pub trait SessionStore {
    /// Current session id.
    fn id(&self) -> &str;

    fn get(&self, key: &str) -> Option<String>;

    fn put(&mut self, key: &str, value: String);

    /// Remove a key, returning the previous value if any.
    fn remove(&mut self, key: &str) -> Option<String>;

    /// Rotate the session id, keeping the stored attributes. With
    /// `destroy_old` the backing store drops the record under the old
    /// id rather than leaving it to expire.
    fn regenerate_id(&mut self, destroy_old: bool);
}
