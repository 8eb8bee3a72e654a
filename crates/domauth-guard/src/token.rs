//! Opaque login-token generation and session-key derivation.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use sha2::{Digest, Sha256};

/// Fixed session key under which the current login token is stored.
pub const LOGIN_TOKEN_KEY: &str = "login_token";

/// Generate a cryptographically random opaque login token
/// (32 bytes → 43 base64url chars, no padding).
///
/// This is the value inserted into the ledger and written to the
/// session; it is stored server-side as-is.
pub fn generate_login_token() -> String {
    let mut rng = rand::rng();
    let bytes: [u8; 32] = rand::Rng::random(&mut rng);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Derive the guard-scoped session key holding the principal id.
///
/// The key mixes the guard type's module path with the configured
/// guard name, so two differently-named guards sharing one session
/// store never read each other's identity.
pub fn identity_session_key(guard_name: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(concat!(module_path!(), "::Guard").as_bytes());
    hasher.update(guard_name.as_bytes());
    let digest = hex::encode(hasher.finalize());
    format!("login_{guard_name}_{}", &digest[..40])
}
