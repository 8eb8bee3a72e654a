//! Password verification using Argon2id.

use argon2::{Argon2, PasswordVerifier};

use crate::error::GuardError;

/// Well-formed Argon2id hash (OWASP parameters, zeroed salt and
/// digest) that no password verifies against.
const DUMMY_HASH: &str = "$argon2id$v=19$m=19456,t=2,p=1\
$AAAAAAAAAAAAAAAAAAAAAA\
$AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA";

/// Run a full Argon2id verification against [`DUMMY_HASH`].
///
/// Called when no credential record exists, so a miss costs the same
/// hashing work as a mismatch and is not observable through response
/// timing. Always returns `false`.
pub fn verify_against_dummy(password: &str, pepper: Option<&str>) -> bool {
    verify_password(password, DUMMY_HASH, pepper).unwrap_or(false)
}

/// Verify a plaintext password against an Argon2id PHC-format hash.
///
/// If `pepper` is provided it is prepended to the password before
/// verification — this must match the pepper used during hashing.
///
/// Returns `Ok(true)` on match, `Ok(false)` on mismatch, or
/// `Err(GuardError::Crypto)` if the stored hash is malformed.
pub fn verify_password(
    password: &str,
    hash: &str,
    pepper: Option<&str>,
) -> Result<bool, GuardError> {
    let peppered: String;
    let input = match pepper {
        Some(p) => {
            peppered = format!("{p}{password}");
            peppered.as_bytes()
        }
        None => password.as_bytes(),
    };

    let parsed_hash = argon2::PasswordHash::new(hash)
        .map_err(|e| GuardError::Crypto(format!("invalid hash format: {e}")))?;

    let argon2 = Argon2::default();
    match argon2.verify_password(input, &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(GuardError::Crypto(format!("verify error: {e}"))),
    }
}
