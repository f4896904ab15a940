/// Password Hashing and Verification
///
/// Salted bcrypt hashes. The cost factor is the work parameter and comes
/// from `AuthSettings::hash_cost`.

use bcrypt::{hash, verify};

use crate::error::AppError;

pub const MIN_HASH_COST: u32 = 4;
pub const MAX_HASH_COST: u32 = 31;

/// bcrypt only reads this many bytes of its input
pub const MAX_PASSWORD_BYTES: usize = 72;

/// Hash a password using bcrypt at an explicit cost
///
/// Every call embeds a fresh random salt, so two hashes of the same
/// password differ.
///
/// # Errors
/// Returns `AppError::Hashing` if bcrypt fails (entropy or resource failure)
/// or the password is longer than `MAX_PASSWORD_BYTES`, which bcrypt would
/// otherwise truncate.
pub fn hash_password_with_cost(password: &str, cost: u32) -> Result<String, AppError> {
    if password.len() > MAX_PASSWORD_BYTES {
        return Err(AppError::Hashing(format!(
            "password exceeds {} bytes",
            MAX_PASSWORD_BYTES
        )));
    }
    hash(password, cost).map_err(|e| AppError::Hashing(e.to_string()))
}

/// Verify a password against a stored hash
///
/// Returns `false` for a wrong password and for a hash that bcrypt cannot
/// parse. Callers treat both the same way. A password over
/// `MAX_PASSWORD_BYTES` never matches, since no stored hash can have been
/// made from it.
pub fn verify_password(password: &str, password_hash: &str) -> bool {
    if password.len() > MAX_PASSWORD_BYTES {
        return false;
    }
    match verify(password, password_hash) {
        Ok(matches) => matches,
        Err(e) => {
            tracing::warn!(error = %e, "Stored password hash could not be verified");
            false
        }
    }
}
