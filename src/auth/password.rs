// src/auth/password.rs
//
// Stored form is the standard bcrypt string (`$2b$<cost>$<salt+hash>`).

use tracing::error;

use crate::errors::ServerError;

#[cfg(not(test))]
const COST: u32 = bcrypt::DEFAULT_COST;
// Minimum cost keeps the test suite fast.
#[cfg(test)]
const COST: u32 = 4;

pub const MIN_PASSWORD_LEN: usize = 6;

/// Minimum policy for account passwords. Passkeys are set by configuration
/// and skip this.
pub fn validate_password(plain: &str) -> Result<(), ServerError> {
    if plain.chars().count() < MIN_PASSWORD_LEN {
        return Err(ServerError::validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters."
        )));
    }
    Ok(())
}

pub fn hash_password(plain: &str) -> Result<String, ServerError> {
    bcrypt::hash(plain, COST).map_err(|e| {
        error!("Password hashing failed: {e}");
        ServerError::InternalError
    })
}

/// False for malformed stored values as well as wrong passwords.
pub fn verify_password(plain: &str, stored: &str) -> bool {
    bcrypt::verify(plain, stored).unwrap_or(false)
}
