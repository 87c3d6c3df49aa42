pub mod connection;
pub mod coupons;
pub mod interests;
pub mod listings;
pub mod owners;
pub mod panel;
pub mod support;
pub mod tokens;
pub mod users;
pub mod wallet;

use crate::errors::ServerError;

/// Map a UNIQUE constraint failure to a client-facing Conflict; anything else
/// stays a database error.
pub fn unique_violation(e: rusqlite::Error, msg: &str) -> ServerError {
    match &e {
        rusqlite::Error::SqliteFailure(err, _)
            if err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
        {
            ServerError::Conflict(msg.to_string())
        }
        _ => ServerError::from(e),
    }
}
