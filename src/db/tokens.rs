// src/db/tokens.rs
use rusqlite::{params, Connection, OptionalExtension};

use crate::errors::ServerError;

#[derive(Debug, Clone)]
pub struct TokenRow {
    pub principal_kind: String,
    pub principal_id: i64,
    pub purpose: String,
    pub expires_at: i64,
    pub revoked_at: Option<i64>,
}

pub fn insert_token(
    conn: &Connection,
    token_hash: &[u8],
    principal_kind: &str,
    principal_id: i64,
    purpose: &str,
    created_at: i64,
    expires_at: i64,
) -> Result<(), ServerError> {
    conn.execute(
        "insert into auth_tokens (token_hash, principal_kind, principal_id, purpose, created_at, expires_at)
         values (?, ?, ?, ?, ?, ?)",
        params![token_hash, principal_kind, principal_id, purpose, created_at, expires_at],
    )
    .map_err(|e| ServerError::DbError(format!("insert token failed: {e}")))?;
    Ok(())
}

pub fn find_token(conn: &Connection, token_hash: &[u8]) -> Result<Option<TokenRow>, ServerError> {
    conn.query_row(
        "select principal_kind, principal_id, purpose, expires_at, revoked_at
         from auth_tokens
         where token_hash = ?",
        params![token_hash],
        |r| {
            Ok(TokenRow {
                principal_kind: r.get(0)?,
                principal_id: r.get(1)?,
                purpose: r.get(2)?,
                expires_at: r.get(3)?,
                revoked_at: r.get(4)?,
            })
        },
    )
    .optional()
    .map_err(|e| ServerError::DbError(format!("token lookup failed: {e}")))
}

pub fn revoke(conn: &Connection, token_hash: &[u8], now: i64) -> Result<usize, ServerError> {
    conn.execute(
        "update auth_tokens set revoked_at = ? where token_hash = ? and revoked_at is null",
        params![now, token_hash],
    )
    .map_err(|e| ServerError::DbError(format!("revoke token failed: {e}")))
}

/// Drop rows that can no longer verify.
pub fn purge_expired(conn: &Connection, now: i64) -> Result<usize, ServerError> {
    conn.execute(
        "delete from auth_tokens where expires_at <= ? or revoked_at is not null",
        params![now],
    )
    .map_err(|e| ServerError::DbError(format!("purge tokens failed: {e}")))
}
