// src/auth/tokens.rs
//
// Opaque bearer tokens. The raw value goes to the client once; the database
// only ever sees its SHA-256.

use base64::Engine;
use rand::rngs::OsRng;
use rand::RngCore;
use rusqlite::Connection;
use sha2::{Digest, Sha256};

use crate::db::tokens as db_tokens;
use crate::errors::ServerError;

pub const DEFAULT_TOKEN_BYTES: usize = 32;

/// Who a token was issued to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrincipalKind {
    User,
    Panel,
}

impl PrincipalKind {
    pub fn as_str(self) -> &'static str {
        match self {
            PrincipalKind::User => "user",
            PrincipalKind::Panel => "panel",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "user" => Some(PrincipalKind::User),
            "panel" => Some(PrincipalKind::Panel),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenPurpose {
    Access,
    Refresh,
}

impl TokenPurpose {
    pub fn as_str(self) -> &'static str {
        match self {
            TokenPurpose::Access => "access",
            TokenPurpose::Refresh => "refresh",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Claims {
    pub kind: PrincipalKind,
    pub principal_id: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenCheck {
    Valid(Claims),
    Expired,
    Invalid,
}

/// Generate a secure random token using the OS RNG.
pub fn generate_token_default() -> String {
    let mut rng = OsRng;
    generate_token(&mut rng, DEFAULT_TOKEN_BYTES)
}

/// URL-safe base64 (no padding) over `nbytes` random bytes.
pub fn generate_token<R: RngCore>(rng: &mut R, nbytes: usize) -> String {
    let mut buf = vec![0u8; nbytes];
    rng.fill_bytes(&mut buf);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(&buf)
}

pub fn hash_token(token: &str) -> [u8; 32] {
    let mut arr = [0u8; 32];
    arr.copy_from_slice(&Sha256::digest(token.as_bytes()));
    arr
}

/// Constant-time-ish compare for hashes.
pub fn hashes_equal(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff: u8 = 0;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

pub fn issue_token(
    conn: &Connection,
    claims: Claims,
    purpose: TokenPurpose,
    ttl_secs: i64,
    now: i64,
) -> Result<String, ServerError> {
    let raw = generate_token_default();
    db_tokens::insert_token(
        conn,
        &hash_token(&raw),
        claims.kind.as_str(),
        claims.principal_id,
        purpose.as_str(),
        now,
        now + ttl_secs,
    )?;
    Ok(raw)
}

pub fn verify_token(
    conn: &Connection,
    raw: &str,
    purpose: TokenPurpose,
    now: i64,
) -> Result<TokenCheck, ServerError> {
    let Some(row) = db_tokens::find_token(conn, &hash_token(raw))? else {
        return Ok(TokenCheck::Invalid);
    };

    if row.purpose != purpose.as_str() || row.revoked_at.is_some() {
        return Ok(TokenCheck::Invalid);
    }
    if row.expires_at <= now {
        return Ok(TokenCheck::Expired);
    }

    Ok(match PrincipalKind::parse(&row.principal_kind) {
        Some(kind) => TokenCheck::Valid(Claims {
            kind,
            principal_id: row.principal_id,
        }),
        None => TokenCheck::Invalid,
    })
}

/// Returns whether a live token was revoked.
pub fn revoke_token(conn: &Connection, raw: &str, now: i64) -> Result<bool, ServerError> {
    Ok(db_tokens::revoke(conn, &hash_token(raw), now)? > 0)
}
