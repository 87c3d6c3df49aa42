// src/db/wallet.rs
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::domain::wallet::{RedeemRequest, RedeemStatus};
use crate::errors::ServerError;

const COLUMNS: &str = "id, user_id, amount, status, created_at, updated_at";

fn read_request(r: &Row<'_>) -> rusqlite::Result<(RedeemRequest, String)> {
    Ok((
        RedeemRequest {
            id: r.get(0)?,
            user_id: r.get(1)?,
            amount: r.get(2)?,
            status: RedeemStatus::Pending,
            created_at: r.get(4)?,
            updated_at: r.get(5)?,
        },
        r.get(3)?,
    ))
}

fn finish((mut req, status): (RedeemRequest, String)) -> Result<RedeemRequest, ServerError> {
    req.status = RedeemStatus::parse(&status)
        .ok_or_else(|| ServerError::DbError(format!("bad redeem status {status}")))?;
    Ok(req)
}

pub fn insert_redeem_request(
    conn: &Connection,
    user_id: i64,
    amount: i64,
    now: DateTime<Utc>,
) -> Result<RedeemRequest, ServerError> {
    conn.execute(
        "insert into redeem_requests (user_id, amount, status, created_at, updated_at)
         values (?, ?, 'pending', ?, ?)",
        params![user_id, amount, now, now],
    )
    .map_err(|e| ServerError::DbError(format!("insert redeem request failed: {e}")))?;

    find_redeem_request(conn, conn.last_insert_rowid())?.ok_or(ServerError::InternalError)
}

pub fn find_redeem_request(conn: &Connection, id: i64) -> Result<Option<RedeemRequest>, ServerError> {
    conn.query_row(
        &format!("select {COLUMNS} from redeem_requests where id = ?"),
        params![id],
        read_request,
    )
    .optional()?
    .map(finish)
    .transpose()
}

/// Newest first.
pub fn list_redeem_requests(conn: &Connection) -> Result<Vec<RedeemRequest>, ServerError> {
    let mut stmt = conn.prepare(&format!(
        "select {COLUMNS} from redeem_requests order by created_at desc, id desc"
    ))?;
    let rows = stmt.query_map([], read_request)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(finish(r?)?);
    }
    Ok(out)
}

pub fn set_redeem_status(
    conn: &Connection,
    id: i64,
    status: RedeemStatus,
    now: DateTime<Utc>,
) -> Result<Option<RedeemRequest>, ServerError> {
    let changed = conn.execute(
        "update redeem_requests set status = ?, updated_at = ? where id = ?",
        params![status.as_str(), now, id],
    )?;
    if changed == 0 {
        return Ok(None);
    }
    find_redeem_request(conn, id)
}
