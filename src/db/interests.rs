// src/db/interests.rs
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::domain::interest::{Interest, InterestStatus, InterestType};
use crate::domain::listing::ListingKind;
use crate::errors::ServerError;

const COLUMNS: &str =
    "id, user_id, listing_id, item_type, interest_type, status, notes, created_at, updated_at";

type RawInterest = (Interest, String, String, String);

fn read_interest(r: &Row<'_>) -> rusqlite::Result<RawInterest> {
    Ok((
        Interest {
            id: r.get(0)?,
            user_id: r.get(1)?,
            listing_id: r.get(2)?,
            item_type: ListingKind::Room,
            interest_type: InterestType::Visit,
            status: InterestStatus::Pending,
            notes: r.get(6)?,
            created_at: r.get(7)?,
            updated_at: r.get(8)?,
        },
        r.get(3)?,
        r.get(4)?,
        r.get(5)?,
    ))
}

fn finish((mut i, item_type, interest_type, status): RawInterest) -> Result<Interest, ServerError> {
    let id = i.id;
    let bad = || ServerError::DbError(format!("bad interest row {id}"));
    i.item_type = ListingKind::parse(&item_type).ok_or_else(bad)?;
    i.interest_type = InterestType::parse(&interest_type).ok_or_else(bad)?;
    i.status = InterestStatus::parse(&status).ok_or_else(bad)?;
    Ok(i)
}

/// Insert unless (user, listing, type) already exists; either way return the
/// stored record and whether it was created by this call.
pub fn insert_or_get(
    conn: &Connection,
    user_id: i64,
    listing_id: i64,
    item_type: ListingKind,
    interest_type: InterestType,
    notes: &str,
    now: DateTime<Utc>,
) -> Result<(Interest, bool), ServerError> {
    let inserted = conn
        .execute(
            "insert or ignore into interests
                (user_id, listing_id, item_type, interest_type, notes, created_at, updated_at)
             values (?, ?, ?, ?, ?, ?, ?)",
            params![user_id, listing_id, item_type.as_str(), interest_type.as_str(), notes, now, now],
        )
        .map_err(|e| ServerError::DbError(format!("insert interest failed: {e}")))?;

    let raw = conn.query_row(
        &format!(
            "select {COLUMNS} from interests
             where user_id = ? and listing_id = ? and interest_type = ?"
        ),
        params![user_id, listing_id, interest_type.as_str()],
        read_interest,
    )?;

    Ok((finish(raw)?, inserted > 0))
}

/// Newest first.
pub fn list_interests(conn: &Connection) -> Result<Vec<Interest>, ServerError> {
    let mut stmt = conn.prepare(&format!(
        "select {COLUMNS} from interests order by created_at desc, id desc"
    ))?;
    let rows = stmt.query_map([], read_interest)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(finish(r?)?);
    }
    Ok(out)
}

pub fn update_interest_status(
    conn: &Connection,
    id: i64,
    status: InterestStatus,
    notes: Option<&str>,
    now: DateTime<Utc>,
) -> Result<Option<Interest>, ServerError> {
    let changed = conn.execute(
        "update interests set status = ?, notes = coalesce(?, notes), updated_at = ? where id = ?",
        params![status.as_str(), notes, now, id],
    )?;
    if changed == 0 {
        return Ok(None);
    }

    conn.query_row(
        &format!("select {COLUMNS} from interests where id = ?"),
        params![id],
        read_interest,
    )
    .optional()?
    .map(finish)
    .transpose()
}

/// Users with at least one interest on record.
pub fn distinct_active_users(conn: &Connection) -> Result<i64, ServerError> {
    Ok(conn.query_row("select count(distinct user_id) from interests", [], |r| r.get(0))?)
}
