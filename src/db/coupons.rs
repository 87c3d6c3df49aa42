// src/db/coupons.rs
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::db::unique_violation;
use crate::domain::coupon::{Coupon, CouponDraft};
use crate::errors::ServerError;

const COLUMNS: &str = "id, code, discount_percent, valid_till, min_rent, usage_limit, created_at";
const DUPLICATE: &str = "Coupon with this code already exists.";

fn read_coupon(r: &Row<'_>) -> rusqlite::Result<Coupon> {
    Ok(Coupon {
        id: r.get(0)?,
        code: r.get(1)?,
        discount_percent: r.get(2)?,
        valid_till: r.get(3)?,
        min_rent: r.get(4)?,
        usage_limit: r.get(5)?,
        created_at: r.get(6)?,
    })
}

pub fn insert_coupon(conn: &Connection, d: &CouponDraft, now: DateTime<Utc>) -> Result<Coupon, ServerError> {
    conn.execute(
        "insert into coupons (code, discount_percent, valid_till, min_rent, usage_limit, created_at)
         values (?, ?, ?, ?, ?, ?)",
        params![d.code, d.discount_percent, d.valid_till, d.min_rent, d.usage_limit, now],
    )
    .map_err(|e| unique_violation(e, DUPLICATE))?;

    find_coupon(conn, conn.last_insert_rowid())?.ok_or(ServerError::InternalError)
}

pub fn find_coupon(conn: &Connection, id: i64) -> Result<Option<Coupon>, ServerError> {
    Ok(conn
        .query_row(
            &format!("select {COLUMNS} from coupons where id = ?"),
            params![id],
            read_coupon,
        )
        .optional()?)
}

pub fn find_coupon_by_code(conn: &Connection, code: &str) -> Result<Option<Coupon>, ServerError> {
    Ok(conn
        .query_row(
            &format!("select {COLUMNS} from coupons where code = ?"),
            params![code],
            read_coupon,
        )
        .optional()?)
}

pub fn list_coupons(conn: &Connection) -> Result<Vec<Coupon>, ServerError> {
    let mut stmt = conn.prepare(&format!("select {COLUMNS} from coupons order by id"))?;
    let rows = stmt.query_map([], read_coupon)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn update_coupon(conn: &Connection, id: i64, d: &CouponDraft) -> Result<Option<Coupon>, ServerError> {
    let changed = conn
        .execute(
            "update coupons set code = ?, discount_percent = ?, valid_till = ?, min_rent = ?, usage_limit = ?
             where id = ?",
            params![d.code, d.discount_percent, d.valid_till, d.min_rent, d.usage_limit, id],
        )
        .map_err(|e| unique_violation(e, DUPLICATE))?;

    if changed == 0 {
        return Ok(None);
    }
    find_coupon(conn, id)
}

pub fn delete_coupon(conn: &Connection, id: i64) -> Result<usize, ServerError> {
    Ok(conn.execute("delete from coupons where id = ?", params![id])?)
}
