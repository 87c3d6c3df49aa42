// src/db/owners.rs
use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;

use crate::domain::listing::ListingKind;
use crate::errors::ServerError;

/// Contact details shown next to a listing.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OwnerSummary {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub mobile_no: Option<String>,
}

/// Rooms belong to landlord users, hostels to panel members.
pub fn owner_summary(
    conn: &Connection,
    kind: ListingKind,
    owner_id: i64,
) -> Result<Option<OwnerSummary>, ServerError> {
    let sql = match kind {
        ListingKind::Room => "select id, name, email, mobile_no from users where id = ?",
        ListingKind::Hostel => "select id, name, email, mobile_no from panel_members where id = ?",
    };
    Ok(conn
        .query_row(sql, params![owner_id], |r| {
            Ok(OwnerSummary {
                id: r.get(0)?,
                name: r.get(1)?,
                email: r.get(2)?,
                mobile_no: r.get(3)?,
            })
        })
        .optional()?)
}
