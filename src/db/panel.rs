// src/db/panel.rs
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::auth::roles::Role;
use crate::db::unique_violation;
use crate::domain::user::PanelMember;
use crate::errors::ServerError;

const COLUMNS: &str = "id, name, email, mobile_no, role, passkey_hash, created_at, updated_at";

fn read_member(r: &Row<'_>) -> rusqlite::Result<(PanelMember, String)> {
    let role: String = r.get(4)?;
    Ok((
        PanelMember {
            id: r.get(0)?,
            name: r.get(1)?,
            email: r.get(2)?,
            mobile_no: r.get(3)?,
            role: Role::Admin,
            passkey_hash: r.get(5)?,
            created_at: r.get(6)?,
            updated_at: r.get(7)?,
        },
        role,
    ))
}

fn finish((mut m, role): (PanelMember, String)) -> Result<PanelMember, ServerError> {
    m.role = Role::parse(&role)
        .filter(|r| r.is_panel())
        .ok_or_else(|| ServerError::DbError(format!("bad panel role {role}")))?;
    Ok(m)
}

pub fn insert_panel_member(
    conn: &Connection,
    name: &str,
    email: &str,
    mobile_no: &str,
    role: Role,
    passkey_hash: &str,
    now: DateTime<Utc>,
) -> Result<i64, ServerError> {
    conn.execute(
        "insert into panel_members (name, email, mobile_no, role, passkey_hash, created_at, updated_at)
         values (?, ?, ?, ?, ?, ?, ?)",
        params![name, email, mobile_no, role.as_str(), passkey_hash, now, now],
    )
    .map_err(|e| unique_violation(e, "A panel account with this email already exists."))?;

    Ok(conn.last_insert_rowid())
}

pub fn find_panel_member(conn: &Connection, id: i64) -> Result<Option<PanelMember>, ServerError> {
    conn.query_row(
        &format!("select {COLUMNS} from panel_members where id = ?"),
        params![id],
        read_member,
    )
    .optional()?
    .map(finish)
    .transpose()
}

pub fn find_panel_member_by_email(conn: &Connection, email: &str) -> Result<Option<PanelMember>, ServerError> {
    conn.query_row(
        &format!("select {COLUMNS} from panel_members where email = ?"),
        params![email],
        read_member,
    )
    .optional()?
    .map(finish)
    .transpose()
}
