// src/db/users.rs
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::auth::roles::Role;
use crate::db::unique_violation;
use crate::domain::user::{AuthMethod, User};
use crate::errors::ServerError;

const COLUMNS: &str = "id, name, email, mobile_no, password_hash, google_id, auth_method, role, \
     wallet_balance, profile_picture, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub mobile_no: Option<String>,
    pub password_hash: Option<String>,
    pub google_id: Option<String>,
    pub auth_method: AuthMethod,
    pub role: Role,
    pub profile_picture: Option<String>,
}

fn read_user(r: &Row<'_>) -> rusqlite::Result<(User, String, String)> {
    let auth_method: String = r.get(6)?;
    let role: String = r.get(7)?;
    Ok((
        User {
            id: r.get(0)?,
            name: r.get(1)?,
            email: r.get(2)?,
            mobile_no: r.get(3)?,
            password_hash: r.get(4)?,
            google_id: r.get(5)?,
            auth_method: AuthMethod::Email,
            role: Role::Renter,
            wallet_balance: r.get(8)?,
            profile_picture: r.get(9)?,
            created_at: r.get(10)?,
            updated_at: r.get(11)?,
        },
        auth_method,
        role,
    ))
}

fn finish((mut user, auth_method, role): (User, String, String)) -> Result<User, ServerError> {
    user.auth_method = AuthMethod::parse(&auth_method)
        .ok_or_else(|| ServerError::DbError(format!("bad auth method {auth_method}")))?;
    user.role = Role::parse(&role)
        .filter(|r| !r.is_panel())
        .ok_or_else(|| ServerError::DbError(format!("bad user role {role}")))?;
    Ok(user)
}

fn find_where(conn: &Connection, clause: &str, value: &dyn rusqlite::ToSql) -> Result<Option<User>, ServerError> {
    conn.query_row(
        &format!("select {COLUMNS} from users where {clause}"),
        params![value],
        read_user,
    )
    .optional()?
    .map(finish)
    .transpose()
}

pub fn insert_user(conn: &Connection, u: &NewUser, now: DateTime<Utc>) -> Result<i64, ServerError> {
    conn.execute(
        "insert into users (name, email, mobile_no, password_hash, google_id, auth_method, role,
            profile_picture, created_at, updated_at)
         values (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        params![
            u.name,
            u.email,
            u.mobile_no,
            u.password_hash,
            u.google_id,
            u.auth_method.as_str(),
            u.role.as_str(),
            u.profile_picture,
            now,
            now,
        ],
    )
    .map_err(|e| unique_violation(e, "User already exists with this email or mobile number."))?;

    Ok(conn.last_insert_rowid())
}

pub fn find_user(conn: &Connection, id: i64) -> Result<Option<User>, ServerError> {
    find_where(conn, "id = ?", &id)
}

pub fn find_user_by_email(conn: &Connection, email: &str) -> Result<Option<User>, ServerError> {
    find_where(conn, "email = ?", &email)
}

pub fn find_user_by_mobile(conn: &Connection, mobile_no: &str) -> Result<Option<User>, ServerError> {
    find_where(conn, "mobile_no = ?", &mobile_no)
}

pub fn find_user_by_google_id(conn: &Connection, google_id: &str) -> Result<Option<User>, ServerError> {
    find_where(conn, "google_id = ?", &google_id)
}

/// Whether any account already uses this email or mobile number.
pub fn user_exists(conn: &Connection, email: &str, mobile_no: Option<&str>) -> Result<bool, ServerError> {
    let n: i64 = conn.query_row(
        "select count(*) from users where email = ? or (? is not null and mobile_no = ?)",
        params![email, mobile_no, mobile_no],
        |r| r.get(0),
    )?;
    Ok(n > 0)
}

/// Persist the editable profile fields of a loaded user.
pub fn save_profile(conn: &Connection, u: &User) -> Result<(), ServerError> {
    conn.execute(
        "update users set name = ?, email = ?, mobile_no = ?, password_hash = ?, google_id = ?,
            auth_method = ?, profile_picture = ?, updated_at = ?
         where id = ?",
        params![
            u.name,
            u.email,
            u.mobile_no,
            u.password_hash,
            u.google_id,
            u.auth_method.as_str(),
            u.profile_picture,
            u.updated_at,
            u.id,
        ],
    )
    .map_err(|e| unique_violation(e, "Email or mobile number is already in use."))?;
    Ok(())
}

/// Atomic wallet credit. Returns rows changed (0 when the user is gone).
pub fn add_to_wallet(conn: &Connection, user_id: i64, amount: i64, now: DateTime<Utc>) -> Result<usize, ServerError> {
    Ok(conn.execute(
        "update users set wallet_balance = wallet_balance + ?, updated_at = ? where id = ?",
        params![amount, now, user_id],
    )?)
}
