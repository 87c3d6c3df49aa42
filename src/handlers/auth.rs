// src/handlers/auth.rs
use astra::Response;
use chrono::Utc;
use http::header::{HeaderValue, SET_COOKIE};
use serde_json::json;
use tracing::{info, warn};

use crate::app::App;
use crate::auth::gate::{authorize, load_principal};
use crate::auth::password::{hash_password, validate_password, verify_password};
use crate::auth::roles::{Capability, Role};
use crate::auth::tokens::{
    hash_token, hashes_equal, issue_token, revoke_token, verify_token, Claims, PrincipalKind,
    TokenCheck, TokenPurpose,
};
use crate::db::{panel, users};
use crate::domain::user::{normalize_email, AuthMethod, User};
use crate::errors::{ResultResp, ServerError};
use crate::payload::{opt_str, req_str, Payload};
use crate::request::Ctx;
use crate::responses::{created, ok};
use crate::storage::{public_id_from_url, UploadFile, UploadPayload};

pub const REFRESH_COOKIE: &str = "refreshToken";

fn email_from(p: &Payload) -> Result<String, ServerError> {
    normalize_email(&req_str(p, "email")?).ok_or_else(|| ServerError::validation("Invalid email."))
}

fn refresh_cookie(app: &App, value: &str, max_age: i64) -> String {
    let secure = if app.config.cookie_secure { "; Secure" } else { "" };
    format!("{REFRESH_COOKIE}={value}; HttpOnly{secure}; SameSite=Strict; Path=/; Max-Age={max_age}")
}

fn with_cookie(mut resp: Response, cookie: &str) -> ResultResp {
    let value = HeaderValue::from_str(cookie).map_err(|_| ServerError::InternalError)?;
    resp.headers_mut().append(SET_COOKIE, value);
    Ok(resp)
}

/// Issue an access/refresh pair and return (access, refresh).
fn issue_pair(app: &App, claims: Claims) -> Result<(String, String), ServerError> {
    let now = Utc::now().timestamp();
    let cfg = &app.config;
    app.db.with_conn(|conn| {
        let access = issue_token(conn, claims, TokenPurpose::Access, cfg.access_token_ttl_secs, now)?;
        let refresh =
            issue_token(conn, claims, TokenPurpose::Refresh, cfg.refresh_token_ttl_secs, now)?;
        Ok((access, refresh))
    })
}

/// `{ user, accessToken }` plus the refresh cookie.
fn user_session(app: &App, user: &User, message: &str) -> ResultResp {
    let (access, refresh) = issue_pair(
        app,
        Claims {
            kind: PrincipalKind::User,
            principal_id: user.id,
        },
    )?;
    let resp = ok(json!({ "user": user, "accessToken": access }), message)?;
    with_cookie(resp, &refresh_cookie(app, &refresh, app.config.refresh_token_ttl_secs))
}

fn user_role(p: &Payload) -> Result<Role, ServerError> {
    match opt_str(p, "role")? {
        None => Ok(Role::Renter),
        Some(r) => match Role::parse(&r) {
            Some(role) if !role.is_panel() => Ok(role),
            _ => Err(ServerError::validation("role must be renter or landlord.")),
        },
    }
}

pub fn signup(ctx: &Ctx, app: &App) -> ResultResp {
    let body = ctx.json()?;
    let name = req_str(&body, "name")?;
    let email = email_from(&body)?;
    let mobile_no = opt_str(&body, "mobileNo")?;
    let password = req_str(&body, "password")?;
    validate_password(&password)?;
    let role = user_role(&body)?;

    let new_user = users::NewUser {
        name,
        email,
        mobile_no,
        password_hash: Some(hash_password(&password)?),
        google_id: None,
        auth_method: AuthMethod::Email,
        role,
        profile_picture: None,
    };

    let user = app.db.with_conn(|conn| {
        if users::user_exists(conn, &new_user.email, new_user.mobile_no.as_deref())? {
            return Err(ServerError::Conflict(
                "User already exists with this email or mobile number.".into(),
            ));
        }
        let id = users::insert_user(conn, &new_user, Utc::now())?;
        users::find_user(conn, id)?.ok_or(ServerError::InternalError)
    })?;

    info!("Registered {} {}", user.role, user.id);
    created(&user, "User registered successfully")
}

pub fn login(ctx: &Ctx, app: &App) -> ResultResp {
    let body = ctx.json()?;
    let email = opt_str(&body, "email")?.and_then(|e| normalize_email(&e));
    let mobile_no = opt_str(&body, "mobileNo")?;
    let password = req_str(&body, "password")?;

    let user = app.db.with_conn(|conn| {
        if let Some(email) = &email {
            if let Some(u) = users::find_user_by_email(conn, email)? {
                return Ok(Some(u));
            }
        }
        match &mobile_no {
            Some(m) => users::find_user_by_mobile(conn, m),
            None => Ok(None),
        }
    })?;

    let Some(user) = user else {
        if email.is_none() && mobile_no.is_none() {
            return Err(ServerError::validation("Email or mobile number is required."));
        }
        return Err(ServerError::not_found("User not found"));
    };

    let valid = user
        .password_hash
        .as_deref()
        .is_some_and(|stored| verify_password(&password, stored));
    if !valid {
        warn!("Failed login for user {}", user.id);
        return Err(ServerError::Unauthorized("Invalid credentials".into()));
    }

    info!("User {} logged in", user.id);
    user_session(app, &user, "Login successful")
}

/// Sign in (or up) with a Google ID token.
pub fn google(ctx: &Ctx, app: &App) -> ResultResp {
    let body = ctx.json()?;
    let id_token = match opt_str(&body, "idToken")? {
        Some(t) => t,
        None => req_str(&body, "credential")?,
    };
    let profile = app.identity.verify(&id_token)?;
    let email = normalize_email(&profile.email)
        .ok_or_else(|| ServerError::Unauthorized("Google account has no usable email.".into()))?;
    let role = user_role(&body)?;

    let user = app.db.with_conn(|conn| {
        if let Some(u) = users::find_user_by_google_id(conn, &profile.subject)? {
            return Ok(u);
        }

        let now = Utc::now();
        if let Some(mut u) = users::find_user_by_email(conn, &email)? {
            // Existing email account: link it.
            u.google_id = Some(profile.subject.clone());
            if u.profile_picture.is_none() {
                u.profile_picture = profile.picture.clone();
            }
            u.updated_at = now;
            users::save_profile(conn, &u)?;
            return Ok(u);
        }

        let id = users::insert_user(
            conn,
            &users::NewUser {
                name: profile.name.clone(),
                email: email.clone(),
                mobile_no: None,
                password_hash: None,
                google_id: Some(profile.subject.clone()),
                auth_method: AuthMethod::Google,
                role,
                profile_picture: profile.picture.clone(),
            },
            now,
        )?;
        users::find_user(conn, id)?.ok_or(ServerError::InternalError)
    })?;

    info!("User {} signed in with Google", user.id);
    user_session(app, &user, "Login successful")
}

pub fn refresh(ctx: &Ctx, app: &App) -> ResultResp {
    let raw = ctx
        .cookie(REFRESH_COOKIE)
        .ok_or_else(|| ServerError::Unauthorized("No refresh token found".into()))?;

    let now = Utc::now().timestamp();
    let check = app
        .db
        .with_conn(|conn| verify_token(conn, raw, TokenPurpose::Refresh, now))?;
    let TokenCheck::Valid(claims) = check else {
        return Err(ServerError::Unauthorized("Invalid refresh token".into()));
    };
    if load_principal(app, claims)?.is_none() {
        return Err(ServerError::Unauthorized("Invalid refresh token".into()));
    }

    let ttl = app.config.access_token_ttl_secs;
    let access = app
        .db
        .with_conn(|conn| issue_token(conn, claims, TokenPurpose::Access, ttl, now))?;
    ok(json!({ "accessToken": access }), "Token refreshed")
}

/// Revokes the refresh cookie (and the bearer token, if sent) and clears the cookie.
pub fn logout(ctx: &Ctx, app: &App) -> ResultResp {
    let now = Utc::now().timestamp();
    app.db.with_conn(|conn| {
        for raw in [ctx.cookie(REFRESH_COOKIE), ctx.bearer()].into_iter().flatten() {
            revoke_token(conn, raw, now)?;
        }
        Ok(())
    })?;

    let resp = ok(serde_json::Value::Null, "Logged out successfully")?;
    with_cookie(resp, &refresh_cookie(app, "", 0))
}

pub fn update_profile(ctx: &Ctx, app: &App) -> ResultResp {
    let principal = authorize(ctx, app, Capability::Profile)?;
    let body = ctx.json()?;

    let mut user = app
        .db
        .with_conn(|conn| users::find_user(conn, principal.id))?
        .ok_or_else(|| ServerError::not_found("User not found"))?;

    if let Some(name) = opt_str(&body, "name")? {
        user.name = name;
    }
    if body.contains_key("email") {
        user.email = email_from(&body)?;
    }
    if let Some(m) = opt_str(&body, "mobileNo")? {
        user.mobile_no = Some(m);
    }
    if let Some(pw) = opt_str(&body, "password")? {
        validate_password(&pw)?;
        user.password_hash = Some(hash_password(&pw)?);
    }

    let mut replaced_picture = None;
    if let Some(raw) = body.get("profilePicture").filter(|v| v.is_object()) {
        let file: UploadPayload = serde_json::from_value(raw.clone())
            .map_err(|_| ServerError::validation("Invalid image file."))?;
        let stored = app.store.upload(&UploadFile::decode(file)?, "profiles")?;
        replaced_picture = user.profile_picture.replace(stored.url);
    }

    user.updated_at = Utc::now();
    app.db.with_conn(|conn| users::save_profile(conn, &user))?;

    if let Some(old) = replaced_picture {
        if let Err(e) = public_id_from_url(&old).and_then(|pid| app.store.delete(&pid)) {
            warn!("Could not delete old profile picture {old}: {e}");
        }
    }

    info!("User {} updated their profile", user.id);
    ok(&user, "Profile updated successfully")
}

fn configured_passkey(app: &App, role: Role) -> &str {
    match role {
        Role::Admin => &app.config.admin_passkey,
        _ => &app.config.manager_passkey,
    }
}

pub fn panel_register(ctx: &Ctx, app: &App) -> ResultResp {
    let body = ctx.json()?;
    let name = req_str(&body, "name")?;
    let email = email_from(&body)?;
    let mobile_no = req_str(&body, "mobileNo")?;
    let role = Role::parse(&req_str(&body, "role")?)
        .filter(|r| r.is_panel())
        .ok_or_else(|| ServerError::validation("role must be admin or manager."))?;
    let passkey = req_str(&body, "passkey")?;

    let expected = configured_passkey(app, role);
    if !hashes_equal(&hash_token(&passkey), &hash_token(expected)) {
        warn!("Panel registration for {email} with a wrong {role} passkey");
        return Err(ServerError::Forbidden("Invalid passkey".into()));
    }

    let passkey_hash = hash_password(&passkey)?;
    let member = app.db.with_conn(|conn| {
        let id = panel::insert_panel_member(
            conn,
            &name,
            &email,
            &mobile_no,
            role,
            &passkey_hash,
            Utc::now(),
        )?;
        panel::find_panel_member(conn, id)?.ok_or(ServerError::InternalError)
    })?;

    info!("Registered panel {} {}", member.role, member.id);
    created(json!({ "admin": member }), "Panel account created successfully")
}

pub fn panel_login(ctx: &Ctx, app: &App) -> ResultResp {
    let body = ctx.json()?;
    let email = email_from(&body)?;
    let passkey = req_str(&body, "passkey")?;

    let member = app
        .db
        .with_conn(|conn| panel::find_panel_member_by_email(conn, &email))?
        .filter(|m| verify_password(&passkey, &m.passkey_hash))
        .ok_or_else(|| ServerError::Unauthorized("Invalid credentials".into()))?;

    let (access, refresh) = issue_pair(
        app,
        Claims {
            kind: PrincipalKind::Panel,
            principal_id: member.id,
        },
    )?;

    info!("Panel {} {} logged in", member.role, member.id);
    let resp = ok(json!({ "admin": member, "accessToken": access }), "Login successful")?;
    with_cookie(resp, &refresh_cookie(app, &refresh, app.config.refresh_token_ttl_secs))
}
