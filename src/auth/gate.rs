// src/auth/gate.rs
//
// One gate for every protected route: bearer token -> principal -> capability.

use chrono::Utc;
use tracing::debug;

use crate::app::App;
use crate::auth::roles::{Capability, Role};
use crate::auth::tokens::{verify_token, Claims, PrincipalKind, TokenCheck, TokenPurpose};
use crate::db::{panel, users};
use crate::errors::ServerError;
use crate::request::Ctx;

/// The authenticated caller.
#[derive(Debug, Clone, PartialEq)]
pub struct Principal {
    pub id: i64,
    pub kind: PrincipalKind,
    pub role: Role,
    pub name: String,
    pub email: String,
}

impl Principal {
    pub fn is_panel(&self) -> bool {
        self.kind == PrincipalKind::Panel
    }
}

/// Load the principal a set of claims points at. None when the account is gone.
pub fn load_principal(app: &App, claims: Claims) -> Result<Option<Principal>, ServerError> {
    app.db.with_conn(|conn| {
        Ok(match claims.kind {
            PrincipalKind::User => users::find_user(conn, claims.principal_id)?.map(|u| Principal {
                id: u.id,
                kind: PrincipalKind::User,
                role: u.role,
                name: u.name,
                email: u.email,
            }),
            PrincipalKind::Panel => {
                panel::find_panel_member(conn, claims.principal_id)?.map(|m| Principal {
                    id: m.id,
                    kind: PrincipalKind::Panel,
                    role: m.role,
                    name: m.name,
                    email: m.email,
                })
            }
        })
    })
}

pub fn authenticate(ctx: &Ctx, app: &App) -> Result<Principal, ServerError> {
    let raw = ctx
        .bearer()
        .ok_or_else(|| ServerError::Unauthorized("Unauthorized".into()))?;

    let now = Utc::now().timestamp();
    let check = app
        .db
        .with_conn(|conn| verify_token(conn, raw, TokenPurpose::Access, now))?;

    let claims = match check {
        TokenCheck::Valid(claims) => claims,
        TokenCheck::Expired => return Err(ServerError::Unauthorized("Token expired".into())),
        TokenCheck::Invalid => return Err(ServerError::Unauthorized("Invalid token".into())),
    };

    load_principal(app, claims)?
        .ok_or_else(|| ServerError::Unauthorized("Account no longer exists".into()))
}

pub fn authorize(ctx: &Ctx, app: &App, cap: Capability) -> Result<Principal, ServerError> {
    let principal = authenticate(ctx, app)?;
    if !principal.role.can(cap) {
        debug!("{} {} lacks {cap:?}", principal.role, principal.id);
        return Err(ServerError::Forbidden("Insufficient permissions".into()));
    }
    Ok(principal)
}
