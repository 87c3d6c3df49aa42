// src/handlers/admin.rs
//
// Panel routes. `{collection}` is `listings` for rooms and `hostels` for hostels.

use chrono::Utc;
use serde_json::json;
use tracing::info;

use crate::app::App;
use crate::auth::gate::authorize;
use crate::auth::roles::Capability;
use crate::db::{interests, support};
use crate::domain::interest::InterestStatus;
use crate::domain::listing::ListingKind;
use crate::domain::status::StatusAction;
use crate::errors::{ResultResp, ServerError};
use crate::listings::{ImageAction, ListingService, QueryService};
use crate::payload::{opt_str, req_str};
use crate::request::Ctx;
use crate::responses::ok;

pub fn collection_kind(segment: &str) -> Option<ListingKind> {
    match segment {
        "listings" => Some(ListingKind::Room),
        "hostels" => Some(ListingKind::Hostel),
        _ => None,
    }
}

fn collection_key(kind: ListingKind) -> &'static str {
    match kind {
        ListingKind::Room => "listings",
        ListingKind::Hostel => "hostels",
    }
}

pub fn list(ctx: &Ctx, app: &App, kind: ListingKind) -> ResultResp {
    authorize(ctx, app, Capability::ViewAllListings)?;
    let all = QueryService::new(&app.db).list_all(kind)?;
    ok(
        json!({ collection_key(kind): all }),
        &format!("All {} listings fetched successfully.", kind.as_str()),
    )
}

pub fn set_status(ctx: &Ctx, app: &App, kind: ListingKind, id: i64, action: StatusAction) -> ResultResp {
    let admin = authorize(ctx, app, Capability::ModerateListings)?;
    let listing = ListingService::new(app).set_status(kind, id, action)?;

    info!("{} {} {} {kind} {id}", admin.role, admin.id, action.done());
    ok(
        json!({ "listing": listing }),
        &format!("{} listing {}.", kind.label(), action.done()),
    )
}

pub fn update(ctx: &Ctx, app: &App, kind: ListingKind, id: i64) -> ResultResp {
    authorize(ctx, app, Capability::EditListings)?;
    let body = ctx.json()?;
    let listing = ListingService::new(app).update(kind, id, &body)?;
    ok(
        json!({ "listing": listing }),
        &format!("{} listing updated successfully.", kind.label()),
    )
}

/// Body: `{ action: "add", images: [...] }` or `{ action: "delete", imageUrl }`.
pub fn update_images(ctx: &Ctx, app: &App, kind: ListingKind, id: i64) -> ResultResp {
    authorize(ctx, app, Capability::EditListings)?;
    let body = ctx.json()?;
    let action = ImageAction::parse(&req_str(&body, "action")?)?;

    let listing = ListingService::new(app).update_images(kind, id, action, &body)?;
    ok(json!({ "listing": listing }), "Images updated successfully.")
}

pub fn delete(ctx: &Ctx, app: &App, kind: ListingKind, id: i64) -> ResultResp {
    authorize(ctx, app, Capability::DeleteListings)?;
    ListingService::new(app).delete(kind, id)?;
    ok(
        serde_json::Value::Null,
        &format!("{} listing deleted successfully.", kind.label()),
    )
}

pub fn analytics(ctx: &Ctx, app: &App) -> ResultResp {
    authorize(ctx, app, Capability::ViewAnalytics)?;
    let analytics = QueryService::new(&app.db).analytics()?;
    ok(analytics, "Analytics fetched successfully.")
}

pub fn issues(ctx: &Ctx, app: &App) -> ResultResp {
    authorize(ctx, app, Capability::HandleSupport)?;
    let issues = app.db.with_conn(|conn| support::list_issues(conn))?;
    ok(json!({ "issues": issues }), "Issues fetched successfully.")
}

pub fn enquiries(ctx: &Ctx, app: &App) -> ResultResp {
    authorize(ctx, app, Capability::HandleSupport)?;
    let enquiries = app.db.with_conn(|conn| support::list_enquiries(conn))?;
    ok(json!({ "enquiries": enquiries }), "Enquiries fetched successfully.")
}

pub fn referrals(ctx: &Ctx, app: &App) -> ResultResp {
    authorize(ctx, app, Capability::HandleSupport)?;
    let referrals = app.db.with_conn(|conn| support::list_referrals(conn))?;
    ok(json!({ "referrals": referrals }), "Referrals fetched successfully.")
}

pub fn interests(ctx: &Ctx, app: &App) -> ResultResp {
    authorize(ctx, app, Capability::HandleSupport)?;
    let interests = app.db.with_conn(|conn| interests::list_interests(conn))?;
    ok(json!({ "interests": interests }), "Interests fetched successfully.")
}

pub fn update_interest_status(ctx: &Ctx, app: &App, id: i64) -> ResultResp {
    authorize(ctx, app, Capability::HandleSupport)?;
    let body = ctx.json()?;
    let raw = req_str(&body, "status")?;
    let status = InterestStatus::parse(&raw).ok_or_else(|| {
        ServerError::validation("status must be pending, in_progress, completed or rejected.")
    })?;
    let notes = opt_str(&body, "notes")?;

    let interest = app
        .db
        .with_conn(|conn| {
            interests::update_interest_status(conn, id, status, notes.as_deref(), Utc::now())
        })?
        .ok_or_else(|| ServerError::not_found("Interest not found."))?;

    ok(json!({ "interest": interest }), "Interest status updated.")
}
