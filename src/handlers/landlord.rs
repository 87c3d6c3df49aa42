// src/handlers/landlord.rs
use serde_json::json;

use crate::app::App;
use crate::auth::gate::authorize;
use crate::auth::roles::Capability;
use crate::domain::listing::ListingKind;
use crate::errors::ResultResp;
use crate::listings::{ListingService, QueryService};
use crate::request::Ctx;
use crate::responses::{created, ok};
use crate::storage::files_from;

/// Rooms go live only after a panel member approves them.
pub fn submit_room(ctx: &Ctx, app: &App) -> ResultResp {
    let landlord = authorize(ctx, app, Capability::SubmitListing)?;
    let body = ctx.json()?;
    let files = files_from(&body, "images")?;

    let room = ListingService::new(app).create(ListingKind::Room, &body, &files, &landlord)?;
    created(json!({ "submittedRoom": room }), "Room submitted for review")
}

pub fn rooms(ctx: &Ctx, app: &App) -> ResultResp {
    let landlord = authorize(ctx, app, Capability::ViewOwnListings)?;
    let rooms = QueryService::new(&app.db).list_by_owner(ListingKind::Room, landlord.id)?;
    ok(json!({ "rooms": rooms }), "Landlord rooms fetched successfully.")
}
