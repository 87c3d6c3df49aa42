// src/handlers/rooms.rs
use serde_json::json;

use crate::app::App;
use crate::domain::listing::ListingKind;
use crate::errors::ResultResp;
use crate::listings::{AvailableFilters, QueryService};
use crate::request::Ctx;
use crate::responses::ok;

/// `GET /api/rooms?location=&rentRange=min-max&amenities=a,b`
pub fn list(ctx: &Ctx, app: &App) -> ResultResp {
    let filters = AvailableFilters {
        location: ctx.query("location"),
        rent_range: ctx.query("rentRange"),
        amenities: ctx.query("amenities"),
    };
    let rooms = QueryService::new(&app.db).list_available(ListingKind::Room, &filters)?;
    ok(json!({ "rooms": rooms }), "Rooms fetched")
}

pub fn get(app: &App, id: i64) -> ResultResp {
    let room = QueryService::new(&app.db).get_by_id(ListingKind::Room, id)?;
    ok(json!({ "room": room }), "Room details fetched")
}
