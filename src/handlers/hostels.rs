// src/handlers/hostels.rs
use serde_json::json;

use crate::app::App;
use crate::auth::gate::authorize;
use crate::auth::roles::Capability;
use crate::domain::listing::ListingKind;
use crate::errors::ResultResp;
use crate::listings::{AvailableFilters, ListingService, QueryService};
use crate::request::Ctx;
use crate::responses::{created, ok};
use crate::storage::files_from;

pub fn list(ctx: &Ctx, app: &App) -> ResultResp {
    let filters = AvailableFilters {
        location: ctx.query("location"),
        rent_range: ctx.query("rentRange"),
        amenities: ctx.query("amenities"),
    };
    let hostels = QueryService::new(&app.db).list_available(ListingKind::Hostel, &filters)?;
    ok(hostels, "Hostels fetched")
}

pub fn list_all(ctx: &Ctx, app: &App) -> ResultResp {
    authorize(ctx, app, Capability::ViewAllListings)?;
    let hostels = QueryService::new(&app.db).list_all(ListingKind::Hostel)?;
    ok(json!({ "hostels": hostels }), "All hostels fetched")
}

pub fn get(app: &App, id: i64) -> ResultResp {
    let hostel = QueryService::new(&app.db).get_by_id(ListingKind::Hostel, id)?;
    ok(json!({ "hostel": hostel }), "Hostel details fetched")
}

pub fn create(ctx: &Ctx, app: &App) -> ResultResp {
    let admin = authorize(ctx, app, Capability::EditListings)?;
    let body = ctx.json()?;
    let files = files_from(&body, "images")?;

    let hostel = ListingService::new(app).create(ListingKind::Hostel, &body, &files, &admin)?;
    created(json!({ "hostel": hostel }), "Hostel created successfully")
}

pub fn update(ctx: &Ctx, app: &App, id: i64) -> ResultResp {
    authorize(ctx, app, Capability::EditListings)?;
    let body = ctx.json()?;

    let hostel = ListingService::new(app).update(ListingKind::Hostel, id, &body)?;
    ok(json!({ "hostel": hostel }), "Hostel updated successfully")
}

pub fn delete(ctx: &Ctx, app: &App, id: i64) -> ResultResp {
    authorize(ctx, app, Capability::DeleteListings)?;
    ListingService::new(app).delete(ListingKind::Hostel, id)?;
    ok(serde_json::Value::Null, "Hostel deleted successfully")
}
