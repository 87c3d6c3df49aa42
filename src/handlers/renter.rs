// src/handlers/renter.rs
use chrono::Utc;
use serde_json::json;
use tracing::info;

use crate::app::App;
use crate::auth::gate::authorize;
use crate::auth::roles::Capability;
use crate::db::listings::find_listing;
use crate::db::{interests, support};
use crate::domain::interest::InterestType;
use crate::domain::listing::{normalize_amenities, ListingKind, ListingStatus};
use crate::domain::support::{Enquiry, Referral, ReferralCoordinates, ReferralLocation};
use crate::errors::{ResultResp, ServerError};
use crate::listings::{ListingService, QueryService};
use crate::payload::{opt_f64, opt_i64, opt_str, opt_string_list, req_f64, req_i64, req_str};
use crate::request::Ctx;
use crate::responses::{created, ok};
use crate::storage::{files_from, upload_all};

/// Public contact form.
pub fn enquire(ctx: &Ctx, app: &App) -> ResultResp {
    let body = ctx.json()?;
    let mut enquiry = Enquiry {
        id: 0,
        name: req_str(&body, "name")?,
        mobile_no: req_str(&body, "mobileNo")?,
        email: opt_str(&body, "email")?,
        subject: opt_str(&body, "subject")?,
        message: req_str(&body, "message")?,
        created_at: Utc::now(),
    };
    enquiry.id = app.db.with_conn(|conn| support::insert_enquiry(conn, &enquiry))?;

    info!("Enquiry {} received", enquiry.id);
    created(json!({ "enquiry": enquiry }), "Enquiry submitted successfully.")
}

/// A repeat of the same (user, listing, type) returns the existing record.
pub fn express_interest(ctx: &Ctx, app: &App, kind: ListingKind, id: i64) -> ResultResp {
    let user = authorize(ctx, app, Capability::RenterActions)?;
    let body = ctx.json()?;

    let raw_type = match opt_str(&body, "interestType")? {
        Some(t) => t,
        None => opt_str(&body, "type")?.unwrap_or_default(),
    };
    let interest_type = InterestType::parse(&raw_type)
        .ok_or_else(|| ServerError::validation("interestType must be visit or book."))?;
    let notes = opt_str(&body, "notes")?.unwrap_or_default();

    let (interest, is_new) = app.db.with_conn(|conn| {
        if find_listing(conn, kind, id)?.is_none() {
            return Err(kind.not_found());
        }
        interests::insert_or_get(conn, user.id, id, kind, interest_type, &notes, Utc::now())
    })?;

    if is_new {
        info!("User {} interested in {kind} {id} ({})", user.id, interest_type.as_str());
        created(json!({ "interest": interest }), "Interest recorded successfully.")
    } else {
        ok(json!({ "interest": interest }), "Interest already recorded.")
    }
}

pub fn add_bookmark(ctx: &Ctx, app: &App, id: i64) -> ResultResp {
    let user = authorize(ctx, app, Capability::RenterActions)?;
    let added = ListingService::new(app).add_bookmark(ListingKind::Room, id, user.id)?;
    let msg = if added {
        "Room bookmarked successfully."
    } else {
        "Room already bookmarked."
    };
    ok(json!({}), msg)
}

pub fn remove_bookmark(ctx: &Ctx, app: &App, id: i64) -> ResultResp {
    let user = authorize(ctx, app, Capability::RenterActions)?;
    let removed = ListingService::new(app).remove_bookmark(ListingKind::Room, id, user.id)?;
    let msg = if removed {
        "Bookmark removed successfully."
    } else {
        "Bookmark not found."
    };
    ok(json!({}), msg)
}

pub fn bookmarks(ctx: &Ctx, app: &App) -> ResultResp {
    let user = authorize(ctx, app, Capability::RenterActions)?;
    let rooms = ListingService::new(app).bookmarks_for(ListingKind::Room, user.id)?;
    ok(json!({ "rooms": rooms }), "Bookmarked rooms retrieved successfully.")
}

pub fn report_issue(ctx: &Ctx, app: &App) -> ResultResp {
    let user = authorize(ctx, app, Capability::RenterActions)?;
    let body = ctx.json()?;
    let room_id = req_i64(&body, "roomId")?;
    let description = req_str(&body, "issueDescription")?;

    let issue = app.db.with_conn(|conn| {
        if find_listing(conn, ListingKind::Room, room_id)?.is_none() {
            return Err(ListingKind::Room.not_found());
        }
        support::insert_issue(conn, user.id, room_id, &description, Utc::now())
    })?;

    info!("Issue {} reported on room {room_id}", issue.id);
    created(json!({ "issue": issue }), "Issue reported successfully.")
}

pub fn refer_room(ctx: &Ctx, app: &App) -> ResultResp {
    let user = authorize(ctx, app, Capability::RenterActions)?;
    let body = ctx.json()?;

    let rent = opt_i64(&body, "rent")?;
    if rent.is_some_and(|r| r <= 0) {
        return Err(ServerError::validation("rent must be positive."));
    }
    let mut referral = Referral {
        id: 0,
        referrer: user.id,
        landlord_name: req_str(&body, "landlordName")?,
        landlord_mobile_no: req_str(&body, "landlordMobileNo")?,
        location: ReferralLocation {
            address: req_str(&body, "address")?,
            city: req_str(&body, "city")?,
            state: req_str(&body, "state")?,
            coordinates: ReferralCoordinates {
                lat: opt_f64(&body, "latitude")?,
                lng: opt_f64(&body, "longitude")?,
            },
        },
        rent,
        amenities: normalize_amenities(opt_string_list(&body, "amenities")?.unwrap_or_default()),
        images: Vec::new(),
        created_at: Utc::now(),
    };

    let files = files_from(&body, "images")?;
    referral.images = upload_all(app.store.as_ref(), &files, "referrals")?;
    referral.id = app.db.with_conn(|conn| support::insert_referral(conn, &referral))?;

    info!("Referral {} submitted by user {}", referral.id, user.id);
    created(json!({ "referral": referral }), "Room referred successfully.")
}

/// Public proximity search over rooms.
pub fn nearby_rooms(ctx: &Ctx, app: &App) -> ResultResp {
    let body = ctx.json()?;
    let lat = req_f64(&body, "latitude")?;
    let lon = req_f64(&body, "longitude")?;
    let max_distance = opt_f64(&body, "maxDistance")?;
    let status = match opt_str(&body, "status")? {
        None => None,
        Some(s) => Some(
            ListingStatus::parse(&s)
                .ok_or_else(|| ServerError::validation(format!("Unknown status '{s}'.")))?,
        ),
    };

    let rooms = QueryService::new(&app.db).find_near(ListingKind::Room, lat, lon, max_distance, status)?;
    ok(json!({ "rooms": rooms }), "Nearby rooms fetched")
}

/// Rating 1..=5 on a room (`roomId`) or hostel (`hostelId`).
pub fn feedback(ctx: &Ctx, app: &App) -> ResultResp {
    let user = authorize(ctx, app, Capability::RenterActions)?;
    let body = ctx.json()?;

    let (kind, id) = match (opt_i64(&body, "roomId")?, opt_i64(&body, "hostelId")?) {
        (Some(id), None) => (ListingKind::Room, id),
        (None, Some(id)) => (ListingKind::Hostel, id),
        _ => return Err(ServerError::validation("Provide either roomId or hostelId.")),
    };
    let rating = req_i64(&body, "rating")?;
    let comment = opt_str(&body, "comment")?;

    let listing = ListingService::new(app).add_feedback(kind, id, user.id, rating, comment)?;
    let entry = listing.feedbacks.last();
    created(json!({ "feedback": entry }), "Feedback submitted successfully.")
}
