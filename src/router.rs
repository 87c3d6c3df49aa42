use astra::Request;
use tracing::debug;

use crate::app::App;
use crate::domain::listing::ListingKind;
use crate::domain::status::StatusAction;
use crate::errors::ServerError;
use crate::handlers::{admin, auth, hostels, landlord, renter, rooms, uploads, wallet};
use crate::request::{parse_id, Ctx};
use crate::responses::ResultResp;

pub fn handle(req: Request, app: &App) -> ResultResp {
    let ctx = Ctx::from_request(req)?;
    debug!("{} {}", ctx.method, ctx.path);

    let method = ctx.method.as_str();
    let segments = ctx.segments();

    match (method, segments.as_slice()) {
        ("GET", ["upload", rest @ ..]) if !rest.is_empty() => uploads::serve(app, &rest.join("/")),
        (_, ["api", "auth", rest @ ..]) => auth_routes(method, rest, &ctx, app),
        (_, ["api", "rooms", rest @ ..]) => room_routes(method, rest, &ctx, app),
        (_, ["api", "hostels", rest @ ..]) => hostel_routes(method, rest, &ctx, app),
        (_, ["api", "landlord", rest @ ..]) => landlord_routes(method, rest, &ctx, app),
        (_, ["api", "renter", rest @ ..]) => renter_routes(method, rest, &ctx, app),
        (_, ["api", "admin", rest @ ..]) => admin_routes(method, rest, &ctx, app),
        (_, ["api", "walletAndCoupan", rest @ ..]) => wallet_routes(method, rest, &ctx, app),
        _ => Err(route_not_found()),
    }
}

fn route_not_found() -> ServerError {
    ServerError::not_found("Route not found")
}

fn auth_routes(method: &str, rest: &[&str], ctx: &Ctx, app: &App) -> ResultResp {
    match (method, rest) {
        ("POST", ["signup"]) => auth::signup(ctx, app),
        ("POST", ["login"]) => auth::login(ctx, app),
        ("POST", ["google"]) => auth::google(ctx, app),
        ("POST", ["refresh-token"]) => auth::refresh(ctx, app),
        ("POST", ["logout"]) => auth::logout(ctx, app),
        ("PUT", ["profile"]) => auth::update_profile(ctx, app),
        ("POST", ["panel", "register"]) => auth::panel_register(ctx, app),
        ("POST", ["panel", "login"]) => auth::panel_login(ctx, app),
        _ => Err(route_not_found()),
    }
}

fn room_routes(method: &str, rest: &[&str], ctx: &Ctx, app: &App) -> ResultResp {
    match (method, rest) {
        ("GET", []) => rooms::list(ctx, app),
        ("GET", [id]) => rooms::get(app, parse_id(id, "room")?),
        _ => Err(route_not_found()),
    }
}

fn hostel_routes(method: &str, rest: &[&str], ctx: &Ctx, app: &App) -> ResultResp {
    match (method, rest) {
        ("GET", []) => hostels::list(ctx, app),
        ("GET", ["admin", "all"]) => hostels::list_all(ctx, app),
        ("GET", [id]) => hostels::get(app, parse_id(id, "hostel")?),
        ("POST", []) => hostels::create(ctx, app),
        ("PUT", [id]) => hostels::update(ctx, app, parse_id(id, "hostel")?),
        ("DELETE", [id]) => hostels::delete(ctx, app, parse_id(id, "hostel")?),
        _ => Err(route_not_found()),
    }
}

fn landlord_routes(method: &str, rest: &[&str], ctx: &Ctx, app: &App) -> ResultResp {
    match (method, rest) {
        ("POST", ["submit-room"]) => landlord::submit_room(ctx, app),
        ("GET", ["rooms"]) => landlord::rooms(ctx, app),
        _ => Err(route_not_found()),
    }
}

fn renter_routes(method: &str, rest: &[&str], ctx: &Ctx, app: &App) -> ResultResp {
    match (method, rest) {
        ("POST", ["enquire"]) => renter::enquire(ctx, app),
        ("POST", ["rooms", "refer"]) => renter::refer_room(ctx, app),
        ("POST", ["rooms", "getNearbyRooms"]) => renter::nearby_rooms(ctx, app),
        ("POST", ["rooms", id, "interest"]) => {
            renter::express_interest(ctx, app, ListingKind::Room, parse_id(id, "room")?)
        }
        ("POST", ["hostels", id, "interest"]) => {
            renter::express_interest(ctx, app, ListingKind::Hostel, parse_id(id, "hostel")?)
        }
        ("POST", ["rooms", id, "bookmark"]) => renter::add_bookmark(ctx, app, parse_id(id, "room")?),
        ("DELETE", ["rooms", id, "bookmark"]) => {
            renter::remove_bookmark(ctx, app, parse_id(id, "room")?)
        }
        ("GET", ["bookmarks"]) => renter::bookmarks(ctx, app),
        ("POST", ["issues", "report"]) => renter::report_issue(ctx, app),
        ("POST", ["feedback"]) => renter::feedback(ctx, app),
        _ => Err(route_not_found()),
    }
}

fn admin_routes(method: &str, rest: &[&str], ctx: &Ctx, app: &App) -> ResultResp {
    match (method, rest) {
        ("GET", ["analytics"]) => admin::analytics(ctx, app),
        ("POST", ["user", "balance"]) => wallet::send_balance(ctx, app),
        ("GET", ["issues"]) => admin::issues(ctx, app),
        ("GET", ["enquiries"]) => admin::enquiries(ctx, app),
        ("GET", ["referrals"]) => admin::referrals(ctx, app),
        ("GET", ["interests"]) => admin::interests(ctx, app),
        ("PUT", ["interests", id, "status"]) => {
            admin::update_interest_status(ctx, app, parse_id(id, "interest")?)
        }
        ("GET", ["balance-requests"]) => wallet::list_redeem_requests(ctx, app),
        ("POST", ["balance-requests", "handle"]) => wallet::handle_redeem_request(ctx, app),
        (_, [collection, tail @ ..]) => match admin::collection_kind(collection) {
            Some(kind) => collection_routes(method, kind, tail, ctx, app),
            None => Err(route_not_found()),
        },
        _ => Err(route_not_found()),
    }
}

fn collection_routes(method: &str, kind: ListingKind, rest: &[&str], ctx: &Ctx, app: &App) -> ResultResp {
    let what = kind.as_str();
    match (method, rest) {
        ("GET", []) => admin::list(ctx, app, kind),
        ("PUT", [id]) => admin::update(ctx, app, kind, parse_id(id, what)?),
        ("DELETE", [id]) => admin::delete(ctx, app, kind, parse_id(id, what)?),
        ("PUT", [id, "images"]) => admin::update_images(ctx, app, kind, parse_id(id, what)?),
        ("PUT", [id, action]) => match StatusAction::parse(action) {
            Some(action) => admin::set_status(ctx, app, kind, parse_id(id, what)?, action),
            None => Err(route_not_found()),
        },
        _ => Err(route_not_found()),
    }
}

fn wallet_routes(method: &str, rest: &[&str], ctx: &Ctx, app: &App) -> ResultResp {
    match (method, rest) {
        ("POST", ["coupon"]) => wallet::create_coupon(ctx, app),
        ("GET", ["coupons"]) => wallet::list_coupons(ctx, app),
        ("POST", ["coupon", "apply"]) => wallet::apply_coupon(ctx, app),
        ("PUT", ["coupon", id]) => wallet::update_coupon(ctx, app, parse_id(id, "coupon")?),
        ("DELETE", ["coupon", id]) => wallet::delete_coupon(ctx, app, parse_id(id, "coupon")?),
        ("POST", ["send-balance"]) => wallet::send_balance(ctx, app),
        ("GET", ["get-all-balance-request"]) => wallet::list_redeem_requests(ctx, app),
        ("POST", ["redeem-request"]) => wallet::redeem_request(ctx, app),
        ("PUT", ["redeem-request", "handle"]) => wallet::handle_redeem_request(ctx, app),
        _ => Err(route_not_found()),
    }
}
