// src/handlers/wallet.rs
use chrono::Utc;
use serde_json::json;
use tracing::info;

use crate::app::App;
use crate::auth::gate::authorize;
use crate::auth::roles::Capability;
use crate::db::connection::write_tx;
use crate::db::{coupons, users, wallet};
use crate::domain::coupon::CouponDraft;
use crate::domain::wallet::{check_redeemable, RedeemStatus};
use crate::errors::{ResultResp, ServerError};
use crate::payload::{req_date, req_f64, req_i64, req_str, Payload};
use crate::request::Ctx;
use crate::responses::{created, ok};

fn coupon_draft(body: &Payload) -> Result<CouponDraft, ServerError> {
    CouponDraft {
        code: req_str(body, "code")?,
        discount_percent: req_f64(body, "discountPercent")?,
        valid_till: req_date(body, "validTill")?,
        min_rent: req_i64(body, "minRent")?,
        usage_limit: req_i64(body, "usageLimit")?,
    }
    .validate()
}

pub fn create_coupon(ctx: &Ctx, app: &App) -> ResultResp {
    let admin = authorize(ctx, app, Capability::ManageCoupons)?;
    let draft = coupon_draft(&ctx.json()?)?;
    let coupon = app
        .db
        .with_conn(|conn| coupons::insert_coupon(conn, &draft, Utc::now()))?;

    info!("{} {} created coupon {}", admin.role, admin.id, coupon.code);
    created(json!({ "coupon": coupon }), "Coupon created successfully.")
}

pub fn list_coupons(ctx: &Ctx, app: &App) -> ResultResp {
    authorize(ctx, app, Capability::ManageCoupons)?;
    let coupons = app.db.with_conn(|conn| coupons::list_coupons(conn))?;
    ok(json!({ "coupons": coupons }), "Coupons fetched successfully.")
}

pub fn update_coupon(ctx: &Ctx, app: &App, id: i64) -> ResultResp {
    authorize(ctx, app, Capability::ManageCoupons)?;
    let draft = coupon_draft(&ctx.json()?)?;
    let coupon = app
        .db
        .with_conn(|conn| coupons::update_coupon(conn, id, &draft))?
        .ok_or_else(|| ServerError::not_found("Coupon not found."))?;
    ok(json!({ "coupon": coupon }), "Coupon updated successfully.")
}

pub fn delete_coupon(ctx: &Ctx, app: &App, id: i64) -> ResultResp {
    authorize(ctx, app, Capability::ManageCoupons)?;
    if app.db.with_conn(|conn| coupons::delete_coupon(conn, id))? == 0 {
        return Err(ServerError::not_found("Coupon not found."));
    }
    ok(serde_json::Value::Null, "Coupon deleted successfully.")
}

/// Public. Codes are matched exactly as stored.
pub fn apply_coupon(ctx: &Ctx, app: &App) -> ResultResp {
    let body = ctx.json()?;
    let code = req_str(&body, "code")?;
    let rent = req_f64(&body, "rent")?;
    if rent <= 0.0 {
        return Err(ServerError::validation("rent must be positive."));
    }

    let coupon = app
        .db
        .with_conn(|conn| coupons::find_coupon_by_code(conn, &code))?
        .ok_or_else(|| ServerError::not_found("Coupon not found."))?;
    let discount = coupon.discount_for(rent, Utc::now())?;

    ok(
        json!({ "discountAmount": discount, "finalRent": rent - discount }),
        "Coupon applied successfully.",
    )
}

/// Credit a user's wallet. Served under both the wallet and admin prefixes.
pub fn send_balance(ctx: &Ctx, app: &App) -> ResultResp {
    let admin = authorize(ctx, app, Capability::ManageWallets)?;
    let body = ctx.json()?;
    let user_id = req_i64(&body, "userId")?;
    let amount = req_i64(&body, "amount")?;
    if amount <= 0 {
        return Err(ServerError::validation("amount must be positive."));
    }

    let balance = app.db.with_conn(|conn| {
        let tx = write_tx(conn)?;
        if users::add_to_wallet(&tx, user_id, amount, Utc::now())? == 0 {
            return Err(ServerError::not_found("User not found."));
        }
        let user = users::find_user(&tx, user_id)?.ok_or(ServerError::InternalError)?;
        tx.commit()?;
        Ok(user.wallet_balance)
    })?;

    info!("{} {} credited {amount} to user {user_id}", admin.role, admin.id);
    ok(
        json!({ "userId": user_id, "walletBalance": balance }),
        "Balance added to wallet successfully.",
    )
}

pub fn list_redeem_requests(ctx: &Ctx, app: &App) -> ResultResp {
    authorize(ctx, app, Capability::ManageWallets)?;
    let requests = app.db.with_conn(|conn| wallet::list_redeem_requests(conn))?;
    ok(json!({ "requests": requests }), "Redeem requests fetched successfully.")
}

pub fn redeem_request(ctx: &Ctx, app: &App) -> ResultResp {
    let user = authorize(ctx, app, Capability::RedeemWallet)?;
    let amount = req_i64(&ctx.json()?, "amount")?;

    let request = app.db.with_conn(|conn| {
        let tx = write_tx(conn)?;
        let account = users::find_user(&tx, user.id)?
            .ok_or_else(|| ServerError::not_found("User not found."))?;
        check_redeemable(amount, account.wallet_balance)?;
        let request = wallet::insert_redeem_request(&tx, user.id, amount, Utc::now())?;
        tx.commit()?;
        Ok(request)
    })?;

    info!("User {} asked to redeem {amount}", user.id);
    created(json!({ "request": request }), "Wallet balance redeem request sent !")
}

/// Approval changes the status only; the balance is settled outside the API.
pub fn handle_redeem_request(ctx: &Ctx, app: &App) -> ResultResp {
    let admin = authorize(ctx, app, Capability::ManageWallets)?;
    let body = ctx.json()?;
    let request_id = req_i64(&body, "requestId")?;
    let action = req_str(&body, "action")?;
    let status = RedeemStatus::from_action(&action)
        .ok_or_else(|| ServerError::validation("action must be approve or reject."))?;

    let request = app.db.with_conn(|conn| {
        let tx = write_tx(conn)?;
        let current = wallet::find_redeem_request(&tx, request_id)?
            .ok_or_else(|| ServerError::not_found("Redeem request not found."))?;
        if current.status != RedeemStatus::Pending {
            return Err(ServerError::validation("Redeem request already handled."));
        }
        let updated = wallet::set_redeem_status(&tx, request_id, status, Utc::now())?
            .ok_or(ServerError::InternalError)?;
        tx.commit()?;
        Ok(updated)
    })?;

    info!("{} {} {}d redeem request {request_id}", admin.role, admin.id, action);
    ok(
        json!({ "request": request }),
        &format!("Redeem balance request {action}d successfully."),
    )
}
