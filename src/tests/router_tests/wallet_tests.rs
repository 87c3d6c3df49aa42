use serde_json::json;

use crate::auth::roles::Role;
use crate::tests::utils::{create_panel, create_user, send, setup};

fn coupon(code: &str) -> serde_json::Value {
    json!({
        "code": code,
        "discountPercent": 10,
        "validTill": "2099-12-31",
        "minRent": 1000,
        "usageLimit": 5,
    })
}

#[test]
fn coupon_crud_and_apply() {
    let env = setup();
    let (_, admin) = create_panel(&env.app, Role::Admin, "admin@example.com");

    let (status, body) = send(&env.app, "POST", "/api/walletAndCoupan/coupon", Some(coupon("WELCOME10")), Some(&admin));
    assert_eq!(status, 201, "{body}");
    let id = body["data"]["coupon"]["id"].as_i64().unwrap();

    let (status, body) = send(&env.app, "POST", "/api/walletAndCoupan/coupon", Some(coupon("WELCOME10")), Some(&admin));
    assert_eq!(status, 400);
    assert_eq!(body["message"], "Coupon with this code already exists.");

    let (status, body) = send(
        &env.app,
        "POST",
        "/api/walletAndCoupan/coupon/apply",
        Some(json!({ "code": "WELCOME10", "rent": 2000 })),
        None,
    );
    assert_eq!(status, 200, "{body}");
    assert_eq!(body["data"]["discountAmount"], 200.0);

    let (status, _) = send(
        &env.app,
        "POST",
        "/api/walletAndCoupan/coupon/apply",
        Some(json!({ "code": "WELCOME10", "rent": 500 })),
        None,
    );
    assert_eq!(status, 400);
    let (status, body) = send(
        &env.app,
        "POST",
        "/api/walletAndCoupan/coupon/apply",
        Some(json!({ "code": "NOPE", "rent": 2000 })),
        None,
    );
    assert_eq!(status, 404);
    assert_eq!(body["message"], "Coupon not found.");

    let mut changed = coupon("WELCOME20");
    changed["discountPercent"] = json!(20);
    let (status, body) = send(
        &env.app,
        "PUT",
        &format!("/api/walletAndCoupan/coupon/{id}"),
        Some(changed),
        Some(&admin),
    );
    assert_eq!(status, 200, "{body}");
    assert_eq!(body["data"]["coupon"]["code"], "WELCOME20");

    let (_, body) = send(&env.app, "GET", "/api/walletAndCoupan/coupons", None, Some(&admin));
    assert_eq!(body["data"]["coupons"].as_array().unwrap().len(), 1);

    let uri = format!("/api/walletAndCoupan/coupon/{id}");
    assert_eq!(send(&env.app, "DELETE", &uri, None, Some(&admin)).0, 200);
    assert_eq!(send(&env.app, "DELETE", &uri, None, Some(&admin)).0, 404);
}

#[test]
fn coupon_validation_and_access() {
    let env = setup();
    let (_, admin) = create_panel(&env.app, Role::Admin, "admin@example.com");
    let (_, manager) = create_panel(&env.app, Role::Manager, "manager@example.com");

    let mut bad = coupon("HALF");
    bad["discountPercent"] = json!(150);
    let (status, _) = send(&env.app, "POST", "/api/walletAndCoupan/coupon", Some(bad), Some(&admin));
    assert_eq!(status, 400);

    let mut expired = coupon("OLD");
    expired["validTill"] = json!("2001-01-01");
    let (status, _) = send(&env.app, "POST", "/api/walletAndCoupan/coupon", Some(expired), Some(&admin));
    assert_eq!(status, 201);
    let (status, body) = send(
        &env.app,
        "POST",
        "/api/walletAndCoupan/coupon/apply",
        Some(json!({ "code": "OLD", "rent": 5000 })),
        None,
    );
    assert_eq!(status, 400);
    assert_eq!(body["message"], "Coupon has expired.");

    let (status, _) = send(&env.app, "POST", "/api/walletAndCoupan/coupon", Some(coupon("MGR")), Some(&manager));
    assert_eq!(status, 403);
}

#[test]
fn wallet_credit_and_redeem_flow() {
    let env = setup();
    let (_, admin) = create_panel(&env.app, Role::Admin, "admin@example.com");
    let (renter_id, renter) = create_user(&env.app, Role::Renter, "renter@example.com");

    let (status, body) = send(
        &env.app,
        "POST",
        "/api/walletAndCoupan/send-balance",
        Some(json!({ "userId": renter_id, "amount": 700 })),
        Some(&admin),
    );
    assert_eq!(status, 200, "{body}");
    assert_eq!(body["data"]["walletBalance"], 700);

    let (_, body) = send(
        &env.app,
        "POST",
        "/api/admin/user/balance",
        Some(json!({ "userId": renter_id, "amount": "300" })),
        Some(&admin),
    );
    assert_eq!(body["data"]["walletBalance"], 1000);

    let (status, body) = send(
        &env.app,
        "POST",
        "/api/walletAndCoupan/send-balance",
        Some(json!({ "userId": 9999, "amount": 10 })),
        Some(&admin),
    );
    assert_eq!(status, 404);
    assert_eq!(body["message"], "User not found.");

    let redeem = |amount: i64| {
        send(
            &env.app,
            "POST",
            "/api/walletAndCoupan/redeem-request",
            Some(json!({ "amount": amount })),
            Some(&renter),
        )
    };
    assert_eq!(redeem(499).0, 400);
    assert_eq!(redeem(1500).0, 400);
    let (status, body) = redeem(600);
    assert_eq!(status, 201, "{body}");
    assert_eq!(body["message"], "Wallet balance redeem request sent !");
    let request_id = body["data"]["request"]["id"].as_i64().unwrap();

    let (_, body) = send(&env.app, "GET", "/api/walletAndCoupan/get-all-balance-request", None, Some(&admin));
    assert_eq!(body["data"]["requests"][0]["status"], "pending");

    let (status, body) = send(
        &env.app,
        "PUT",
        "/api/walletAndCoupan/redeem-request/handle",
        Some(json!({ "requestId": request_id, "action": "approve" })),
        Some(&admin),
    );
    assert_eq!(status, 200, "{body}");
    assert_eq!(body["message"], "Redeem balance request approved successfully.");
    assert_eq!(body["data"]["request"]["status"], "approved");

    // Already handled.
    let (status, _) = send(
        &env.app,
        "POST",
        "/api/admin/balance-requests/handle",
        Some(json!({ "requestId": request_id, "action": "reject" })),
        Some(&admin),
    );
    assert_eq!(status, 400);

    let (_, body) = send(&env.app, "GET", "/api/admin/balance-requests", None, Some(&admin));
    assert_eq!(body["data"]["requests"].as_array().unwrap().len(), 1);

    let (status, _) = send(
        &env.app,
        "POST",
        "/api/walletAndCoupan/send-balance",
        Some(json!({ "userId": renter_id, "amount": 10 })),
        Some(&renter),
    );
    assert_eq!(status, 403);
}
