use serde_json::json;

use crate::auth::roles::Role;
use crate::tests::utils::{approved_room, create_panel, create_user, send, setup};

#[test]
fn issues_and_interests_reach_the_panel() {
    let env = setup();
    let (_, landlord) = create_user(&env.app, Role::Landlord, "owner@example.com");
    let (_, admin) = create_panel(&env.app, Role::Admin, "admin@example.com");
    let (_, manager) = create_panel(&env.app, Role::Manager, "manager@example.com");
    let (renter_id, renter) = create_user(&env.app, Role::Renter, "renter@example.com");
    let id = approved_room(&env, &landlord, &admin, "Leaky", 1500, 1);

    let (status, body) = send(
        &env.app,
        "POST",
        "/api/renter/issues/report",
        Some(json!({ "roomId": id, "issueDescription": "Tap is leaking" })),
        Some(&renter),
    );
    assert_eq!(status, 201, "{body}");

    let (status, body) = send(&env.app, "GET", "/api/admin/issues", None, Some(&manager));
    assert_eq!(status, 200);
    let issues = body["data"]["issues"].as_array().unwrap();
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0]["userId"], renter_id);
    assert_eq!(issues[0]["issueDescription"], "Tap is leaking");

    let (_, body) = send(
        &env.app,
        "POST",
        &format!("/api/renter/rooms/{id}/interest"),
        Some(json!({ "interestType": "book" })),
        Some(&renter),
    );
    let interest_id = body["data"]["interest"]["id"].as_i64().unwrap();

    let (status, body) = send(
        &env.app,
        "PUT",
        &format!("/api/admin/interests/{interest_id}/status"),
        Some(json!({ "status": "in_progress", "notes": "Called the renter" })),
        Some(&manager),
    );
    assert_eq!(status, 200, "{body}");
    assert_eq!(body["data"]["interest"]["status"], "in_progress");
    assert_eq!(body["data"]["interest"]["notes"], "Called the renter");

    let (status, _) = send(
        &env.app,
        "PUT",
        &format!("/api/admin/interests/{interest_id}/status"),
        Some(json!({ "status": "lost" })),
        Some(&manager),
    );
    assert_eq!(status, 400);

    let (_, body) = send(&env.app, "GET", "/api/admin/interests", None, Some(&admin));
    assert_eq!(body["data"]["interests"].as_array().unwrap().len(), 1);

    let (status, _) = send(&env.app, "GET", "/api/admin/issues", None, Some(&renter));
    assert_eq!(status, 403);
}

#[test]
fn enquiries_and_referrals_are_listed() {
    let env = setup();
    let (_, admin) = create_panel(&env.app, Role::Admin, "admin@example.com");
    send(
        &env.app,
        "POST",
        "/api/renter/enquire",
        Some(json!({ "name": "Ravi", "mobileNo": "9999999999", "message": "Hello" })),
        None,
    );

    let (_, body) = send(&env.app, "GET", "/api/admin/enquiries", None, Some(&admin));
    assert_eq!(body["data"]["enquiries"][0]["name"], "Ravi");
    let (status, body) = send(&env.app, "GET", "/api/admin/referrals", None, Some(&admin));
    assert_eq!(status, 200);
    assert!(body["data"]["referrals"].as_array().unwrap().is_empty());
}

#[test]
fn analytics_counts_listings_views_and_active_users() {
    let env = setup();
    let (_, landlord) = create_user(&env.app, Role::Landlord, "owner@example.com");
    let (_, admin) = create_panel(&env.app, Role::Admin, "admin@example.com");
    let (_, renter) = create_user(&env.app, Role::Renter, "renter@example.com");
    let a = approved_room(&env, &landlord, &admin, "Popular", 1500, 1);
    approved_room(&env, &landlord, &admin, "Quiet", 1500, 1);
    send(
        &env.app,
        "POST",
        "/api/landlord/submit-room",
        Some(crate::tests::utils::room_body("Waiting", 900, 1)),
        Some(&landlord),
    );

    for _ in 0..3 {
        send(&env.app, "GET", &format!("/api/rooms/{a}"), None, None);
    }
    send(
        &env.app,
        "POST",
        &format!("/api/renter/rooms/{a}/interest"),
        Some(json!({ "interestType": "visit" })),
        Some(&renter),
    );

    let (status, body) = send(&env.app, "GET", "/api/admin/analytics", None, Some(&admin));
    assert_eq!(status, 200, "{body}");
    let data = &body["data"];
    assert_eq!(data["totalRooms"], 3);
    assert_eq!(data["totalHostels"], 0);
    assert_eq!(data["activeUsers"], 1);
    assert_eq!(data["views"][0]["id"], a);
    assert_eq!(data["views"][0]["viewsCount"], 3);

    let pending = data["byStatus"]
        .as_array()
        .unwrap()
        .iter()
        .find(|c| c["status"] == "pending")
        .unwrap();
    assert_eq!(pending["count"], 1);
}
