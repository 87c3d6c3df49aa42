use serde_json::json;

use crate::auth::roles::Role;
use crate::tests::utils::{approved_room, create_panel, create_user, room_body, send, setup};

#[test]
fn landlord_room_lifecycle_end_to_end() {
    let env = setup();
    let (landlord_id, landlord) = create_user(&env.app, Role::Landlord, "owner@example.com");
    let (_, admin) = create_panel(&env.app, Role::Admin, "admin@example.com");

    // Submit with two images: pending, both uploaded.
    let (status, body) = send(
        &env.app,
        "POST",
        "/api/landlord/submit-room",
        Some(room_body("Sunny 1BHK", 1500, 2)),
        Some(&landlord),
    );
    assert_eq!(status, 201, "{body}");
    let room = &body["data"]["submittedRoom"];
    let id = room["id"].as_i64().unwrap();
    assert_eq!(room["availabilityStatus"], "pending");
    assert_eq!(room["ownerId"], landlord_id);
    assert_eq!(room["images"].as_array().unwrap().len(), 2);
    assert_eq!(env.store.uploads().len(), 2);

    // Not public while pending.
    let (_, body) = send(&env.app, "GET", "/api/rooms", None, None);
    assert!(body["data"]["rooms"].as_array().unwrap().is_empty());

    let (status, body) = send(&env.app, "PUT", &format!("/api/admin/listings/{id}/approve"), None, Some(&admin));
    assert_eq!(status, 200, "{body}");
    assert_eq!(body["data"]["listing"]["availabilityStatus"], "available");
    assert!(body["data"]["listing"]["history"].as_array().unwrap().is_empty());

    let (status, body) = send(
        &env.app,
        "PUT",
        &format!("/api/admin/listings/{id}"),
        Some(json!({ "title": "Renovated 1BHK" })),
        Some(&admin),
    );
    assert_eq!(status, 200, "{body}");
    let listing = &body["data"]["listing"];
    assert_eq!(listing["title"], "Renovated 1BHK");
    let history = listing["history"].as_array().unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0]["data"]["title"], "Sunny 1BHK");

    let (status, _) = send(&env.app, "DELETE", &format!("/api/admin/listings/{id}"), None, Some(&admin));
    assert_eq!(status, 200);
    let mut deleted = env.store.deletes();
    deleted.sort();
    let mut uploaded = env.store.uploads();
    uploaded.sort();
    assert_eq!(deleted, uploaded);

    let (status, body) = send(&env.app, "GET", &format!("/api/rooms/{id}"), None, None);
    assert_eq!(status, 404);
    assert_eq!(body["success"], false);
    assert_eq!(body["statusCode"], 404);
}

#[test]
fn history_keeps_three_newest_snapshots() {
    let env = setup();
    let (_, landlord) = create_user(&env.app, Role::Landlord, "owner@example.com");
    let (_, admin) = create_panel(&env.app, Role::Admin, "admin@example.com");
    let id = approved_room(&env, &landlord, &admin, "v0", 1000, 1);

    let mut last = serde_json::Value::Null;
    for n in 1..=5 {
        let (status, body) = send(
            &env.app,
            "PUT",
            &format!("/api/admin/listings/{id}"),
            Some(json!({ "title": format!("v{n}") })),
            Some(&admin),
        );
        assert_eq!(status, 200, "{body}");
        last = body;
    }

    let history = last["data"]["listing"]["history"].as_array().unwrap().clone();
    assert_eq!(history.len(), 3);
    let titles: Vec<&str> = history.iter().map(|h| h["data"]["title"].as_str().unwrap()).collect();
    assert_eq!(titles, vec!["v4", "v3", "v2"]);
}

#[test]
fn protected_fields_in_update_are_ignored() {
    let env = setup();
    let (_, landlord) = create_user(&env.app, Role::Landlord, "owner@example.com");
    let (_, admin) = create_panel(&env.app, Role::Admin, "admin@example.com");
    let id = approved_room(&env, &landlord, &admin, "Plain", 1000, 1);

    let (status, body) = send(
        &env.app,
        "PUT",
        &format!("/api/admin/listings/{id}"),
        Some(json!({ "availabilityStatus": "booked", "viewsCount": 999, "rent": 1200 })),
        Some(&admin),
    );
    assert_eq!(status, 200, "{body}");
    let listing = &body["data"]["listing"];
    assert_eq!(listing["availabilityStatus"], "available");
    assert_eq!(listing["viewsCount"], 0);
    assert_eq!(listing["rent"], 1200);
}

#[test]
fn non_numeric_latitude_persists_nothing() {
    let env = setup();
    let (_, landlord) = create_user(&env.app, Role::Landlord, "owner@example.com");
    let (_, admin) = create_panel(&env.app, Role::Admin, "admin@example.com");

    let mut body = room_body("Bad coords", 1500, 1);
    body["latitude"] = json!("north-ish");
    let (status, resp) = send(&env.app, "POST", "/api/landlord/submit-room", Some(body), Some(&landlord));
    assert_eq!(status, 400);
    assert!(resp["message"].as_str().unwrap().contains("latitude"));
    assert!(env.store.uploads().is_empty());

    let (_, all) = send(&env.app, "GET", "/api/admin/listings", None, Some(&admin));
    assert!(all["data"]["listings"].as_array().unwrap().is_empty());
}

#[test]
fn landlord_submission_requires_an_image() {
    let env = setup();
    let (_, landlord) = create_user(&env.app, Role::Landlord, "owner@example.com");

    let (status, body) = send(
        &env.app,
        "POST",
        "/api/landlord/submit-room",
        Some(room_body("No photos", 1500, 0)),
        Some(&landlord),
    );
    assert_eq!(status, 400);
    assert_eq!(body["message"], "No images provided. Please upload at least one image.");
}

#[test]
fn delete_survives_a_failing_image_delete() {
    let env = setup();
    let (_, landlord) = create_user(&env.app, Role::Landlord, "owner@example.com");
    let (_, admin) = create_panel(&env.app, Role::Admin, "admin@example.com");
    let id = approved_room(&env, &landlord, &admin, "Three photos", 1500, 3);

    let uploads = env.store.uploads();
    env.store.fail_delete_of(&uploads[1]);

    let (status, body) = send(&env.app, "DELETE", &format!("/api/admin/listings/{id}"), None, Some(&admin));
    assert_eq!(status, 200, "{body}");
    assert_eq!(env.store.deletes().len(), 3);

    let (status, _) = send(&env.app, "GET", &format!("/api/rooms/{id}"), None, None);
    assert_eq!(status, 404);
}

#[test]
fn rent_range_filters_available_rooms() {
    let env = setup();
    let (_, landlord) = create_user(&env.app, Role::Landlord, "owner@example.com");
    let (_, admin) = create_panel(&env.app, Role::Admin, "admin@example.com");

    approved_room(&env, &landlord, &admin, "Cheap", 800, 1);
    let mid = approved_room(&env, &landlord, &admin, "Mid", 1500, 1);
    approved_room(&env, &landlord, &admin, "Pricey", 2500, 1);
    let edge = approved_room(&env, &landlord, &admin, "Edge", 2000, 1);
    // Pending rooms never show up.
    send(
        &env.app,
        "POST",
        "/api/landlord/submit-room",
        Some(room_body("Pending mid", 1200, 1)),
        Some(&landlord),
    );

    let (status, body) = send(&env.app, "GET", "/api/rooms?rentRange=1000-2000", None, None);
    assert_eq!(status, 200, "{body}");
    let mut ids: Vec<i64> = body["data"]["rooms"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["id"].as_i64().unwrap())
        .collect();
    ids.sort();
    assert_eq!(ids, vec![mid, edge]);

    let (status, _) = send(&env.app, "GET", "/api/rooms?rentRange=cheap", None, None);
    assert_eq!(status, 400);
}

#[test]
fn amenities_and_location_filters() {
    let env = setup();
    let (_, landlord) = create_user(&env.app, Role::Landlord, "owner@example.com");
    let (_, admin) = create_panel(&env.app, Role::Admin, "admin@example.com");
    let id = approved_room(&env, &landlord, &admin, "Wifi room", 1500, 1);

    let (_, body) = send(&env.app, "GET", "/api/rooms?amenities=wifi,ac&location=bhopal", None, None);
    let rooms = body["data"]["rooms"].as_array().unwrap();
    assert_eq!(rooms.len(), 1);
    assert_eq!(rooms[0]["id"], id);

    let (_, body) = send(&env.app, "GET", "/api/rooms?amenities=pool", None, None);
    assert!(body["data"]["rooms"].as_array().unwrap().is_empty());

    let (_, body) = send(&env.app, "GET", "/api/rooms?location=Indore", None, None);
    assert!(body["data"]["rooms"].as_array().unwrap().is_empty());
}

#[test]
fn reading_a_room_counts_views_and_shows_owner() {
    let env = setup();
    let (_, landlord) = create_user(&env.app, Role::Landlord, "owner@example.com");
    let (_, admin) = create_panel(&env.app, Role::Admin, "admin@example.com");
    let id = approved_room(&env, &landlord, &admin, "Viewed", 1500, 1);

    send(&env.app, "GET", &format!("/api/rooms/{id}"), None, None);
    let (status, body) = send(&env.app, "GET", &format!("/api/rooms/{id}"), None, None);
    assert_eq!(status, 200);
    let room = &body["data"]["room"];
    assert_eq!(room["viewsCount"], 2);
    assert_eq!(room["owner"]["email"], "owner@example.com");
}

#[test]
fn status_transitions_follow_the_table() {
    let env = setup();
    let (_, landlord) = create_user(&env.app, Role::Landlord, "owner@example.com");
    let (_, admin) = create_panel(&env.app, Role::Admin, "admin@example.com");

    let (_, body) = send(
        &env.app,
        "POST",
        "/api/landlord/submit-room",
        Some(room_body("Fresh", 1500, 1)),
        Some(&landlord),
    );
    let id = body["data"]["submittedRoom"]["id"].as_i64().unwrap();
    let put = |action: &str| {
        send(&env.app, "PUT", &format!("/api/admin/listings/{id}/{action}"), None, Some(&admin))
    };

    // Cannot book a pending room.
    assert_eq!(put("book").0, 400);
    assert_eq!(put("approve").0, 200);
    let (status, body) = put("book");
    assert_eq!(status, 200);
    assert_eq!(body["data"]["listing"]["availabilityStatus"], "booked");
    assert_eq!(put("approve").0, 400);
    let (_, body) = put("unbook");
    assert_eq!(body["data"]["listing"]["availabilityStatus"], "available");
    assert_eq!(put("publish").0, 404);
}

#[test]
fn image_add_and_delete_keep_history() {
    let env = setup();
    let (_, landlord) = create_user(&env.app, Role::Landlord, "owner@example.com");
    let (_, admin) = create_panel(&env.app, Role::Admin, "admin@example.com");
    let id = approved_room(&env, &landlord, &admin, "Gallery", 1500, 1);
    let uri = format!("/api/admin/listings/{id}/images");

    let (status, body) = send(
        &env.app,
        "PUT",
        &uri,
        Some(json!({ "action": "add", "images": [crate::tests::utils::image("extra.png")] })),
        Some(&admin),
    );
    assert_eq!(status, 200, "{body}");
    let images = body["data"]["listing"]["images"].as_array().unwrap().clone();
    assert_eq!(images.len(), 2);
    assert_eq!(body["data"]["listing"]["history"].as_array().unwrap().len(), 1);

    let first = images[0].as_str().unwrap().to_string();
    let (status, body) = send(
        &env.app,
        "PUT",
        &uri,
        Some(json!({ "action": "delete", "imageUrl": first })),
        Some(&admin),
    );
    assert_eq!(status, 200, "{body}");
    assert_eq!(body["data"]["listing"]["images"].as_array().unwrap().len(), 1);
    assert_eq!(env.store.deletes(), vec!["rooms/img1".to_string()]);

    // Deleting it again: the URL is no longer on the listing.
    let (status, _) = send(
        &env.app,
        "PUT",
        &uri,
        Some(json!({ "action": "delete", "imageUrl": first })),
        Some(&admin),
    );
    assert_eq!(status, 404);

    let (status, _) = send(&env.app, "PUT", &uri, Some(json!({ "action": "rotate" })), Some(&admin));
    assert_eq!(status, 400);
}

#[test]
fn renter_token_on_admin_route_is_forbidden() {
    let env = setup();
    let (_, renter) = create_user(&env.app, Role::Renter, "renter@example.com");

    let (status, body) = send(&env.app, "GET", "/api/admin/listings", None, Some(&renter));
    assert_eq!(status, 403);
    assert_eq!(body["message"], "Insufficient permissions");

    let (status, _) = send(&env.app, "GET", "/api/admin/listings", None, None);
    assert_eq!(status, 401);
    let (status, _) = send(&env.app, "GET", "/api/admin/listings", None, Some("not-a-token"));
    assert_eq!(status, 401);
}

#[test]
fn manager_can_moderate_but_not_delete() {
    let env = setup();
    let (_, landlord) = create_user(&env.app, Role::Landlord, "owner@example.com");
    let (_, manager) = create_panel(&env.app, Role::Manager, "manager@example.com");
    let id = approved_room(&env, &landlord, &manager, "Managed", 1500, 1);

    let (status, _) = send(&env.app, "DELETE", &format!("/api/admin/listings/{id}"), None, Some(&manager));
    assert_eq!(status, 403);
    let (status, _) = send(&env.app, "GET", "/api/admin/analytics", None, Some(&manager));
    assert_eq!(status, 200);
}

#[test]
fn landlord_sees_only_own_rooms_newest_first() {
    let env = setup();
    let (_, a) = create_user(&env.app, Role::Landlord, "a@example.com");
    let (_, b) = create_user(&env.app, Role::Landlord, "b@example.com");

    for title in ["first", "second"] {
        send(&env.app, "POST", "/api/landlord/submit-room", Some(room_body(title, 1000, 1)), Some(&a));
    }
    send(&env.app, "POST", "/api/landlord/submit-room", Some(room_body("other", 1000, 1)), Some(&b));

    let (status, body) = send(&env.app, "GET", "/api/landlord/rooms", None, Some(&a));
    assert_eq!(status, 200);
    let titles: Vec<&str> = body["data"]["rooms"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["second", "first"]);
}

#[test]
fn unknown_routes_are_json_404s() {
    let env = setup();
    let (status, body) = send(&env.app, "GET", "/api/nowhere", None, None);
    assert_eq!(status, 404);
    assert_eq!(body["message"], "Route not found");

    let (status, _) = send(&env.app, "GET", "/api/rooms/abc", None, None);
    assert_eq!(status, 400);
}
