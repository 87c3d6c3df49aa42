use serde_json::json;

use crate::auth::roles::Role;
use crate::tests::utils::{
    create_user, read_json, send, send_raw, setup, ADMIN_PASSKEY, MANAGER_PASSKEY, PASSWORD,
};

fn refresh_cookie(resp: &astra::Response) -> String {
    let header = resp
        .headers()
        .get("set-cookie")
        .and_then(|v| v.to_str().ok())
        .expect("set-cookie header")
        .to_string();
    assert!(header.contains("HttpOnly"));
    assert!(header.contains("Secure"));
    assert!(header.contains("SameSite=Strict"));
    header.split(';').next().unwrap().to_string()
}

fn with_cookie(app: &crate::app::App, uri: &str, cookie: &str) -> astra::Response {
    let req = http::Request::builder()
        .method("POST")
        .uri(uri)
        .header("Cookie", cookie)
        .body(astra::Body::empty())
        .unwrap();
    match crate::router::handle(req, app) {
        Ok(r) => r,
        Err(e) => crate::responses::error_to_response(e),
    }
}

#[test]
fn signup_login_refresh_logout() {
    let env = setup();
    let (status, body) = send(
        &env.app,
        "POST",
        "/api/auth/signup",
        Some(json!({
            "name": "Meera",
            "email": "Meera@Example.com",
            "mobileNo": "9876500000",
            "password": "hunter22",
            "role": "landlord",
        })),
        None,
    );
    assert_eq!(status, 201, "{body}");
    assert_eq!(body["data"]["email"], "meera@example.com");
    assert_eq!(body["data"]["role"], "landlord");
    assert!(body["data"].get("passwordHash").is_none());

    let (status, _) = send(
        &env.app,
        "POST",
        "/api/auth/signup",
        Some(json!({ "name": "Dup", "email": "meera@example.com", "password": "hunter22" })),
        None,
    );
    assert_eq!(status, 400);

    let resp = send_raw(
        &env.app,
        "POST",
        "/api/auth/login",
        Some(json!({ "mobileNo": "9876500000", "password": "hunter22" })),
        None,
    );
    assert_eq!(resp.status().as_u16(), 200);
    let cookie = refresh_cookie(&resp);
    let body = read_json(resp);
    let access = body["data"]["accessToken"].as_str().unwrap().to_string();

    let (status, _) = send(&env.app, "GET", "/api/landlord/rooms", None, Some(&access));
    assert_eq!(status, 200);

    let resp = with_cookie(&env.app, "/api/auth/refresh-token", &cookie);
    assert_eq!(resp.status().as_u16(), 200);
    let fresh = read_json(resp)["data"]["accessToken"].as_str().unwrap().to_string();
    assert_ne!(fresh, access);

    let req = http::Request::builder()
        .method("POST")
        .uri("/api/auth/logout")
        .header("Cookie", &cookie)
        .header("Authorization", format!("Bearer {access}"))
        .body(astra::Body::empty())
        .unwrap();
    let resp = crate::router::handle(req, &env.app).unwrap();
    assert_eq!(resp.status().as_u16(), 200);

    // Both the refresh cookie and the old access token are dead now.
    assert_eq!(with_cookie(&env.app, "/api/auth/refresh-token", &cookie).status().as_u16(), 401);
    let (status, _) = send(&env.app, "GET", "/api/landlord/rooms", None, Some(&access));
    assert_eq!(status, 401);
    let (status, _) = send(&env.app, "GET", "/api/landlord/rooms", None, Some(&fresh));
    assert_eq!(status, 200);
}

#[test]
fn login_failures() {
    let env = setup();
    create_user(&env.app, Role::Renter, "renter@example.com");

    let (status, body) = send(
        &env.app,
        "POST",
        "/api/auth/login",
        Some(json!({ "email": "nobody@example.com", "password": PASSWORD })),
        None,
    );
    assert_eq!(status, 404);
    assert_eq!(body["message"], "User not found");

    let (status, body) = send(
        &env.app,
        "POST",
        "/api/auth/login",
        Some(json!({ "email": "renter@example.com", "password": "wrong-pass" })),
        None,
    );
    assert_eq!(status, 401);
    assert_eq!(body["message"], "Invalid credentials");

    let (status, _) = send(&env.app, "POST", "/api/auth/signup", Some(json!({ "name": "x" })), None);
    assert_eq!(status, 400);
}

#[test]
fn refresh_without_cookie_is_unauthorized() {
    let env = setup();
    let (status, _) = send(&env.app, "POST", "/api/auth/refresh-token", None, None);
    assert_eq!(status, 401);

    let resp = with_cookie(&env.app, "/api/auth/refresh-token", "refreshToken=forged");
    assert_eq!(resp.status().as_u16(), 401);
}

#[test]
fn access_token_cannot_refresh() {
    let env = setup();
    let (_, access) = create_user(&env.app, Role::Renter, "renter@example.com");
    let resp = with_cookie(&env.app, "/api/auth/refresh-token", &format!("refreshToken={access}"));
    assert_eq!(resp.status().as_u16(), 401);
}

#[test]
fn panel_register_and_login_with_passkey() {
    let env = setup();
    let register = |role: &str, passkey: &str, email: &str| {
        send(
            &env.app,
            "POST",
            "/api/auth/panel/register",
            Some(json!({
                "name": "Ops",
                "email": email,
                "mobileNo": "9000000001",
                "role": role,
                "passkey": passkey,
            })),
            None,
        )
    };

    let (status, body) = register("admin", "guess", "ops@example.com");
    assert_eq!(status, 403);
    assert_eq!(body["message"], "Invalid passkey");
    // Each role has its own passkey.
    assert_eq!(register("admin", MANAGER_PASSKEY, "ops@example.com").0, 403);
    assert_eq!(register("renter", ADMIN_PASSKEY, "ops@example.com").0, 400);

    let (status, body) = register("admin", ADMIN_PASSKEY, "ops@example.com");
    assert_eq!(status, 201, "{body}");
    assert_eq!(body["data"]["admin"]["role"], "admin");
    assert_eq!(register("admin", ADMIN_PASSKEY, "ops@example.com").0, 400);

    let (status, body) = send(
        &env.app,
        "POST",
        "/api/auth/panel/login",
        Some(json!({ "email": "ops@example.com", "passkey": ADMIN_PASSKEY })),
        None,
    );
    assert_eq!(status, 200, "{body}");
    let token = body["data"]["accessToken"].as_str().unwrap().to_string();
    let (status, _) = send(&env.app, "GET", "/api/admin/analytics", None, Some(&token));
    assert_eq!(status, 200);

    let (status, _) = send(
        &env.app,
        "POST",
        "/api/auth/panel/login",
        Some(json!({ "email": "ops@example.com", "passkey": "nope" })),
        None,
    );
    assert_eq!(status, 401);
}

#[test]
fn google_sign_in_creates_then_reuses_account() {
    let env = setup();
    let (status, body) = send(
        &env.app,
        "POST",
        "/api/auth/google",
        Some(json!({ "idToken": "good:g@example.com" })),
        None,
    );
    assert_eq!(status, 200, "{body}");
    let id = body["data"]["user"]["id"].as_i64().unwrap();
    assert_eq!(body["data"]["user"]["authMethod"], "google");

    let (_, body) = send(
        &env.app,
        "POST",
        "/api/auth/google",
        Some(json!({ "credential": "good:g@example.com" })),
        None,
    );
    assert_eq!(body["data"]["user"]["id"], id);

    let (status, _) = send(&env.app, "POST", "/api/auth/google", Some(json!({ "idToken": "bad" })), None);
    assert_eq!(status, 401);
}

#[test]
fn profile_update_changes_name_and_picture() {
    let env = setup();
    let (_, token) = create_user(&env.app, Role::Renter, "renter@example.com");

    let (status, body) = send(
        &env.app,
        "PUT",
        "/api/auth/profile",
        Some(json!({ "name": "New Name", "profilePicture": crate::tests::utils::image("me.jpg") })),
        Some(&token),
    );
    assert_eq!(status, 200, "{body}");
    let user = &body["data"];
    assert_eq!(user["name"], "New Name");
    assert!(user["profilePicture"].as_str().unwrap().contains("profiles/img1"));

    let (status, _) = send(&env.app, "PUT", "/api/auth/profile", Some(json!({ "name": "x" })), None);
    assert_eq!(status, 401);
}
