// Shared fixtures for router tests: a throwaway SQLite file, a recording
// object store and helpers that mint accounts and tokens directly.

use astra::{Body, Response};
use chrono::Utc;
use serde_json::{json, Value};
use std::collections::HashSet;
use std::io::Read;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::app::App;
use crate::auth::identity::{FederatedProfile, IdentityVerifier};
use crate::auth::password::hash_password;
use crate::auth::roles::Role;
use crate::auth::tokens::{generate_token_default, issue_token, Claims, PrincipalKind, TokenPurpose};
use crate::config::{Config, StorageConfig};
use crate::db::connection::{init_db, Database};
use crate::db::{panel, users};
use crate::domain::user::AuthMethod;
use crate::errors::ServerError;
use crate::responses::error_to_response;
use crate::router::handle;
use crate::storage::{ObjectStore, StoredObject, UploadFile};

pub const ADMIN_PASSKEY: &str = "admin-passkey";
pub const MANAGER_PASSKEY: &str = "manager-passkey";
pub const PASSWORD: &str = "secret-pass";

/// Object store double: hands out fake CDN URLs and records every delete.
#[derive(Default)]
pub struct RecordingStore {
    counter: AtomicUsize,
    uploads: Mutex<Vec<String>>,
    deletes: Mutex<Vec<String>>,
    failing: Mutex<HashSet<String>>,
}

impl RecordingStore {
    pub fn uploads(&self) -> Vec<String> {
        self.uploads.lock().unwrap().clone()
    }

    pub fn deletes(&self) -> Vec<String> {
        self.deletes.lock().unwrap().clone()
    }

    /// Make `delete(public_id)` fail from now on.
    pub fn fail_delete_of(&self, public_id: &str) {
        self.failing.lock().unwrap().insert(public_id.to_string());
    }
}

impl ObjectStore for RecordingStore {
    fn upload(&self, file: &UploadFile, folder: &str) -> Result<StoredObject, ServerError> {
        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        let public_id = format!("{folder}/img{n}");
        let ext = file.extension().unwrap_or_else(|| "jpg".into());
        self.uploads.lock().unwrap().push(public_id.clone());
        Ok(StoredObject {
            url: format!("https://cdn.test/image/upload/v1/{public_id}.{ext}"),
            public_id,
        })
    }

    fn delete(&self, public_id: &str) -> Result<(), ServerError> {
        self.deletes.lock().unwrap().push(public_id.to_string());
        if self.failing.lock().unwrap().contains(public_id) {
            return Err(ServerError::Storage(format!("refused to delete {public_id}")));
        }
        Ok(())
    }
}

/// Accepts `good:<email>` tokens; anything else is rejected.
pub struct FakeIdentity;

impl IdentityVerifier for FakeIdentity {
    fn verify(&self, id_token: &str) -> Result<FederatedProfile, ServerError> {
        let email = id_token
            .strip_prefix("good:")
            .ok_or_else(|| ServerError::Unauthorized("Invalid Google token".into()))?;
        Ok(FederatedProfile {
            subject: format!("sub-{email}"),
            email: email.to_string(),
            name: "Google User".into(),
            picture: None,
        })
    }
}

pub struct TestEnv {
    pub app: App,
    pub store: Arc<RecordingStore>,
    path: PathBuf,
}

impl Drop for TestEnv {
    fn drop(&mut self) {
        for suffix in ["", "-wal", "-shm"] {
            let mut p = self.path.clone().into_os_string();
            p.push(suffix);
            let _ = std::fs::remove_file(p);
        }
    }
}

fn test_config(path: &str) -> Config {
    Config {
        port: 0,
        database_path: path.to_string(),
        max_workers: 1,
        access_token_ttl_secs: 3600,
        refresh_token_ttl_secs: 7 * 24 * 3600,
        cookie_secure: true,
        admin_passkey: ADMIN_PASSKEY.into(),
        manager_passkey: MANAGER_PASSKEY.into(),
        google_client_id: None,
        storage: StorageConfig::Disk {
            dir: "unused".into(),
            public_base_url: "http://localhost".into(),
        },
    }
}

/// Fresh database file per test.
pub fn setup() -> TestEnv {
    let path = std::env::temp_dir().join(format!("rumin-test-{}.sqlite3", generate_token_default()));
    let path_str = path.to_string_lossy().to_string();

    let db = Database::new(path_str.clone());
    init_db(&db).unwrap_or_else(|e| panic!("Database initialization failed: {e}"));

    let store = Arc::new(RecordingStore::default());
    let app = App {
        db,
        config: Arc::new(test_config(&path_str)),
        store: store.clone(),
        identity: Arc::new(FakeIdentity),
    };
    TestEnv { app, store, path }
}

fn access_token(app: &App, kind: PrincipalKind, id: i64) -> String {
    app.db
        .with_conn(|conn| {
            issue_token(
                conn,
                Claims {
                    kind,
                    principal_id: id,
                },
                TokenPurpose::Access,
                3600,
                Utc::now().timestamp(),
            )
        })
        .expect("issue token")
}

/// Insert a renter or landlord with password [`PASSWORD`]; returns (id, access token).
pub fn create_user(app: &App, role: Role, email: &str) -> (i64, String) {
    let id = app
        .db
        .with_conn(|conn| {
            users::insert_user(
                conn,
                &users::NewUser {
                    name: "Test User".into(),
                    email: email.into(),
                    mobile_no: None,
                    password_hash: Some(hash_password(PASSWORD).unwrap()),
                    google_id: None,
                    auth_method: AuthMethod::Email,
                    role,
                    profile_picture: None,
                },
                Utc::now(),
            )
        })
        .expect("insert user");
    (id, access_token(app, PrincipalKind::User, id))
}

/// Insert an admin or manager; returns (id, access token).
pub fn create_panel(app: &App, role: Role, email: &str) -> (i64, String) {
    let passkey = match role {
        Role::Admin => ADMIN_PASSKEY,
        _ => MANAGER_PASSKEY,
    };
    let id = app
        .db
        .with_conn(|conn| {
            panel::insert_panel_member(
                conn,
                "Panel Member",
                email,
                "9000000000",
                role,
                &hash_password(passkey).unwrap(),
                Utc::now(),
            )
        })
        .expect("insert panel member");
    (id, access_token(app, PrincipalKind::Panel, id))
}

/// A small fake JPEG as the JSON upload object.
pub fn image(name: &str) -> Value {
    json!({ "filename": name, "contentType": "image/jpeg", "data": "aGVsbG8gd29ybGQ=" })
}

pub fn room_body(title: &str, rent: i64, images: usize) -> Value {
    let images: Vec<Value> = (0..images).map(|i| image(&format!("photo{i}.jpg"))).collect();
    json!({
        "title": title,
        "description": "Bright room near the market",
        "address": "12 MG Road",
        "city": "Bhopal",
        "state": "MP",
        "latitude": 23.2599,
        "longitude": 77.4126,
        "rent": rent,
        "amenities": ["wifi", "ac"],
        "availabilityDate": "2030-01-01",
        "bhk": "1BHK",
        "images": images,
    })
}

pub fn hostel_body(title: &str, rent_per_bed: i64) -> Value {
    json!({
        "title": title,
        "description": "Hostel close to campus",
        "address": "5 College Road",
        "city": "Indore",
        "state": "MP",
        "latitude": 22.7196,
        "longitude": 75.8577,
        "rentPerBed": rent_per_bed,
        "amenities": "[\"wifi\",\"mess\"]",
        "hostelType": "Girls",
        "totalBeds": 40,
        "availableBeds": 12,
        "facilities": { "food": true },
        "images": [image("front.png")],
    })
}

/// Run a request through the router, rendering errors the way the server does.
pub fn send_raw(app: &App, method: &str, uri: &str, body: Option<Value>, token: Option<&str>) -> Response {
    let mut builder = http::Request::builder().method(method).uri(uri);
    if let Some(t) = token {
        builder = builder.header("Authorization", format!("Bearer {t}"));
    }
    let body = match body {
        Some(v) => Body::from(v.to_string()),
        None => Body::empty(),
    };
    let req = builder.body(body).expect("build request");

    match handle(req, app) {
        Ok(resp) => resp,
        Err(e) => error_to_response(e),
    }
}

pub fn read_json(resp: Response) -> Value {
    let mut body = String::new();
    resp.into_body()
        .reader()
        .read_to_string(&mut body)
        .expect("read body");
    serde_json::from_str(&body).unwrap_or_else(|e| panic!("non-JSON body {body:?}: {e}"))
}

/// (status, parsed envelope)
pub fn send(app: &App, method: &str, uri: &str, body: Option<Value>, token: Option<&str>) -> (u16, Value) {
    let resp = send_raw(app, method, uri, body, token);
    let status = resp.status().as_u16();
    (status, read_json(resp))
}

/// Landlord submits a room with `images` files and an admin approves it; returns the id.
pub fn approved_room(env: &TestEnv, landlord: &str, admin: &str, title: &str, rent: i64, images: usize) -> i64 {
    let (status, body) = send(
        &env.app,
        "POST",
        "/api/landlord/submit-room",
        Some(room_body(title, rent, images)),
        Some(landlord),
    );
    assert_eq!(status, 201, "{body}");
    let id = body["data"]["submittedRoom"]["id"].as_i64().expect("room id");

    let (status, body) = send(&env.app, "PUT", &format!("/api/admin/listings/{id}/approve"), None, Some(admin));
    assert_eq!(status, 200, "{body}");
    id
}
