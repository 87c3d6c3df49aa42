use std::net::SocketAddr;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use astra::Server;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::app::App;
use crate::auth::identity::GoogleVerifier;
use crate::config::{Config, StorageConfig};
use crate::db::connection::{init_db, Database};
use crate::db::tokens::purge_expired;
use crate::errors::ServerError;
use crate::responses::{error_to_response, json_error_response};
use crate::router::handle;
use crate::storage::{CloudinaryStore, DiskStore, ObjectStore};

mod app;
mod auth;
mod config;
mod db;
mod domain;
mod errors;
mod handlers;
mod listings;
mod payload;
mod request;
mod responses;
mod router;
mod storage;

#[cfg(test)]
mod tests;

fn build_store(cfg: &StorageConfig) -> Result<Arc<dyn ObjectStore>, ServerError> {
    Ok(match cfg {
        StorageConfig::Cloudinary {
            cloud_name,
            api_key,
            api_secret,
        } => Arc::new(CloudinaryStore::new(
            cloud_name.clone(),
            api_key.clone(),
            api_secret.clone(),
        )?),
        StorageConfig::Disk {
            dir,
            public_base_url,
        } => Arc::new(DiskStore::new(dir.as_str(), public_base_url.as_str())?),
    })
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::load();

    let db = Database::new(config.database_path.clone());
    if let Err(e) = init_db(&db) {
        error!("Database initialization failed: {e}");
        std::process::exit(1);
    }
    let now = chrono::Utc::now().timestamp();
    match db.with_conn(|conn| purge_expired(conn, now)) {
        Ok(n) => info!("Purged {n} expired tokens"),
        Err(e) => error!("Token purge failed: {e}"),
    }

    let store = match build_store(&config.storage) {
        Ok(store) => store,
        Err(e) => {
            error!("Object store setup failed: {e}");
            std::process::exit(1);
        }
    };
    let identity = match GoogleVerifier::new(config.google_client_id.clone()) {
        Ok(v) => Arc::new(v),
        Err(e) => {
            error!("Identity verifier setup failed: {e}");
            std::process::exit(1);
        }
    };

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let server = Server::bind(&addr).max_workers(config.max_workers);
    let app = App {
        db,
        config: Arc::new(config),
        store,
        identity,
    };
    info!("Starting server at http://{addr}");

    let result = server.serve(move |req, _info| {
        match catch_unwind(AssertUnwindSafe(|| handle(req, &app))) {
            Ok(Ok(resp)) => resp,
            Ok(Err(err)) => error_to_response(err),
            Err(_) => {
                error!("Handler panicked");
                json_error_response(500, "Internal Server Error")
            }
        }
    });

    if let Err(e) = result {
        error!("Server ended with error: {e}");
    }

    info!("Server shut down cleanly.");
}
