// src/config.rs
use std::{env, fmt::Display, fs::read_to_string, str::FromStr};

use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_path: String,
    pub max_workers: usize,
    pub access_token_ttl_secs: i64,
    pub refresh_token_ttl_secs: i64,
    /// Adds `Secure` to the refresh cookie. Off only for plain-http local dev.
    pub cookie_secure: bool,
    pub admin_passkey: String,
    pub manager_passkey: String,
    pub google_client_id: Option<String>,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone)]
pub enum StorageConfig {
    Cloudinary {
        cloud_name: String,
        api_key: String,
        api_secret: String,
    },
    Disk {
        dir: String,
        public_base_url: String,
    },
}

impl Config {
    pub fn load() -> Self {
        let port: u16 = try_load("PORT", "3000");

        Self {
            port,
            database_path: try_load("DATABASE_PATH", "rumin.sqlite3"),
            max_workers: try_load("MAX_WORKERS", "8"),
            access_token_ttl_secs: try_load("ACCESS_TOKEN_TTL_SECS", "3600"),
            refresh_token_ttl_secs: try_load("REFRESH_TOKEN_TTL_SECS", "604800"),
            cookie_secure: try_load("COOKIE_SECURE", "true"),
            admin_passkey: read_secret("ADMIN_PASSKEY"),
            manager_passkey: read_secret("MANAGER_PASSKEY"),
            google_client_id: var("GOOGLE_CLIENT_ID").ok(),
            storage: StorageConfig::load(port),
        }
    }
}

impl StorageConfig {
    fn load(port: u16) -> Self {
        match (
            var("CLOUDINARY_CLOUD_NAME"),
            var("CLOUDINARY_API_KEY"),
            optional_secret("CLOUDINARY_API_SECRET"),
        ) {
            (Ok(cloud_name), Ok(api_key), Some(api_secret)) => {
                info!("Using Cloudinary object store ({cloud_name})");
                StorageConfig::Cloudinary {
                    cloud_name,
                    api_key,
                    api_secret,
                }
            }
            _ => {
                let default_base = format!("http://localhost:{port}");
                let dir: String = try_load("UPLOAD_DIR", "uploads");
                let public_base_url: String = try_load("PUBLIC_BASE_URL", &default_base);
                info!("Using disk object store at {dir}");
                StorageConfig::Disk {
                    dir,
                    public_base_url,
                }
            }
        }
    }
}

fn var(key: &str) -> Result<String, ()> {
    env::var(key).map_err(|_| {
        warn!("Environment variable {key} not found");
    })
}

fn try_load<T: FromStr>(key: &str, default: &str) -> T
where
    T::Err: Display,
{
    let raw = var(key).unwrap_or_else(|_| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });

    match raw.parse() {
        Ok(v) => v,
        Err(e) => {
            warn!("Invalid {key} value ({e}), using default: {default}");
            match default.parse() {
                Ok(v) => v,
                Err(_) => panic!("Default for {key} does not parse"),
            }
        }
    }
}

/// Secrets come from the environment first, then `/run/secrets/<NAME>`.
fn optional_secret(secret_name: &str) -> Option<String> {
    if let Ok(v) = env::var(secret_name) {
        return Some(v.trim().to_string());
    }

    let path = format!("/run/secrets/{secret_name}");
    read_to_string(&path)
        .map(|s| s.trim().to_string())
        .map_err(|e| {
            warn!("Failed to read {secret_name} from file: {e}");
        })
        .ok()
}

fn read_secret(secret_name: &str) -> String {
    optional_secret(secret_name)
        .filter(|s| !s.is_empty())
        .expect("Secrets misconfigured!")
}
