// src/app.rs
use std::sync::Arc;

use crate::auth::identity::IdentityVerifier;
use crate::config::Config;
use crate::db::connection::Database;
use crate::storage::ObjectStore;

/// Shared handles passed to every request.
#[derive(Clone)]
pub struct App {
    pub db: Database,
    pub config: Arc<Config>,
    pub store: Arc<dyn ObjectStore>,
    pub identity: Arc<dyn IdentityVerifier>,
}
