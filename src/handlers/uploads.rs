// src/handlers/uploads.rs
use crate::app::App;
use crate::errors::{ResultResp, ServerError};
use crate::responses::file_response;

/// Serve a stored image. Only the disk store keeps files locally.
pub fn serve(app: &App, rel: &str) -> ResultResp {
    match app.store.local_file(rel)? {
        Some(bytes) => file_response(bytes, rel),
        None => Err(ServerError::not_found("File not found.")),
    }
}
