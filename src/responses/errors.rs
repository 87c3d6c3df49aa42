use crate::errors::ServerError;
use astra::{Body, Response, ResponseBuilder};
use serde_json::json;
use tracing::error;

pub use crate::errors::ResultResp;

/// Convert a ServerError into the `{ success, statusCode, message }` envelope.
/// Server-side failures are logged in full; clients get a generic message.
pub fn error_to_response(err: ServerError) -> Response {
    let status = err.status_code();
    if status >= 500 {
        error!("request failed: {err}");
        return json_error_response(status, "Internal Server Error");
    }
    json_error_response(status, &err.to_string())
}

pub fn json_error_response(status: u16, message: &str) -> Response {
    let body = json!({
        "success": false,
        "statusCode": status,
        "message": message,
    })
    .to_string();

    ResponseBuilder::new()
        .status(status)
        .header("Content-Type", mime::APPLICATION_JSON.as_ref())
        .body(Body::from(body))
        .unwrap_or_else(|_| Response::new(Body::from("Internal Server Error")))
}
