// responses/json.rs
use crate::errors::{ResultResp, ServerError};
use astra::{Body, ResponseBuilder};
use serde::Serialize;

/// Uniform success envelope: `{ success, statusCode, data, message }`.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Envelope<'a, T: Serialize> {
    success: bool,
    status_code: u16,
    data: T,
    message: &'a str,
}

pub fn json_response<T: Serialize>(status: u16, data: T, message: &str) -> ResultResp {
    let body = serde_json::to_vec(&Envelope {
        success: (200..300).contains(&status),
        status_code: status,
        data,
        message,
    })
    .map_err(|_| ServerError::InternalError)?;

    ResponseBuilder::new()
        .status(status)
        .header("Content-Type", mime::APPLICATION_JSON.as_ref())
        .body(Body::from(body))
        .map_err(|_| ServerError::InternalError)
}

/// 200 with data.
pub fn ok<T: Serialize>(data: T, message: &str) -> ResultResp {
    json_response(200, data, message)
}

/// 201 with data.
pub fn created<T: Serialize>(data: T, message: &str) -> ResultResp {
    json_response(201, data, message)
}
