// src/request.rs
//
// Everything a handler needs from an incoming request, read once up front.

use astra::Request;
use http::header::{AUTHORIZATION, COOKIE};
use http::{HeaderMap, Method};
use serde_json::Value;
use std::collections::HashMap;
use std::io::Read;

use crate::errors::ServerError;
use crate::payload::{as_object, Payload};

/// Large enough for five base64 images.
pub const MAX_BODY_BYTES: u64 = 40 * 1024 * 1024;

pub struct Ctx {
    pub method: Method,
    pub path: String,
    query: HashMap<String, String>,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl Ctx {
    pub fn from_request(req: Request) -> Result<Self, ServerError> {
        let (parts, mut body) = req.into_parts();

        let mut buf = Vec::new();
        body.reader()
            .take(MAX_BODY_BYTES + 1)
            .read_to_end(&mut buf)
            .map_err(|_| ServerError::validation("Could not read request body."))?;
        if buf.len() as u64 > MAX_BODY_BYTES {
            return Err(ServerError::validation("Request body is too large."));
        }

        let query = parts
            .uri
            .query()
            .map(|q| url::form_urlencoded::parse(q.as_bytes()).into_owned().collect())
            .unwrap_or_default();

        Ok(Self {
            method: parts.method,
            path: parts.uri.path().to_string(),
            query,
            headers: parts.headers,
            body: buf,
        })
    }

    /// Path split on `/` without empty segments.
    pub fn segments(&self) -> Vec<&str> {
        self.path.split('/').filter(|s| !s.is_empty()).collect()
    }

    /// JSON object body. An empty body reads as `{}`.
    pub fn json(&self) -> Result<Payload, ServerError> {
        if self.body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Payload::new());
        }
        let value: Value = serde_json::from_slice(&self.body)
            .map_err(|e| ServerError::validation(format!("Malformed JSON body: {e}")))?;
        as_object(value)
    }

    pub fn query(&self, key: &str) -> Option<&str> {
        self.query
            .get(key)
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
    }

    pub fn bearer(&self) -> Option<&str> {
        let header = self.headers.get(AUTHORIZATION)?.to_str().ok()?;
        let token = header.strip_prefix("Bearer ")?.trim();
        (!token.is_empty() && token != "null" && token != "undefined").then_some(token)
    }

    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|h| h.to_str().ok())
            .flat_map(|h| h.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v.trim())
            .filter(|v| !v.is_empty())
    }
}

pub fn parse_id(seg: &str, what: &str) -> Result<i64, ServerError> {
    seg.parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| ServerError::validation(format!("Invalid {what} id.")))
}
