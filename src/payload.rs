// src/payload.rs
//
// Clients send numbers both as JSON numbers and as strings (form-style), and
// lists either as arrays or as serialized JSON strings. These helpers read a
// field the lenient way and report a ValidationError naming the field otherwise.

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::{Map, Value};

use crate::errors::ServerError;

pub type Payload = Map<String, Value>;

/// Interpret a request body as a JSON object.
pub fn as_object(value: Value) -> Result<Payload, ServerError> {
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(ServerError::validation("Request body must be a JSON object.")),
    }
}

fn present<'a>(p: &'a Payload, key: &str) -> Option<&'a Value> {
    match p.get(key) {
        None | Some(Value::Null) => None,
        Some(v) => Some(v),
    }
}

/// Trimmed non-empty string, or None when absent/blank.
pub fn opt_str(p: &Payload, key: &str) -> Result<Option<String>, ServerError> {
    match present(p, key) {
        None => Ok(None),
        Some(Value::String(s)) => {
            let s = s.trim();
            Ok((!s.is_empty()).then(|| s.to_string()))
        }
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(_) => Err(ServerError::validation(format!("{key} must be a string."))),
    }
}

pub fn req_str(p: &Payload, key: &str) -> Result<String, ServerError> {
    opt_str(p, key)?.ok_or_else(|| ServerError::validation(format!("{key} is required.")))
}

/// Number given either as a JSON number or a numeric string.
pub fn opt_f64(p: &Payload, key: &str) -> Result<Option<f64>, ServerError> {
    let parsed = match present(p, key) {
        None => return Ok(None),
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) if s.trim().is_empty() => return Ok(None),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        Some(_) => None,
    };
    match parsed {
        Some(v) if v.is_finite() => Ok(Some(v)),
        _ => Err(ServerError::validation(format!("{key} must be a number."))),
    }
}

pub fn req_f64(p: &Payload, key: &str) -> Result<f64, ServerError> {
    opt_f64(p, key)?.ok_or_else(|| ServerError::validation(format!("{key} is required.")))
}

/// Whole number; fractional input is rejected rather than truncated.
pub fn opt_i64(p: &Payload, key: &str) -> Result<Option<i64>, ServerError> {
    match opt_f64(p, key)? {
        None => Ok(None),
        Some(v) if v.fract() == 0.0 && v.abs() < 9.0e15 => Ok(Some(v as i64)),
        Some(_) => Err(ServerError::validation(format!("{key} must be a whole number."))),
    }
}

pub fn req_i64(p: &Payload, key: &str) -> Result<i64, ServerError> {
    opt_i64(p, key)?.ok_or_else(|| ServerError::validation(format!("{key} is required.")))
}

pub fn opt_bool(p: &Payload, key: &str) -> Result<Option<bool>, ServerError> {
    match present(p, key) {
        None => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(*b)),
        Some(Value::String(s)) => match s.trim() {
            "true" | "1" => Ok(Some(true)),
            "false" | "0" => Ok(Some(false)),
            _ => Err(ServerError::validation(format!("{key} must be true or false."))),
        },
        Some(_) => Err(ServerError::validation(format!("{key} must be true or false."))),
    }
}

/// List of strings given as an array or as a serialized JSON array string.
pub fn opt_string_list(p: &Payload, key: &str) -> Result<Option<Vec<String>>, ServerError> {
    let items = match present(p, key) {
        None => return Ok(None),
        Some(Value::Array(items)) => items.clone(),
        Some(Value::String(s)) if s.trim().is_empty() => return Ok(Some(Vec::new())),
        Some(Value::String(s)) => match serde_json::from_str::<Value>(s.trim()) {
            Ok(Value::Array(items)) => items,
            _ => {
                return Err(ServerError::validation(format!(
                    "{key} must be a list or a JSON-encoded list."
                )))
            }
        },
        Some(_) => {
            return Err(ServerError::validation(format!("{key} must be a list.")));
        }
    };

    items
        .into_iter()
        .map(|v| match v {
            Value::String(s) => Ok(s),
            _ => Err(ServerError::validation(format!("{key} must contain only strings."))),
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Some)
}

/// Object given inline or as a serialized JSON string.
pub fn opt_object(p: &Payload, key: &str) -> Result<Option<Payload>, ServerError> {
    match present(p, key) {
        None => Ok(None),
        Some(Value::Object(m)) => Ok(Some(m.clone())),
        Some(Value::String(s)) => match serde_json::from_str::<Value>(s.trim()) {
            Ok(Value::Object(m)) => Ok(Some(m)),
            _ => Err(ServerError::validation(format!("{key} must be an object."))),
        },
        Some(_) => Err(ServerError::validation(format!("{key} must be an object."))),
    }
}

/// RFC 3339 timestamp or a bare `YYYY-MM-DD` (midnight UTC).
pub fn opt_date(p: &Payload, key: &str) -> Result<Option<DateTime<Utc>>, ServerError> {
    match opt_str(p, key)? {
        None => Ok(None),
        Some(s) => parse_date(&s)
            .map(Some)
            .ok_or_else(|| ServerError::validation(format!("{key} must be a date."))),
    }
}

pub fn req_date(p: &Payload, key: &str) -> Result<DateTime<Utc>, ServerError> {
    opt_date(p, key)?.ok_or_else(|| ServerError::validation(format!("{key} is required.")))
}

pub fn parse_date(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|ndt| ndt.and_utc())
}
