//! Status-code to outcome mapping.
//!
//! This is the only place a wire status is interpreted. Repositories pass
//! the raw `HttpResponse` through `map_response` and decode the returned
//! payload; they never look at `status` themselves.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ApiError;
use crate::http::HttpResponse;

const INCORRECT_PASSWORD: &str = "incorrect_password";

/// The statuses the platform API is known to return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    Unauthorized,
    Forbidden,
    NotFound,
    Conflict,
    UnprocessableEntity,
    Other(u16),
}

impl From<u16> for Status {
    fn from(code: u16) -> Self {
        match code {
            200 => Status::Ok,
            401 => Status::Unauthorized,
            403 => Status::Forbidden,
            404 => Status::NotFound,
            409 => Status::Conflict,
            422 => Status::UnprocessableEntity,
            other => Status::Other(other),
        }
    }
}

/// Call-site context for the few statuses whose meaning depends on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Operation {
    #[default]
    General,
    /// Credentials check: any 401 means the password was wrong.
    Login,
}

/// Map a response to its payload or to the matching `ApiError`.
pub fn map_response(response: HttpResponse, op: Operation) -> Result<Value, ApiError> {
    match Status::from(response.status) {
        Status::Ok => Ok(response.body),
        Status::Unauthorized => match op {
            Operation::Login => Err(ApiError::IncorrectPassword),
            Operation::General if detail_str(&response.body) == Some(INCORRECT_PASSWORD) => {
                Err(ApiError::IncorrectPassword)
            }
            Operation::General => Err(ApiError::TokenExpired),
        },
        Status::Forbidden => Err(ApiError::NotAllowed),
        Status::NotFound => Err(ApiError::NotFound),
        Status::Conflict => Err(ApiError::AlreadyExists),
        Status::UnprocessableEntity => Err(ApiError::Validation(describe_validation(&response.body))),
        Status::Other(status) => Err(ApiError::Unknown {
            status,
            body: body_text(&response.body),
        }),
    }
}

/// `map_response` followed by decoding the payload into `T`.
pub fn decode<T: DeserializeOwned>(response: HttpResponse, op: Operation) -> Result<T, ApiError> {
    let body = map_response(response, op)?;
    serde_json::from_value(body).map_err(|e| ApiError::Deserialization(e.to_string()))
}

fn detail_str(body: &Value) -> Option<&str> {
    body.get("detail").and_then(Value::as_str)
}

/// Human-readable summary of a 422 body.
///
/// Understands the `{"detail": [{"loc": [...], "msg": "..."}]}` shape, a
/// plain string `detail`, and falls back to the raw body.
pub fn describe_validation(body: &Value) -> String {
    match body.get("detail") {
        Some(Value::String(detail)) => detail.clone(),
        Some(Value::Array(items)) if !items.is_empty() => items
            .iter()
            .map(describe_item)
            .collect::<Vec<_>>()
            .join("; "),
        _ => body_text(body),
    }
}

fn describe_item(item: &Value) -> String {
    let msg = item.get("msg").and_then(Value::as_str).unwrap_or("invalid value");
    let loc = item
        .get("loc")
        .and_then(Value::as_array)
        .map(|parts| {
            parts
                .iter()
                .filter(|p| p.as_str() != Some("body") && p.as_str() != Some("query"))
                .map(|p| match p {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect::<Vec<_>>()
                .join(".")
        })
        .unwrap_or_default();
    if loc.is_empty() {
        msg.to_string()
    } else {
        format!("{loc}: {msg}")
    }
}

fn body_text(body: &Value) -> String {
    match body {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
