//! Error types for the platform client.
//!
//! # Design
//! Every status-code outcome has its own variant so callers can branch on
//! "the token expired" versus "the name is taken" without inspecting raw
//! statuses. Statuses the client does not understand land in `Unknown` with
//! the raw status and body for debugging. `Transport` is reserved for
//! failures below the HTTP layer and is never produced from a status code.

use thiserror::Error;

/// Errors returned by every client operation.
#[derive(Debug, Error)]
pub enum ApiError {
    /// 404: the requested resource (or a referenced parent) does not exist.
    #[error("resource not found")]
    NotFound,

    /// 409: a uniqueness constraint was violated.
    #[error("resource already exists")]
    AlreadyExists,

    /// 401 carrying `incorrect_password`, or a rejected login.
    #[error("incorrect password")]
    IncorrectPassword,

    /// 401: the access (or refresh) token is no longer accepted.
    #[error("token expired or invalid")]
    TokenExpired,

    /// 403: authenticated but not permitted.
    #[error("operation not allowed")]
    NotAllowed,

    /// 422: the server rejected one or more fields.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Any status outside the mapping table, or a response that breaks the
    /// server contract (e.g. a pagination link without a page number).
    #[error("unexpected response (HTTP {status}): {body}")]
    Unknown { status: u16, body: String },

    /// DNS, connection or timeout failure; no HTTP response was received.
    #[error("transport failure: {0}")]
    Transport(String),

    /// A 200 response body did not match the expected shape.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// A request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        ApiError::Transport(e.to_string())
    }
}
