//! Request building and dispatch shared by every resource.
//!
//! # Design
//! `Client` holds the server root and a shared `Transport`, and carries no
//! authentication state. It knows how platform URLs are laid out
//! (`{base_url}/api/v1/{resource}/{path}`) and how to push a request through
//! the transport and the status mapping. Token handling lives one level up
//! in `Session`.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, ReqwestTransport, Transport};
use crate::status::{self, Operation};

/// Top-level REST collections exposed under `/api/v1/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Accounts,
    Projects,
    Sections,
    Sentences,
    Translations,
}

impl Resource {
    pub fn as_str(self) -> &'static str {
        match self {
            Resource::Accounts => "accounts",
            Resource::Projects => "projects",
            Resource::Sections => "sections",
            Resource::Sentences => "sentences",
            Resource::Translations => "translations",
        }
    }
}

/// Cheap to clone; clones share the underlying transport.
#[derive(Clone)]
pub struct Client {
    base_url: Arc<str>,
    transport: Arc<dyn Transport>,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client").field("base_url", &self.base_url).finish()
    }
}

impl Client {
    /// Client for `base_url` with default timeout and user agent.
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        Self::from_config(ClientConfig::new(base_url))
    }

    pub fn from_config(config: ClientConfig) -> Result<Self, ApiError> {
        let transport = ReqwestTransport::new(config.timeout, &config.user_agent)?;
        Ok(Self::with_transport(&config.base_url, Arc::new(transport)))
    }

    /// Client over a caller-supplied transport.
    pub fn with_transport(base_url: &str, transport: Arc<dyn Transport>) -> Self {
        Self {
            base_url: Arc::from(base_url.trim_end_matches('/')),
            transport,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `{base_url}/api/v1/{resource}/{path}`; an empty `path` yields the
    /// collection URL with its trailing slash.
    pub fn endpoint(&self, resource: Resource, path: &str) -> String {
        format!("{}/api/v1/{}/{}", self.base_url, resource.as_str(), path)
    }

    pub fn build(&self, method: HttpMethod, resource: Resource, path: &str) -> HttpRequest {
        HttpRequest::new(method, self.endpoint(resource, path))
    }

    /// One round trip, no interpretation of the status.
    pub async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        self.transport.execute(request).await
    }

    /// Round trip followed by the status mapping and payload decoding.
    pub async fn fetch<T: DeserializeOwned>(&self, request: HttpRequest, op: Operation) -> Result<T, ApiError> {
        let response = self.execute(request).await?;
        status::decode(response, op)
    }
}

/// Percent-encode `raw` for use as a single path segment.
pub(crate) fn path_segment(raw: &str) -> String {
    url::form_urlencoded::byte_serialize(raw.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

/// Serialize a request payload.
pub(crate) fn to_body<T: serde::Serialize>(value: &T) -> Result<Value, ApiError> {
    serde_json::to_value(value).map_err(|e| ApiError::Serialization(e.to_string()))
}
