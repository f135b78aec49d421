//! Client configuration.

use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_USER_AGENT: &str = concat!("torjoman-core/", env!("CARGO_PKG_VERSION"));

/// Settings for building a `Client`.
///
/// | Variable | Default | Description |
/// |----------|---------|-------------|
/// | `TORJOMAN_BASE_URL` | `http://localhost:8000` | Server root, without `/api/v1` |
/// | `TORJOMAN_TIMEOUT_SECS` | `30` | Per-request timeout |
/// | `TORJOMAN_USER_AGENT` | `torjoman-core/<version>` | `User-Agent` header |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub user_agent: String,
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: normalize_base_url(base_url),
            ..Self::default()
        }
    }

    /// Populate config from environment variables, applying defaults where absent.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as `from_env`, reading variables through `lookup`.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let base_url = lookup("TORJOMAN_BASE_URL")
            .map(|v| normalize_base_url(&v))
            .unwrap_or(defaults.base_url);
        let timeout = lookup("TORJOMAN_TIMEOUT_SECS")
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.timeout);
        let user_agent = lookup("TORJOMAN_USER_AGENT").unwrap_or(defaults.user_agent);
        Self {
            base_url,
            timeout,
            user_agent,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

fn normalize_base_url(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_string()
}
