/// API endpoint configuration.
///
/// The base URL is resolved in order: explicit override, development
/// loopback, production internal service address.
use std::time::Duration;

use crate::error::{ClientError, Result};
use crate::operation::OperationKind;

/// Environment variable holding an explicit API base URL.
pub const API_URL_ENV: &str = "FILECRYPT_API_URL";
/// Environment variable selecting the deployment mode.
pub const MODE_ENV: &str = "FILECRYPT_ENV";

pub const DEVELOPMENT_API_URL: &str = "http://127.0.0.1:8000";
pub const PRODUCTION_API_URL: &str = "http://backend:8000";

/// Configuration for reaching the file API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// Origin of the API (e.g., "http://127.0.0.1:8000"), without trailing slash.
    pub base_url: String,
    /// Overall request timeout. `None` leaves it to the HTTP client.
    pub timeout: Option<Duration>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: PRODUCTION_API_URL.to_string(),
            timeout: None,
        }
    }
}

impl ApiConfig {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let base_url = normalize_base(base_url.into())?;
        Ok(Self {
            base_url,
            timeout: None,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Resolve from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(API_URL_ENV).filter(|u| !u.trim().is_empty()) {
            return Self::new(url);
        }

        let development = lookup(MODE_ENV)
            .map(|m| m.trim().eq_ignore_ascii_case("development"))
            .unwrap_or(false);

        if development {
            Self::new(DEVELOPMENT_API_URL)
        } else {
            Self::new(PRODUCTION_API_URL)
        }
    }

    /// Full URL of the endpoint for `kind`.
    pub fn endpoint(&self, kind: OperationKind) -> String {
        format!("{}/api/file/{}", self.base_url, kind.path_segment())
    }
}

fn normalize_base(url: String) -> Result<String> {
    let trimmed = url.trim().trim_end_matches('/');
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(ClientError::Config(format!(
            "API URL must start with http:// or https://, got {trimmed:?}"
        )));
    }
    Ok(trimmed.to_string())
}
