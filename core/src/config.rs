//! Runtime resolution of the backend base URL.
//!
//! The base URL is read from the process environment when the client is
//! configured, never captured at compile time, so one build can be deployed
//! against any backend. An empty value selects relative-path mode, where a
//! reverse proxy in front of the app maps `/api/*` to the backend.

use std::env;

use tracing::debug;

/// Environment variable holding the absolute backend URL.
pub const API_URL_VAR: &str = "PUBLIC_API_URL";

/// Read `PUBLIC_API_URL` from the current environment.
///
/// Returns the value verbatim when set and non-empty, otherwise `""`. A value
/// that is not valid unicode is treated as unset.
pub fn resolve_base_url() -> String {
    resolve_base_url_with(|key| env::var(key).ok())
}

/// Same rule as [`resolve_base_url`] over an arbitrary lookup.
pub fn resolve_base_url_with<F>(lookup: F) -> String
where
    F: FnOnce(&str) -> Option<String>,
{
    match lookup(API_URL_VAR) {
        Some(url) if !url.is_empty() => {
            debug!(base_url = %url, "{API_URL_VAR} set, using absolute requests");
            url
        }
        _ => {
            debug!("{API_URL_VAR} not set, using relative requests");
            String::new()
        }
    }
}

/// Client settings captured once at process start.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_base_url: String,
}

impl ClientConfig {
    pub fn new(api_base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: api_base_url.into(),
        }
    }

    pub fn from_env() -> Self {
        Self::new(resolve_base_url())
    }

    /// True when requests go out as same-origin relative paths.
    pub fn is_relative(&self) -> bool {
        self.api_base_url.is_empty()
    }
}
