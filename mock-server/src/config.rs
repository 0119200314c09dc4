use std::{env, time::Duration};

use axum::http::HeaderValue;
use thiserror::Error;
use tracing::info;

pub const ADDR_VAR: &str = "MOCK_SERVER_ADDR";
pub const ORIGINS_VAR: &str = "MOCK_SERVER_ORIGINS";
pub const SHUTDOWN_TIMEOUT_VAR: &str = "MOCK_SERVER_SHUTDOWN_TIMEOUT_SECS";

const ADDR_DEFAULT: &str = "localhost:8080";
const ORIGINS_DEFAULT: &str = "http://localhost:3000";
const SHUTDOWN_TIMEOUT_DEFAULT: &str = "60";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {key} value `{value}`: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone)]
pub struct Config {
    /// `host:port` to bind.
    pub addr: String,
    /// Origins allowed by CORS.
    pub origins: Vec<String>,
    /// Grace period for in-flight requests after a shutdown signal.
    pub shutdown_timeout: Duration,
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let addr = var_or(&lookup, ADDR_VAR, ADDR_DEFAULT);

        let raw_origins = var_or(&lookup, ORIGINS_VAR, ORIGINS_DEFAULT);
        let origins: Vec<String> = raw_origins
            .split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(str::to_string)
            .collect();
        for origin in &origins {
            HeaderValue::from_str(origin).map_err(|e| ConfigError::Invalid {
                key: ORIGINS_VAR,
                value: origin.clone(),
                reason: e.to_string(),
            })?;
        }

        let raw_timeout = var_or(&lookup, SHUTDOWN_TIMEOUT_VAR, SHUTDOWN_TIMEOUT_DEFAULT);
        let secs: u64 = raw_timeout.parse().map_err(|e: std::num::ParseIntError| ConfigError::Invalid {
            key: SHUTDOWN_TIMEOUT_VAR,
            value: raw_timeout.clone(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            addr,
            origins,
            shutdown_timeout: Duration::from_secs(secs),
        })
    }
}

fn var_or<F>(lookup: &F, key: &str, default: &str) -> String
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).filter(|v| !v.is_empty()).unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.addr, "localhost:8080");
        assert_eq!(config.origins, vec!["http://localhost:3000".to_string()]);
        assert_eq!(config.shutdown_timeout, Duration::from_secs(60));
    }

    #[test]
    fn origins_are_split_and_trimmed() {
        let config = Config::from_lookup(lookup(&[(
            ORIGINS_VAR,
            "http://localhost:3000, https://vital.example ,",
        )]))
        .unwrap();
        assert_eq!(
            config.origins,
            vec!["http://localhost:3000".to_string(), "https://vital.example".to_string()]
        );
    }

    #[test]
    fn bad_timeout_is_rejected() {
        let err = Config::from_lookup(lookup(&[(SHUTDOWN_TIMEOUT_VAR, "soon")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: SHUTDOWN_TIMEOUT_VAR, .. }));
    }

    #[test]
    fn bad_origin_is_rejected() {
        let err = Config::from_lookup(lookup(&[(ORIGINS_VAR, "http://bad\norigin")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: ORIGINS_VAR, .. }));
    }
}
