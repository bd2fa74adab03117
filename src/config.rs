use std::env;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::auth::DEFAULT_API_TOKEN;

/// Application configuration
#[derive(Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub api_token: String,
    pub request_timeout: Duration,
    pub rate_limit_per_minute: u32,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable lookup
    pub fn from_vars<F>(var: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = match var("PORT") {
            Some(port) => port.parse().context("PORT must be a valid number")?,
            None => 8000,
        };
        let timeout_secs: u64 = match var("REQUEST_TIMEOUT_SECS") {
            Some(secs) => secs
                .parse()
                .context("REQUEST_TIMEOUT_SECS must be a number of seconds")?,
            None => 30,
        };
        let rate_limit_per_minute = match var("RATE_LIMIT_PER_MINUTE") {
            Some(limit) => limit
                .parse()
                .context("RATE_LIMIT_PER_MINUTE must be a valid number")?,
            None => 20,
        };
        anyhow::ensure!(
            rate_limit_per_minute > 0,
            "RATE_LIMIT_PER_MINUTE must be greater than zero"
        );

        Ok(Self {
            host: var("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            log_level: var("RUST_LOG")
                .unwrap_or_else(|| "risk_lists_svc=info,tower_http=debug".to_string()),
            api_token: var("API_TOKEN").unwrap_or_else(|| DEFAULT_API_TOKEN.to_string()),
            request_timeout: Duration::from_secs(timeout_secs),
            rate_limit_per_minute,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

// Keeps the token out of startup logs
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("log_level", &self.log_level)
            .field("api_token", &"***")
            .field("request_timeout", &self.request_timeout)
            .field("rate_limit_per_minute", &self.rate_limit_per_minute)
            .finish()
    }
}
