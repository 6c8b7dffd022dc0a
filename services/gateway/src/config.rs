use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;

/// Gateway configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// HS256 secret shared with the identity service
    pub jwt_secret: String,
    /// Capacity of the event broadcast channel feeding `/v1/ws`
    pub event_buffer: usize,
    pub notify_eligible_providers: bool,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let jwt_secret = lookup("JWT_SECRET").context("JWT_SECRET must be set")?;
        if jwt_secret.trim().is_empty() {
            anyhow::bail!("JWT_SECRET must not be empty");
        }

        Ok(Self {
            host: lookup("GATEWAY_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: lookup("GATEWAY_PORT")
                .unwrap_or_else(|| "8080".to_string())
                .parse()
                .context("GATEWAY_PORT must be a valid port number")?,
            jwt_secret,
            event_buffer: lookup("EVENT_BUFFER")
                .unwrap_or_else(|| "256".to_string())
                .parse()
                .context("EVENT_BUFFER must be a positive integer")
                .and_then(|n: usize| {
                    anyhow::ensure!(n > 0, "EVENT_BUFFER must be greater than zero");
                    Ok(n)
                })?,
            notify_eligible_providers: lookup("NOTIFY_ELIGIBLE_PROVIDERS")
                .unwrap_or_else(|| "true".to_string())
                .parse()
                .context("NOTIFY_ELIGIBLE_PROVIDERS must be true or false")?,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
