//! Client configuration structs
//!
//! Loads configuration from environment variables (with `.env` support).

use pulse_core::Intents;
use serde::Deserialize;
use std::env;

/// Top-level client configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    /// Authentication token forwarded in IDENTIFY and REST requests
    pub token: String,
    /// Gateway intents bitmask
    pub intents: Intents,
    /// Optional shard pair (shard id, shard count)
    pub shard: Option<(u32, u32)>,
    /// REST collaborator settings
    pub rest: RestConfig,
}

/// REST collaborator configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RestConfig {
    /// Base URL of the HTTP API, e.g. `https://discord.com/api/v10`
    #[serde(default = "default_api_base")]
    pub base_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_api_base() -> String {
    "https://discord.com/api/v10".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl ClientConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if required environment variables are missing or
    /// unparsable.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let token = env::var("PULSE_TOKEN").map_err(|_| ConfigError::MissingVar("PULSE_TOKEN"))?;

        let intents = match env::var("PULSE_INTENTS") {
            Ok(raw) => {
                let bits = raw
                    .parse::<u64>()
                    .map_err(|_| ConfigError::InvalidValue("PULSE_INTENTS", raw))?;
                Intents::from_bits_truncate(bits)
            }
            Err(_) => Intents::non_privileged(),
        };

        let shard = match (env::var("PULSE_SHARD_ID"), env::var("PULSE_SHARD_COUNT")) {
            (Ok(id), Ok(count)) => {
                let id = id
                    .parse::<u32>()
                    .map_err(|_| ConfigError::InvalidValue("PULSE_SHARD_ID", id.clone()))?;
                let count = count
                    .parse::<u32>()
                    .map_err(|_| ConfigError::InvalidValue("PULSE_SHARD_COUNT", count.clone()))?;
                Some((id, count))
            }
            _ => None,
        };

        Ok(Self {
            token,
            intents,
            shard,
            rest: RestConfig {
                base_url: env::var("PULSE_API_BASE").unwrap_or_else(|_| default_api_base()),
                timeout_secs: env::var("PULSE_REST_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_else(default_timeout_secs),
            },
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
