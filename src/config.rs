//! Application configuration management.
//!
//! This module handles loading configuration from environment variables.
//! It uses the `envy` crate to automatically deserialize environment variables into a type-safe struct.

use serde::Deserialize;

/// Application configuration loaded from environment variables.
///
/// # Environment Variables
///
/// - `SERVER_PORT` (optional): HTTP server port, defaults to 3000
/// - `TOKEN_SECRETS` (optional): comma-separated signing secrets. The first
///   entry signs newly issued tokens; every entry is accepted during
///   validation, which gives old tokens a grace window during key rotation.
/// - `TOKEN_TTL_SECS` (optional): token lifetime, defaults to 86400 (24h)
/// - `RATE_WINDOW_SECS` (optional): rate limit window, defaults to 60
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_port")]
    pub server_port: u16,

    #[serde(default = "default_secrets")]
    pub token_secrets: String,

    #[serde(default = "default_token_ttl_secs")]
    pub token_ttl_secs: i64,

    #[serde(default = "default_rate_window_secs")]
    pub rate_window_secs: u64,
}

/// Default port if SERVER_PORT environment variable is not set.
fn default_port() -> u16 {
    3000
}

/// Development fallback secret. Production deployments must set TOKEN_SECRETS.
fn default_secrets() -> String {
    "dev-only-signing-secret-change-me".to_string()
}

fn default_token_ttl_secs() -> i64 {
    86_400
}

fn default_rate_window_secs() -> u64 {
    60
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// This method first attempts to load a `.env` file (which is optional),
    /// then reads environment variables and deserializes them into a Config struct.
    ///
    /// # Errors
    ///
    /// Returns an error if environment variable values cannot be parsed into
    /// the expected types.
    pub fn from_env() -> Result<Self, envy::Error> {
        // Try to load .env file if it exists (does nothing if not found)
        dotenvy::dotenv().ok();

        // Parse environment variables into Config struct
        // Field names are automatically converted: server_port -> SERVER_PORT
        envy::from_env::<Config>()
    }

    /// Split TOKEN_SECRETS into the ordered trusted key set.
    ///
    /// Empty entries are skipped so trailing commas are harmless.
    pub fn secret_set(&self) -> Vec<Vec<u8>> {
        self.token_secrets
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| s.as_bytes().to_vec())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secret_set_splits_and_trims() {
        let config = Config {
            server_port: 3000,
            token_secrets: "new-key, old-key,".to_string(),
            token_ttl_secs: 86_400,
            rate_window_secs: 60,
        };

        let set = config.secret_set();
        assert_eq!(set.len(), 2);
        assert_eq!(set[0], b"new-key");
        assert_eq!(set[1], b"old-key");
    }
}
