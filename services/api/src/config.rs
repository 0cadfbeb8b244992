//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub log_level: Level,
    /// Credential for the generative AI endpoints. Required: a missing key is
    /// a fatal startup precondition, never a silent degradation.
    pub gemini_api_key: String,
    /// Optional override for the OpenAI-compatible API base URL.
    pub api_base: Option<String>,
    pub analysis_model: String,
    pub image_model: String,
    /// Upper bound on each remote call, in seconds.
    pub request_timeout_secs: u64,
    /// Access-gate credentials. Both set enables the gate; both unset
    /// disables it.
    pub access_username: Option<String>,
    pub access_password: Option<String>,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        // --- Load Server Settings ---
        let bind_address_str =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let bind_address = bind_address_str
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string()))?;

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        // --- Load API Credential and Endpoint Settings ---
        let gemini_api_key = std::env::var("GEMINI_API_KEY")
            .map_err(|_| ConfigError::MissingVar("GEMINI_API_KEY".to_string()))?;

        let api_base = std::env::var("API_BASE").ok();

        let analysis_model = std::env::var("ANALYSIS_MODEL")
            .unwrap_or_else(|_| "gemini-2.0-flash".to_string());
        let image_model = std::env::var("IMAGE_MODEL")
            .unwrap_or_else(|_| "imagen-3.0-generate-002".to_string());

        let timeout_str =
            std::env::var("REQUEST_TIMEOUT_SECS").unwrap_or_else(|_| "60".to_string());
        let request_timeout_secs = timeout_str.parse::<u64>().map_err(|e| {
            ConfigError::InvalidValue("REQUEST_TIMEOUT_SECS".to_string(), e.to_string())
        })?;

        // --- Load Access Gate Settings (both-or-neither) ---
        let access_username = std::env::var("ACCESS_USERNAME").ok();
        let access_password = std::env::var("ACCESS_PASSWORD").ok();
        if access_username.is_some() != access_password.is_some() {
            return Err(ConfigError::InvalidValue(
                "ACCESS_USERNAME/ACCESS_PASSWORD".to_string(),
                "both must be set to enable the access gate".to_string(),
            ));
        }

        Ok(Self {
            bind_address,
            log_level,
            gemini_api_key,
            api_base,
            analysis_model,
            image_model,
            request_timeout_secs,
            access_username,
            access_password,
        })
    }

    /// True when the optional username/password gate is configured.
    pub fn access_gate_enabled(&self) -> bool {
        self.access_username.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Environment variables are process-global, so all the cases run inside
    // one test to avoid interference from parallel execution.
    #[test]
    fn from_env_loads_defaults_and_validates() {
        std::env::remove_var("BIND_ADDRESS");
        std::env::remove_var("RUST_LOG");
        std::env::remove_var("API_BASE");
        std::env::remove_var("REQUEST_TIMEOUT_SECS");
        std::env::remove_var("ACCESS_USERNAME");
        std::env::remove_var("ACCESS_PASSWORD");

        // Missing credential is a hard error.
        std::env::remove_var("GEMINI_API_KEY");
        assert!(matches!(
            Config::from_env(),
            Err(ConfigError::MissingVar(var)) if var == "GEMINI_API_KEY"
        ));

        std::env::set_var("GEMINI_API_KEY", "test-key");
        let config = Config::from_env().expect("config should load");
        assert_eq!(config.bind_address.port(), 3000);
        assert_eq!(config.request_timeout_secs, 60);
        assert_eq!(config.analysis_model, "gemini-2.0-flash");
        assert!(!config.access_gate_enabled());

        // Half-configured gate is rejected.
        std::env::set_var("ACCESS_USERNAME", "studio");
        assert!(matches!(
            Config::from_env(),
            Err(ConfigError::InvalidValue(_, _))
        ));

        std::env::set_var("ACCESS_PASSWORD", "secret");
        let config = Config::from_env().expect("config should load with full gate");
        assert!(config.access_gate_enabled());

        std::env::remove_var("ACCESS_USERNAME");
        std::env::remove_var("ACCESS_PASSWORD");
        std::env::remove_var("GEMINI_API_KEY");
    }
}
