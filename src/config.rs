//! Configuration management with validation and defaults
//!
//! Loaded once at startup: defaults, then an optional TOML file, then
//! environment overrides for the secrets and the port.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Top-level application configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub game: GameConfig,
}

/// HTTP server configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub allowed_origins: Vec<String>,
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            allowed_origins: vec!["*".to_string()],
            request_timeout_secs: 30,
        }
    }
}

/// Payment provider credentials and currency
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub key_id: String,
    pub key_secret: String,
    pub currency: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            key_id: String::new(),
            key_secret: String::new(),
            currency: "INR".to_string(),
        }
    }
}

/// Game tuning parameters
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GameConfig {
    /// Entry fee in major currency units (rupees)
    pub entry_fee: u64,
    /// Points required per unit of payout
    pub points_per_unit: u64,
    pub initial_speed: f64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            entry_fee: 50,
            points_per_unit: 10,
            initial_speed: 5.0,
        }
    }
}

impl AppConfig {
    /// Load from a TOML file, if present, then apply environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(p) => {
                let raw = std::fs::read_to_string(p)
                    .map_err(|e| ConfigError::LoadFailed(format!("{}: {}", p.display(), e)))?;
                toml::from_str(&raw)
                    .map_err(|e| ConfigError::LoadFailed(format!("{}: {}", p.display(), e)))?
            }
            None => Self::default(),
        };
        config.apply_env();
        Ok(config)
    }

    /// Environment overrides: secrets never live in the TOML file
    fn apply_env(&mut self) {
        if let Ok(v) = std::env::var("PAYMENT_KEY_ID") {
            self.provider.key_id = v;
        }
        if let Ok(v) = std::env::var("PAYMENT_KEY_SECRET") {
            self.provider.key_secret = v;
        }
        if let Ok(v) = std::env::var("ARCADIA_PORT") {
            if let Ok(port) = v.parse() {
                self.server.port = port;
            }
        }
    }

    /// Validate configuration for logical consistency
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.provider.key_id.is_empty() {
            return Err(ConfigError::MissingRequired("provider.key_id".to_string()));
        }
        if self.provider.key_secret.is_empty() {
            return Err(ConfigError::MissingRequired(
                "provider.key_secret".to_string(),
            ));
        }
        if self.provider.currency.len() != 3 {
            return Err(ConfigError::InvalidValue(
                "provider.currency must be a 3-letter code".to_string(),
            ));
        }
        if self.game.entry_fee == 0 {
            return Err(ConfigError::InvalidValue(
                "game.entry_fee must be > 0".to_string(),
            ));
        }
        if self.game.points_per_unit == 0 {
            return Err(ConfigError::InvalidValue(
                "game.points_per_unit must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Configuration validation errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}
