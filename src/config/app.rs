//! Main application configuration
//!
//! This module defines the top-level configuration for the glicko-keeper
//! binary, including environment variable loading, TOML file loading and
//! validation.

use crate::config::rating::Glicko2Config;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub service: ServiceSettings,
    pub rating: Glicko2Config,
}

/// Process-level settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceSettings {
    /// Name used in log output
    pub name: String,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            name: "glicko-keeper".to_string(),
            log_level: "info".to_string(),
        }
    }
}

fn parse_env<T: std::str::FromStr>(key: &str) -> Result<Option<T>> {
    match env::var(key) {
        Ok(value) => value
            .parse()
            .map(Some)
            .map_err(|_| anyhow!("Invalid {} value: {}", key, value)),
        Err(_) => Ok(None),
    }
}

impl AppConfig {
    /// Load configuration from environment variables with fallback to defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env()?;
        validate_config(&config)?;
        Ok(config)
    }

    /// Load configuration from a TOML file; environment variables still win
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let mut config: AppConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        config.apply_env()?;
        validate_config(&config)?;
        Ok(config)
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(name) = env::var("SERVICE_NAME") {
            self.service.name = name;
        }
        if let Ok(log_level) = env::var("LOG_LEVEL") {
            self.service.log_level = log_level;
        }

        if let Some(tau) = parse_env("GLICKO_TAU")? {
            self.rating.tau = tau;
        }
        if let Some(tolerance) = parse_env("GLICKO_CONVERGENCE_TOLERANCE")? {
            self.rating.convergence_tolerance = tolerance;
        }
        if let Some(iterations) = parse_env("GLICKO_MAX_ITERATIONS")? {
            self.rating.max_iterations = iterations;
        }
        if let Some(steps) = parse_env("GLICKO_MAX_BRACKET_STEPS")? {
            self.rating.max_bracket_steps = steps;
        }
        if let Some(rating) = parse_env("GLICKO_DEFAULT_RATING")? {
            self.rating.default_rating = rating;
        }
        if let Some(deviation) = parse_env("GLICKO_DEFAULT_DEVIATION")? {
            self.rating.default_deviation = deviation;
        }
        if let Some(volatility) = parse_env("GLICKO_DEFAULT_VOLATILITY")? {
            self.rating.default_volatility = volatility;
        }

        Ok(())
    }
}

/// Validate configuration values
pub fn validate_config(config: &AppConfig) -> Result<()> {
    match config.service.log_level.to_lowercase().as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => {}
        _ => return Err(anyhow!("Invalid log level: {}", config.service.log_level)),
    }

    config.rating.validate()?;

    Ok(())
}
