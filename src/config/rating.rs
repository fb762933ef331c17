//! Glicko-2 system configuration

use crate::error::{RatingError, Result};
use crate::types::{RatingRecord, DEFAULT_DEVIATION, DEFAULT_RATING, DEFAULT_VOLATILITY};
use serde::{Deserialize, Serialize};

/// System-wide parameters of the Glicko-2 model.
///
/// `tau` constrains how fast volatility may change between rating periods.
/// Recommended values are in the range 0.3 to 1.2; lower values make
/// volatility more resistant to change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Glicko2Config {
    pub tau: f64,
    /// Stop the volatility solve once the bracket is narrower than this
    pub convergence_tolerance: f64,
    /// Hard cap on Illinois iterations
    pub max_iterations: usize,
    /// Hard cap on the downward search for the lower bracket bound
    pub max_bracket_steps: usize,
    pub default_rating: f64,
    pub default_deviation: f64,
    pub default_volatility: f64,
}

impl Default for Glicko2Config {
    fn default() -> Self {
        Self {
            tau: 0.6,
            convergence_tolerance: 0.000_001,
            max_iterations: 100,
            max_bracket_steps: 100,
            default_rating: DEFAULT_RATING,
            default_deviation: DEFAULT_DEVIATION,
            default_volatility: DEFAULT_VOLATILITY,
        }
    }
}

impl Glicko2Config {
    /// Default configuration with a custom system constant
    pub fn with_tau(tau: f64) -> Self {
        Self {
            tau,
            ..Self::default()
        }
    }

    /// Volatility resists change between periods
    pub fn conservative() -> Self {
        Self::with_tau(0.3)
    }

    /// Volatility adapts quickly to surprising results
    pub fn aggressive() -> Self {
        Self::with_tau(1.2)
    }

    /// Starting record for competitors added without explicit state
    pub fn unrated(&self) -> RatingRecord {
        RatingRecord::new(
            self.default_rating,
            self.default_deviation,
            self.default_volatility,
        )
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        if !(self.tau.is_finite() && self.tau > 0.0) {
            return Err(RatingError::ConfigurationError {
                message: "Tau must be positive".to_string(),
            });
        }

        if !(self.convergence_tolerance.is_finite() && self.convergence_tolerance > 0.0) {
            return Err(RatingError::ConfigurationError {
                message: "Convergence tolerance must be positive".to_string(),
            });
        }

        if self.max_iterations == 0 {
            return Err(RatingError::ConfigurationError {
                message: "Max iterations must be greater than 0".to_string(),
            });
        }

        if self.max_bracket_steps == 0 {
            return Err(RatingError::ConfigurationError {
                message: "Max bracket steps must be greater than 0".to_string(),
            });
        }

        self.unrated()
            .validate()
            .map_err(|e| RatingError::ConfigurationError {
                message: format!("Invalid unrated defaults: {}", e),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Glicko2Config::default();
        assert_eq!(config.tau, 0.6);
        assert_eq!(config.convergence_tolerance, 1e-6);
        assert_eq!(config.unrated(), RatingRecord::unrated());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = Glicko2Config::default();

        config.tau = 0.0;
        assert!(config.validate().is_err());

        config = Glicko2Config::default();
        config.convergence_tolerance = -1.0;
        assert!(config.validate().is_err());

        config = Glicko2Config::default();
        config.max_iterations = 0;
        assert!(config.validate().is_err());

        config = Glicko2Config::default();
        config.max_bracket_steps = 0;
        assert!(config.validate().is_err());

        config = Glicko2Config::default();
        config.default_volatility = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_presets() {
        let conservative = Glicko2Config::conservative();
        let aggressive = Glicko2Config::aggressive();
        let default = Glicko2Config::default();

        assert!(conservative.tau < default.tau);
        assert!(aggressive.tau > default.tau);

        assert!(conservative.validate().is_ok());
        assert!(aggressive.validate().is_ok());
    }

    #[test]
    fn test_partial_toml() {
        let config: Glicko2Config = toml::from_str("tau = 0.5").unwrap();
        assert_eq!(config.tau, 0.5);
        assert_eq!(config.max_iterations, 100);
    }
}
