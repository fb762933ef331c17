//! Rating calculator trait and the Glicko-2 implementation
//!
//! A calculator turns a competitor's current record plus the matches of one
//! rating period into a new record. It holds no mutable state, so a single
//! instance can be shared across threads for batch updates.

use crate::config::Glicko2Config;
use crate::error::{RatingError, Result};
use crate::rating::kernels::{expected_score, from_mu, from_phi, g, to_mu, to_phi};
use crate::rating::volatility::VolatilitySolver;
use crate::types::{MatchObservation, RatingRecord};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Result of a rating calculation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatingCalculationResult {
    pub new_rating: RatingRecord,
    /// Illinois iterations spent on the volatility solve (0 when no matches)
    pub solver_iterations: usize,
}

/// Trait for calculating a competitor's rating after a rating period
pub trait RatingCalculator: Send + Sync {
    /// Calculate the new rating from the current one and this period's matches
    ///
    /// # Arguments
    /// * `current` - Rating record at the start of the period
    /// * `matches` - Outcomes against frozen opponent snapshots
    fn calculate(
        &self,
        current: &RatingRecord,
        matches: &[MatchObservation],
    ) -> Result<RatingCalculationResult>;

    /// Get the initial rating for new competitors
    fn initial_rating(&self) -> RatingRecord;

    /// Get current configuration as JSON
    fn config(&self) -> serde_json::Value;
}

/// Glicko-2 rating calculator
#[derive(Debug, Clone)]
pub struct Glicko2Calculator {
    config: Glicko2Config,
    solver: VolatilitySolver,
}

impl Default for Glicko2Calculator {
    fn default() -> Self {
        let config = Glicko2Config::default();
        Self {
            solver: VolatilitySolver::new(&config),
            config,
        }
    }
}

impl Glicko2Calculator {
    /// Create a new Glicko-2 calculator
    pub fn new(config: Glicko2Config) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            solver: VolatilitySolver::new(&config),
            config,
        })
    }

    pub fn tau(&self) -> f64 {
        self.config.tau
    }

    /// Win probability of `player` against `opponent`
    pub fn expected_score(&self, player: &RatingRecord, opponent: &RatingRecord) -> f64 {
        expected_score(
            to_mu(player.rating),
            to_mu(opponent.rating),
            to_phi(opponent.deviation),
        )
    }

    /// Deviation growth over a period without games
    fn inactive(&self, current: &RatingRecord) -> RatingCalculationResult {
        let phi = to_phi(current.deviation);
        let phi_prime = (phi * phi + current.volatility * current.volatility).sqrt();

        RatingCalculationResult {
            new_rating: RatingRecord::new(current.rating, from_phi(phi_prime), current.volatility),
            solver_iterations: 0,
        }
    }
}

impl RatingCalculator for Glicko2Calculator {
    fn calculate(
        &self,
        current: &RatingRecord,
        matches: &[MatchObservation],
    ) -> Result<RatingCalculationResult> {
        current.validate()?;
        for observation in matches {
            observation.validate()?;
        }

        if matches.is_empty() {
            return Ok(self.inactive(current));
        }

        let mu = to_mu(current.rating);
        let phi = to_phi(current.deviation);

        let mut information = 0.0;
        let mut improvement = 0.0;
        for observation in matches {
            let mu_j = to_mu(observation.opponent.rating);
            let phi_j = to_phi(observation.opponent.deviation);
            let g_j = g(phi_j);
            let e_j = expected_score(mu, mu_j, phi_j);

            information += g_j * g_j * e_j * (1.0 - e_j);
            improvement += g_j * (observation.score - e_j);
        }

        if !(information.is_finite() && information > 0.0) {
            return Err(RatingError::DegenerateVariance { information });
        }

        let v = 1.0 / information;
        let delta = v * improvement;

        let solution = self.solver.solve(phi, current.volatility, v, delta)?;
        let sigma_prime = solution.volatility;

        let phi_star = (phi * phi + sigma_prime * sigma_prime).sqrt();
        let phi_prime = 1.0 / (1.0 / (phi_star * phi_star) + 1.0 / v).sqrt();
        let mu_prime = mu + phi_prime * phi_prime * improvement;

        debug!(
            matches = matches.len(),
            v,
            delta,
            iterations = solution.iterations,
            "Glicko-2 update"
        );

        Ok(RatingCalculationResult {
            new_rating: RatingRecord::new(from_mu(mu_prime), from_phi(phi_prime), sigma_prime),
            solver_iterations: solution.iterations,
        })
    }

    fn initial_rating(&self) -> RatingRecord {
        self.config.unrated()
    }

    fn config(&self) -> serde_json::Value {
        serde_json::to_value(&self.config).unwrap_or(serde_json::Value::Null)
    }
}
