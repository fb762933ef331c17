//! Volatility solver
//!
//! The new volatility is `exp(x / 2)` where `x` is the root of
//!
//! ```text
//! f(x) = e^x (delta^2 - phi^2 - v - e^x) / (2 (phi^2 + v + e^x)^2) - (x - a) / tau^2
//! ```
//!
//! with `a = ln(sigma^2)`. The root is found with regula falsi using the
//! Illinois modification: whenever the same bracket end is kept twice in a
//! row its function value is halved, which stops the retained end from
//! stalling convergence.

use crate::config::Glicko2Config;
use crate::error::{RatingError, Result};
use tracing::trace;

/// Converged volatility and the work it took to get there
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolatilitySolution {
    pub volatility: f64,
    pub iterations: usize,
}

/// Bounded Illinois root finder for the Glicko-2 volatility equation
#[derive(Debug, Clone)]
pub struct VolatilitySolver {
    tau: f64,
    epsilon: f64,
    max_iterations: usize,
    max_bracket_steps: usize,
}

impl VolatilitySolver {
    pub fn new(config: &Glicko2Config) -> Self {
        Self {
            tau: config.tau,
            epsilon: config.convergence_tolerance,
            max_iterations: config.max_iterations,
            max_bracket_steps: config.max_bracket_steps,
        }
    }

    /// Solve for the new volatility.
    ///
    /// `phi` is the pre-period deviation on the internal scale, `sigma` the
    /// current volatility, `v` the estimated variance and `delta` the
    /// estimated improvement for this rating period.
    pub fn solve(&self, phi: f64, sigma: f64, v: f64, delta: f64) -> Result<VolatilitySolution> {
        let tau = self.tau;
        let a = (sigma * sigma).ln();
        let phi_sq = phi * phi;
        let delta_sq = delta * delta;

        let f = |x: f64| -> f64 {
            let ex = x.exp();
            let denom = phi_sq + v + ex;
            ex * (delta_sq - phi_sq - v - ex) / (2.0 * denom * denom) - (x - a) / (tau * tau)
        };

        let mut big_a = a;
        let mut big_b = if delta_sq > phi_sq + v {
            (delta_sq - phi_sq - v).ln()
        } else {
            self.lower_bracket(a, &f)?
        };

        let mut f_a = f(big_a);
        let mut f_b = f(big_b);
        let mut iterations = 0;

        while (big_b - big_a).abs() > self.epsilon {
            if iterations >= self.max_iterations {
                return Err(RatingError::NonConvergence { iterations });
            }
            iterations += 1;

            let big_c = big_a + (big_a - big_b) * f_a / (f_b - f_a);
            if !big_c.is_finite() {
                return Err(RatingError::NonConvergence { iterations });
            }
            let f_c = f(big_c);

            // Landing on the root exactly would freeze both ends
            if f_c == 0.0 {
                big_a = big_c;
                trace!(iterations, root = big_c, "Illinois step hit the root");
                break;
            }

            if f_c * f_b < 0.0 {
                big_a = big_b;
                f_a = f_b;
            } else {
                f_a /= 2.0;
            }

            big_b = big_c;
            f_b = f_c;

            trace!(iterations, a = big_a, b = big_b, "Illinois step");
        }

        Ok(VolatilitySolution {
            volatility: (big_a / 2.0).exp(),
            iterations,
        })
    }

    /// Step down from `a` in multiples of tau until `f` is non-negative
    fn lower_bracket(&self, a: f64, f: &impl Fn(f64) -> f64) -> Result<f64> {
        (1..=self.max_bracket_steps)
            .map(|k| a - k as f64 * self.tau)
            .find(|&x| f(x) >= 0.0)
            .ok_or(RatingError::BracketSearchExhausted {
                steps: self.max_bracket_steps,
            })
    }
}
