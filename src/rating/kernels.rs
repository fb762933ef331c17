//! Glicko-2 statistical kernels and scale conversion
//!
//! Ratings are stored on the familiar Glicko scale (centered on 1500) and
//! converted to the internal Glicko-2 scale for every computation.

use std::f64::consts::PI;

/// 400 / ln(10), the factor between the two rating scales
pub const SCALE: f64 = 173.7178;

/// Center of the rating scale
pub const RATING_CENTER: f64 = 1500.0;

/// Rating to internal `mu`
pub fn to_mu(rating: f64) -> f64 {
    (rating - RATING_CENTER) / SCALE
}

/// Rating deviation to internal `phi`
pub fn to_phi(deviation: f64) -> f64 {
    deviation / SCALE
}

/// Internal `mu` back to a rating
pub fn from_mu(mu: f64) -> f64 {
    SCALE * mu + RATING_CENTER
}

/// Internal `phi` back to a rating deviation
pub fn from_phi(phi: f64) -> f64 {
    SCALE * phi
}

/// Information weight of an opponent with deviation `phi`.
///
/// In (0, 1] and decreasing: uncertain opponents count for less.
pub fn g(phi: f64) -> f64 {
    1.0 / (1.0 + 3.0 * phi * phi / (PI * PI)).sqrt()
}

/// Expected score of a player at `mu` against an opponent at `(mu_j, phi_j)`
pub fn expected_score(mu: f64, mu_j: f64, phi_j: f64) -> f64 {
    1.0 / (1.0 + (-g(phi_j) * (mu - mu_j)).exp())
}
