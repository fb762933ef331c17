//! Glicko Keeper - Glicko-2 rating engine
//!
//! This crate computes Glicko-2 rating updates for competitors, manages a
//! registry of competitors and their match histories, and runs rating
//! periods across the whole registry in parallel.

pub mod config;
pub mod error;
pub mod metrics;
pub mod rating;
pub mod roster;
pub mod types;

// Re-export commonly used types and traits
pub use error::{RatingError, Result};
pub use types::*;

// Re-export key components
pub use config::Glicko2Config;
pub use rating::{CompetitorRegistry, Glicko2Calculator, RatingCalculator};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
