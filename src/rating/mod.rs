//! Glicko-2 rating engine
//!
//! This module provides the statistical kernels, the volatility solver, the
//! per-competitor update procedure, storage interfaces and the competitor
//! registry that runs rating periods.

pub mod calculator;
pub mod kernels;
pub mod registry;
pub mod storage;
pub mod volatility;

// Re-export commonly used types
pub use calculator::{Glicko2Calculator, RatingCalculationResult, RatingCalculator};
pub use registry::{BatchReport, CompetitorRegistry};
pub use storage::{CompetitorStorage, InMemoryCompetitorStorage};
pub use volatility::{VolatilitySolution, VolatilitySolver};
