//! Competitor registry
//!
//! The registry owns the competitors of one rating system and drives their
//! updates. Every competitor's new record depends only on its own record and
//! its own frozen match history, so a full run is a parallel map over the
//! roster with one write-back per competitor.

use crate::error::{RatingError, Result};
use crate::metrics::MetricsCollector;
use crate::rating::calculator::RatingCalculator;
use crate::rating::storage::{CompetitorStorage, InMemoryCompetitorStorage};
use crate::types::{Competitor, CompetitorId, MatchObservation, RatingChange, RatingRecord};
use chrono::Utc;
use rayon::prelude::*;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Outcome of updating every registered competitor
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Applied updates, ordered by competitor id
    pub changes: Vec<RatingChange>,
    /// Competitors whose update was rejected; their stored record is untouched
    pub failures: Vec<(CompetitorId, RatingError)>,
}

impl BatchReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn change_for(&self, id: &str) -> Option<&RatingChange> {
        self.changes.iter().find(|change| change.competitor_id == id)
    }

    pub fn failure_for(&self, id: &str) -> Option<&RatingError> {
        self.failures
            .iter()
            .find(|(competitor_id, _)| competitor_id == id)
            .map(|(_, error)| error)
    }
}

/// Keyed collection of competitors sharing one rating configuration
pub struct CompetitorRegistry {
    storage: Arc<dyn CompetitorStorage>,
    calculator: Arc<dyn RatingCalculator>,
    metrics: Option<MetricsCollector>,
}

impl CompetitorRegistry {
    /// Create an empty in-memory registry
    pub fn new(calculator: Arc<dyn RatingCalculator>) -> Self {
        Self::with_storage(Arc::new(InMemoryCompetitorStorage::new()), calculator)
    }

    /// Create a registry over an existing storage backend
    pub fn with_storage(
        storage: Arc<dyn CompetitorStorage>,
        calculator: Arc<dyn RatingCalculator>,
    ) -> Self {
        Self {
            storage,
            calculator,
            metrics: None,
        }
    }

    /// Create an in-memory registry preloaded with competitors
    pub fn from_competitors(
        competitors: impl IntoIterator<Item = Competitor>,
        calculator: Arc<dyn RatingCalculator>,
    ) -> Result<Self> {
        let registry = Self::new(calculator);
        for competitor in competitors {
            registry.add(competitor)?;
        }
        Ok(registry)
    }

    /// Record update outcomes into the given metrics collector
    pub fn with_metrics(mut self, metrics: MetricsCollector) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Insert a competitor, replacing any existing entry with the same id
    pub fn add(&self, competitor: Competitor) -> Result<()> {
        debug!(competitor = %competitor.id, "Adding competitor");
        self.storage.store_competitor(competitor)
    }

    /// Register a new competitor at the configured unrated defaults
    pub fn add_unrated(&self, id: impl Into<CompetitorId>) -> Result<()> {
        self.add(Competitor::with_rating(id, self.calculator.initial_rating()))
    }

    /// Append a match observation to a competitor's history
    pub fn add_match(&self, id: &str, observation: MatchObservation) -> Result<()> {
        observation.validate()?;
        self.storage.append_match(id, observation)
    }

    /// Record a game between two registered competitors.
    ///
    /// Both sides receive an observation holding the other's rating as it
    /// stands now; `score` is from `first`'s point of view.
    pub fn record_match(&self, first: &str, second: &str, score: f64) -> Result<()> {
        let first_rating = self.rating_of(first)?;
        let second_rating = self.rating_of(second)?;

        let forward = MatchObservation::new(second_rating, score).against(second);
        let backward = MatchObservation::new(first_rating, 1.0 - score).against(first);
        forward.validate()?;
        backward.validate()?;

        self.storage
            .append_matches(vec![(first.to_string(), forward), (second.to_string(), backward)])
    }

    /// Remove a competitor, returning whether it was registered
    pub fn remove(&self, id: &str) -> Result<bool> {
        debug!(competitor = %id, "Removing competitor");
        self.storage.remove_competitor(id)
    }

    /// Drop a competitor's accumulated matches, returning how many were removed
    pub fn clear_matches(&self, id: &str) -> Result<usize> {
        self.storage.clear_matches(id)
    }

    /// Snapshot of one competitor
    pub fn get(&self, id: &str) -> Result<Option<Competitor>> {
        self.storage.get_competitor(id)
    }

    /// Snapshot of every competitor, ordered by id
    pub fn get_all(&self) -> Result<Vec<Competitor>> {
        self.storage.get_all_competitors()
    }

    pub fn len(&self) -> Result<usize> {
        self.storage.competitor_count()
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Update a single competitor from its accumulated matches
    pub fn run(&self, id: &str) -> Result<RatingChange> {
        let competitor = self
            .storage
            .get_competitor(id)?
            .ok_or_else(|| RatingError::CompetitorNotFound {
                competitor_id: id.to_string(),
            })?;

        self.update(&competitor).inspect_err(|e| self.record_failure(id, e))
    }

    /// Update every registered competitor.
    ///
    /// A failure only affects the competitor it belongs to. The outer error
    /// is reserved for storage failures that prevent reading the roster.
    pub fn run_all(&self) -> Result<BatchReport> {
        let timer = self.metrics.as_ref().map(|m| m.start_timer());
        let competitors = self.storage.get_all_competitors()?;

        let outcomes: Vec<(CompetitorId, Result<RatingChange>)> = competitors
            .par_iter()
            .map(|competitor| (competitor.id.clone(), self.update(competitor)))
            .collect();

        let mut report = BatchReport::default();
        for (id, outcome) in outcomes {
            match outcome {
                Ok(change) => report.changes.push(change),
                Err(e) => {
                    self.record_failure(&id, &e);
                    report.failures.push((id, e));
                }
            }
        }

        if let (Some(metrics), Some(timer)) = (&self.metrics, timer) {
            metrics.record_batch(timer.stop());
        }

        info!(
            updated = report.changes.len(),
            failed = report.failures.len(),
            "Rating period complete"
        );

        Ok(report)
    }

    fn rating_of(&self, id: &str) -> Result<RatingRecord> {
        self.storage
            .get_competitor(id)?
            .map(|competitor| competitor.rating)
            .ok_or_else(|| RatingError::CompetitorNotFound {
                competitor_id: id.to_string(),
            })
    }

    /// Compute and write back one competitor's new record
    fn update(&self, competitor: &Competitor) -> Result<RatingChange> {
        let result = self
            .calculator
            .calculate(&competitor.rating, &competitor.matches)?;

        self.storage
            .store_rating(&competitor.id, result.new_rating)?;

        if let Some(metrics) = &self.metrics {
            metrics.record_update(result.solver_iterations);
        }

        debug!(
            competitor = %competitor.id,
            old = competitor.rating.rating,
            new = result.new_rating.rating,
            deviation = result.new_rating.deviation,
            "Competitor updated"
        );

        Ok(RatingChange {
            competitor_id: competitor.id.clone(),
            old_rating: competitor.rating,
            new_rating: result.new_rating,
            matches_played: competitor.matches.len(),
            updated_at: Utc::now(),
        })
    }

    fn record_failure(&self, id: &str, error: &RatingError) {
        warn!(competitor = %id, error = %error, "Rating update failed");
        if let Some(metrics) = &self.metrics {
            metrics.record_failure(error);
        }
    }
}

impl std::fmt::Debug for CompetitorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompetitorRegistry")
            .field("calculator", &self.calculator.config())
            .finish_non_exhaustive()
    }
}
