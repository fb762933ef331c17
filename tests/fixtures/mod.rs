//! Test fixtures and mock implementations for integration testing

use glicko_keeper::error::Result;
use glicko_keeper::rating::storage::{CompetitorStorage, InMemoryCompetitorStorage};
use glicko_keeper::types::{Competitor, MatchObservation, RatingRecord};
use std::collections::HashMap;
use std::sync::Mutex;

/// Storage wrapper that records every rating write-back
#[derive(Debug, Default)]
pub struct RecordingStorage {
    inner: InMemoryCompetitorStorage,
    rating_writes: Mutex<Vec<(String, RatingRecord)>>,
}

impl RecordingStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all rating writes made (for testing)
    pub fn rating_writes(&self) -> Vec<(String, RatingRecord)> {
        self.rating_writes
            .lock()
            .map(|writes| writes.clone())
            .unwrap_or_default()
    }

    /// Number of rating writes per competitor
    pub fn writes_per_competitor(&self) -> HashMap<String, usize> {
        let mut counts = HashMap::new();
        for (id, _) in self.rating_writes() {
            *counts.entry(id).or_insert(0) += 1;
        }
        counts
    }
}

impl CompetitorStorage for RecordingStorage {
    fn get_competitor(&self, id: &str) -> Result<Option<Competitor>> {
        self.inner.get_competitor(id)
    }

    fn store_competitor(&self, competitor: Competitor) -> Result<()> {
        self.inner.store_competitor(competitor)
    }

    fn get_all_competitors(&self) -> Result<Vec<Competitor>> {
        self.inner.get_all_competitors()
    }

    fn store_rating(&self, id: &str, rating: RatingRecord) -> Result<()> {
        if let Ok(mut writes) = self.rating_writes.lock() {
            writes.push((id.to_string(), rating));
        }
        self.inner.store_rating(id, rating)
    }

    fn append_match(&self, id: &str, observation: MatchObservation) -> Result<()> {
        self.inner.append_match(id, observation)
    }

    fn append_matches(&self, observations: Vec<(String, MatchObservation)>) -> Result<()> {
        self.inner.append_matches(observations)
    }

    fn clear_matches(&self, id: &str) -> Result<usize> {
        self.inner.clear_matches(id)
    }

    fn remove_competitor(&self, id: &str) -> Result<bool> {
        self.inner.remove_competitor(id)
    }

    fn competitor_count(&self) -> Result<usize> {
        self.inner.competitor_count()
    }
}

/// Subject of the canonical Glicko-2 worked example
pub fn reference_subject() -> RatingRecord {
    RatingRecord::new(1500.0, 200.0, 0.06)
}

/// Matches of the canonical Glicko-2 worked example
pub fn reference_matches() -> Vec<MatchObservation> {
    vec![
        MatchObservation::win(RatingRecord::new(1400.0, 30.0, 0.06)),
        MatchObservation::loss(RatingRecord::new(1550.0, 100.0, 0.06)),
        MatchObservation::loss(RatingRecord::new(1700.0, 300.0, 0.06)),
    ]
}
