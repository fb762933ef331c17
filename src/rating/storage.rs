//! Competitor storage interface and the in-memory implementation
//!
//! Storage hands out cloned snapshots only. Match histories can change
//! solely through [`CompetitorStorage::append_match`],
//! [`CompetitorStorage::append_matches`] and
//! [`CompetitorStorage::clear_matches`], and ratings only through
//! [`CompetitorStorage::store_rating`].

use crate::error::{RatingError, Result};
use crate::types::{Competitor, CompetitorId, MatchObservation, RatingRecord};
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Trait for competitor storage operations
pub trait CompetitorStorage: Send + Sync {
    /// Get a competitor snapshot
    fn get_competitor(&self, id: &str) -> Result<Option<Competitor>>;

    /// Insert a competitor, replacing any existing entry with the same id
    fn store_competitor(&self, competitor: Competitor) -> Result<()>;

    /// Snapshot of every competitor, ordered by id
    fn get_all_competitors(&self) -> Result<Vec<Competitor>>;

    /// Replace a competitor's rating record, leaving its matches untouched
    fn store_rating(&self, id: &str, rating: RatingRecord) -> Result<()>;

    /// Append one observation to a competitor's match history
    fn append_match(&self, id: &str, observation: MatchObservation) -> Result<()>;

    /// Append several observations at once. Either every target exists and
    /// all are appended, or nothing changes.
    fn append_matches(&self, observations: Vec<(CompetitorId, MatchObservation)>) -> Result<()>;

    /// Drop a competitor's match history, returning how many were removed
    fn clear_matches(&self, id: &str) -> Result<usize>;

    /// Remove a competitor entirely
    fn remove_competitor(&self, id: &str) -> Result<bool>;

    /// Get total number of competitors
    fn competitor_count(&self) -> Result<usize>;
}

/// In-memory competitor storage
#[derive(Debug, Default)]
pub struct InMemoryCompetitorStorage {
    competitors: RwLock<HashMap<CompetitorId, Competitor>>,
}

impl InMemoryCompetitorStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<CompetitorId, Competitor>>> {
        self.competitors.read().map_err(|_| RatingError::Internal {
            message: "Failed to acquire competitors read lock".to_string(),
        })
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<CompetitorId, Competitor>>> {
        self.competitors.write().map_err(|_| RatingError::Internal {
            message: "Failed to acquire competitors write lock".to_string(),
        })
    }
}

fn not_found(id: &str) -> RatingError {
    RatingError::CompetitorNotFound {
        competitor_id: id.to_string(),
    }
}

impl CompetitorStorage for InMemoryCompetitorStorage {
    fn get_competitor(&self, id: &str) -> Result<Option<Competitor>> {
        Ok(self.read()?.get(id).cloned())
    }

    fn store_competitor(&self, competitor: Competitor) -> Result<()> {
        self.write()?.insert(competitor.id.clone(), competitor);
        Ok(())
    }

    fn get_all_competitors(&self) -> Result<Vec<Competitor>> {
        let mut competitors: Vec<Competitor> = self.read()?.values().cloned().collect();
        competitors.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(competitors)
    }

    fn store_rating(&self, id: &str, rating: RatingRecord) -> Result<()> {
        let mut competitors = self.write()?;
        let competitor = competitors.get_mut(id).ok_or_else(|| not_found(id))?;
        competitor.rating = rating;
        Ok(())
    }

    fn append_match(&self, id: &str, observation: MatchObservation) -> Result<()> {
        let mut competitors = self.write()?;
        let competitor = competitors.get_mut(id).ok_or_else(|| not_found(id))?;
        competitor.add_match(observation);
        Ok(())
    }

    fn append_matches(&self, observations: Vec<(CompetitorId, MatchObservation)>) -> Result<()> {
        let mut competitors = self.write()?;
        if let Some((id, _)) = observations
            .iter()
            .find(|(id, _)| !competitors.contains_key(id))
        {
            return Err(not_found(id));
        }

        for (id, observation) in observations {
            if let Some(competitor) = competitors.get_mut(&id) {
                competitor.add_match(observation);
            }
        }
        Ok(())
    }

    fn clear_matches(&self, id: &str) -> Result<usize> {
        let mut competitors = self.write()?;
        let competitor = competitors.get_mut(id).ok_or_else(|| not_found(id))?;
        Ok(std::mem::take(&mut competitor.matches).len())
    }

    fn remove_competitor(&self, id: &str) -> Result<bool> {
        Ok(self.write()?.remove(id).is_some())
    }

    fn competitor_count(&self) -> Result<usize> {
        Ok(self.read()?.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn competitor(id: &str, rating: f64) -> Competitor {
        Competitor::with_rating(id, RatingRecord::new(rating, 200.0, 0.06))
    }

    #[test]
    fn test_basic_operations() {
        let storage = InMemoryCompetitorStorage::new();

        assert!(storage.get_competitor("alice").unwrap().is_none());

        storage.store_competitor(competitor("alice", 1500.0)).unwrap();

        let retrieved = storage.get_competitor("alice").unwrap().unwrap();
        assert_eq!(retrieved.id, "alice");
        assert_eq!(retrieved.rating.rating, 1500.0);
        assert_eq!(storage.competitor_count().unwrap(), 1);
    }

    #[test]
    fn test_store_overwrites() {
        let storage = InMemoryCompetitorStorage::new();

        let mut first = competitor("alice", 1500.0);
        first.add_match(MatchObservation::win(RatingRecord::unrated()));
        storage.store_competitor(first).unwrap();
        storage.store_competitor(competitor("alice", 1700.0)).unwrap();

        let stored = storage.get_competitor("alice").unwrap().unwrap();
        assert_eq!(stored.rating.rating, 1700.0);
        assert!(stored.matches.is_empty());
        assert_eq!(storage.competitor_count().unwrap(), 1);
    }

    #[test]
    fn test_snapshots_are_detached() {
        let storage = InMemoryCompetitorStorage::new();
        storage.store_competitor(competitor("alice", 1500.0)).unwrap();

        let mut snapshot = storage.get_competitor("alice").unwrap().unwrap();
        snapshot.add_match(MatchObservation::loss(RatingRecord::unrated()));
        snapshot.rating.rating = 0.0;

        let stored = storage.get_competitor("alice").unwrap().unwrap();
        assert!(stored.matches.is_empty());
        assert_eq!(stored.rating.rating, 1500.0);
    }

    #[test]
    fn test_match_history_operations() {
        let storage = InMemoryCompetitorStorage::new();
        storage.store_competitor(competitor("alice", 1500.0)).unwrap();

        storage
            .append_match("alice", MatchObservation::win(RatingRecord::unrated()))
            .unwrap();
        storage
            .append_match("alice", MatchObservation::draw(RatingRecord::unrated()))
            .unwrap();
        assert_eq!(
            storage.get_competitor("alice").unwrap().unwrap().matches.len(),
            2
        );

        assert_eq!(storage.clear_matches("alice").unwrap(), 2);
        assert!(storage
            .get_competitor("alice")
            .unwrap()
            .unwrap()
            .matches
            .is_empty());
    }

    #[test]
    fn test_append_matches_is_atomic() {
        let storage = InMemoryCompetitorStorage::new();
        storage.store_competitor(competitor("alice", 1500.0)).unwrap();
        storage.store_competitor(competitor("bob", 1500.0)).unwrap();

        let err = storage
            .append_matches(vec![
                ("alice".to_string(), MatchObservation::win(RatingRecord::unrated())),
                ("ghost".to_string(), MatchObservation::loss(RatingRecord::unrated())),
            ])
            .unwrap_err();
        assert_eq!(
            err,
            RatingError::CompetitorNotFound {
                competitor_id: "ghost".to_string()
            }
        );
        assert!(storage
            .get_competitor("alice")
            .unwrap()
            .unwrap()
            .matches
            .is_empty());

        storage
            .append_matches(vec![
                ("alice".to_string(), MatchObservation::win(RatingRecord::unrated())),
                ("bob".to_string(), MatchObservation::loss(RatingRecord::unrated())),
            ])
            .unwrap();
        assert_eq!(storage.get_competitor("alice").unwrap().unwrap().matches.len(), 1);
        assert_eq!(storage.get_competitor("bob").unwrap().unwrap().matches.len(), 1);
    }

    #[test]
    fn test_store_rating_keeps_matches() {
        let storage = InMemoryCompetitorStorage::new();
        storage.store_competitor(competitor("alice", 1500.0)).unwrap();
        storage
            .append_match("alice", MatchObservation::win(RatingRecord::unrated()))
            .unwrap();

        storage
            .store_rating("alice", RatingRecord::new(1550.0, 180.0, 0.06))
            .unwrap();

        let stored = storage.get_competitor("alice").unwrap().unwrap();
        assert_eq!(stored.rating.rating, 1550.0);
        assert_eq!(stored.matches.len(), 1);
    }

    #[test]
    fn test_missing_competitor() {
        let storage = InMemoryCompetitorStorage::new();
        let expected = RatingError::CompetitorNotFound {
            competitor_id: "ghost".to_string(),
        };

        assert_eq!(
            storage
                .store_rating("ghost", RatingRecord::unrated())
                .unwrap_err(),
            expected
        );
        assert_eq!(
            storage
                .append_match("ghost", MatchObservation::win(RatingRecord::unrated()))
                .unwrap_err(),
            expected
        );
        assert_eq!(storage.clear_matches("ghost").unwrap_err(), expected);
        assert!(!storage.remove_competitor("ghost").unwrap());
    }

    #[test]
    fn test_get_all_sorted() {
        let storage = InMemoryCompetitorStorage::new();
        storage.store_competitor(competitor("carol", 1400.0)).unwrap();
        storage.store_competitor(competitor("alice", 1500.0)).unwrap();
        storage.store_competitor(competitor("bob", 1600.0)).unwrap();

        let ids: Vec<_> = storage
            .get_all_competitors()
            .unwrap()
            .into_iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(ids, vec!["alice", "bob", "carol"]);
    }

    #[test]
    fn test_remove_competitor() {
        let storage = InMemoryCompetitorStorage::new();
        storage.store_competitor(competitor("alice", 1500.0)).unwrap();

        assert!(storage.remove_competitor("alice").unwrap());
        assert!(storage.get_competitor("alice").unwrap().is_none());
        assert_eq!(storage.competitor_count().unwrap(), 0);
    }
}
