//! Common types used throughout the rating engine

use crate::error::{RatingError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use skillratings::glicko2::Glicko2Rating;

/// Unique identifier for competitors
pub type CompetitorId = String;

/// Rating of a new, unrated competitor
pub const DEFAULT_RATING: f64 = 1500.0;

/// Rating deviation of a new, unrated competitor
pub const DEFAULT_DEVIATION: f64 = 350.0;

/// Volatility of a new, unrated competitor
pub const DEFAULT_VOLATILITY: f64 = 0.06;

/// Snapshot of a competitor's rating at a point in time.
///
/// Records are plain values: an update produces a new record and replaces
/// the old one wholesale. Opponents inside a [`MatchObservation`] are also
/// stored as records, so they never carry a match history of their own.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatingRecord {
    pub rating: f64,
    pub deviation: f64,
    pub volatility: f64,
}

impl Default for RatingRecord {
    fn default() -> Self {
        Self::unrated()
    }
}

impl RatingRecord {
    pub fn new(rating: f64, deviation: f64, volatility: f64) -> Self {
        Self {
            rating,
            deviation,
            volatility,
        }
    }

    /// Standard Glicko-2 starting point for a brand-new competitor
    pub fn unrated() -> Self {
        Self::new(DEFAULT_RATING, DEFAULT_DEVIATION, DEFAULT_VOLATILITY)
    }

    /// Check that the record can be fed to the update procedure
    pub fn validate(&self) -> Result<()> {
        if !self.rating.is_finite() {
            return Err(RatingError::InvalidRating {
                reason: format!("rating must be finite, got {}", self.rating),
            });
        }

        if !(self.deviation.is_finite() && self.deviation > 0.0) {
            return Err(RatingError::InvalidRating {
                reason: format!("deviation must be positive, got {}", self.deviation),
            });
        }

        if !(self.volatility.is_finite() && self.volatility > 0.0) {
            return Err(RatingError::InvalidRating {
                reason: format!("volatility must be positive, got {}", self.volatility),
            });
        }

        Ok(())
    }

    /// 95% confidence interval of the rating
    pub fn confidence_interval(&self) -> (f64, f64) {
        (
            self.rating - 1.96 * self.deviation,
            self.rating + 1.96 * self.deviation,
        )
    }
}

impl From<Glicko2Rating> for RatingRecord {
    fn from(rating: Glicko2Rating) -> Self {
        Self {
            rating: rating.rating,
            deviation: rating.deviation,
            volatility: rating.volatility,
        }
    }
}

impl From<RatingRecord> for Glicko2Rating {
    fn from(record: RatingRecord) -> Self {
        Self {
            rating: record.rating,
            deviation: record.deviation,
            volatility: record.volatility,
        }
    }
}

/// Outcome of one match from the subject's point of view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchObservation {
    /// Opponent's rating as it stood when the match was played
    pub opponent: RatingRecord,
    /// 1.0 = win, 0.5 = draw, 0.0 = loss
    pub score: f64,
    /// Opponent name, kept for display only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opponent_id: Option<CompetitorId>,
}

impl MatchObservation {
    pub fn new(opponent: RatingRecord, score: f64) -> Self {
        Self {
            opponent,
            score,
            opponent_id: None,
        }
    }

    pub fn win(opponent: RatingRecord) -> Self {
        Self::new(opponent, 1.0)
    }

    pub fn draw(opponent: RatingRecord) -> Self {
        Self::new(opponent, 0.5)
    }

    pub fn loss(opponent: RatingRecord) -> Self {
        Self::new(opponent, 0.0)
    }

    /// Attach the opponent's name
    pub fn against(mut self, opponent_id: impl Into<CompetitorId>) -> Self {
        self.opponent_id = Some(opponent_id.into());
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.score) {
            return Err(RatingError::InvalidScore { score: self.score });
        }
        self.opponent.validate()
    }
}

/// A registered competitor and the matches recorded since its last update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Competitor {
    pub id: CompetitorId,
    pub rating: RatingRecord,
    #[serde(default)]
    pub matches: Vec<MatchObservation>,
}

impl Competitor {
    /// Create an unrated competitor with no match history
    pub fn new(id: impl Into<CompetitorId>) -> Self {
        Self::with_rating(id, RatingRecord::unrated())
    }

    pub fn with_rating(id: impl Into<CompetitorId>, rating: RatingRecord) -> Self {
        Self {
            id: id.into(),
            rating,
            matches: Vec::new(),
        }
    }

    /// Record a match against another competitor's current rating
    pub fn add_match(&mut self, observation: MatchObservation) {
        self.matches.push(observation);
    }

    /// Frozen view of this competitor, usable as an opponent
    pub fn snapshot(&self) -> RatingRecord {
        self.rating
    }
}

/// Before/after view of one competitor's update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingChange {
    pub competitor_id: CompetitorId,
    pub old_rating: RatingRecord,
    pub new_rating: RatingRecord,
    pub matches_played: usize,
    pub updated_at: DateTime<Utc>,
}

impl RatingChange {
    pub fn rating_delta(&self) -> f64 {
        self.new_rating.rating - self.old_rating.rating
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unrated_defaults() {
        let record = RatingRecord::unrated();
        assert_eq!(record.rating, 1500.0);
        assert_eq!(record.deviation, 350.0);
        assert_eq!(record.volatility, 0.06);
        assert_eq!(record, RatingRecord::default());
    }

    #[test]
    fn test_confidence_interval() {
        let (low, high) = RatingRecord::new(1500.0, 50.0, 0.06).confidence_interval();
        assert!((low - 1402.0).abs() < 1e-9);
        assert!((high - 1598.0).abs() < 1e-9);
    }

    #[test]
    fn test_record_validation() {
        assert!(RatingRecord::new(1500.0, 200.0, 0.06).validate().is_ok());
        assert!(RatingRecord::new(1500.0, 0.0, 0.06).validate().is_err());
        assert!(RatingRecord::new(1500.0, 200.0, 0.0).validate().is_err());
        assert!(RatingRecord::new(f64::NAN, 200.0, 0.06).validate().is_err());
        assert!(RatingRecord::new(1500.0, f64::INFINITY, 0.06)
            .validate()
            .is_err());
    }

    #[test]
    fn test_score_validation() {
        let opponent = RatingRecord::unrated();
        assert!(MatchObservation::win(opponent).validate().is_ok());
        assert!(MatchObservation::draw(opponent).validate().is_ok());
        assert!(MatchObservation::new(opponent, 0.25).validate().is_ok());

        let err = MatchObservation::new(opponent, 1.5).validate().unwrap_err();
        assert_eq!(err, RatingError::InvalidScore { score: 1.5 });
        assert!(MatchObservation::new(opponent, -0.1).validate().is_err());
        assert!(MatchObservation::new(opponent, f64::NAN).validate().is_err());
    }

    #[test]
    fn test_snapshot_is_frozen() {
        let mut opponent = Competitor::with_rating("bob", RatingRecord::new(1600.0, 80.0, 0.06));
        let mut subject = Competitor::new("alice");
        subject.add_match(MatchObservation::loss(opponent.snapshot()).against("bob"));

        opponent.rating.rating = 1800.0;

        assert_eq!(subject.matches[0].opponent.rating, 1600.0);
        assert_eq!(subject.matches[0].opponent_id.as_deref(), Some("bob"));
    }

    #[test]
    fn test_skillratings_conversion() {
        let record = RatingRecord::new(1620.5, 120.0, 0.059);
        let converted: Glicko2Rating = record.into();
        assert_eq!(converted.rating, 1620.5);
        assert_eq!(converted.deviation, 120.0);
        assert_eq!(converted.volatility, 0.059);
        assert_eq!(RatingRecord::from(converted), record);
    }

    #[test]
    fn test_competitor_serde() {
        let mut competitor = Competitor::new("alice");
        competitor.add_match(MatchObservation::draw(RatingRecord::unrated()));

        let json = serde_json::to_string(&competitor).unwrap();
        let parsed: Competitor = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, competitor);

        // Match history is optional on input
        let bare: Competitor = serde_json::from_str(
            r#"{"id":"bob","rating":{"rating":1400.0,"deviation":80.0,"volatility":0.06}}"#,
        )
        .unwrap();
        assert!(bare.matches.is_empty());
    }
}
