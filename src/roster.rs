//! Roster files for the command line tool
//!
//! A roster is the serialized state of a registry: every competitor with its
//! current rating and the matches recorded since its last update. JSON and
//! TOML are both accepted, chosen by file extension.

use crate::rating::{CompetitorRegistry, RatingCalculator};
use crate::types::Competitor;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::path::Path;
use std::sync::Arc;

/// On-disk representation of a registry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Roster {
    #[serde(default)]
    pub competitors: Vec<Competitor>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Json,
    Toml,
}

impl Format {
    fn from_path(path: &Path) -> Result<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(Format::Json),
            Some("toml") => Ok(Format::Toml),
            _ => Err(anyhow!(
                "Unsupported roster format for {} (expected .json or .toml)",
                path.display()
            )),
        }
    }
}

impl Roster {
    pub fn load(path: &Path) -> Result<Self> {
        let format = Format::from_path(path)?;
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read roster {}", path.display()))?;

        let roster: Roster = match format {
            Format::Json => serde_json::from_str(&contents).map_err(anyhow::Error::from),
            Format::Toml => toml::from_str(&contents).map_err(anyhow::Error::from),
        }
        .with_context(|| format!("Failed to parse roster {}", path.display()))?;
        Ok(roster)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let contents = match Format::from_path(path)? {
            Format::Json => serde_json::to_string_pretty(self)?,
            Format::Toml => toml::to_string_pretty(self)?,
        };

        std::fs::write(path, contents)
            .with_context(|| format!("Failed to write roster {}", path.display()))
    }

    /// Build a registry holding every competitor in the roster
    pub fn into_registry(self, calculator: Arc<dyn RatingCalculator>) -> Result<CompetitorRegistry> {
        Ok(CompetitorRegistry::from_competitors(
            self.competitors,
            calculator,
        )?)
    }

    /// Capture the current state of a registry
    pub fn from_registry(registry: &CompetitorRegistry) -> Result<Self> {
        Ok(Self {
            competitors: registry.get_all()?,
        })
    }

    /// Human-readable listing of every competitor
    pub fn summary(&self) -> String {
        let mut out = String::new();

        for competitor in &self.competitors {
            let opponents: Vec<&str> = competitor
                .matches
                .iter()
                .map(|m| m.opponent_id.as_deref().unwrap_or("?"))
                .collect();
            let scores: Vec<String> = competitor
                .matches
                .iter()
                .map(|m| m.score.to_string())
                .collect();

            let _ = writeln!(out, "Player:\t{}", competitor.id);
            let _ = writeln!(out, "Rating:\t{:.0}", competitor.rating.rating);
            let _ = writeln!(
                out,
                "Rating Deviation (+/-):\t{:.0}",
                competitor.rating.deviation
            );
            let (low, high) = competitor.rating.confidence_interval();
            let _ = writeln!(out, "95% Interval:\t[{:.0}, {:.0}]", low, high);
            let _ = writeln!(out, "Volatility:\t{:.6}", competitor.rating.volatility);
            let _ = writeln!(out, "Opponents:\t[{}]", opponents.join(", "));
            let _ = writeln!(out, "Scores:\t[{}]", scores.join(", "));
            out.push('\n');
        }

        out
    }
}
