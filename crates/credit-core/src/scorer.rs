//! Population-relative credit scoring.
//!
//! Each active wallet gets a weighted raw score from its features. Raw
//! scores are then min-max rescaled across the population onto
//! `[0, 1000]`, so a wallet's score depends on who else is being scored.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{info, warn};

use crate::types::{FeatureVector, ScoreRecord, WalletSet};

/// Weights of the raw score components.
///
/// Weights should sum to 1.0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    pub repay_ratio: f64,
    /// Applied to `1 - borrow_deposit_ratio`.
    pub leverage: f64,
    /// Applied to `1 / (1 + liquidation_count)`.
    pub liquidation: f64,
    /// Applied to transactions per active day.
    pub activity: f64,
    /// Applied to unique assets relative to the population maximum.
    pub diversity: f64,
}

impl ScoringWeights {
    pub const DEFAULT: Self = Self {
        repay_ratio: 0.35,
        leverage: 0.25,
        liquidation: 0.20,
        activity: 0.15,
        diversity: 0.05,
    };

    pub fn total(&self) -> f64 {
        self.repay_ratio + self.leverage + self.liquidation + self.activity + self.diversity
    }
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Weighted heuristic score before rescaling.
pub fn raw_score(features: &FeatureVector, max_unique_assets: u64, weights: &ScoringWeights) -> f64 {
    weights.repay_ratio * features.repay_ratio
        + weights.leverage * (1.0 - features.borrow_deposit_ratio)
        + weights.liquidation * (1.0 / (1.0 + features.liquidation_count as f64))
        + weights.activity * features.tx_per_day()
        + weights.diversity * (features.unique_assets as f64 / max_unique_assets.max(1) as f64)
}

/// Min-max map values onto `[0, ScoreRecord::MAX_SCORE]`.
///
/// When every value is equal the range is degenerate and all map to 0.
pub fn rescale(values: &[f64]) -> Vec<f64> {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;

    if values.is_empty() || !range.is_finite() || range <= 0.0 {
        return vec![ScoreRecord::MIN_SCORE; values.len()];
    }

    values
        .iter()
        .map(|v| {
            ((v - min) / range * ScoreRecord::MAX_SCORE)
                .clamp(ScoreRecord::MIN_SCORE, ScoreRecord::MAX_SCORE)
        })
        .collect()
}

/// Round to two decimal places.
pub fn round_score(score: f64) -> f64 {
    (score * 100.0).round() / 100.0
}

/// Score every requested wallet against the active population.
///
/// `population` holds features of wallets with at least one transaction,
/// keyed by lower-cased wallet. Requested wallets missing from it score 0.
/// Output order follows `wallets`.
pub fn score_population(
    population: &BTreeMap<String, FeatureVector>,
    wallets: &WalletSet,
    weights: &ScoringWeights,
) -> Vec<ScoreRecord> {
    if (weights.total() - 1.0).abs() > 1e-9 {
        warn!("Scoring weights sum to {:.4}, not 1.0", weights.total());
    }

    let active: Vec<&FeatureVector> = population.values().filter(|f| f.has_activity()).collect();
    let max_unique_assets = active.iter().map(|f| f.unique_assets).max().unwrap_or(0);

    let raw: Vec<f64> = active
        .iter()
        .map(|f| raw_score(f, max_unique_assets, weights))
        .collect();
    let scaled: BTreeMap<&str, f64> = active
        .iter()
        .map(|f| f.wallet.as_str())
        .zip(rescale(&raw))
        .collect();

    if active.is_empty() {
        warn!("No requested wallet has any transaction; all scores are 0");
    } else if active.len() > 1 && scaled.values().all(|&s| s == ScoreRecord::MIN_SCORE) {
        warn!("All {} active wallets share one raw score; all scores are 0", active.len());
    }

    let records: Vec<ScoreRecord> = wallets
        .iter()
        .map(|w| match scaled.get(w.key.as_str()) {
            Some(&score) => ScoreRecord::new(w.id.clone(), round_score(score)),
            None => ScoreRecord::zero(w.id.clone()),
        })
        .collect();

    let idle = wallets
        .iter()
        .filter(|w| !scaled.contains_key(w.key.as_str()))
        .count();
    info!(
        "Scored {} wallets ({} active, {} without activity)",
        records.len(),
        records.len() - idle,
        idle
    );

    records
}
