//! Scoring output types.

use serde::{Deserialize, Serialize};

/// Final credit score of one requested wallet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub wallet_id: String,
    /// In `[0, 1000]`, rounded to two decimals.
    pub score: f64,
}

impl ScoreRecord {
    pub const MIN_SCORE: f64 = 0.0;
    pub const MAX_SCORE: f64 = 1000.0;

    pub fn new(wallet_id: impl Into<String>, score: f64) -> Self {
        Self {
            wallet_id: wallet_id.into(),
            score,
        }
    }

    /// Score for a wallet that has no transactions.
    pub fn zero(wallet_id: impl Into<String>) -> Self {
        Self::new(wallet_id, Self::MIN_SCORE)
    }
}
