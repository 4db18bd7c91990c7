//! Per-wallet feature vectors.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Aggregated lending behavior of one wallet.
///
/// Ratios with a zero denominator are 0, never NaN.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    /// Lower-cased wallet identifier.
    pub wallet: String,

    /// Number of transactions in the ledger.
    pub num_tx: u64,

    /// Whole days between first and last transaction, plus one. Always >= 1.
    pub active_days: u64,

    /// Mean USD value per transaction.
    pub avg_tx_usd: Decimal,

    pub deposit_total: Decimal,
    pub borrow_total: Decimal,
    pub repay_total: Decimal,
    pub liquidation_count: u64,

    /// `borrow_total / deposit_total`.
    pub borrow_deposit_ratio: f64,

    /// `repay_total / borrow_total`.
    pub repay_ratio: f64,

    /// Distinct non-empty asset symbols seen.
    pub unique_assets: u64,
}

impl FeatureVector {
    /// Features of a wallet with no transactions.
    pub fn empty(wallet: impl Into<String>) -> Self {
        Self {
            wallet: wallet.into(),
            ..Default::default()
        }
    }

    pub fn has_activity(&self) -> bool {
        self.num_tx > 0
    }

    /// Transactions per active day.
    pub fn tx_per_day(&self) -> f64 {
        self.num_tx as f64 / self.active_days.max(1) as f64
    }
}

impl Default for FeatureVector {
    fn default() -> Self {
        Self {
            wallet: String::new(),
            num_tx: 0,
            active_days: 1,
            avg_tx_usd: Decimal::ZERO,
            deposit_total: Decimal::ZERO,
            borrow_total: Decimal::ZERO,
            repay_total: Decimal::ZERO,
            liquidation_count: 0,
            borrow_deposit_ratio: 0.0,
            repay_ratio: 0.0,
            unique_assets: 0,
        }
    }
}
