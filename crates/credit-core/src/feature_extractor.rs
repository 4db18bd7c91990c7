//! Feature extraction from wallet ledgers.

use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashSet};
use tracing::{info, warn};

use crate::ledger::LedgerBook;
use crate::types::{ActionBucket, FeatureVector, WalletLedger};

/// Reduce one wallet's ledger to its feature vector.
pub fn extract_features(ledger: &WalletLedger) -> FeatureVector {
    let mut features = FeatureVector::empty(ledger.wallet.clone());

    if ledger.is_empty() {
        return features;
    }

    features.num_tx = ledger.len() as u64;
    features.active_days = active_days(ledger.first_timestamp(), ledger.last_timestamp());

    let mut total = Decimal::ZERO;
    for tx in ledger.iter() {
        accumulate(&mut total, tx.usd_value, &ledger.wallet, "total_usd");
        match tx.action.bucket() {
            Some(ActionBucket::Deposit) => {
                accumulate(&mut features.deposit_total, tx.usd_value, &ledger.wallet, "deposit_total");
            }
            Some(ActionBucket::Borrow) => {
                accumulate(&mut features.borrow_total, tx.usd_value, &ledger.wallet, "borrow_total");
            }
            Some(ActionBucket::Repay) => {
                accumulate(&mut features.repay_total, tx.usd_value, &ledger.wallet, "repay_total");
            }
            Some(ActionBucket::Liquidation) => features.liquidation_count += 1,
            None => {}
        }
    }
    features.avg_tx_usd = (total / Decimal::from(features.num_tx)).normalize();

    features.borrow_deposit_ratio = ratio(features.borrow_total, features.deposit_total);
    features.repay_ratio = ratio(features.repay_total, features.borrow_total);

    let assets: HashSet<_> = ledger
        .iter()
        .map(|t| t.asset.as_str())
        .filter(|a| !a.is_empty())
        .collect();
    features.unique_assets = assets.len() as u64;

    features
}

/// Extract features for every wallet that has at least one transaction.
pub fn extract_population(book: &LedgerBook) -> BTreeMap<String, FeatureVector> {
    let population: BTreeMap<_, _> = book
        .active()
        .map(|ledger| (ledger.wallet.clone(), extract_features(ledger)))
        .collect();
    info!("Extracted features for {} wallets", population.len());
    population
}

/// Add `value` to `total`, saturating at `Decimal::MAX` instead of overflowing.
///
/// Returns false when the sum saturated.
pub fn accumulate(total: &mut Decimal, value: Decimal, wallet: &str, field: &str) -> bool {
    match total.checked_add(value) {
        Some(sum) => {
            *total = sum;
            true
        }
        None => {
            if *total != Decimal::MAX {
                warn!("{} of wallet {} overflowed; saturating at Decimal::MAX", field, wallet);
            }
            *total = Decimal::MAX;
            false
        }
    }
}

/// Whole days between first and last activity, plus one.
pub fn active_days(first: Option<DateTime<Utc>>, last: Option<DateTime<Utc>>) -> u64 {
    match (first, last) {
        (Some(first), Some(last)) => (last - first).num_days().max(0) as u64 + 1,
        _ => 1,
    }
}

/// `numerator / denominator`, or 0 when the denominator is not positive.
pub fn ratio(numerator: Decimal, denominator: Decimal) -> f64 {
    if denominator <= Decimal::ZERO {
        return 0.0;
    }
    numerator
        .checked_div(denominator)
        .and_then(|r| r.to_f64())
        .unwrap_or(0.0)
}
