//! Wallet ledger construction.

use std::collections::{BTreeSet, HashMap};
use tracing::{debug, info};

use crate::types::{CanonicalTransaction, WalletLedger, WalletSet};

/// Per-wallet ledgers for every requested wallet.
#[derive(Debug, Clone, Default)]
pub struct LedgerBook {
    ledgers: HashMap<String, WalletLedger>,
    /// Wallets with at least one transaction.
    present: BTreeSet<String>,
}

impl LedgerBook {
    /// Ledger for a lower-cased wallet key.
    pub fn get(&self, key: &str) -> Option<&WalletLedger> {
        self.ledgers.get(key)
    }

    /// Number of ledgers, empty ones included.
    pub fn len(&self) -> usize {
        self.ledgers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ledgers.is_empty()
    }

    /// Ledgers that hold at least one transaction.
    pub fn active(&self) -> impl Iterator<Item = &WalletLedger> {
        self.present.iter().filter_map(|key| self.ledgers.get(key))
    }
}

/// Partition transactions by wallet and order each ledger by timestamp.
///
/// Every requested wallet gets a ledger, possibly empty. Transactions for
/// wallets outside the set are dropped. Ties keep input order.
pub fn build_ledgers(transactions: Vec<CanonicalTransaction>, wallets: &WalletSet) -> LedgerBook {
    let mut ledgers: HashMap<String, WalletLedger> = wallets
        .iter()
        .map(|w| (w.key.clone(), WalletLedger::new(w.key.clone())))
        .collect();

    let mut dropped = 0usize;
    for tx in transactions {
        match ledgers.get_mut(&tx.wallet) {
            Some(ledger) => ledger.transactions.push(tx),
            None => dropped += 1,
        }
    }
    if dropped > 0 {
        debug!("Dropped {} transactions for unrequested wallets", dropped);
    }

    let mut present = BTreeSet::new();
    for (key, ledger) in ledgers.iter_mut() {
        ledger.transactions.sort_by_key(|t| t.timestamp);
        if !ledger.is_empty() {
            present.insert(key.clone());
        }
    }

    info!(
        "Built {} wallet ledgers ({} with activity)",
        ledgers.len(),
        present.len()
    );

    LedgerBook { ledgers, present }
}
