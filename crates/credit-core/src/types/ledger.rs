//! Requested wallets and their ordered transaction histories.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::CanonicalTransaction;

/// One entry of the wallet list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestedWallet {
    /// Identifier as written in the wallet list (trimmed).
    pub id: String,
    /// Lower-cased identifier used for matching.
    pub key: String,
}

/// The ordered, de-duplicated set of wallets to score.
#[derive(Debug, Clone, Default)]
pub struct WalletSet {
    entries: Vec<RequestedWallet>,
    index: HashMap<String, usize>,
    duplicates: usize,
}

impl WalletSet {
    /// Build from raw identifiers. Blank entries are skipped and later
    /// case-insensitive duplicates collapse onto the first occurrence.
    pub fn from_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self::default();
        for id in ids {
            let id = id.as_ref().trim();
            if id.is_empty() {
                continue;
            }
            let key = id.to_lowercase();
            if set.index.contains_key(&key) {
                set.duplicates += 1;
                continue;
            }
            set.index.insert(key.clone(), set.entries.len());
            set.entries.push(RequestedWallet {
                id: id.to_string(),
                key,
            });
        }
        set
    }

    /// Whether a lower-cased wallet key was requested.
    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RequestedWallet> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries dropped as duplicates.
    pub fn duplicates(&self) -> usize {
        self.duplicates
    }
}

/// Transactions of one wallet in ascending timestamp order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WalletLedger {
    pub wallet: String,
    pub transactions: Vec<CanonicalTransaction>,
}

impl WalletLedger {
    pub fn new(wallet: impl Into<String>) -> Self {
        Self {
            wallet: wallet.into(),
            transactions: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    pub fn first_timestamp(&self) -> Option<DateTime<Utc>> {
        self.transactions.first().map(|t| t.timestamp)
    }

    pub fn last_timestamp(&self) -> Option<DateTime<Utc>> {
        self.transactions.last().map(|t| t.timestamp)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CanonicalTransaction> {
        self.transactions.iter()
    }
}
