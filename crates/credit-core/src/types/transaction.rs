//! Transaction records before and after normalization.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// A transaction record as it appears in the input file.
///
/// Every field is optional and loosely typed; the normalizer decides what is
/// acceptable. Unknown fields are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTransaction {
    pub user_wallet: Option<Value>,
    pub timestamp: Option<Value>,
    pub action: Option<Value>,
    pub action_data: Option<RawActionData>,
}

/// The `actionData` payload of a raw transaction.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawActionData {
    #[serde(rename = "assetSymbol")]
    pub asset_symbol: Option<Value>,
    pub amount: Option<Value>,
    #[serde(rename = "assetPriceUSD")]
    pub asset_price_usd: Option<Value>,
}

/// Lending protocol action, lower-cased.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Supply,
    Mint,
    Borrow,
    Repay,
    LiquidationCall,
    LiquidateBorrow,
    /// Any action outside the vocabulary, kept verbatim (lower-cased).
    #[serde(untagged)]
    Other(String),
}

impl Action {
    /// Map a raw action string onto the vocabulary (case-insensitive).
    pub fn parse(raw: &str) -> Self {
        let lowered = raw.trim().to_lowercase();
        match lowered.as_str() {
            "supply" => Self::Supply,
            "mint" => Self::Mint,
            "borrow" => Self::Borrow,
            "repay" => Self::Repay,
            "liquidationcall" => Self::LiquidationCall,
            "liquidateborrow" => Self::LiquidateBorrow,
            _ => Self::Other(lowered),
        }
    }

    /// Feature bucket this action counts towards, if any.
    pub fn bucket(&self) -> Option<ActionBucket> {
        match self {
            Self::Supply | Self::Mint => Some(ActionBucket::Deposit),
            Self::Borrow => Some(ActionBucket::Borrow),
            Self::Repay => Some(ActionBucket::Repay),
            Self::LiquidationCall | Self::LiquidateBorrow => Some(ActionBucket::Liquidation),
            Self::Other(_) => None,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Supply => "supply",
            Self::Mint => "mint",
            Self::Borrow => "borrow",
            Self::Repay => "repay",
            Self::LiquidationCall => "liquidationcall",
            Self::LiquidateBorrow => "liquidateborrow",
            Self::Other(s) => s,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionBucket {
    Deposit,
    Borrow,
    Repay,
    Liquidation,
}

/// A validated, USD-valued transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalTransaction {
    /// Lower-cased wallet identifier.
    pub wallet: String,
    pub timestamp: DateTime<Utc>,
    pub action: Action,
    /// Always non-negative; zero when amount or price could not be used.
    pub usd_value: Decimal,
    /// Asset symbol, empty when the record carried none.
    pub asset: String,
}

/// Why a raw record was dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum RejectionReason {
    /// The record is not an object of the expected shape.
    Malformed { message: String },
    MissingWallet,
    UnrequestedWallet,
    MissingField { field: String },
    InvalidTimestamp { value: String },
    InvalidAction { value: String },
}

impl RejectionReason {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Malformed { .. } => "malformed",
            Self::MissingWallet => "missing_wallet",
            Self::UnrequestedWallet => "unrequested_wallet",
            Self::MissingField { .. } => "missing_field",
            Self::InvalidTimestamp { .. } => "invalid_timestamp",
            Self::InvalidAction { .. } => "invalid_action",
        }
    }
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed { message } => write!(f, "malformed record: {}", message),
            Self::MissingWallet => write!(f, "missing wallet"),
            Self::UnrequestedWallet => write!(f, "wallet not requested"),
            Self::MissingField { field } => write!(f, "missing field '{}'", field),
            Self::InvalidTimestamp { value } => write!(f, "invalid timestamp {}", value),
            Self::InvalidAction { value } => write!(f, "invalid action {}", value),
        }
    }
}

/// Why a kept record was valued at zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "warning", rename_all = "snake_case")]
pub enum ValueWarning {
    InvalidAmount { value: String },
    InvalidPrice { value: String },
    Overflow,
    NegativeValue,
}

impl ValueWarning {
    pub fn label(&self) -> &'static str {
        match self {
            Self::InvalidAmount { .. } => "invalid_amount",
            Self::InvalidPrice { .. } => "invalid_price",
            Self::Overflow => "overflow",
            Self::NegativeValue => "negative_value",
        }
    }
}

impl fmt::Display for ValueWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidAmount { value } => write!(f, "unparseable amount {}", value),
            Self::InvalidPrice { value } => write!(f, "unparseable price {}", value),
            Self::Overflow => write!(f, "amount x price overflowed"),
            Self::NegativeValue => write!(f, "negative USD value"),
        }
    }
}

/// A rejected record kept for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RejectionSample {
    /// Position of the record in the input.
    pub index: usize,
    pub reason: RejectionReason,
}

/// Tally of what the normalizer did with the input.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NormalizationReport {
    pub total_records: usize,
    pub accepted: usize,
    /// Accepted records whose value was forced to zero.
    pub zero_valued: usize,
    pub rejected: BTreeMap<String, usize>,
    pub value_warnings: BTreeMap<String, usize>,
    pub samples: Vec<RejectionSample>,
    pub sample_limit: usize,
}

impl NormalizationReport {
    pub fn new(sample_limit: usize) -> Self {
        Self {
            sample_limit,
            ..Default::default()
        }
    }

    pub fn record_accepted(&mut self, warning: Option<&ValueWarning>) {
        self.total_records += 1;
        self.accepted += 1;
        if let Some(warning) = warning {
            self.zero_valued += 1;
            *self
                .value_warnings
                .entry(warning.label().to_string())
                .or_default() += 1;
        }
    }

    pub fn record_rejected(&mut self, index: usize, reason: RejectionReason) {
        self.total_records += 1;
        *self.rejected.entry(reason.label().to_string()).or_default() += 1;
        // Unrequested wallets are ordinary filtering, not worth a sample.
        if reason != RejectionReason::UnrequestedWallet && self.samples.len() < self.sample_limit
        {
            self.samples.push(RejectionSample { index, reason });
        }
    }

    pub fn rejected_total(&self) -> usize {
        self.rejected.values().sum()
    }

    /// Rejections excluding records that merely belong to other wallets.
    pub fn malformed_total(&self) -> usize {
        self.rejected
            .iter()
            .filter(|(label, _)| label.as_str() != "unrequested_wallet")
            .map(|(_, count)| count)
            .sum()
    }
}
