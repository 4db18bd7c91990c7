//! Record normalization: raw JSON records to [`CanonicalTransaction`]s.
//!
//! A record is either accepted (possibly valued at zero, with a
//! [`ValueWarning`]) or rejected with a [`RejectionReason`]. Nothing here
//! aborts the batch.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;
use std::str::FromStr;
use tracing::{debug, info, warn};

use crate::types::{
    Action, CanonicalTransaction, NormalizationReport, RawTransaction, RejectionReason,
    ValueWarning, WalletSet,
};

/// Amounts above this are assumed to be token minor units (18 decimals).
///
/// This is asset-agnostic: a genuinely large amount in whole units is
/// misread as minor units. Treat the result as an approximation.
pub fn unit_threshold() -> Decimal {
    Decimal::from(1_000_000_000_000i64)
}

/// Divisor applied to `amount * price` when the amount is above the threshold.
pub fn minor_unit_scale() -> Decimal {
    Decimal::from(1_000_000_000_000_000_000i64)
}

/// A record that survived validation.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRecord {
    pub transaction: CanonicalTransaction,
    /// Set when the USD value was forced to zero.
    pub warning: Option<ValueWarning>,
}

/// Validates raw records against the requested wallet set.
#[derive(Debug, Clone)]
pub struct RecordNormalizer<'a> {
    wallets: &'a WalletSet,
    sample_limit: usize,
}

impl<'a> RecordNormalizer<'a> {
    pub fn new(wallets: &'a WalletSet, sample_limit: usize) -> Self {
        Self {
            wallets,
            sample_limit,
        }
    }

    /// Normalize every record, collecting accepted transactions and a report.
    pub fn normalize_all(&self, records: &[Value]) -> (Vec<CanonicalTransaction>, NormalizationReport) {
        let mut report = NormalizationReport::new(self.sample_limit);
        let mut accepted = Vec::new();

        for (index, raw) in records.iter().enumerate() {
            match normalize_record(raw, self.wallets) {
                Ok(record) => {
                    if let Some(warning) = &record.warning {
                        warn!(
                            "Record {} ({}) valued at zero: {}",
                            index, record.transaction.wallet, warning
                        );
                    }
                    report.record_accepted(record.warning.as_ref());
                    accepted.push(record.transaction);
                }
                Err(RejectionReason::UnrequestedWallet) => {
                    debug!("Record {} skipped: wallet not requested", index);
                    report.record_rejected(index, RejectionReason::UnrequestedWallet);
                }
                Err(reason) => {
                    warn!("Record {} rejected: {}", index, reason);
                    report.record_rejected(index, reason);
                }
            }
        }

        info!(
            "Normalized {} records: {} accepted ({} zero-valued), {} rejected",
            report.total_records,
            report.accepted,
            report.zero_valued,
            report.rejected_total()
        );

        (accepted, report)
    }
}

/// Validate and value a single raw record.
pub fn normalize_record(
    raw: &Value,
    wallets: &WalletSet,
) -> Result<NormalizedRecord, RejectionReason> {
    if !raw.is_object() {
        return Err(RejectionReason::Malformed {
            message: format!("expected object, found {}", json_kind(raw)),
        });
    }
    let record = RawTransaction::deserialize(raw).map_err(|e| RejectionReason::Malformed {
        message: e.to_string(),
    })?;

    let wallet = match record.user_wallet.as_ref().and_then(Value::as_str) {
        Some(w) if !w.trim().is_empty() => w.trim().to_lowercase(),
        _ => return Err(RejectionReason::MissingWallet),
    };
    if !wallets.contains(&wallet) {
        return Err(RejectionReason::UnrequestedWallet);
    }

    let raw_timestamp = record.timestamp.as_ref().ok_or_else(|| missing("timestamp"))?;
    let raw_action = record.action.as_ref().ok_or_else(|| missing("action"))?;
    let action_data = record.action_data.as_ref().ok_or_else(|| missing("actionData"))?;

    let timestamp =
        parse_timestamp(raw_timestamp).ok_or_else(|| RejectionReason::InvalidTimestamp {
            value: raw_timestamp.to_string(),
        })?;

    let action = match raw_action.as_str() {
        Some(s) if !s.trim().is_empty() => Action::parse(s),
        Some(_) => return Err(missing("action")),
        None => {
            return Err(RejectionReason::InvalidAction {
                value: raw_action.to_string(),
            })
        }
    };

    let asset = action_data
        .asset_symbol
        .as_ref()
        .and_then(Value::as_str)
        .map(|s| s.trim().to_string())
        .unwrap_or_default();

    let (usd_value, warning) = usd_value(
        action_data.amount.as_ref(),
        action_data.asset_price_usd.as_ref(),
    );

    Ok(NormalizedRecord {
        transaction: CanonicalTransaction {
            wallet,
            timestamp,
            action,
            usd_value,
            asset,
        },
        warning,
    })
}

/// Compute `amount * price` in decimal arithmetic.
///
/// Amounts above [`unit_threshold`] are treated as 18-decimal fixed point.
/// Any failure yields zero plus the reason.
pub fn usd_value(amount: Option<&Value>, price: Option<&Value>) -> (Decimal, Option<ValueWarning>) {
    let amount = match amount.and_then(parse_decimal) {
        Some(a) => a,
        None => {
            return (
                Decimal::ZERO,
                Some(ValueWarning::InvalidAmount {
                    value: display_value(amount),
                }),
            )
        }
    };
    let price = match price.and_then(parse_decimal) {
        Some(p) => p,
        None => {
            return (
                Decimal::ZERO,
                Some(ValueWarning::InvalidPrice {
                    value: display_value(price),
                }),
            )
        }
    };

    let value = if amount > unit_threshold() {
        amount
            .checked_mul(price)
            .and_then(|v| v.checked_div(minor_unit_scale()))
            // Scaling first keeps huge raw amounts representable.
            .or_else(|| {
                amount
                    .checked_div(minor_unit_scale())
                    .and_then(|a| a.checked_mul(price))
            })
    } else {
        amount.checked_mul(price)
    };

    match value {
        Some(v) if v.is_sign_negative() && !v.is_zero() => {
            (Decimal::ZERO, Some(ValueWarning::NegativeValue))
        }
        Some(v) => (v.normalize(), None),
        None => (Decimal::ZERO, Some(ValueWarning::Overflow)),
    }
}

/// Parse a decimal from a JSON string or number without going through `f64`.
pub fn parse_decimal(value: &Value) -> Option<Decimal> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    if text.is_empty() {
        return None;
    }
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()
}

/// Parse seconds since the Unix epoch from an integer, integral float or
/// numeric string.
pub fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    let secs = match value {
        Value::Number(n) => match n.as_i64() {
            Some(i) => i,
            None => {
                let f = n.as_f64()?;
                if !f.is_finite() || f.fract() != 0.0 || f.abs() > i64::MAX as f64 {
                    return None;
                }
                f as i64
            }
        },
        Value::String(s) => s.trim().parse::<i64>().ok()?,
        _ => return None,
    };
    DateTime::from_timestamp(secs, 0)
}

fn missing(field: &str) -> RejectionReason {
    RejectionReason::MissingField {
        field: field.to_string(),
    }
}

fn display_value(value: Option<&Value>) -> String {
    value.map(Value::to_string).unwrap_or_else(|| "null".to_string())
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
