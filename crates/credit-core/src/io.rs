//! Reading pipeline inputs and writing results.
//!
//! Failures here are structural and abort the run before any output is
//! written.

use serde_json::Value;
use std::fs;
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};

use crate::types::{FeatureVector, ScoreRecord, WalletSet};
use crate::{Error, Result};

/// Column of the wallet list holding wallet identifiers.
pub const WALLET_COLUMN: &str = "wallet_id";

/// Load raw transaction records from a JSON array or JSON-lines file.
pub fn load_transactions(path: &Path) -> Result<Vec<Value>> {
    let text = fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let records = parse_transactions(&text)?;
    info!("Loaded {} transaction records from {}", records.len(), path.display());
    Ok(records)
}

/// Parse transaction records.
///
/// Accepts a single JSON array, or a stream of JSON objects separated by
/// whitespace. Blank input is an empty list. Records are not validated here.
pub fn parse_transactions(text: &str) -> Result<Vec<Value>> {
    let mut values = Vec::new();
    for value in serde_json::Deserializer::from_str(text).into_iter::<Value>() {
        values.push(value?);
    }

    match values.len() {
        0 => Ok(Vec::new()),
        1 => match values.pop() {
            Some(Value::Array(records)) => Ok(records),
            Some(record @ Value::Object(_)) => Ok(vec![record]),
            Some(other) => Err(Error::InvalidFormat {
                message: format!("expected an array of transaction records, found {}", other),
            }),
            None => Ok(Vec::new()),
        },
        _ => {
            if values.iter().any(Value::is_array) {
                return Err(Error::InvalidFormat {
                    message: "multiple top-level arrays in transaction stream".to_string(),
                });
            }
            Ok(values)
        }
    }
}

/// Load the wallet list from a CSV file with a `wallet_id` column.
pub fn load_wallets(path: &Path) -> Result<WalletSet> {
    let file = fs::File::open(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let wallets = read_wallets(file, path)?;
    info!("Loaded {} wallets from {}", wallets.len(), path.display());
    Ok(wallets)
}

/// Read a wallet list. `path` is only used in error messages.
pub fn read_wallets<R: Read>(reader: R, path: &Path) -> Result<WalletSet> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let records = rdr.records().collect::<std::result::Result<Vec<_>, _>>()?;

    // A blank header with no rows is an empty file, not a missing column.
    if headers.iter().all(|h| h.is_empty()) && records.is_empty() {
        return Err(Error::EmptyWalletList {
            path: path.to_path_buf(),
        });
    }

    let column = headers
        .iter()
        .position(|h| h.trim_start_matches('\u{feff}') == WALLET_COLUMN)
        .ok_or_else(|| Error::MissingColumn {
            path: path.to_path_buf(),
            column: WALLET_COLUMN.to_string(),
        })?;

    let ids: Vec<String> = records
        .iter()
        .filter_map(|record| record.get(column))
        .map(str::to_string)
        .collect();

    let wallets = WalletSet::from_ids(&ids);
    if wallets.duplicates() > 0 {
        warn!(
            "Wallet list {} has {} duplicate entries; keeping first occurrences",
            path.display(),
            wallets.duplicates()
        );
    }
    if wallets.is_empty() {
        return Err(Error::EmptyWalletList {
            path: path.to_path_buf(),
        });
    }

    Ok(wallets)
}

/// Write `wallet_id,score` rows.
pub fn write_scores(path: &Path, scores: &[ScoreRecord]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for record in scores {
        writer.serialize(record)?;
    }
    writer.flush().map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    info!("Wrote {} scores to {}", scores.len(), path.display());
    Ok(())
}

/// Write one row of features per wallet.
pub fn write_features<'a, I>(path: &Path, features: I) -> Result<()>
where
    I: IntoIterator<Item = &'a FeatureVector>,
{
    let mut writer = csv::Writer::from_path(path)?;
    let mut rows = 0usize;
    for row in features {
        writer.serialize(row)?;
        rows += 1;
    }
    writer.flush().map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    info!("Wrote {} feature rows to {}", rows, path.display());
    Ok(())
}
