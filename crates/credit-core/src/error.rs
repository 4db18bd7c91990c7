//! Error types for the credit scoring pipeline.
//!
//! Only structural problems with the inputs surface here. Problems with a
//! single transaction record are reported through
//! [`NormalizationReport`](crate::types::NormalizationReport) instead.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid input format: {message}")]
    InvalidFormat { message: String },

    #[error("{} is missing required column '{column}'", path.display())]
    MissingColumn { path: PathBuf, column: String },

    #[error("Wallet list {} contains no wallets", path.display())]
    EmptyWalletList { path: PathBuf },

    #[error("Configuration error: {message}")]
    Config { message: String },
}

pub type Result<T> = std::result::Result<T, Error>;
