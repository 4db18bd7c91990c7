//! Configuration management for the credit scorer.

use crate::{Error, Result};
use serde::Deserialize;
use std::env;
use std::path::PathBuf;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub output: OutputConfig,
    pub normalizer: NormalizerConfig,
    pub report: ReportConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Where scores are written when no path is given on the command line.
    pub scores_path: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NormalizerConfig {
    /// Rejected records kept as samples in the normalization report.
    pub rejection_samples: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReportConfig {
    /// Wallets listed in the ranked report.
    pub top_n: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output: OutputConfig {
                scores_path: PathBuf::from(Self::DEFAULT_SCORES_PATH),
            },
            normalizer: NormalizerConfig {
                rejection_samples: 5,
            },
            report: ReportConfig { top_n: 10 },
        }
    }
}

impl Config {
    pub const DEFAULT_SCORES_PATH: &'static str = "wallet_scores.csv";

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        Ok(Self {
            output: OutputConfig {
                scores_path: lookup("CREDIT_SCORES_OUTPUT")
                    .filter(|s| !s.trim().is_empty())
                    .map(PathBuf::from)
                    .unwrap_or(defaults.output.scores_path),
            },
            normalizer: NormalizerConfig {
                rejection_samples: parse_var(&lookup, "CREDIT_REJECTION_SAMPLES")?
                    .unwrap_or(defaults.normalizer.rejection_samples),
            },
            report: ReportConfig {
                top_n: parse_var(&lookup, "CREDIT_REPORT_TOP")?.unwrap_or(defaults.report.top_n),
            },
        })
    }
}

fn parse_var<F>(lookup: &F, key: &str) -> Result<Option<usize>>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw.trim().parse().map(Some).map_err(|_| Error::Config {
            message: format!("{} must be a non-negative integer, got '{}'", key, raw),
        }),
    }
}
