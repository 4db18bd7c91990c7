//! Pipeline driver: normalize, build ledgers, extract features, score.

use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;

use crate::config::Config;
use crate::feature_extractor::extract_population;
use crate::io;
use crate::ledger::build_ledgers;
use crate::normalizer::RecordNormalizer;
use crate::scorer::{score_population, ScoringWeights};
use crate::types::{FeatureVector, NormalizationReport, ScoreRecord, WalletSet};
use crate::{Error, Result};

/// Everything a run produces.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// One record per requested wallet, in wallet list order.
    pub scores: Vec<ScoreRecord>,
    /// Features of wallets with at least one transaction, keyed by
    /// lower-cased wallet.
    pub features: BTreeMap<String, FeatureVector>,
    pub report: NormalizationReport,
}

impl PipelineOutput {
    /// Features for every scored wallet in output order, zeroed for wallets
    /// without activity.
    pub fn feature_rows(&self) -> Vec<FeatureVector> {
        self.scores
            .iter()
            .map(|s| {
                let key = s.wallet_id.to_lowercase();
                self.features
                    .get(&key)
                    .cloned()
                    .unwrap_or_else(|| FeatureVector::empty(key))
            })
            .collect()
    }

    pub fn active_wallets(&self) -> usize {
        self.features.len()
    }
}

/// Batch scoring pipeline.
#[derive(Debug, Clone)]
pub struct ScoringPipeline {
    weights: ScoringWeights,
    rejection_samples: usize,
}

impl Default for ScoringPipeline {
    fn default() -> Self {
        Self::new(ScoringWeights::DEFAULT)
    }
}

impl ScoringPipeline {
    pub fn new(weights: ScoringWeights) -> Self {
        Self {
            weights,
            rejection_samples: Config::default().normalizer.rejection_samples,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(ScoringWeights::DEFAULT).with_rejection_samples(config.normalizer.rejection_samples)
    }

    pub fn with_rejection_samples(mut self, samples: usize) -> Self {
        self.rejection_samples = samples;
        self
    }

    /// Score `wallets` from in-memory raw records.
    pub fn run(&self, records: &[Value], wallets: &WalletSet) -> Result<PipelineOutput> {
        if wallets.is_empty() {
            return Err(Error::InvalidFormat {
                message: "no wallets to score".to_string(),
            });
        }

        let (transactions, report) =
            RecordNormalizer::new(wallets, self.rejection_samples).normalize_all(records);
        let book = build_ledgers(transactions, wallets);
        let features = extract_population(&book);
        let scores = score_population(&features, wallets, &self.weights);

        debug_assert_eq!(scores.len(), wallets.len());

        Ok(PipelineOutput {
            scores,
            features,
            report,
        })
    }

    /// Load both input files and score them. Nothing is written.
    pub fn run_files(&self, transactions: &Path, wallets: &Path) -> Result<PipelineOutput> {
        let wallets = io::load_wallets(wallets)?;
        let records = io::load_transactions(transactions)?;
        let output = self.run(&records, &wallets)?;
        info!(
            "Pipeline complete: {} wallets scored, {} with activity",
            output.scores.len(),
            output.active_wallets()
        );
        Ok(output)
    }
}
