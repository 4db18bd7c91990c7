//! Credit Core Library
//!
//! Turns a raw DeFi lending ledger into population-relative wallet credit
//! scores in `[0, 1000]`.
//!
//! The pipeline runs in four stages:
//!
//! - [`normalizer`]: validates raw records into [`CanonicalTransaction`]s
//! - [`ledger`]: groups them into ordered per-wallet [`WalletLedger`]s
//! - [`feature_extractor`]: reduces each ledger to a [`FeatureVector`]
//! - [`scorer`]: weights and min-max rescales the population
//!
//! [`pipeline::ScoringPipeline`] sequences them and guarantees one
//! [`ScoreRecord`] per requested wallet.

pub mod config;
pub mod error;
pub mod feature_extractor;
pub mod io;
pub mod ledger;
pub mod normalizer;
pub mod pipeline;
pub mod scorer;
pub mod types;

pub use error::{Error, Result};
pub use pipeline::{PipelineOutput, ScoringPipeline};
pub use scorer::ScoringWeights;
pub use types::*;
