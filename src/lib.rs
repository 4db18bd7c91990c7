//! Credit Scorer: DeFi Lending Wallet Credit Scores
//!
//! This is the root crate that provides benchmark and integration test access
//! to the workspace. For actual functionality, use the individual crates:
//!
//! - `credit-core`: normalization, ledgers, features, scoring, file I/O
//! - `wallet-scorer`: command-line entrypoint

// Re-export for benchmarks
pub use credit_core as core;
