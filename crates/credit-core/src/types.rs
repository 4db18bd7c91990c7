//! Core domain types for the credit scoring pipeline.

pub mod features;
pub mod ledger;
pub mod score;
pub mod transaction;

pub use features::*;
pub use ledger::*;
pub use score::*;
pub use transaction::*;
