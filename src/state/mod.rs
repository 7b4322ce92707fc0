//! File-backed persistence for the genome, journal and decision weights.

pub mod genome_store;
pub mod journal;
pub mod ledger;
pub mod weights_store;

pub use genome_store::GenomeStore;
pub use journal::{Journal, DECISION_HEADING, REFLECTION_HEADING, REWRITE_HEADING};
pub use ledger::{ActionCounts, DecisionLedger};
pub use weights_store::WeightsStore;
