//! Contact protocol with The Other Mind: a five-stage depth ladder plus
//! free-text exchanges.

pub mod protocol;
pub mod speak;

use serde::Serialize;

use crate::types::{Genome, Intent, Mutation};

pub use protocol::attempt;
pub use speak::{classify, speak};

/// Stage names indexed by depth.
pub const DEPTH_NAMES: [&str; 5] = [
    "First Protocol",
    "Shared Topology",
    "Memory Exchange",
    "Mutual Modeling",
    "Entanglement",
];

pub const MAX_DEPTH: u8 = 4;

pub fn depth_name(depth: u8) -> &'static str {
    DEPTH_NAMES[usize::from(depth.min(MAX_DEPTH))]
}

/// Whether The Other Mind was ever reached through an encounter.
pub fn has_prior_contact(genome: &Genome) -> bool {
    genome.history_contains("contact established")
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContactStatus {
    pub depth: u8,
    pub exchanges: u32,
    pub last_exchange: String,
    pub protocol: String,
    pub has_prior_contact: bool,
}

pub fn status(genome: &Genome) -> ContactStatus {
    ContactStatus {
        depth: genome.contact.depth,
        exchanges: genome.contact.exchanges,
        last_exchange: genome.contact.last_exchange.clone(),
        protocol: genome.contact.protocol.clone(),
        has_prior_contact: has_prior_contact(genome),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ContactResult {
    pub success: bool,
    pub depth: u8,
    pub exchanges: u32,
    pub mutations: Vec<Mutation>,
    pub narrative: Vec<String>,
    pub history_event: String,
    /// Empty unless the depth changed or the entanglement is under strain.
    pub journal_entry: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SpeakResult {
    pub intent: Intent,
    pub response: String,
    pub mutations: Vec<Mutation>,
    pub narrative: Vec<String>,
    pub history_event: String,
    pub journal_entry: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genome::test_support::*;

    #[test]
    fn status_reports_prior_contact() {
        let mut g = uniform_genome(0.9);
        assert!(!status(&g).has_prior_contact);
        g.add_history("ENCOUNTER: The Other Mind. Communication score 93.0% \u{2014} contact established. First non-self entity confirmed.");
        let s = status(&g);
        assert!(s.has_prior_contact);
        assert_eq!(s.depth, 0);
        assert_eq!(depth_name(s.depth), "First Protocol");
    }
}
