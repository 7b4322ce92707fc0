//! Snapshot of what the decision engine would see right now.

use serde::Serialize;

use super::decision::{in_survival, is_stable};
use crate::contact::has_prior_contact;
use crate::molt::{self, ErodedTrait, MoltReadiness};
use crate::types::{Genome, TraitKey};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LowestTrait {
    pub key: TraitKey,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveStatus {
    pub mean: f64,
    pub shell: f64,
    pub lowest: LowestTrait,
    pub eroded: Vec<ErodedTrait>,
    pub molt_ready: MoltReadiness,
    pub contact_available: bool,
    pub contact_depth: u8,
    pub contact_exchanges: u32,
    pub survival_mode: bool,
    pub stable: bool,
}

pub fn status(genome: &Genome) -> LiveStatus {
    let (key, value) = genome.lowest_non_shell();
    let molt_ready = molt::check_readiness(genome);
    LiveStatus {
        mean: genome.mean(),
        shell: genome.shell(),
        lowest: LowestTrait { key, value },
        eroded: molt_ready.eroded.clone(),
        molt_ready,
        contact_available: has_prior_contact(genome),
        contact_depth: genome.contact.depth,
        contact_exchanges: genome.contact.exchanges,
        survival_mode: in_survival(genome),
        stable: is_stable(genome),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genome::test_support::*;

    #[test]
    fn stable_genome() {
        let s = status(&uniform_genome(0.93));
        assert!(s.stable);
        assert!(!s.survival_mode);
        assert!(s.eroded.is_empty());
        assert!(!s.contact_available);
    }

    #[test]
    fn eroded_trait_drives_survival() {
        let g = with(uniform_genome(0.93), TraitKey::Cognition, 0.72);
        let s = status(&g);
        assert!(s.survival_mode);
        assert_eq!(s.lowest, LowestTrait { key: TraitKey::Cognition, value: 0.72 });
        assert_eq!(s.eroded.len(), 9);
        assert!(!s.molt_ready.ready);
    }
}
