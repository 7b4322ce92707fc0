//! Encounter engine: five probabilistic stimuli from outside the membrane.

pub mod entropy;
pub mod observer;
pub mod other;
pub mod puzzle;
pub mod signal;

use rand::Rng;
use serde::Serialize;
use tracing::info;

use crate::state::DecisionLedger;
use crate::threshold::{self, ThresholdResult};
use crate::types::{EncounterKind, Genome, Mutation};

/// What a single variant produced before thresholds are checked.
#[derive(Debug, Clone, Default)]
pub struct EncounterOutcome {
    pub mutations: Vec<Mutation>,
    pub narrative: Vec<String>,
    pub history_event: String,
    pub journal_entry: Option<String>,
}

impl EncounterOutcome {
    fn new(lines: &[&str]) -> Self {
        Self {
            narrative: lines.iter().map(|l| l.to_string()).collect(),
            ..Self::default()
        }
    }

    fn line(&mut self, line: impl Into<String>) {
        self.narrative.push(line.into());
    }
}

/// Full result of an encounter, thresholds included.
#[derive(Debug, Clone, Serialize)]
pub struct EncounterResult {
    #[serde(rename = "type")]
    pub kind: EncounterKind,
    /// Encounter mutations followed by any threshold mutations.
    pub mutations: Vec<Mutation>,
    pub narrative: Vec<String>,
    pub history_event: String,
    /// Empty when the variant wrote no journal entry.
    pub journal_entry: String,
    pub thresholds: Vec<ThresholdResult>,
    /// Extra narrative produced by thresholds that fired.
    pub threshold_narrative: Vec<String>,
    /// Every journal entry to append, in order.
    #[serde(skip)]
    pub journal_entries: Vec<String>,
}

/// The encounter kinds in presentation order.
pub fn list() -> Vec<EncounterKind> {
    EncounterKind::ALL.to_vec()
}

/// Run one encounter against the in-memory genome, then the threshold
/// monitor. The caller persists the genome and appends `journal_entries`.
pub fn run<R: Rng + ?Sized>(
    genome: &mut Genome,
    kind: EncounterKind,
    ledger: &DecisionLedger,
    rng: &mut R,
) -> EncounterResult {
    let outcome = match kind {
        EncounterKind::Signal => signal::run(genome, rng),
        EncounterKind::Puzzle => puzzle::run(genome, rng),
        EncounterKind::Other => other::run(genome, rng),
        EncounterKind::Entropy => entropy::run(genome, rng),
        EncounterKind::Observer => observer::run(genome, ledger),
    };
    genome.add_history(outcome.history_event.clone());
    info!("Encounter ({}): {}", kind, outcome.history_event);

    let report = threshold::check(genome, rng);

    let mut mutations = outcome.mutations;
    mutations.extend(report.mutations.iter().cloned());

    let mut journal_entries: Vec<String> = outcome.journal_entry.iter().cloned().collect();
    journal_entries.extend(report.journal_entries.iter().cloned());

    EncounterResult {
        kind,
        mutations,
        narrative: outcome.narrative,
        history_event: outcome.history_event,
        journal_entry: outcome.journal_entry.unwrap_or_default(),
        thresholds: report.results(),
        threshold_narrative: report.narrative,
        journal_entries,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genome::test_support::*;
    use crate::types::TraitKey;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn list_is_ordered() {
        assert_eq!(
            list(),
            vec![
                EncounterKind::Signal,
                EncounterKind::Puzzle,
                EncounterKind::Other,
                EncounterKind::Entropy,
                EncounterKind::Observer
            ]
        );
    }

    #[test]
    fn signal_breach_records_one_history_event() {
        let g = with(uniform_genome(0.97), TraitKey::ShellHardness, 0.10);
        let mut g = with(g, TraitKey::ClawStrength, 0.85);
        // shell collapse already recorded, so no threshold should fire
        g.add_history("THRESHOLD: Trait Collapse (shell_hardness). shell hardness at 10.0%.");
        let mut rng = StdRng::seed_from_u64(4);

        let result = run(&mut g, EncounterKind::Signal, &DecisionLedger::default(), &mut rng);
        let hostile = g
            .history
            .iter()
            .filter(|h| h.event.starts_with("ENCOUNTER: Hostile signal"))
            .count();
        assert_eq!(hostile, 1);
        assert_eq!(result.thresholds.len(), 6);
        assert!(result.thresholds.iter().all(|t| !t.triggered));
        assert!(result.journal_entries.is_empty());
    }

    #[test]
    fn thresholds_follow_the_encounter_in_history() {
        let mut g = with(uniform_genome(0.86), TraitKey::ShellHardness, 0.3);
        g.add_history("THRESHOLD: Trait Collapse (shell_hardness). shell hardness at 30.0%.");
        let mut rng = StdRng::seed_from_u64(8);
        let result = run(&mut g, EncounterKind::Entropy, &DecisionLedger::default(), &mut rng);

        let idx = g
            .history
            .iter()
            .position(|h| h.event.starts_with("ENCOUNTER: Entropy"))
            .unwrap();
        assert!(g.history[idx + 1..].iter().all(|h| h.event.starts_with("THRESHOLD: ")));
        assert!(result.thresholds[0].triggered);
        assert!(result.thresholds[2].triggered);
        assert!(!result.journal_entries.is_empty());
        assert!(!result.threshold_narrative.is_empty());
    }
}
