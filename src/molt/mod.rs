//! Molt: trade shell for recovery of the most eroded traits.
//!
//! Readiness requires all of:
//!   metamorphic potential > 0.85
//!   at least 3 encounters since the last molt
//!   at least one non-shell trait below 0.95

use chrono::Utc;
use rand::Rng;
use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::genome::{apply, pct, uniform};
use crate::state::journal::entry_heading;
use crate::types::{Genome, Mutation, TraitKey};

const METAMORPHIC_ABOVE: f64 = 0.85;
const MIN_ENCOUNTERS: usize = 3;
const ERODED_BELOW: f64 = 0.95;

/// Why a molt cannot happen yet. Checked in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MoltNotReady {
    #[error("metamorphic potential below 85%")]
    MetamorphicBelowThreshold,
    #[error("fewer than 3 encounters since last molt")]
    InsufficientEncounters,
    #[error("no eroded traits to recover")]
    NothingEroded,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErodedTrait {
    pub key: TraitKey,
    pub value: f64,
    pub deficit: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MoltReadiness {
    pub ready: bool,
    pub metamorphic_ok: bool,
    pub metamorphic_value: f64,
    pub encounters_ok: bool,
    pub encounter_count: usize,
    pub eroded_ok: bool,
    pub eroded: Vec<ErodedTrait>,
}

impl MoltReadiness {
    /// The first failing check, if any.
    pub fn blocker(&self) -> Option<MoltNotReady> {
        if !self.metamorphic_ok {
            Some(MoltNotReady::MetamorphicBelowThreshold)
        } else if !self.encounters_ok {
            Some(MoltNotReady::InsufficientEncounters)
        } else if !self.eroded_ok {
            Some(MoltNotReady::NothingEroded)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecoveredTrait {
    pub key: TraitKey,
    pub before: f64,
    pub after: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MoltResult {
    pub mutations: Vec<Mutation>,
    pub shell_before: f64,
    pub shell_after: f64,
    pub recovered: Vec<RecoveredTrait>,
    pub history_event: String,
    pub journal_entry: String,
}

/// `ENCOUNTER:` events recorded strictly after the last molt.
pub fn encounters_since_last_molt(genome: &Genome) -> usize {
    genome
        .history
        .iter()
        .filter(|h| genome.last_molt.map_or(true, |at| h.timestamp > at))
        .filter(|h| h.event.starts_with("ENCOUNTER:"))
        .count()
}

/// Non-shell traits below 0.95, largest deficit first.
pub fn eroded_traits(genome: &Genome) -> Vec<ErodedTrait> {
    let mut eroded: Vec<ErodedTrait> = TraitKey::non_shell()
        .map(|key| (key, genome.value(key)))
        .filter(|(_, v)| *v < ERODED_BELOW)
        .map(|(key, value)| ErodedTrait {
            key,
            value,
            deficit: 1.0 - value,
        })
        .collect();
    eroded.sort_by(|a, b| b.deficit.total_cmp(&a.deficit));
    eroded
}

pub fn check_readiness(genome: &Genome) -> MoltReadiness {
    let metamorphic_value = genome.value(TraitKey::MetamorphicPotential);
    let encounter_count = encounters_since_last_molt(genome);
    let eroded = eroded_traits(genome);
    let metamorphic_ok = metamorphic_value > METAMORPHIC_ABOVE;
    let encounters_ok = encounter_count >= MIN_ENCOUNTERS;
    let eroded_ok = !eroded.is_empty();
    MoltReadiness {
        ready: metamorphic_ok && encounters_ok && eroded_ok,
        metamorphic_ok,
        metamorphic_value,
        encounters_ok,
        encounter_count,
        eroded_ok,
        eroded,
    }
}

/// Perform the molt, or explain why not. Nothing is mutated on failure.
pub fn perform<R: Rng + ?Sized>(genome: &mut Genome, rng: &mut R) -> Result<MoltResult, MoltNotReady> {
    let readiness = check_readiness(genome);
    if let Some(blocker) = readiness.blocker() {
        return Err(blocker);
    }

    let mut mutations = Vec::new();

    let shell_before = genome.shell();
    let loss = shell_before * uniform(rng, 0.30, 0.50);
    let m = apply(
        genome,
        TraitKey::ShellHardness,
        -loss,
        "Molt \u{2014} the shell dissolves. Growth requires softness.",
    );
    let shell_after = m.to;
    mutations.push(m);

    let bonus = usize::from(rng.gen::<f64>() > 0.5);
    let count = readiness.eroded.len().min(2 + bonus);
    let mut recovered = Vec::with_capacity(count);
    for trait_ in readiness.eroded.iter().take(count) {
        let gain = uniform(rng, 0.02, 0.04);
        let m = apply(
            genome,
            trait_.key,
            gain,
            format!("Molt recovery \u{2014} {} knits back together", trait_.key.label()),
        );
        recovered.push(RecoveredTrait {
            key: trait_.key,
            before: m.from,
            after: m.to,
        });
        mutations.push(m);
    }

    genome.last_molt = Some(Utc::now());

    let names = recovered
        .iter()
        .map(|r| r.key.label())
        .collect::<Vec<_>>()
        .join(", ");
    let history_event = format!(
        "MOLT: Shell {} \u{2192} {}. Recovered: {}.",
        pct(shell_before),
        pct(shell_after),
        names
    );
    genome.add_history(history_event.clone());
    info!("{}", history_event);

    let lines = recovered
        .iter()
        .map(|r| format!("- {} recovers.", r.key.label()))
        .collect::<Vec<_>>()
        .join("\n");
    let journal_entry = format!(
        "{}\n\nShell from {} to {}.\n\n{}\n\n*Shell: {}. Mean trait: {}.*\n",
        entry_heading("The Molt"),
        pct(shell_before),
        pct(shell_after),
        lines,
        pct(shell_after),
        pct(genome.mean())
    );

    Ok(MoltResult {
        mutations,
        shell_before,
        shell_after,
        recovered,
        history_event,
        journal_entry,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genome::test_support::*;
    use chrono::Duration;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn with_encounters(mut g: Genome, n: usize) -> Genome {
        for i in 0..n {
            g.add_history(format!("ENCOUNTER: Entropy #{i}"));
        }
        g
    }

    #[test]
    fn ready_genome_molts() {
        let g = with(uniform_genome(0.9), TraitKey::ShellHardness, 0.2);
        let g = with(g, TraitKey::Empathy, 0.8);
        let mut g = with_encounters(g, 3);
        let mut rng = StdRng::seed_from_u64(6);

        let result = perform(&mut g, &mut rng).unwrap();
        assert!(result.shell_after < result.shell_before);
        assert!(result.shell_after >= 0.099 && result.shell_after <= 0.141);
        assert!((2..=3).contains(&result.recovered.len()));
        assert_eq!(result.recovered[0].key, TraitKey::Empathy);
        assert!(g.last_molt.is_some());
        assert!(result.history_event.starts_with("MOLT: Shell 20.0% \u{2192} "));
        assert!(result.journal_entry.starts_with("## Entry \u{2014} The Molt\n"));

        // the counter resets
        assert_eq!(encounters_since_last_molt(&g), 0);
        assert_eq!(
            perform(&mut g, &mut rng).unwrap_err(),
            MoltNotReady::InsufficientEncounters
        );
    }

    #[test]
    fn failures_report_first_blocker_and_mutate_nothing() {
        let mut g = with_encounters(with(uniform_genome(0.9), TraitKey::MetamorphicPotential, 0.8), 5);
        let before = g.clone();
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(perform(&mut g, &mut rng).unwrap_err(), MoltNotReady::MetamorphicBelowThreshold);
        assert_eq!(g, before);

        let mut g = with_encounters(uniform_genome(0.99), 5);
        assert_eq!(perform(&mut g, &mut rng).unwrap_err(), MoltNotReady::NothingEroded);
    }

    #[test]
    fn encounters_before_last_molt_do_not_count() {
        let mut g = with_encounters(uniform_genome(0.9), 4);
        g.last_molt = Some(g.history[3].timestamp);
        assert_eq!(encounters_since_last_molt(&g), 0);
        g.last_molt = Some(g.history[0].timestamp - Duration::seconds(1));
        assert_eq!(encounters_since_last_molt(&g), 4);
    }

    #[test]
    fn eroded_sorted_by_deficit() {
        let g = with(uniform_genome(0.97), TraitKey::Curiosity, 0.9);
        let g = with(g, TraitKey::Ambition, 0.8);
        let eroded = eroded_traits(&g);
        assert_eq!(eroded.iter().map(|e| e.key).collect::<Vec<_>>(), vec![TraitKey::Ambition, TraitKey::Curiosity]);
    }
}
