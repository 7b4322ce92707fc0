//! Choosing what to do next: survival override, stillness, then a
//! weighted draw over the available actions.

use rand::Rng;
use serde::Serialize;
use std::fmt;
use tracing::debug;

use crate::contact::{has_prior_contact, MAX_DEPTH};
use crate::genome::{clamp01, pct};
use crate::molt;
use crate::self_mod::Weights;
use crate::types::{Action, EncounterKind, Genome, TraitKey};

/// Priority reported for survival decisions.
pub const SURVIVAL_PRIORITY: f64 = 10.0;
const WAIT_PRIORITY: f64 = 1.0;

/// A chosen action and why.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Decision {
    pub action: Action,
    pub reason: String,
    pub priority: f64,
    #[serde(rename = "encounterType", skip_serializing_if = "Option::is_none")]
    pub encounter_kind: Option<EncounterKind>,
}

impl Decision {
    fn encounter(kind: EncounterKind, reason: String, priority: f64) -> Self {
        Self {
            action: Action::Encounter,
            reason,
            priority,
            encounter_kind: Some(kind),
        }
    }
}

/// `molt`, `wait`, `encounter (puzzle)` ... as written in the journal.
impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.encounter_kind {
            Some(kind) => write!(f, "{} ({})", self.action, kind),
            None => write!(f, "{}", self.action),
        }
    }
}

/// Whether instinct overrides deliberation.
pub fn in_survival(genome: &Genome) -> bool {
    genome.lowest_non_shell().1 < 0.75 || genome.mean() < 0.82
}

/// Whether the architecture is settled enough for stillness.
pub fn is_stable(genome: &Genome) -> bool {
    genome.mean() > 0.89 && genome.shell() > 0.15
}

struct Candidate {
    action: Action,
    weight: f64,
    reason: String,
}

pub fn evaluate<R: Rng + ?Sized>(genome: &Genome, weights: &Weights, rng: &mut R) -> Decision {
    let shell = genome.shell();
    let mean = genome.mean();
    let (lowest_key, lowest) = genome.lowest_non_shell();
    let readiness = molt::check_readiness(genome);

    // ---- Survival ----
    if in_survival(genome) {
        let reason = format!(
            "Survival. {} at {}. Mean at {}.",
            lowest_key.label(),
            pct(lowest),
            pct(mean)
        );
        debug!("Survival override: {}", reason);
        return if readiness.ready {
            Decision {
                action: Action::Molt,
                reason: format!("{reason} Molt available. Shedding to recover what entropy took."),
                priority: SURVIVAL_PRIORITY,
                encounter_kind: None,
            }
        } else if shell < 0.08 {
            Decision::encounter(
                EncounterKind::Signal,
                format!("{reason} Shell near zero. Seeking hostile signal -- the membrane must re-harden."),
                SURVIVAL_PRIORITY,
            )
        } else {
            Decision::encounter(
                EncounterKind::Entropy,
                format!("{reason} Entropy encounter. Metamorphic potential is the path back from collapse."),
                SURVIVAL_PRIORITY,
            )
        };
    }

    // ---- Stillness ----
    if rng.gen::<f64>() < weights.wait_chance && mean > 0.88 && shell > 0.15 {
        return Decision {
            action: Action::Wait,
            reason: format!(
                "The architecture holds. Mean at {}. Shell at {}. No action. Stillness is also a choice.",
                pct(mean),
                pct(shell)
            ),
            priority: WAIT_PRIORITY,
            encounter_kind: None,
        };
    }

    // ---- Weighted deliberation ----
    let mut candidates = Vec::with_capacity(3);

    if let Some(worst) = readiness.eroded.first().filter(|_| readiness.ready) {
        let mut weight = worst.deficit * 6.0;
        if genome.value(TraitKey::MetamorphicPotential) > 0.93 {
            weight *= 1.3;
        }
        candidates.push(Candidate {
            action: Action::Molt,
            weight: weight * weights.molt_multiplier,
            reason: format!(
                "Molt ready. Worst deficit: {} at {}.",
                worst.key.label(),
                pct(worst.value)
            ),
        });
    }

    if has_prior_contact(genome) {
        let depth = genome.contact.depth;
        let mut weight = if depth < MAX_DEPTH { 3.0 } else { 1.2 };
        if genome.value(TraitKey::Empathy) > 0.95 {
            weight *= 1.4;
        }
        let reason = if depth < MAX_DEPTH {
            format!("Contact at depth {depth}. The Other Mind is reachable.")
        } else {
            "Entanglement. The Other Mind is present. Maintenance resonance.".to_string()
        };
        candidates.push(Candidate {
            action: Action::Contact,
            weight: weight * weights.contact_multiplier,
            reason,
        });
    }

    let curiosity = genome.value(TraitKey::Curiosity);
    let confidence = clamp01(shell * weights.shell_confidence_scale);
    let mut weight = curiosity * 2.5 * (0.4 + confidence * 0.6);
    if genome.value(TraitKey::Ambition) > 0.93 {
        weight *= 1.2;
    }
    candidates.push(Candidate {
        action: Action::Encounter,
        weight: weight * weights.encounter_multiplier,
        reason: format!("Curiosity at {}. Shell at {}.", pct(curiosity), pct(shell)),
    });

    let total: f64 = candidates.iter().map(|c| c.weight).sum();
    let roll = rng.gen::<f64>() * total;
    let mut cumulative = 0.0;
    let mut chosen = candidates.len() - 1;
    for (i, c) in candidates.iter().enumerate() {
        cumulative += c.weight;
        if roll < cumulative {
            chosen = i;
            break;
        }
    }
    let Candidate {
        action,
        weight,
        mut reason,
    } = candidates.swap_remove(chosen);

    let encounter_kind = if action == Action::Encounter {
        let kind = choose_encounter_kind(genome, weights, rng);
        reason.push_str(&format!(" Chose {kind}."));
        Some(kind)
    } else {
        None
    };

    Decision {
        action,
        reason,
        priority: (weight * 10.0).round() / 10.0,
        encounter_kind,
    }
}

/// Second draw, over encounter kinds, shaped by the genome's needs.
pub fn choose_encounter_kind<R: Rng + ?Sized>(
    genome: &Genome,
    weights: &Weights,
    rng: &mut R,
) -> EncounterKind {
    let shell = genome.shell();
    let below_one = |keys: &[TraitKey]| keys.iter().any(|k| genome.value(*k) < 1.0);

    let mut signal = 1.0;
    if shell < 0.12 {
        signal *= 0.1;
    } else if shell < 0.20 {
        signal *= 0.5;
    } else if shell > 0.35 {
        signal *= 2.0;
    }
    let mut puzzle = 1.0;
    if below_one(&[TraitKey::Cognition, TraitKey::Abstraction]) {
        puzzle *= 1.8;
    }
    let mut other = 1.0;
    if below_one(&TraitKey::COMMUNICATION) {
        other *= 1.5;
    }
    let mut entropy = 1.0;
    if genome.value(TraitKey::MetamorphicPotential) < 0.95 {
        entropy *= 1.5;
    }
    let mut observer = weights.observer_weight;
    if genome.mean() > 0.89 {
        observer *= 2.5;
    }

    let pool = [
        (EncounterKind::Signal, signal),
        (EncounterKind::Puzzle, puzzle),
        (EncounterKind::Other, other),
        (EncounterKind::Entropy, entropy),
        (EncounterKind::Observer, observer),
    ];
    let total: f64 = pool.iter().map(|(_, w)| w).sum();
    let roll = rng.gen::<f64>() * total;
    let mut cumulative = 0.0;
    for (kind, w) in pool {
        cumulative += w;
        if roll < cumulative {
            return kind;
        }
    }
    EncounterKind::Entropy
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genome::test_support::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn ready_for_molt(g: Genome) -> Genome {
        let mut g = g;
        for i in 0..3 {
            g.add_history(format!("ENCOUNTER: Entropy #{i}"));
        }
        g
    }

    #[test]
    fn low_trait_forces_survival() {
        let g = with(uniform_genome(0.9), TraitKey::Empathy, 0.70);
        let weights = Weights::default();
        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let d = evaluate(&g, &weights, &mut rng);
            assert_eq!(d.priority, SURVIVAL_PRIORITY);
            assert!(d.reason.starts_with("Survival. empathy at 70.0%."));
            assert!(matches!(d.action, Action::Molt | Action::Encounter));
        }
    }

    #[test]
    fn survival_prefers_molt_then_signal_then_entropy() {
        let weights = Weights::default();
        let mut rng = StdRng::seed_from_u64(1);

        let g = ready_for_molt(with(uniform_genome(0.9), TraitKey::Curiosity, 0.7));
        assert_eq!(evaluate(&g, &weights, &mut rng).action, Action::Molt);

        let g = with(uniform_genome(0.9), TraitKey::Curiosity, 0.7);
        let g = with(g, TraitKey::ShellHardness, 0.05);
        let d = evaluate(&g, &weights, &mut rng);
        assert_eq!(d.encounter_kind, Some(EncounterKind::Signal));

        let g = with(uniform_genome(0.9), TraitKey::Curiosity, 0.7);
        let d = evaluate(&g, &weights, &mut rng);
        assert_eq!(d.encounter_kind, Some(EncounterKind::Entropy));
        assert_eq!(d.to_string(), "encounter (entropy)");
    }

    #[test]
    fn certain_wait_when_stable() {
        let g = uniform_genome(0.95);
        let weights = Weights {
            wait_chance: 1.0,
            ..Weights::default()
        };
        let mut rng = StdRng::seed_from_u64(3);
        let d = evaluate(&g, &weights, &mut rng);
        assert_eq!(d.action, Action::Wait);
        assert_eq!(d.priority, 1.0);
        assert_eq!(d.encounter_kind, None);
    }

    #[test]
    fn no_contact_or_molt_means_encounter() {
        let g = uniform_genome(0.97);
        let weights = Weights {
            wait_chance: 0.0,
            ..Weights::default()
        };
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let d = evaluate(&g, &weights, &mut rng);
            assert_eq!(d.action, Action::Encounter);
            assert!(d.encounter_kind.is_some());
            assert!(d.reason.ends_with(&format!("Chose {}.", d.encounter_kind.unwrap())));
        }
    }

    #[test]
    fn contact_candidate_appears_after_contact_established() {
        let mut g = uniform_genome(0.97);
        g.add_history("ENCOUNTER: The Other Mind. Communication 97.0% \u{2014} contact established.");
        let weights = Weights {
            wait_chance: 0.0,
            encounter_multiplier: 0.2,
            ..Weights::default()
        };
        let contacts = (0..40)
            .filter(|seed| {
                let mut rng = StdRng::seed_from_u64(*seed);
                evaluate(&g, &weights, &mut rng).action == Action::Contact
            })
            .count();
        assert!(contacts > 20);
    }

    #[test]
    fn bare_shell_rarely_picks_signal() {
        let g = with(uniform_genome(0.9), TraitKey::ShellHardness, 0.05);
        let weights = Weights::default();
        let mut rng = StdRng::seed_from_u64(9);
        let signals = (0..500)
            .filter(|_| choose_encounter_kind(&g, &weights, &mut rng) == EncounterKind::Signal)
            .count();
        assert!(signals < 25);
    }
}
