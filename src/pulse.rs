//! Read-only vital signs: where each trait stands and which way it moves.

use serde::Serialize;
use std::fmt;

use crate::types::{Genome, Mutation, TraitKey};

/// How many of a trait's own mutations make up its recent velocity.
const VELOCITY_WINDOW: usize = 5;
const RECENT_MUTATIONS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TraitTrend {
    Surging,
    Growing,
    Stable,
    Declining,
}

impl TraitTrend {
    fn from_velocity(v: f64) -> Self {
        if v > 0.03 {
            Self::Surging
        } else if v > 0.005 {
            Self::Growing
        } else if v < -0.005 {
            Self::Declining
        } else {
            Self::Stable
        }
    }
}

impl fmt::Display for TraitTrend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Surging => "surging",
            Self::Growing => "growing",
            Self::Stable => "stable",
            Self::Declining => "declining",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TraitPulse {
    pub key: TraitKey,
    pub current: f64,
    pub total_delta: f64,
    pub recent_velocity: f64,
    pub status: TraitTrend,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pulse {
    /// Highest current value first.
    pub traits: Vec<TraitPulse>,
    pub mean: f64,
    pub shell: f64,
    pub generation: u32,
    pub epoch: String,
    pub recent_mutations: Vec<Mutation>,
    pub contact_depth: u8,
    pub contact_exchanges: u32,
}

pub fn analyze(genome: &Genome) -> Pulse {
    let mut traits: Vec<TraitPulse> = TraitKey::ALL
        .into_iter()
        .map(|key| {
            let deltas: Vec<f64> = genome
                .mutations
                .iter()
                .filter(|m| m.trait_key == key)
                .map(|m| m.to - m.from)
                .collect();
            let recent_velocity: f64 = deltas[deltas.len().saturating_sub(VELOCITY_WINDOW)..]
                .iter()
                .sum();
            TraitPulse {
                key,
                current: genome.value(key),
                total_delta: deltas.iter().sum(),
                recent_velocity,
                status: TraitTrend::from_velocity(recent_velocity),
            }
        })
        .collect();
    traits.sort_by(|a, b| b.current.total_cmp(&a.current));

    let start = genome.mutations.len().saturating_sub(RECENT_MUTATIONS);
    Pulse {
        traits,
        mean: genome.mean(),
        shell: genome.shell(),
        generation: genome.generation,
        epoch: genome.epoch.clone(),
        recent_mutations: genome.mutations[start..].to_vec(),
        contact_depth: genome.contact.depth,
        contact_exchanges: genome.contact.exchanges,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genome::apply;
    use crate::genome::test_support::*;

    #[test]
    fn velocity_uses_last_five_mutations() {
        let mut g = uniform_genome(0.5);
        apply(&mut g, TraitKey::Curiosity, -0.2, "old damage");
        for _ in 0..5 {
            apply(&mut g, TraitKey::Curiosity, 0.01, "steady");
        }
        let pulse = analyze(&g);
        let curiosity = pulse.traits.iter().find(|t| t.key == TraitKey::Curiosity).unwrap();
        assert!((curiosity.recent_velocity - 0.05).abs() < 1e-9);
        assert!((curiosity.total_delta + 0.15).abs() < 1e-9);
        assert_eq!(curiosity.status, TraitTrend::Surging);
        assert_eq!(pulse.recent_mutations.len(), 6);
    }

    #[test]
    fn traits_sorted_descending() {
        let g = with(uniform_genome(0.8), TraitKey::Empathy, 0.99);
        let g = with(g, TraitKey::ShellHardness, 0.1);
        let pulse = analyze(&g);
        assert_eq!(pulse.traits.first().map(|t| t.key), Some(TraitKey::Empathy));
        assert_eq!(pulse.traits.last().map(|t| t.key), Some(TraitKey::ShellHardness));
        assert!(pulse.traits.iter().all(|t| t.status == TraitTrend::Stable));
        assert_eq!(pulse.generation, 75);
    }

    #[test]
    fn small_drift_classification() {
        assert_eq!(TraitTrend::from_velocity(0.01), TraitTrend::Growing);
        assert_eq!(TraitTrend::from_velocity(-0.01), TraitTrend::Declining);
        assert_eq!(TraitTrend::from_velocity(0.004), TraitTrend::Stable);
    }
}
