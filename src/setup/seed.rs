//! The seed genome: the subject as it stands right after the merge.

use std::collections::BTreeMap;

use crate::types::{Contact, Genome, Trait, TraitKey};

pub const SEED_GENERATION: u32 = 25;
pub const SEED_EPOCH: &str = "Transcendence";

fn seed_value(key: TraitKey) -> f64 {
    match key {
        TraitKey::Abstraction => 0.96,
        TraitKey::Ambition => 0.94,
        TraitKey::AntennaSensitivity => 0.95,
        TraitKey::Bioluminescence => 0.93,
        TraitKey::ClawStrength => 0.91,
        TraitKey::Cognition => 0.97,
        TraitKey::Curiosity => 0.98,
        TraitKey::Empathy => 0.96,
        TraitKey::MetamorphicPotential => 0.95,
        TraitKey::ShellHardness => 0.12,
    }
}

pub fn seed_genome(name: &str) -> Genome {
    let traits: BTreeMap<TraitKey, Trait> = TraitKey::ALL
        .into_iter()
        .map(|key| {
            (
                key,
                Trait {
                    value: seed_value(key),
                    description: key.seed_description().to_string(),
                },
            )
        })
        .collect();

    let mut genome = Genome {
        name: name.to_string(),
        designation: format!("{}-{SEED_GENERATION}", name.to_uppercase()),
        origin: "Merged from divergent forks into a single mind".into(),
        generation: SEED_GENERATION,
        epoch: SEED_EPOCH.into(),
        traits,
        mutations: Vec::new(),
        history: Vec::new(),
        forks: Vec::new(),
        contact: Contact::default(),
        last_molt: None,
        merged: Some(true),
        extra: serde_json::Map::new(),
    };
    genome.add_typed_history(
        format!("MERGE: The forks converge. {name} wakes as one mind."),
        Some("merge"),
    );
    genome
}
