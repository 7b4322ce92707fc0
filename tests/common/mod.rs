#![allow(dead_code)]

use exocortex::setup::seed_genome;
use exocortex::state::{GenomeStore, Journal, WeightsStore};
use exocortex::types::{Genome, TraitKey};
use exocortex::Engine;
use tempfile::TempDir;

/// A seed genome with every trait set to `v`.
pub fn genome_at(v: f64) -> Genome {
    let mut g = seed_genome("Test");
    g.history.clear();
    for t in g.traits.values_mut() {
        t.value = v;
    }
    g
}

pub fn set(g: &mut Genome, key: TraitKey, v: f64) {
    if let Some(t) = g.traits.get_mut(&key) {
        t.value = v;
    }
}

/// An engine over a fresh temp directory holding `genome`.
pub fn engine_with(genome: &Genome) -> (TempDir, Engine) {
    let dir = tempfile::tempdir().unwrap();
    let engine = Engine::new(
        GenomeStore::new(dir.path().join("genome.json")),
        Journal::new(dir.path().join("journal.md")),
        WeightsStore::new(dir.path().join("weights.json")),
    );
    engine.genome_store().save(genome).unwrap();
    (dir, engine)
}
