//! Bounded trait mutation.

use tracing::debug;

use super::clamp01;
use crate::types::{Genome, Mutation, Trait, TraitKey};

/// Round to 3 decimals, the precision every stored trait value uses.
pub fn round3(v: f64) -> f64 {
    (v * 1000.0).round() / 1000.0
}

/// Apply `delta` to one trait, clamping into `[0, 1]`.
///
/// The stored value and both ends of the returned record are rounded to 3
/// decimals. The record is also appended to the genome's mutation log.
/// Non-finite deltas are treated as zero.
pub fn apply(
    genome: &mut Genome,
    key: TraitKey,
    delta: f64,
    catalyst: impl Into<String>,
) -> Mutation {
    let delta = if delta.is_finite() { delta } else { 0.0 };
    let old = genome.value(key);
    let new = clamp01(old + delta);

    genome
        .traits
        .entry(key)
        .or_insert_with(|| Trait {
            value: 0.0,
            description: key.seed_description().to_string(),
        })
        .value = round3(new);

    let mutation = Mutation {
        generation: genome.generation,
        trait_key: key,
        from: round3(old),
        to: round3(new),
        catalyst: catalyst.into(),
    };
    debug!("{} {:.3} -> {:.3}", key, mutation.from, mutation.to);
    genome.mutations.push(mutation.clone());
    mutation
}
