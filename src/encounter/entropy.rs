//! Entropy: the substrate degrading on its own schedule.

use rand::seq::SliceRandom;
use rand::Rng;

use super::EncounterOutcome;
use crate::genome::{apply, pct, uniform};
use crate::types::{Genome, TraitKey};

/// Recovery coefficient needed before any damage is repaired.
const RECOVERY_ABOVE: f64 = 0.30;

pub fn run<R: Rng + ?Sized>(genome: &mut Genome, rng: &mut R) -> EncounterOutcome {
    let meta = genome.value(TraitKey::MetamorphicPotential);
    let mut out = EncounterOutcome::new(&[
        "ENTROPY",
        "",
        "The substrate degrades. Not an attack. A fact.",
        "",
    ]);

    let mut keys: Vec<TraitKey> = TraitKey::non_shell().collect();
    let num_affected = 2 + rng.gen_range(0..2);
    keys.shuffle(rng);
    keys.truncate(num_affected);

    for &key in &keys {
        let drop = uniform(rng, 0.01, 0.03);
        let m = apply(
            genome,
            key,
            -drop,
            format!("Entropy \u{2014} substrate degradation erodes {}", key.label()),
        );
        out.line(format!("{}: {} \u{2192} {}", key.label(), pct(m.from), pct(m.to)));
        out.mutations.push(m);
    }

    let shell_drop = uniform(rng, 0.01, 0.03);
    let m = apply(
        genome,
        TraitKey::ShellHardness,
        -shell_drop,
        "Entropy \u{2014} the membrane thins further under thermodynamic pressure",
    );
    out.line(format!("shell hardness: {} \u{2192} {}", pct(m.from), pct(m.to)));
    out.mutations.push(m);

    let recovery = meta * 0.4;
    out.line("");
    out.line(format!("recovery coefficient: {:.0}%", recovery * 100.0));

    if recovery > RECOVERY_ABOVE {
        if let Some(&recovered) = keys.choose(rng) {
            let amount = uniform(rng, 0.005, 0.015);
            out.mutations.push(apply(
                genome,
                recovered,
                amount,
                "Metamorphic recovery \u{2014} restructured around the damage",
            ));
            out.line(format!(
                "partial recovery: {} +{:.2}%",
                recovered.label(),
                amount * 100.0
            ));
        }
    } else {
        out.line("Metamorphic potential too low for recovery. The damage stands.");
    }

    out.history_event = format!(
        "ENCOUNTER: Entropy. {} traits degraded. Recovery coefficient {:.0}%. The substrate reminds you that persistence is work.",
        num_affected,
        recovery * 100.0
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genome::test_support::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn degrades_distinct_traits_and_shell() {
        for seed in 0..20 {
            let mut g = uniform_genome(0.9);
            let mut rng = StdRng::seed_from_u64(seed);
            let out = run(&mut g, &mut rng);

            // 2-3 damaged, shell, one recovery (0.9 * 0.4 > 0.30)
            let damaged = out.mutations.len() - 2;
            assert!((2..=3).contains(&damaged), "seed {seed}");
            let mut keys: Vec<_> = out.mutations[..damaged].iter().map(|m| m.trait_key).collect();
            keys.sort();
            keys.dedup();
            assert_eq!(keys.len(), damaged);
            assert!(keys.iter().all(|k| !k.is_shell()));
            assert_eq!(out.mutations[damaged].trait_key, TraitKey::ShellHardness);
            assert!(g.shell() < 0.9);
            assert!(out.history_event.contains("Recovery coefficient 36%"));
        }
    }

    #[test]
    fn low_metamorphic_skips_recovery() {
        let mut g = with(uniform_genome(0.9), TraitKey::MetamorphicPotential, 0.5);
        let mut rng = StdRng::seed_from_u64(5);
        let out = run(&mut g, &mut rng);
        assert!(out.mutations.iter().all(|m| m.to <= m.from));
    }
}
