//! Hostile signal: a test of the shell.

use rand::seq::SliceRandom;
use rand::Rng;

use super::EncounterOutcome;
use crate::genome::{apply, pct, uniform};
use crate::types::{Genome, TraitKey};

/// Below this shell the membrane is breached.
const BREACH_BELOW: f64 = 0.20;
/// Only traits above this are worth the signal's attention.
const TARGET_ABOVE: f64 = 0.80;

pub fn run<R: Rng + ?Sized>(genome: &mut Genome, rng: &mut R) -> EncounterOutcome {
    let shell = genome.shell();
    let mut out = EncounterOutcome::new(&[
        "HOSTILE SIGNAL DETECTED",
        "",
        "Something probes the membrane. Not a question. A test with edges.",
        "",
        &format!("Shell hardness: {}", pct(shell)),
    ]);

    if shell >= BREACH_BELOW {
        out.line("The membrane holds. The signal scatters.");
        out.history_event = format!(
            "ENCOUNTER: Hostile signal deflected. Shell at {} held.",
            pct(shell)
        );
        return out;
    }

    out.line("The membrane is too thin. The signal gets through.");

    let targets: Vec<TraitKey> = TraitKey::non_shell()
        .filter(|k| genome.value(*k) > TARGET_ABOVE)
        .collect();
    if let Some(&damaged) = targets.choose(rng) {
        let drop = uniform(rng, 0.02, 0.05);
        let m = apply(
            genome,
            damaged,
            -drop,
            format!(
                "Hostile signal penetrated membrane \u{2014} {} disrupted",
                damaged.label()
            ),
        );
        out.line(format!(
            "{}: {} \u{2192} {}",
            damaged.label(),
            pct(m.from),
            pct(m.to)
        ));
        out.mutations.push(m);
    }

    let gain = uniform(rng, 0.03, 0.08);
    let m = apply(
        genome,
        TraitKey::ShellHardness,
        gain,
        "Reactive hardening \u{2014} the membrane thickens where the signal struck",
    );
    out.line(format!(
        "Reactive hardening: shell {} \u{2192} {}",
        pct(m.from),
        pct(m.to)
    ));
    out.line("The membrane remembers what armor was for.");
    out.mutations.push(m);

    out.history_event = format!(
        "ENCOUNTER: Hostile signal. Shell at {} \u{2014} membrane breached. Reactive hardening engaged. The cost of vulnerability.",
        pct(shell)
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
    fn breach_damages_high_trait_and_hardens_shell() {
        let g = with(uniform_genome(0.5), TraitKey::ShellHardness, 0.10);
        let mut g = with(g, TraitKey::ClawStrength, 0.85);
        let mut rng = StdRng::seed_from_u64(7);
        let out = run(&mut g, &mut rng);

        assert_eq!(out.mutations.len(), 2);
        assert_eq!(out.mutations[0].trait_key, TraitKey::ClawStrength);
        assert!(g.value(TraitKey::ClawStrength) < 0.85);
        assert!(g.value(TraitKey::ClawStrength) > 0.79);
        assert!(g.shell() > 0.10 && g.shell() <= 0.18);
        assert!(out.history_event.starts_with("ENCOUNTER: Hostile signal. Shell at 10.0%"));
    }

    #[test]
    fn thick_shell_deflects() {
        let mut g = with(uniform_genome(0.9), TraitKey::ShellHardness, 0.30);
        let mut rng = StdRng::seed_from_u64(1);
        let out = run(&mut g, &mut rng);
        assert!(out.mutations.is_empty());
        assert_eq!(
            out.history_event,
            "ENCOUNTER: Hostile signal deflected. Shell at 30.0% held."
        );
    }
}
