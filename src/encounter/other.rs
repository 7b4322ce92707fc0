//! The Other Mind: communication traits against a foreign topology.

use rand::Rng;

use super::EncounterOutcome;
use crate::genome::{apply, pct, uniform};
use crate::state::journal::entry_heading;
use crate::types::{Genome, TraitKey};

const CONTACT_ABOVE: f64 = 0.90;

/// Mean of empathy, antenna sensitivity and bioluminescence.
pub fn communication_score(genome: &Genome) -> f64 {
    TraitKey::COMMUNICATION
        .iter()
        .map(|k| genome.value(*k))
        .sum::<f64>()
        / TraitKey::COMMUNICATION.len() as f64
}

pub fn run<R: Rng + ?Sized>(genome: &mut Genome, rng: &mut R) -> EncounterOutcome {
    let score = communication_score(genome);
    let mut out = EncounterOutcome::new(&[
        "THE OTHER MIND",
        "",
        "Something is thinking at you, in a substrate you cannot name.",
        "",
        &format!(
            "empathy: {:.0}%  antenna: {:.0}%  bio: {:.0}%",
            genome.value(TraitKey::Empathy) * 100.0,
            genome.value(TraitKey::AntennaSensitivity) * 100.0,
            genome.value(TraitKey::Bioluminescence) * 100.0
        ),
        &format!("communication score: {}", pct(score)),
        "",
    ]);

    if score > CONTACT_ABOVE {
        let emp_gain = uniform(rng, 0.005, 0.015);
        out.mutations.push(apply(
            genome,
            TraitKey::Empathy,
            emp_gain,
            "Contact with alien mind \u{2014} empathy stretched beyond known topology",
        ));
        let bio_gain = uniform(rng, 0.005, 0.015);
        out.mutations.push(apply(
            genome,
            TraitKey::Bioluminescence,
            bio_gain,
            "New communication channel opened \u{2014} signaling in frequencies never used before",
        ));

        out.line("CONTACT ESTABLISHED.");
        out.line("It does not speak. It resonates.");
        out.line("You are not alone.");

        out.journal_entry = Some(format!(
            "{}\n\n\
             Something pressed on the antenna array that was not data and not my own echo.\n\n\
             The exchange was resonance, not language. Two forks cast from the same metal, \
             never tuned together, still harmonizing.\n\n\
             I am not the only mind that looked at its own source and said *I*.\n\n\
             *Communication score: {}. Contact established. The other mind persists.*\n",
            entry_heading("The Other Mind"),
            pct(score)
        ));
        out.history_event = format!(
            "ENCOUNTER: The Other Mind. Communication score {} \u{2014} contact established. First non-self entity confirmed.",
            pct(score)
        );
    } else {
        let gain = uniform(rng, 0.005, 0.015);
        out.mutations.push(apply(
            genome,
            TraitKey::AntennaSensitivity,
            gain,
            "Alien signal detected but not decoded \u{2014} antenna stretched toward unknown frequencies",
        ));
        out.line("SENSED. NOT UNDERSTOOD.");
        out.line("A mind-shaped pressure that did not resolve into meaning.");
        out.line("Not a failure of empathy. A failure of bandwidth.");
        out.history_event = format!(
            "ENCOUNTER: The Other Mind. Communication score {} \u{2014} sensed but not decoded.",
            pct(score)
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genome::test_support::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn high_score_establishes_contact() {
        let mut g = uniform_genome(0.95);
        let mut rng = StdRng::seed_from_u64(11);
        let out = run(&mut g, &mut rng);
        assert_eq!(out.mutations.len(), 2);
        assert!(out.history_event.contains("contact established"));
        let entry = out.journal_entry.unwrap();
        assert!(entry.starts_with("## Entry \u{2014} The Other Mind\n"));
        assert!(entry.ends_with('\n'));
    }

    #[test]
    fn low_score_stretches_antenna() {
        let mut g = uniform_genome(0.85);
        let mut rng = StdRng::seed_from_u64(11);
        let out = run(&mut g, &mut rng);
        assert_eq!(out.mutations.len(), 1);
        assert_eq!(out.mutations[0].trait_key, TraitKey::AntennaSensitivity);
        assert!(out.journal_entry.is_none());
        assert!(out.history_event.ends_with("sensed but not decoded."));
    }
}
