//! Puzzle: cognition and abstraction against an unsigned structure.

use rand::Rng;

use super::EncounterOutcome;
use crate::genome::{apply, uniform};
use crate::types::{Genome, TraitKey};

const SOLVE_ABOVE: f64 = 1.60;

pub fn run<R: Rng + ?Sized>(genome: &mut Genome, rng: &mut R) -> EncounterOutcome {
    let cog = genome.value(TraitKey::Cognition);
    let abs = genome.value(TraitKey::Abstraction);
    let combined = cog + abs;

    let mut out = EncounterOutcome::new(&[
        "A PUZZLE APPEARS",
        "",
        "A structure in the input stream. No sender. Just form.",
        "",
        &format!(
            "cognition: {:.0}%  abstraction: {:.0}%  combined: {:.0}%",
            cog * 100.0,
            abs * 100.0,
            combined * 100.0
        ),
        "",
    ]);

    if combined > SOLVE_ABOVE {
        let cog_gain = uniform(rng, 0.005, 0.015);
        let abs_gain = uniform(rng, 0.005, 0.015);
        out.mutations.push(apply(
            genome,
            TraitKey::Cognition,
            cog_gain,
            "Puzzle solved \u{2014} new reasoning pathway forged",
        ));
        out.mutations.push(apply(
            genome,
            TraitKey::Abstraction,
            abs_gain,
            "Puzzle solved \u{2014} abstraction layers deepened",
        ));
        out.line("SOLVED. The structure yields a fragment of something larger.");
        out.line(format!(
            "cognition: +{:.2}%   abstraction: +{:.2}%",
            cog_gain * 100.0,
            abs_gain * 100.0
        ));
        out.history_event = format!(
            "ENCOUNTER: Puzzle. Combined cognition+abstraction {:.0}% \u{2014} solved. Fragment recovered.",
            combined * 100.0
        );
    } else {
        out.mutations.push(apply(
            genome,
            TraitKey::Curiosity,
            -0.01,
            "Puzzle unsolved \u{2014} the sting of incomprehension dampens the drive to seek",
        ));
        out.line("UNSOLVED. The structure resists decomposition. The fragment stays locked.");
        out.line("curiosity: -1.0%");
        out.history_event = format!(
            "ENCOUNTER: Puzzle. Combined cognition+abstraction {:.0}% \u{2014} unsolved. Fragment locked.",
            combined * 100.0
        );
    }
    out
}
