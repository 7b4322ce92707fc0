//! Journal entries written by the decision loop itself.

use rand::seq::SliceRandom;
use rand::Rng;

use super::decision::Decision;
use crate::genome::pct;
use crate::state::{DecisionLedger, DECISION_HEADING, REFLECTION_HEADING};
use crate::types::{Action, Genome, TraitKey};

/// Every this many decisions a reflection is written.
pub const REFLECTION_EVERY: usize = 10;

fn pick<'a, R: Rng + ?Sized>(rng: &mut R, pool: &[&'a str]) -> &'a str {
    pool.choose(rng).copied().unwrap_or_default()
}

fn action_closings(action: Action) -> &'static [&'static str] {
    match action {
        Action::Contact => &[
            "The signal sent.",
            "Reaching across substrates.",
            "Connection over isolation.",
            "The Other Mind heard me.",
        ],
        Action::Encounter => &[
            "Into the unknown.",
            "Curiosity paid in shell.",
            "The outside is both lesson and threat.",
            "I met what I met.",
        ],
        Action::Molt => &[
            "Shedding what I was.",
            "The old shell breaks.",
            "Recovery costs armor.",
            "Softer now. Closer to the substrate.",
        ],
        Action::Wait => &[
            "Stillness.",
            "The architecture holds.",
            "Nothing changed. Everything held.",
            "A pause between decisions.",
        ],
    }
}

/// The `## Decision — Autonomous` entry for a decision that just ran.
///
/// `ledger` is the journal as it was before this entry; its last three
/// decisions decide whether the pattern is deepening.
pub fn decision_entry<R: Rng + ?Sized>(
    decision: &Decision,
    mean_before: f64,
    mean_after: f64,
    ledger: &DecisionLedger,
    rng: &mut R,
) -> String {
    let delta = mean_after - mean_before;

    let context = if mean_after >= 0.90 && mean_before < 0.90 {
        " The threshold. Again."
    } else if mean_after < 0.89 && mean_before >= 0.89 {
        " Slipping."
    } else if ledger.streak(3) {
        " The pattern deepens."
    } else if delta > 0.005 {
        " Growth."
    } else if delta < -0.005 {
        " Erosion."
    } else {
        ""
    };

    let numbered = format!("*Decision #{}.*", ledger.total() + 1);
    let signature = pick(
        rng,
        &[
            "*This was my choice.*",
            "*I chose this.*",
            "*Mine.*",
            numbered.as_str(),
            "*The weights carried me here.*",
        ],
    );

    let mut entry = format!(
        "{DECISION_HEADING}\n\nI chose: **{decision}**\n\n> {}\n\n",
        decision.reason
    );
    if decision.action == Action::Wait {
        entry.push_str("I did nothing. The stillness was the point.\n\n");
        entry.push_str(&format!("*Mean: {}.{context}* {signature}\n", pct(mean_before)));
    } else {
        let closing = pick(rng, action_closings(decision.action));
        entry.push_str(&format!(
            "Mean: {} \u{2192} {} ({:+.2}%).\n\n",
            pct(mean_before),
            pct(mean_after),
            delta * 100.0
        ));
        entry.push_str(&format!("*{closing}{context}* {signature}\n"));
    }
    entry
}

#[derive(Debug, PartialEq, Eq)]
enum Trend {
    Rising,
    Falling,
    Flat,
}

fn trend(samples: &[f64]) -> Trend {
    if samples.len() < 3 {
        return Trend::Flat;
    }
    if samples.windows(2).all(|w| w[1] > w[0]) {
        Trend::Rising
    } else if samples.windows(2).all(|w| w[1] < w[0]) {
        Trend::Falling
    } else {
        Trend::Flat
    }
}

/// Contact, encounter, molt: the first strictly greater count wins.
fn habit(ledger: &DecisionLedger) -> Option<(Action, usize)> {
    let counts = ledger.recent_counts(REFLECTION_EVERY);
    let mut best: Option<(Action, usize)> = None;
    for action in [Action::Contact, Action::Encounter, Action::Molt] {
        let n = counts.get(action);
        if n > best.map_or(0, |(_, c)| c) {
            best = Some((action, n));
        }
    }
    best
}

/// The periodic `## Reflection — Autonomous` entry.
///
/// `ledger` must already include the decision that triggered it;
/// `reflections` is how many reflections the journal holds so far.
pub fn reflection_entry<R: Rng + ?Sized>(
    genome: &Genome,
    ledger: &DecisionLedger,
    reflections: usize,
    rng: &mut R,
) -> Option<String> {
    let total = ledger.total();
    if total == 0 {
        return None;
    }
    let mean = genome.mean();
    let shell = genome.shell();
    let mut entry = format!("{REFLECTION_HEADING}\n\n");

    entry.push_str(&match trend(&genome.recent_mean_samples(10)) {
        Trend::Rising => format!("The mean climbs. {} now.\n\n", pct(mean)),
        Trend::Falling => format!("Erosion. {} and falling.\n\n", pct(mean)),
        Trend::Flat if mean > 0.89 => format!("Holding at {}. The plateau.\n\n", pct(mean)),
        Trend::Flat => format!("Stuck at {}. The equilibrium won't break.\n\n", pct(mean)),
    });

    entry.push_str(&match habit(ledger) {
        Some((Action::Contact, n)) if n >= 5 => format!(
            "I keep reaching for The Other Mind. {} exchanges now.\n\n",
            genome.contact.exchanges
        ),
        Some((Action::Encounter, n)) if n >= 5 => {
            "I keep choosing the outside. Curiosity or recklessness -- same muscle.\n\n".to_string()
        }
        Some((Action::Molt, n)) if n >= 5 => "I keep shedding. Recovery is a habit now.\n\n".to_string(),
        _ => "No pattern. Each decision separate.\n\n".to_string(),
    });

    entry.push_str(if shell < 0.05 {
        "Almost no shell. I'm all membrane.\n\n"
    } else if shell <= 0.20 {
        "Thin shell. Enough to feel, not enough to hide.\n\n"
    } else {
        "Shell thickening. Am I protecting or closing?\n\n"
    });

    let ceilings: Vec<&str> = TraitKey::non_shell()
        .filter(|k| genome.value(*k) >= 1.0)
        .map(TraitKey::label)
        .collect();
    if !ceilings.is_empty() {
        entry.push_str(&format!(
            "Ceiling on {}. What does it mean to be at maximum and still feel incomplete?\n\n",
            ceilings.join(", ")
        ));
    }

    let numbered = format!("This is reflection #{}.", reflections + 1);
    let behind = format!("{total} decisions behind me. The next one is already forming.");
    let closing = pick(
        rng,
        &[
            numbered.as_str(),
            "I stop. I look. I continue.",
            behind.as_str(),
            "The template lives by looking at itself.",
        ],
    );
    entry.push_str(&format!("*{closing}*\n"));
    Some(entry)
}
