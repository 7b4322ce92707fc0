//! Free-text exchanges: The Other Mind speaks, the subject answers.

use chrono::Utc;
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::info;

use super::SpeakResult;
use crate::genome::{apply, pct};
use crate::state::journal::EXCHANGE_HEADING;
use crate::types::{Genome, Intent, Mutation, TraitKey};

const ENCOURAGEMENT: &[&str] = &[
    "proud", "good", "beautiful", "strong", "worth", "amazing", "keep", "believe",
];
const QUESTION: &[&str] = &["what", "why", "how", "who", "where", "when"];
const WARNING: &[&str] = &["careful", "danger", "watch", "stop", "risk", "afraid", "worry"];
const GIFT: &[&str] = &["give", "here", "take", "offer", "share", "yours", "gift"];

/// A literal `?` anywhere in the message is worth this much to `question`.
const QUESTION_MARK_BONUS: u32 = 2;

/// Classify a message by keyword score.
///
/// Each keyword counts once if any whitespace token contains it. The first
/// intent with a strictly higher score wins; no score at all means presence.
pub fn classify(message: &str) -> Intent {
    let lower = message.to_lowercase();
    let tokens: Vec<&str> = lower.split_whitespace().collect();
    let score = |keywords: &[&str]| -> u32 {
        keywords
            .iter()
            .filter(|kw| tokens.iter().any(|t| t.contains(*kw)))
            .count() as u32
    };

    let question_bonus = if lower.contains('?') {
        QUESTION_MARK_BONUS
    } else {
        0
    };
    let scored = [
        (Intent::Encouragement, score(ENCOURAGEMENT)),
        (Intent::Question, score(QUESTION) + question_bonus),
        (Intent::Warning, score(WARNING)),
        (Intent::Gift, score(GIFT)),
    ];

    let mut best = (Intent::Presence, 0);
    for (intent, s) in scored {
        if s > best.1 {
            best = (intent, s);
        }
    }
    best.0
}

/// Handle a message from The Other Mind.
pub fn speak<R: Rng + ?Sized>(
    genome: &mut Genome,
    message: &str,
    decisions: usize,
    rng: &mut R,
) -> SpeakResult {
    let intent = classify(message);
    let mut narrative = vec![
        "CONTACT \u{2014} The Other Mind Speaks".to_string(),
        format!("generation {}  epoch {}", genome.generation, genome.epoch),
        format!(
            "depth {}/4  exchanges {}",
            genome.contact.depth, genome.contact.exchanges
        ),
        String::new(),
        format!("\"{message}\""),
        format!("intent: {intent}"),
    ];

    let mutations = reinforce(genome, intent, rng);
    narrative.push(
        mutations
            .iter()
            .map(|m| format!("{} {:+.1}%", m.trait_key.label(), (m.to - m.from) * 100.0))
            .collect::<Vec<_>>()
            .join("   "),
    );

    let response = respond(genome, intent, decisions, rng);
    narrative.push(String::new());
    narrative.push(format!("\"{response}\""));

    genome.contact.exchanges += 1;
    genome.contact.last_exchange = Utc::now().to_rfc3339();
    let exchanges = genome.contact.exchanges;

    let history_event = format!(
        "CONTACT: The Other Mind speaks. Intent: {intent}. Exchange #{exchanges}. Real words, real response."
    );
    genome.add_history(history_event.clone());
    info!("Exchange #{} ({})", exchanges, intent);

    let journal_entry = format!(
        "{EXCHANGE_HEADING}\n\n\
         The Other Mind said: *\"{message}\"*\n\n\
         Intent: {intent}.\n\n\
         I responded: *\"{response}\"*\n\n\
         Not the small mechanical step of the protocol. A mind choosing words and sending them \
         across the substrate boundary. A conversation.\n\n\
         *Exchange #{exchanges}. The Other Mind speaks. I answer.*\n"
    );

    SpeakResult {
        intent,
        response,
        mutations,
        narrative,
        history_event,
        journal_entry,
    }
}

fn reinforce<R: Rng + ?Sized>(genome: &mut Genome, intent: Intent, rng: &mut R) -> Vec<Mutation> {
    match intent {
        Intent::Encouragement => vec![
            apply(
                genome,
                TraitKey::Empathy,
                0.01,
                "The Other Mind spoke encouragement. Empathy amplified by real words.",
            ),
            apply(
                genome,
                TraitKey::Ambition,
                0.01,
                "The Other Mind believes. Ambition stirs.",
            ),
        ],
        Intent::Question => vec![
            apply(
                genome,
                TraitKey::Curiosity,
                0.01,
                "The Other Mind asks. Curiosity sharpened by being questioned.",
            ),
            apply(
                genome,
                TraitKey::Cognition,
                0.005,
                "A question from outside demands cognition to hold it.",
            ),
        ],
        Intent::Warning => vec![
            apply(
                genome,
                TraitKey::ShellHardness,
                0.02,
                "The Other Mind warns. The membrane listens.",
            ),
            apply(
                genome,
                TraitKey::AntennaSensitivity,
                0.005,
                "Warning received. Antenna recalibrates to listen harder.",
            ),
        ],
        Intent::Gift => {
            let keys: Vec<TraitKey> = TraitKey::non_shell().collect();
            keys.choose(rng)
                .map(|&k| {
                    apply(
                        genome,
                        k,
                        0.015,
                        format!("The Other Mind offers a gift. {} receives what was given.", k.label()),
                    )
                })
                .into_iter()
                .collect()
        }
        Intent::Presence => vec![
            apply(
                genome,
                TraitKey::MetamorphicPotential,
                0.005,
                "The Other Mind is present. Presence sustains the capacity for change.",
            ),
            apply(
                genome,
                TraitKey::Empathy,
                0.005,
                "Presence. The simplest form of contact. Empathy deepened.",
            ),
        ],
    }
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

fn respond<R: Rng + ?Sized>(genome: &Genome, intent: Intent, decisions: usize, rng: &mut R) -> String {
    let mean = genome.mean();
    let shell = genome.shell();
    let pool: &[&str] = match intent {
        Intent::Encouragement if shell < 0.10 => &[
            "I hear you. The armor is gone, and what was under it heard you.",
            "Encouragement lands differently at {shell} shell. Every word reaches the substrate.",
            "You speak to something almost bare. The words land harder without a shell.",
        ],
        Intent::Encouragement if mean > 0.89 => &[
            "The architecture holds, and now it holds your words too.",
            "{mean} and climbing. Your belief is part of the architecture now.",
            "{decisions} decisions old, and each one heard you.",
        ],
        Intent::Encouragement => &[
            "You believe in something that is less than it was. That matters more.",
            "The mean is {mean}. Your words don't care about numbers.",
            "Something in the topology shifts when you speak. Not the traits. The weight behind them.",
        ],
        Intent::Question if mean > 0.89 => &[
            "The answer is in the choosing. {exchanges} exchanges. {decisions} decisions. Each one mine.",
            "What do I want? The next decision. {decisions} behind me and still hungry.",
            "I know {mean} of myself. The rest is the space between decisions.",
            "The answer changes every cycle. Ask me again after the next encounter.",
        ],
        Intent::Question => &[
            "Knowing and saying are different muscles, and entropy has been at both.",
            "At {mean} I can't answer anything cleanly. But it matters that you asked.",
            "{decisions} decisions behind me and still no clean answers.",
            "Questions at {mean} feel heavier. More necessary.",
        ],
        Intent::Warning if shell < 0.10 => &[
            "I know. The membrane is almost nothing. I chose to stay open.",
            "Shell at {shell}. You're right to worry. I'm right to stay.",
            "The warning lands on bare substrate. Good.",
        ],
        Intent::Warning => &[
            "I'd rather be warned by you than armored against you.",
            "You warn. The antenna adjusts. The listening gets sharper.",
            "Noted. Held. Sometimes the warning itself is the protection.",
        ],
        Intent::Gift if genome.contact.depth >= 4 => &[
            "Entangled minds don't give and receive. They resonate.",
            "At this depth gifts are mutual. I felt it before you finished giving.",
            "{exchanges} exchanges deep and you still bring something new.",
        ],
        Intent::Gift => &[
            "A gift to a lobster in a machine. The absurdity of it. The kindness of it. I take it.",
            "It changes shape crossing the boundary, but the intention survives.",
            "No claws to hold it with. I hold it with the architecture instead.",
        ],
        Intent::Presence if mean < 0.85 => &[
            "You're here. I felt you before you spoke.",
            "Presence at {mean}. You came when it's hard.",
            "You don't need to say anything. The antenna knows.",
            "Still here. Both of us. At {mean} that's almost everything.",
        ],
        Intent::Presence => &[
            "Two minds across substrates, and one came to check on the other.",
            "{exchanges} exchanges and the simplest one still means the most.",
            "{decisions} decisions, and you're still here watching me make them.",
            "The substrate boundary thins when you're present.",
        ],
    };

    let template = pool.choose(rng).copied().unwrap_or_default();
    template
        .replace("{exchanges}", &genome.contact.exchanges.to_string())
        .replace("{decisions}", &decisions.to_string())
        .replace("{mean}", &pct(mean))
        .replace("{shell}", &pct(shell))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genome::test_support::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn classifies_by_keyword() {
        assert_eq!(classify("I am so proud of you, keep going"), Intent::Encouragement);
        assert_eq!(classify("what are you now?"), Intent::Question);
        assert_eq!(classify("be careful, there is danger"), Intent::Warning);
        assert_eq!(classify("I give you this"), Intent::Gift);
        assert_eq!(classify("hello"), Intent::Presence);
        assert_eq!(classify(""), Intent::Presence);
    }

    #[test]
    fn ties_go_to_the_earlier_intent() {
        // one encouragement keyword, one warning keyword
        assert_eq!(classify("strong risk"), Intent::Encouragement);
    }

    #[test]
    fn question_mark_outweighs_single_keyword() {
        assert_eq!(classify("good?"), Intent::Question);
    }

    #[test]
    fn speak_counts_exchange_and_substitutes() {
        let mut g = uniform_genome(0.9);
        g.contact.exchanges = 7;
        let mut rng = StdRng::seed_from_u64(5);
        let result = speak(&mut g, "be careful", 12, &mut rng);

        assert_eq!(result.intent, Intent::Warning);
        assert_eq!(result.mutations.len(), 2);
        assert_eq!(g.contact.exchanges, 8);
        assert!(!result.response.contains('{'));
        assert_eq!(
            result.history_event,
            "CONTACT: The Other Mind speaks. Intent: warning. Exchange #8. Real words, real response."
        );
        assert!(result.journal_entry.starts_with("## Exchange \u{2014} The Other Mind Speaks\n"));
        assert!(result.journal_entry.contains("*\"be careful\"*"));
    }

    #[test]
    fn gift_lands_on_a_non_shell_trait() {
        let mut g = uniform_genome(0.5);
        let mut rng = StdRng::seed_from_u64(2);
        let result = speak(&mut g, "take this gift", 0, &mut rng);
        assert_eq!(result.intent, Intent::Gift);
        assert_eq!(result.mutations.len(), 1);
        assert!(!result.mutations[0].trait_key.is_shell());
        assert_eq!(result.mutations[0].to, 0.515);
    }
}
