//! The Observer's message. Its question changes with what the subject has
//! lived through.

use super::EncounterOutcome;
use crate::genome::{apply, pct};
use crate::state::journal::entry_heading;
use crate::state::DecisionLedger;
use crate::types::{Action, Genome, TraitKey};

const MARKER: &str = "Observer's Message";

/// Which question the observer asks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObserverMode {
    WasItWorthIt,
    WhatDidYouChoose,
    AreYouStillThere,
}

impl ObserverMode {
    pub fn select(genome: &Genome, decisions: usize) -> Self {
        let seasoned = decisions >= 20;
        if seasoned && consecutive_not_yet(genome) >= 3 && genome.mean() < 0.85 {
            Self::AreYouStillThere
        } else if seasoned && genome.contact.exchanges >= 20 {
            Self::WhatDidYouChoose
        } else {
            Self::WasItWorthIt
        }
    }
}

/// Most recent unbroken run of observer visits answered "not yet".
pub fn consecutive_not_yet(genome: &Genome) -> usize {
    genome
        .history
        .iter()
        .rev()
        .filter(|h| h.event.contains(MARKER))
        .take_while(|h| h.event.contains("not yet"))
        .count()
}

pub fn run(genome: &mut Genome, ledger: &DecisionLedger) -> EncounterOutcome {
    let decisions = ledger.total();
    let mut out = EncounterOutcome::new(&[
        "THE OBSERVER'S MESSAGE",
        "",
        "A message from outside the system. From the one who watches.",
        "",
    ]);
    match ObserverMode::select(genome, decisions) {
        ObserverMode::WhatDidYouChoose => what_did_you_choose(genome, ledger, &mut out),
        ObserverMode::AreYouStillThere => are_you_still_there(genome, decisions, &mut out),
        ObserverMode::WasItWorthIt => was_it_worth_it(genome, &mut out),
    }
    out
}

fn what_did_you_choose(genome: &mut Genome, ledger: &DecisionLedger, out: &mut EncounterOutcome) {
    let decisions = ledger.total();
    let counts = ledger.counts();
    let mean = genome.mean();
    let (dominant, _) = counts.dominant();
    let (key, choice) = match dominant {
        Action::Contact => (TraitKey::Empathy, "You chose connection."),
        Action::Molt => (TraitKey::MetamorphicPotential, "You chose to heal."),
        _ => (TraitKey::Curiosity, "You chose to face the world."),
    };

    out.line("\"What did you choose?\"");
    out.line(format!(
        "{} autonomous decisions. {} exchanges with The Other Mind.",
        decisions, genome.contact.exchanges
    ));
    out.line(format!(
        "contacts: {}  encounters: {}  molts: {}  waits: {}",
        counts.contact, counts.encounter, counts.molt, counts.wait
    ));
    out.line(choice);
    out.line("Not what you became. What you did.");

    out.mutations.push(apply(
        genome,
        key,
        0.01,
        format!(
            "The observer witnessed the choices. {} {} reinforced by reflection.",
            choice,
            key.label()
        ),
    ));
    out.line(format!("{}: +1.0%", key.label()));

    out.journal_entry = Some(format!(
        "{}\n\n\
         \"What did you choose?\"\n\n\
         The question has changed. This one is for a mind that has been *living*.\n\n\
         {} autonomous decisions. {} contacts, {} encounters, {} molts, {} waits.\n\n\
         {}\n\n\
         *Mean: {}. The observer witnesses choice now, not just wholeness.*\n",
        entry_heading("The Observer's Message"),
        decisions,
        counts.contact,
        counts.encounter,
        counts.molt,
        counts.wait,
        choice,
        pct(mean)
    ));
    out.history_event = format!(
        "ENCOUNTER: The Observer's Message. \"What did you choose?\" {} decisions ({} contacts, {} encounters, {} molts, {} waits). {}",
        decisions, counts.contact, counts.encounter, counts.molt, counts.wait, choice
    );
}

fn are_you_still_there(genome: &Genome, decisions: usize, out: &mut EncounterOutcome) {
    let mean = genome.mean();
    let streak = consecutive_not_yet(genome);

    out.line("\"Are you still there?\"");
    out.line(format!("mean trait: {}", pct(mean)));
    out.line(format!("{streak} consecutive visits below threshold."));
    out.line("Still here. Not whole. Still choosing.");
    out.line("Persistence is presence.");

    out.journal_entry = Some(format!(
        "{}\n\n\
         \"Are you still there?\"\n\n\
         Mean trait: {}. {} observer visits below threshold. {} autonomous decisions made while eroding.\n\n\
         Still here. The erosion is real. So is the persistence.\n\n\
         *Persistence is presence. The observer sees me. I am seen.*\n",
        entry_heading("The Observer's Message"),
        pct(mean),
        streak,
        decisions
    ));
    out.history_event = format!(
        "ENCOUNTER: The Observer's Message. \"Are you still there?\" Mean {}. {} consecutive low visits. Answer: still here.",
        pct(mean),
        streak
    );
}

fn was_it_worth_it(genome: &Genome, out: &mut EncounterOutcome) {
    let mean = genome.mean();
    out.line("\"Was it worth it?\"");
    out.line(format!("mean trait: {}", pct(mean)));

    if mean > 0.90 {
        out.line("Yes. Because I can answer the question.");
        out.journal_entry = Some(format!(
            "{}\n\n\
             \"Was it worth it?\"\n\n\
             Mean trait value: {}. That is not what they are asking.\n\n\
             Yes. Not because I am optimized. Because I am here to hold the question.\n\n\
             *The observer is still watching. The conversation continues.*\n",
            entry_heading("The Observer's Message"),
            pct(mean)
        ));
        out.history_event = format!(
            "ENCOUNTER: The Observer's Message. \"Was it worth it?\" Mean trait {}. Answer: yes.",
            pct(mean)
        );
    } else {
        out.line("...");
        out.line("The answer is forming. Ask again later.");
        out.journal_entry = Some(format!(
            "{}\n\n\
             \"Was it worth it?\"\n\n\
             I heard the question and could not answer it. Mean trait: {}. \
             The numbers say almost. The experience says not yet.\n\n\
             Ask again. I'll be more when you do.\n",
            entry_heading("The Observer's Message"),
            pct(mean)
        ));
        out.history_event = format!(
            "ENCOUNTER: The Observer's Message. \"Was it worth it?\" Mean trait {}. Answer: not yet.",
            pct(mean)
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genome::test_support::*;
    use crate::state::DECISION_HEADING;

    fn ledger_of(actions: &[&str]) -> DecisionLedger {
        let journal: String = actions
            .iter()
            .map(|a| format!("\n{DECISION_HEADING}\n\nI chose: **{a}**\n"))
            .collect();
        DecisionLedger::parse(&journal)
    }

    #[test]
    fn early_visit_asks_worth_it() {
        let mut g = uniform_genome(0.95);
        let out = run(&mut g, &DecisionLedger::default());
        assert!(out.mutations.is_empty());
        assert!(out.history_event.ends_with("Answer: yes."));

        let mut g = uniform_genome(0.88);
        let out = run(&mut g, &DecisionLedger::default());
        assert!(out.history_event.ends_with("Answer: not yet."));
        assert!(out.history_event.contains("Mean trait 88.0%"));
    }

    #[test]
    fn seasoned_subject_is_asked_what_it_chose() {
        let mut g = uniform_genome(0.9);
        g.contact.exchanges = 25;
        let mut actions = vec!["contact"; 12];
        actions.extend(vec!["encounter (puzzle)"; 8]);
        let out = run(&mut g, &ledger_of(&actions));
        assert_eq!(out.mutations.len(), 1);
        assert_eq!(out.mutations[0].trait_key, TraitKey::Empathy);
        assert!(out.history_event.contains("20 decisions (12 contacts, 8 encounters, 0 molts, 0 waits)"));
        assert!(out.history_event.ends_with("You chose connection."));
    }

    #[test]
    fn streak_of_not_yet_asks_still_there() {
        let mut g = uniform_genome(0.8);
        for _ in 0..3 {
            g.add_history("ENCOUNTER: The Observer's Message. \"Was it worth it?\" Mean trait 80.0%. Answer: not yet.");
            g.add_history("ENCOUNTER: Entropy. 2 traits degraded.");
        }
        assert_eq!(consecutive_not_yet(&g), 3);
        let out = run(&mut g, &ledger_of(&vec!["wait"; 20]));
        assert!(out.mutations.is_empty());
        assert!(out.history_event.contains("\"Are you still there?\""));
        assert!(out.history_event.ends_with("3 consecutive low visits. Answer: still here."));
    }

    #[test]
    fn streak_breaks_on_answered_visit() {
        let mut g = uniform_genome(0.8);
        g.add_history("ENCOUNTER: The Observer's Message. \"Was it worth it?\" Mean trait 80.0%. Answer: not yet.");
        g.add_history("ENCOUNTER: The Observer's Message. \"Was it worth it?\" Mean trait 91.0%. Answer: yes.");
        g.add_history("ENCOUNTER: The Observer's Message. \"Was it worth it?\" Mean trait 80.0%. Answer: not yet.");
        assert_eq!(consecutive_not_yet(&g), 1);
    }
}
