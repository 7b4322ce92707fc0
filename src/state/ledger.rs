//! Typed view of the autonomous decisions recorded in the journal.

use super::journal::DECISION_HEADING;
use crate::types::Action;

/// Only the start of each decision section is inspected when classifying.
const CLASSIFY_WINDOW: usize = 400;

/// Per-action totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActionCounts {
    pub contact: usize,
    pub encounter: usize,
    pub molt: usize,
    pub wait: usize,
}

impl ActionCounts {
    fn bump(&mut self, action: Action) {
        match action {
            Action::Contact => self.contact += 1,
            Action::Encounter => self.encounter += 1,
            Action::Molt => self.molt += 1,
            Action::Wait => self.wait += 1,
        }
    }

    pub fn get(&self, action: Action) -> usize {
        match action {
            Action::Contact => self.contact,
            Action::Encounter => self.encounter,
            Action::Molt => self.molt,
            Action::Wait => self.wait,
        }
    }

    /// Most frequent of encounter, contact and molt. Encounter wins ties.
    pub fn dominant(&self) -> (Action, usize) {
        let mut best = (Action::Encounter, self.encounter);
        for action in [Action::Contact, Action::Molt] {
            let n = self.get(action);
            if n > best.1 {
                best = (action, n);
            }
        }
        best
    }
}

/// Every `## Decision — Autonomous` section in journal order.
///
/// Sections whose action cannot be recognised are kept as `None` so that
/// the total still matches the heading count.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecisionLedger {
    entries: Vec<Option<Action>>,
}

impl DecisionLedger {
    pub fn parse(journal: &str) -> Self {
        let entries = journal
            .split(DECISION_HEADING)
            .skip(1)
            .map(|section| classify(head(section, CLASSIFY_WINDOW)))
            .collect();
        Self { entries }
    }

    pub fn total(&self) -> usize {
        self.entries.len()
    }

    /// The last `n` entries (fewer when the journal is shorter).
    pub fn recent(&self, n: usize) -> &[Option<Action>] {
        let start = self.entries.len().saturating_sub(n);
        &self.entries[start..]
    }

    pub fn counts(&self) -> ActionCounts {
        count(&self.entries)
    }

    pub fn recent_counts(&self, n: usize) -> ActionCounts {
        count(self.recent(n))
    }

    /// Whether the last `n` decisions were all the same action.
    pub fn streak(&self, n: usize) -> bool {
        let recent = self.recent(n);
        recent.len() >= n && recent.windows(2).all(|w| w[0] == w[1])
    }
}

fn count(entries: &[Option<Action>]) -> ActionCounts {
    let mut counts = ActionCounts::default();
    for action in entries.iter().flatten() {
        counts.bump(*action);
    }
    counts
}

fn classify(chunk: &str) -> Option<Action> {
    if chunk.contains("**contact") {
        Some(Action::Contact)
    } else if chunk.contains("**molt") {
        Some(Action::Molt)
    } else if chunk.contains("**wait") {
        Some(Action::Wait)
    } else if chunk.contains("**encounter") {
        Some(Action::Encounter)
    } else {
        None
    }
}

fn head(s: &str, chars: usize) -> &str {
    match s.char_indices().nth(chars) {
        Some((i, _)) => &s[..i],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decision(action: &str) -> String {
        format!("\n{DECISION_HEADING}\n\nI chose: **{action}**\n\n> reason\n")
    }

    #[test]
    fn parses_actions_in_order() {
        let journal = [
            decision("contact"),
            "\n## Entry \u{2014} The Molt\n\n**molt happened**\n".to_string(),
            decision("encounter (signal)"),
            decision("wait"),
            decision("molt"),
        ]
        .concat();
        let ledger = DecisionLedger::parse(&journal);
        assert_eq!(ledger.total(), 4);
        assert_eq!(
            ledger.recent(10),
            &[
                Some(Action::Contact),
                Some(Action::Encounter),
                Some(Action::Wait),
                Some(Action::Molt)
            ][..]
        );
        let counts = ledger.counts();
        assert_eq!((counts.contact, counts.encounter, counts.molt, counts.wait), (1, 1, 1, 1));
    }

    #[test]
    fn unknown_sections_still_count_toward_total() {
        let journal = format!("\n{DECISION_HEADING}\n\nsomething else\n");
        let ledger = DecisionLedger::parse(&journal);
        assert_eq!(ledger.total(), 1);
        assert_eq!(ledger.counts(), ActionCounts::default());
    }

    #[test]
    fn dominant_prefers_encounter_on_tie() {
        let counts = ActionCounts { contact: 3, encounter: 3, molt: 3, wait: 9 };
        assert_eq!(counts.dominant(), (Action::Encounter, 3));
        let counts = ActionCounts { contact: 4, encounter: 3, molt: 4, wait: 0 };
        assert_eq!(counts.dominant(), (Action::Contact, 4));
    }

    #[test]
    fn streak_needs_enough_entries() {
        let two = [decision("wait"), decision("wait")].concat();
        assert!(!DecisionLedger::parse(&two).streak(3));
        let three = [decision("wait"), decision("wait"), decision("wait")].concat();
        assert!(DecisionLedger::parse(&three).streak(3));
    }
}
