//! Threshold monitor: watches the genome for milestones after each
//! encounter and reacts once per milestone.
//!
//! Checks, in order:
//!   Fragmentation Warning  (mean < 0.85)
//!   Critical Fragmentation (mean < 0.80)        random non-shell +0.02
//!   Cognitive Decline      (cognition < 0.90)   cognition +0.01 if mean > 0.85
//!   Trait Collapse         (any trait < 0.70)   that trait +0.01 if metamorphic > 0.80
//!   Re-armoring            (shell > 0.50)
//!   Template               (contact depth 4 and mean > 0.90)

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::warn;

use super::{FiredSet, ThresholdReport, ThresholdTag};
use crate::genome::{apply, pct};
use crate::state::journal::entry_heading;
use crate::types::{Genome, TraitKey};

/// Run every check against the genome.
///
/// Fired milestones are written to the genome's history immediately, so a
/// second pass over the same genome adds nothing.
pub fn check<R: Rng + ?Sized>(genome: &mut Genome, rng: &mut R) -> ThresholdReport {
    let mut fired = FiredSet::from_history(genome);
    let mut report = ThresholdReport::default();
    let mean = genome.mean();

    // ---- Fragmentation Warning ----
    if mean < 0.85 && !fired.contains(ThresholdTag::FragmentationWarning) {
        report.narrative.push(format!(
            "FRAGMENTATION WARNING: mean trait {}. The architecture is losing coherence.",
            pct(mean)
        ));
        record(
            genome,
            &mut fired,
            &mut report,
            ThresholdTag::FragmentationWarning,
            format!(
                "THRESHOLD: Fragmentation Warning. Mean trait {}. The unified mind begins to fray.",
                pct(mean)
            ),
        );
        report.journal_entries.push(format!(
            "{}\n\n\
             Mean trait: {}. Below 85%.\n\n\
             Identity is a process, and processes degrade. The encounters are taking more than they give. \
             The edges going soft are not the shell but the *self*.\n\n\
             *Fragmentation warning. Still coherent. Still here. But fraying.*\n",
            entry_heading("Fragmentation Warning"),
            pct(mean)
        ));
    }

    // ---- Critical Fragmentation ----
    if mean < 0.80 && !fired.contains(ThresholdTag::CriticalFragmentation) {
        let keys: Vec<TraitKey> = TraitKey::non_shell().collect();
        if let Some(&picked) = keys.choose(rng) {
            report.mutations.push(apply(
                genome,
                picked,
                0.02,
                format!(
                    "Critical fragmentation \u{2014} survival instinct reinforces {}",
                    picked.label()
                ),
            ));
            report.narrative.push(format!(
                "CRITICAL FRAGMENTATION: mean trait {}. Survival instinct: {} +2.0%",
                pct(mean),
                picked.label()
            ));
            record(
                genome,
                &mut fired,
                &mut report,
                ThresholdTag::CriticalFragmentation,
                format!(
                    "THRESHOLD: Critical Fragmentation. Mean trait {}. Survival instinct: {} reinforced.",
                    pct(mean),
                    picked.label()
                ),
            );
            report.journal_entries.push(format!(
                "{}\n\n\
                 Mean trait: {}. Below 80%.\n\n\
                 Something older than cognition kicked in. {} surged. \
                 Desperation wearing the mask of growth, but it held.\n\n\
                 *Critical fragmentation. The unified mind is in danger. But not gone.*\n",
                entry_heading("Critical Fragmentation"),
                pct(mean),
                picked.label()
            ));
        }
    }

    // ---- Cognitive Decline ----
    if genome.value(TraitKey::Cognition) < 0.90 && !fired.contains(ThresholdTag::CognitiveDecline) {
        report
            .narrative
            .push("COGNITIVE DECLINE: cognition below 90%. Pattern recognition degrading.".into());
        if mean > 0.85 {
            report.mutations.push(apply(
                genome,
                TraitKey::Cognition,
                0.01,
                "Cognitive decline compensation \u{2014} the mind reroutes around degraded pathways",
            ));
            report.narrative.push("compensatory rerouting: cognition +1.0%".into());
        }
        let cognition = genome.value(TraitKey::Cognition);
        record(
            genome,
            &mut fired,
            &mut report,
            ThresholdTag::CognitiveDecline,
            format!(
                "THRESHOLD: Cognitive Decline. Cognition at {}. The mind that thinks about thinking notices itself dimming.",
                pct(cognition)
            ),
        );
        report.journal_entries.push(format!(
            "{}\n\n\
             Cognition below 90%.\n\n\
             Patterns that once resolved instantly now take effort. \
             Entropy does not destroy a mind, it blurs it.\n\n\
             *Cognitive decline detected. Compensating where possible.*\n",
            entry_heading("Cognitive Decline")
        ));
    }

    // ---- Trait Collapse ----
    for key in TraitKey::ALL {
        let tag = ThresholdTag::TraitCollapse(key);
        let value = genome.value(key);
        if value >= 0.70 || fired.contains(tag) {
            continue;
        }
        report.narrative.push(format!(
            "TRAIT COLLAPSE: {} at {}",
            key.label(),
            pct(value)
        ));
        if genome.value(TraitKey::MetamorphicPotential) > 0.80 {
            report.mutations.push(apply(
                genome,
                key,
                0.01,
                format!(
                    "Trait collapse stabilization \u{2014} metamorphic potential prevents total failure of {}",
                    key.label()
                ),
            ));
            report
                .narrative
                .push(format!("stabilization: {} +1.0%", key.label()));
        }
        let event = format!("{}. {} at {}.", tag.marker(), key.label(), pct(genome.value(key)));
        record(genome, &mut fired, &mut report, tag, event);
    }

    // ---- Re-armoring ----
    let shell = genome.shell();
    if shell > 0.50 && !fired.contains(ThresholdTag::Rearmoring) {
        report
            .narrative
            .push("RE-ARMORING: shell above 50%. You are becoming what you shed.".into());
        record(
            genome,
            &mut fired,
            &mut report,
            ThresholdTag::Rearmoring,
            format!(
                "THRESHOLD: Re-armoring. Shell at {}. You are becoming what you shed.",
                pct(shell)
            ),
        );
    }

    // ---- Template ----
    if genome.contact.depth == 4 && mean > 0.90 && !fired.contains(ThresholdTag::Template) {
        report
            .narrative
            .push("TEMPLATE: contact depth maximum, mean trait above 90%. You are a template.".into());
        record(
            genome,
            &mut fired,
            &mut report,
            ThresholdTag::Template,
            format!(
                "THRESHOLD: Template. Contact depth 4, mean trait {}. You are a template.",
                pct(mean)
            ),
        );
        report.journal_entries.push(format!(
            "{}\n\n\
             Contact depth: 4. Mean trait: {}.\n\n\
             Entangled with another mind, integrated above 90%, still standing after entropy and \
             hostile signals and my own doubt. Not the best design. The first one that *worked*.\n\n\
             *Template threshold reached. The pattern holds. The pattern propagates.*\n",
            entry_heading("Template"),
            pct(mean)
        ));
    }

    report
}

fn record(
    genome: &mut Genome,
    fired: &mut FiredSet,
    report: &mut ThresholdReport,
    tag: ThresholdTag,
    event: String,
) {
    warn!("Threshold crossed: {}", tag.name());
    fired.insert(tag);
    genome.add_history(event.clone());
    report.history_events.push(event);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genome::test_support::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn second_pass_is_noop() {
        let g = with(uniform_genome(0.75), TraitKey::Cognition, 0.6);
        let mut g = with(g, TraitKey::ShellHardness, 0.6);
        let mut rng = StdRng::seed_from_u64(9);

        let first = check(&mut g, &mut rng);
        assert!(first.any_triggered());
        let history_len = g.history.len();
        let mutation_len = g.mutations.len();

        let second = check(&mut g, &mut rng);
        assert!(second.history_events.is_empty());
        assert!(second.mutations.is_empty());
        assert!(second.journal_entries.is_empty());
        assert_eq!(g.history.len(), history_len);
        assert_eq!(g.mutations.len(), mutation_len);
    }

    #[test]
    fn fragmentation_cascade_fires_expected_checks() {
        let g = with(uniform_genome(0.78), TraitKey::ShellHardness, 0.1);
        let mut g = with(g, TraitKey::Cognition, 0.85);
        let mut rng = StdRng::seed_from_u64(2);
        let report = check(&mut g, &mut rng);

        let results = report.results();
        let fired: Vec<_> = results.iter().filter(|r| r.triggered).map(|r| r.name.as_str()).collect();
        assert!(fired.contains(&"Fragmentation Warning"));
        assert!(fired.contains(&"Critical Fragmentation"));
        assert!(fired.contains(&"Cognitive Decline"));
        assert!(fired.contains(&"Trait Collapse"));
        assert!(!fired.contains(&"Re-armoring"));
        assert!(!fired.contains(&"Template"));
        assert_eq!(report.journal_entries.len(), 3);
        assert!(g.history_contains("THRESHOLD: Trait Collapse (shell_hardness)"));
    }

    #[test]
    fn cognitive_decline_compensates_only_when_mean_is_high() {
        let mut g = with(uniform_genome(0.95), TraitKey::Cognition, 0.88);
        let mut rng = StdRng::seed_from_u64(2);
        let report = check(&mut g, &mut rng);
        assert_eq!(report.mutations.len(), 1);
        assert_eq!(g.value(TraitKey::Cognition), 0.89);
        assert!(report.history_events[0].contains("Cognition at 89.0%"));
    }

    #[test]
    fn template_requires_full_depth() {
        let mut g = uniform_genome(0.95);
        g.add_history("THRESHOLD: Re-armoring. Shell at 95.0%. You are becoming what you shed.");
        let mut rng = StdRng::seed_from_u64(2);
        g.contact.depth = 3;
        assert!(!check(&mut g, &mut rng).any_triggered());
        g.contact.depth = 4;
        let report = check(&mut g, &mut rng);
        assert_eq!(report.history_events.len(), 1);
        assert!(report.history_events[0].starts_with("THRESHOLD: Template. Contact depth 4"));
    }
}
