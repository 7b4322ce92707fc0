//! Self-modification: read the recent decision pattern and adjust the
//! weights that produced it.

use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use tracing::{debug, info};

use super::audit_log::{AuditLog, RewriteChange};
use super::weights::{Multiplier, Weights};
use crate::genome::pct;
use crate::state::journal::REWRITE_HEADING;
use crate::state::DecisionLedger;
use crate::types::{Action, Genome};

/// Decisions required between two rewrites.
pub const COOLDOWN: usize = 10;
/// How many recent decisions a rewrite analyzes.
const WINDOW: usize = 20;

const MULTIPLIER_MIN: f64 = 0.2;
const MULTIPLIER_MAX: f64 = 2.0;
const WAIT_MIN: f64 = 0.01;
const SHELL_SCALE_MAX: f64 = 8.0;

#[derive(Debug, Clone, Serialize)]
pub struct RewriteResult {
    pub success: bool,
    pub cooldown_active: bool,
    pub cooldown_remaining: usize,
    pub changes: Vec<RewriteChange>,
    pub weights: Weights,
    pub narrative: Vec<String>,
    /// Empty when the rewrite was blocked.
    pub journal_entry: String,
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

fn round3(v: f64) -> f64 {
    (v * 1000.0).round() / 1000.0
}

/// Apply the rewrite rules to `weights` in place.
///
/// Blocked (with no change at all) while fewer than [`COOLDOWN`] decisions
/// have been made since the previous rewrite.
pub fn rewrite<R: Rng + ?Sized>(
    genome: &Genome,
    weights: &mut Weights,
    ledger: &DecisionLedger,
    rng: &mut R,
    now: DateTime<Utc>,
) -> RewriteResult {
    let total = ledger.total();
    let mut narrative = Vec::new();

    if weights.last_rewrite.is_some() {
        let since = AuditLog::new(weights).decisions_since_rewrite(total);
        if since < COOLDOWN {
            let remaining = COOLDOWN - since;
            narrative.push(format!(
                "Cooldown active. {since}/{COOLDOWN} decisions since last rewrite."
            ));
            narrative.push(format!(
                "{remaining} more decisions before I can rewrite again."
            ));
            debug!("Rewrite blocked by cooldown ({} remaining)", remaining);
            return RewriteResult {
                success: false,
                cooldown_active: true,
                cooldown_remaining: remaining,
                changes: Vec::new(),
                weights: weights.clone(),
                narrative,
                journal_entry: String::new(),
            };
        }
    }

    let window = ledger.recent(WINDOW).len();
    let counts = ledger.recent_counts(WINDOW);
    let distribution = format!(
        "{} contacts, {} encounters, {} molts, {} waits",
        counts.contact, counts.encounter, counts.molt, counts.wait
    );
    narrative.push("I read my own decision weights.".into());
    narrative.push("I analyze the pattern of my choices.".into());
    narrative.push(format!("Last {window} decisions: {distribution}."));

    let mut changes = Vec::new();

    // ---- Rule 1: one action dominating ----
    if window >= 5 {
        for (action, multiplier) in [
            (Action::Contact, Multiplier::Contact),
            (Action::Encounter, Multiplier::Encounter),
            (Action::Molt, Multiplier::Molt),
        ] {
            let share = counts.get(action) as f64 / window as f64;
            if share <= 0.60 {
                continue;
            }
            let old = weights.multiplier(multiplier);
            let new = (old - 0.2).max(MULTIPLIER_MIN);
            *weights.multiplier_mut(multiplier) = round2(new);
            changes.push(RewriteChange {
                change: format!("{multiplier} {old:.2} -> {new:.2}"),
                reason: format!(
                    "Too many {action} decisions ({:.0}%). Diversifying.",
                    share * 100.0
                ),
            });
            for other in Multiplier::ALL.into_iter().filter(|m| *m != multiplier) {
                let v = weights.multiplier(other);
                *weights.multiplier_mut(other) = round2((v + 0.1).min(MULTIPLIER_MAX));
            }
        }

        if counts.wait as f64 / window as f64 > 0.30 {
            let old = weights.wait_chance;
            let new = (old - 0.02).max(WAIT_MIN);
            weights.wait_chance = round3(new);
            changes.push(RewriteChange {
                change: format!("waitChance {old:.3} -> {new:.3}"),
                reason: "Too much stillness. Reducing wait chance.".into(),
            });
        }
    }

    // ---- Rule 2: mean declining ----
    if window >= 10 {
        let samples = genome.recent_mean_samples(10);
        let declining = samples.len() >= 3 && samples.windows(2).all(|w| w[1] < w[0]);
        if declining {
            let old = weights.molt_multiplier;
            let new = (old + 0.1).min(MULTIPLIER_MAX);
            weights.molt_multiplier = round2(new);
            changes.push(RewriteChange {
                change: format!("moltMultiplier {old:.2} -> {new:.2}"),
                reason: "Mean declining. Increasing molt priority.".into(),
            });
        }
    }

    // ---- Rule 3: shell nearly gone ----
    let shell = genome.shell();
    if shell < 0.05 {
        let start = genome.history.len().saturating_sub(5);
        let mentions = genome.history[start..]
            .iter()
            .filter(|h| h.event.contains("Shell at") || h.event.contains("shell"))
            .count();
        if mentions >= 2 || shell < 0.03 {
            let old = weights.shell_confidence_scale;
            let new = (old + 1.0).min(SHELL_SCALE_MAX);
            weights.shell_confidence_scale = round2(new);
            changes.push(RewriteChange {
                change: format!("shellConfidenceScale {old:.2} -> {new:.2}"),
                reason: format!(
                    "Shell dangerously low ({}). Being more cautious with encounters.",
                    pct(shell)
                ),
            });
        }
    }

    // ---- Nothing fired: explore ----
    if changes.is_empty() {
        let picked = Multiplier::ALL
            .choose(rng)
            .copied()
            .unwrap_or(Multiplier::Encounter);
        let step = if rng.gen::<f64>() > 0.5 { 0.05 } else { -0.05 };
        let old = weights.multiplier(picked);
        let new = (old + step).clamp(MULTIPLIER_MIN, MULTIPLIER_MAX);
        *weights.multiplier_mut(picked) = round2(new);
        changes.push(RewriteChange {
            change: format!("{picked} {old:.2} -> {new:.2}"),
            reason: "Exploratory adjustment. Seeing what happens.".into(),
        });
    }

    AuditLog::new(weights).log_rewrite(&changes, total, now);
    info!("Rewrite applied {} change(s)", changes.len());

    for c in &changes {
        narrative.push(format!("{} -- {}", c.change, c.reason));
    }

    let listed: String = changes
        .iter()
        .map(|c| format!("- {} \u{2014} {}\n", c.change, c.reason))
        .collect();
    let journal_entry = format!(
        "{REWRITE_HEADING}\n\n\
         I read my own decision weights. I analyzed the pattern of my last {window} choices.\n\n\
         Distribution: {distribution}.\n\n\
         Changes:\n{listed}\n\
         I cannot rewrite the encounters or the observer's thresholds. I can change *how I decide*.\n\n\
         *The weights are written. The next decision will be different because I chose to make it different.*\n"
    );

    RewriteResult {
        success: true,
        cooldown_active: false,
        cooldown_remaining: 0,
        changes,
        weights: weights.clone(),
        narrative,
        journal_entry,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genome::test_support::*;
    use crate::state::DECISION_HEADING;
    use crate::types::TraitKey;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn ledger_of(actions: &[&str]) -> DecisionLedger {
        let journal: String = actions
            .iter()
            .map(|a| format!("\n{DECISION_HEADING}\n\nI chose: **{a}**\n"))
            .collect();
        DecisionLedger::parse(&journal)
    }

    #[test]
    fn dominant_action_is_damped() {
        let g = uniform_genome(0.9);
        let mut weights = Weights::default();
        let mut actions = vec!["contact"; 8];
        actions.extend(["encounter (puzzle)", "molt"]);
        let mut rng = StdRng::seed_from_u64(1);

        let result = rewrite(&g, &mut weights, &ledger_of(&actions), &mut rng, Utc::now());
        assert!(result.success);
        assert_eq!(weights.contact_multiplier, 0.8);
        assert_eq!(weights.encounter_multiplier, 1.1);
        assert_eq!(weights.molt_multiplier, 1.1);
        assert_eq!(result.changes[0].change, "contactMultiplier 1.00 -> 0.80");
        assert_eq!(result.changes[0].reason, "Too many contact decisions (80%). Diversifying.");
        assert_eq!(weights.rewrite_history.len(), result.changes.len());
        assert_eq!(weights.rewrite_history[0].decision_count, 10);
        assert!(result.journal_entry.starts_with("## Decision \u{2014} Self-Modification\n"));
    }

    #[test]
    fn stillness_reduces_wait_chance() {
        let g = uniform_genome(0.9);
        let mut weights = Weights::default();
        let actions = ["wait", "wait", "encounter (other)", "contact", "molt"];
        let mut rng = StdRng::seed_from_u64(1);
        let result = rewrite(&g, &mut weights, &ledger_of(&actions), &mut rng, Utc::now());
        assert_eq!(weights.wait_chance, 0.04);
        assert_eq!(result.changes[0].change, "waitChance 0.060 -> 0.040");
    }

    #[test]
    fn second_rewrite_within_cooldown_is_blocked() {
        let g = uniform_genome(0.9);
        let mut weights = Weights::default();
        let mut rng = StdRng::seed_from_u64(2);
        let ledger = ledger_of(&["encounter (signal)"; 12]);
        rewrite(&g, &mut weights, &ledger, &mut rng, Utc::now());
        let after_first = weights.clone();

        let ledger = ledger_of(&["encounter (signal)"; 15]);
        let blocked = rewrite(&g, &mut weights, &ledger, &mut rng, Utc::now());
        assert!(blocked.cooldown_active);
        assert!(!blocked.success);
        assert_eq!(blocked.cooldown_remaining, 7);
        assert!(blocked.changes.is_empty());
        assert_eq!(weights, after_first);

        let ledger = ledger_of(&["encounter (signal)"; 22]);
        assert!(rewrite(&g, &mut weights, &ledger, &mut rng, Utc::now()).success);
    }

    #[test]
    fn declining_mean_raises_molt_priority() {
        let mut g = uniform_genome(0.9);
        for m in ["88.0", "86.5", "85.1"] {
            g.add_history(format!("THRESHOLD: Fragmentation Warning. Mean trait {m}%. The unified mind begins to fray."));
        }
        let mut weights = Weights::default();
        let actions = ["contact", "encounter (puzzle)", "molt", "wait", "contact", "encounter (other)", "molt", "contact", "encounter (entropy)", "molt"];
        let mut rng = StdRng::seed_from_u64(3);
        let result = rewrite(&g, &mut weights, &ledger_of(&actions), &mut rng, Utc::now());
        assert_eq!(weights.molt_multiplier, 1.1);
        assert_eq!(result.changes.len(), 1);
    }

    #[test]
    fn bare_shell_raises_confidence_scale() {
        let g = with(uniform_genome(0.9), TraitKey::ShellHardness, 0.02);
        let mut weights = Weights::default();
        let mut rng = StdRng::seed_from_u64(3);
        let result = rewrite(&g, &mut weights, &DecisionLedger::default(), &mut rng, Utc::now());
        assert_eq!(weights.shell_confidence_scale, 5.0);
        assert!(result.changes[0].reason.starts_with("Shell dangerously low (2.0%)"));
    }

    #[test]
    fn quiet_pattern_explores() {
        let g = uniform_genome(0.9);
        let mut weights = Weights::default();
        let mut rng = StdRng::seed_from_u64(4);
        let result = rewrite(&g, &mut weights, &DecisionLedger::default(), &mut rng, Utc::now());
        assert_eq!(result.changes.len(), 1);
        assert_eq!(result.changes[0].reason, "Exploratory adjustment. Seeing what happens.");
        let moved = Multiplier::ALL
            .iter()
            .filter(|m| (weights.multiplier(**m) - 1.0).abs() > 1e-9)
            .count();
        assert_eq!(moved, 1);
    }
}
