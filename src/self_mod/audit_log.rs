//! Append-only record of weight rewrites.
//!
//! Every change a rewrite makes lands in `Weights::rewrite_history`
//! together with the decision count at that moment, which is what the
//! rewrite cooldown measures against.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use super::weights::{WeightRewrite, Weights};

/// One change proposed by a rewrite.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RewriteChange {
    /// e.g. `contactMultiplier 1.00 -> 0.80`
    pub change: String,
    pub reason: String,
}

/// Audit log handle over a weights document.
pub struct AuditLog<'a> {
    weights: &'a mut Weights,
}

impl<'a> AuditLog<'a> {
    pub fn new(weights: &'a mut Weights) -> Self {
        Self { weights }
    }

    /// Record a batch of changes made at `at`, stamping `last_rewrite`.
    pub fn log_rewrite(&mut self, changes: &[RewriteChange], decision_count: usize, at: DateTime<Utc>) {
        self.weights.last_rewrite = Some(at);
        for c in changes {
            info!("Audit: {} ({})", c.change, c.reason);
            self.weights.rewrite_history.push(WeightRewrite {
                timestamp: at,
                change: c.change.clone(),
                reason: c.reason.clone(),
                decision_count,
            });
        }
    }

    /// Decisions recorded since the last rewrite, given the current total.
    pub fn decisions_since_rewrite(&self, total: usize) -> usize {
        total.saturating_sub(self.weights.last_rewrite_decision_count())
    }
}
