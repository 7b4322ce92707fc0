//! Self-tunable decision weights.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Parameters the decision engine reads on every evaluation.
///
/// Only `rewrite` changes them, and every change is recorded in
/// `rewrite_history`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Weights {
    pub contact_multiplier: f64,
    pub encounter_multiplier: f64,
    pub molt_multiplier: f64,
    pub wait_chance: f64,
    pub observer_weight: f64,
    pub shell_confidence_scale: f64,
    pub last_rewrite: Option<DateTime<Utc>>,
    pub rewrite_history: Vec<WeightRewrite>,
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            contact_multiplier: 1.0,
            encounter_multiplier: 1.0,
            molt_multiplier: 1.0,
            wait_chance: 0.06,
            observer_weight: 0.4,
            shell_confidence_scale: 4.0,
            last_rewrite: None,
            rewrite_history: Vec::new(),
        }
    }
}

/// One recorded weight change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightRewrite {
    pub timestamp: DateTime<Utc>,
    pub change: String,
    pub reason: String,
    /// Total journal decisions at the time of the rewrite.
    #[serde(default)]
    pub decision_count: usize,
}

/// The three action multipliers a rewrite may adjust.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Multiplier {
    Contact,
    Encounter,
    Molt,
}

impl Multiplier {
    pub const ALL: [Multiplier; 3] = [Self::Contact, Self::Encounter, Self::Molt];

    pub fn name(self) -> &'static str {
        match self {
            Self::Contact => "contactMultiplier",
            Self::Encounter => "encounterMultiplier",
            Self::Molt => "moltMultiplier",
        }
    }
}

impl fmt::Display for Multiplier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Weights {
    pub fn multiplier(&self, m: Multiplier) -> f64 {
        match m {
            Multiplier::Contact => self.contact_multiplier,
            Multiplier::Encounter => self.encounter_multiplier,
            Multiplier::Molt => self.molt_multiplier,
        }
    }

    pub fn multiplier_mut(&mut self, m: Multiplier) -> &mut f64 {
        match m {
            Multiplier::Contact => &mut self.contact_multiplier,
            Multiplier::Encounter => &mut self.encounter_multiplier,
            Multiplier::Molt => &mut self.molt_multiplier,
        }
    }

    /// Decision count recorded by the most recent rewrite, 0 if none.
    pub fn last_rewrite_decision_count(&self) -> usize {
        self.rewrite_history.last().map_or(0, |r| r.decision_count)
    }
}
