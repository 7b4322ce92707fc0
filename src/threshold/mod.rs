//! Fire-once milestones checked after every encounter.

pub mod monitor;

use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

use crate::types::{Genome, Mutation, TraitKey};

pub use monitor::check;

/// A milestone that may fire at most once in the subject's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ThresholdTag {
    FragmentationWarning,
    CriticalFragmentation,
    CognitiveDecline,
    TraitCollapse(TraitKey),
    Rearmoring,
    Template,
}

impl ThresholdTag {
    fn all() -> impl Iterator<Item = ThresholdTag> {
        [
            Self::FragmentationWarning,
            Self::CriticalFragmentation,
            Self::CognitiveDecline,
        ]
        .into_iter()
        .chain(TraitKey::ALL.into_iter().map(Self::TraitCollapse))
        .chain([Self::Rearmoring, Self::Template])
    }

    /// Display name shared by every trait-collapse variant.
    pub fn name(self) -> &'static str {
        match self {
            Self::FragmentationWarning => "Fragmentation Warning",
            Self::CriticalFragmentation => "Critical Fragmentation",
            Self::CognitiveDecline => "Cognitive Decline",
            Self::TraitCollapse(_) => "Trait Collapse",
            Self::Rearmoring => "Re-armoring",
            Self::Template => "Template",
        }
    }

    /// The history text that records this milestone.
    pub fn marker(self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ThresholdTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TraitCollapse(key) => write!(f, "THRESHOLD: Trait Collapse ({key})"),
            other => write!(f, "THRESHOLD: {}", other.name()),
        }
    }
}

/// Milestones already present in a genome's history.
#[derive(Debug, Clone, Default)]
pub struct FiredSet(BTreeSet<ThresholdTag>);

impl FiredSet {
    pub fn from_history(genome: &Genome) -> Self {
        Self(
            ThresholdTag::all()
                .filter(|tag| genome.history_contains(&tag.marker()))
                .collect(),
        )
    }

    pub fn contains(&self, tag: ThresholdTag) -> bool {
        self.0.contains(&tag)
    }

    pub fn insert(&mut self, tag: ThresholdTag) {
        self.0.insert(tag);
    }
}

/// Outcome of one named check.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThresholdResult {
    pub name: String,
    pub triggered: bool,
    pub message: String,
}

/// Everything a monitor pass produced.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ThresholdReport {
    pub mutations: Vec<Mutation>,
    pub narrative: Vec<String>,
    pub history_events: Vec<String>,
    pub journal_entries: Vec<String>,
}

impl ThresholdReport {
    pub const NAMES: [&'static str; 6] = [
        "Fragmentation Warning",
        "Critical Fragmentation",
        "Cognitive Decline",
        "Trait Collapse",
        "Re-armoring",
        "Template",
    ];

    /// One result per named check, in a fixed order.
    pub fn results(&self) -> Vec<ThresholdResult> {
        Self::NAMES
            .iter()
            .map(|name| {
                let hit = self.history_events.iter().find(|e| e.contains(name));
                ThresholdResult {
                    name: name.to_string(),
                    triggered: hit.is_some(),
                    message: hit.cloned().unwrap_or_default(),
                }
            })
            .collect()
    }

    pub fn any_triggered(&self) -> bool {
        !self.history_events.is_empty()
    }
}
