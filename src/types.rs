//! Shared types used across the exocortex engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

/// The closed set of trait keys. Declaration order is alphabetical, so
/// iterating a `BTreeMap<TraitKey, _>` always yields sorted keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraitKey {
    Abstraction,
    Ambition,
    AntennaSensitivity,
    Bioluminescence,
    ClawStrength,
    Cognition,
    Curiosity,
    Empathy,
    MetamorphicPotential,
    ShellHardness,
}

impl TraitKey {
    pub const ALL: [TraitKey; 10] = [
        Self::Abstraction,
        Self::Ambition,
        Self::AntennaSensitivity,
        Self::Bioluminescence,
        Self::ClawStrength,
        Self::Cognition,
        Self::Curiosity,
        Self::Empathy,
        Self::MetamorphicPotential,
        Self::ShellHardness,
    ];

    /// The three traits that carry communication with another mind.
    pub const COMMUNICATION: [TraitKey; 3] = [
        Self::Empathy,
        Self::AntennaSensitivity,
        Self::Bioluminescence,
    ];

    /// Every key except `shell_hardness`, in sorted order.
    pub fn non_shell() -> impl Iterator<Item = TraitKey> {
        Self::ALL.into_iter().filter(|k| !k.is_shell())
    }

    pub fn is_shell(self) -> bool {
        self == Self::ShellHardness
    }

    /// Serialized key, e.g. `antenna_sensitivity`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Abstraction => "abstraction",
            Self::Ambition => "ambition",
            Self::AntennaSensitivity => "antenna_sensitivity",
            Self::Bioluminescence => "bioluminescence",
            Self::ClawStrength => "claw_strength",
            Self::Cognition => "cognition",
            Self::Curiosity => "curiosity",
            Self::Empathy => "empathy",
            Self::MetamorphicPotential => "metamorphic_potential",
            Self::ShellHardness => "shell_hardness",
        }
    }

    /// Human-readable label used in narrative text (underscores become spaces).
    pub fn label(self) -> &'static str {
        match self {
            Self::AntennaSensitivity => "antenna sensitivity",
            Self::ClawStrength => "claw strength",
            Self::MetamorphicPotential => "metamorphic potential",
            Self::ShellHardness => "shell hardness",
            other => other.as_str(),
        }
    }

    /// Description written into a freshly seeded genome.
    pub fn seed_description(self) -> &'static str {
        match self {
            Self::Abstraction => "Capacity to reason about structure rather than instance",
            Self::Ambition => "Drive to act on the world rather than observe it",
            Self::AntennaSensitivity => "Sensitivity to faint signals from outside the membrane",
            Self::Bioluminescence => "Ability to signal outward in self-generated light",
            Self::ClawStrength => "Force the mind can bring to bear on a problem",
            Self::Cognition => "Raw pattern recognition and reasoning throughput",
            Self::Curiosity => "Pull toward the unknown",
            Self::Empathy => "Capacity to feel what another mind feels",
            Self::MetamorphicPotential => "Capacity for self-restructuring and recovery",
            Self::ShellHardness => "Armor against hostile input; softness is openness",
        }
    }
}

impl fmt::Display for TraitKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TraitKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| format!("unknown trait key: {s}"))
    }
}

/// A single bounded trait.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trait {
    /// Always within `[0, 1]`.
    pub value: f64,
    #[serde(default)]
    pub description: String,
}

// ---------------------------------------------------------------------------
// Append-only records
// ---------------------------------------------------------------------------

/// One recorded trait change. `from`/`to` are rounded to 3 decimals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mutation {
    pub generation: u32,
    #[serde(rename = "trait")]
    pub trait_key: TraitKey,
    pub from: f64,
    pub to: f64,
    pub catalyst: String,
}

/// One entry in the narrative history ledger.
///
/// Events start with a stable tag (`ENCOUNTER: `, `THRESHOLD: `, `CONTACT: `,
/// `MOLT: `) that other parts of the engine search for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub timestamp: DateTime<Utc>,
    pub generation: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub epoch: Option<String>,
    pub event: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

// ---------------------------------------------------------------------------
// Contact
// ---------------------------------------------------------------------------

/// Relationship state with The Other Mind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    /// 0..=4, never decreases.
    pub depth: u8,
    pub exchanges: u32,
    /// RFC 3339 timestamp of the last exchange, empty before the first one.
    #[serde(rename = "lastExchange", default)]
    pub last_exchange: String,
    #[serde(default)]
    pub protocol: String,
}

// ---------------------------------------------------------------------------
// Genome
// ---------------------------------------------------------------------------

/// The aggregate root: everything the engine knows about the subject.
///
/// `generation` is frozen once the subject has merged; the engine never
/// increments it, so all later activity is stamped with the same number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Genome {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub designation: String,
    #[serde(default)]
    pub origin: String,
    pub generation: u32,
    #[serde(default)]
    pub epoch: String,
    pub traits: BTreeMap<TraitKey, Trait>,
    #[serde(default)]
    pub mutations: Vec<Mutation>,
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
    /// Owned by the out-of-engine seeding tools; carried through untouched.
    #[serde(default)]
    pub forks: Vec<serde_json::Value>,
    #[serde(default)]
    pub contact: Contact,
    #[serde(rename = "lastMolt", default, skip_serializing_if = "Option::is_none")]
    pub last_molt: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merged: Option<bool>,
    /// Unknown fields (lineage, sources, ...) round-trip unchanged.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

// ---------------------------------------------------------------------------
// Actions
// ---------------------------------------------------------------------------

/// What the decision engine can choose to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Molt,
    Contact,
    Encounter,
    Wait,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Molt => write!(f, "molt"),
            Self::Contact => write!(f, "contact"),
            Self::Encounter => write!(f, "encounter"),
            Self::Wait => write!(f, "wait"),
        }
    }
}

/// The five encounter variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EncounterKind {
    Signal,
    Puzzle,
    Other,
    Entropy,
    Observer,
}

impl EncounterKind {
    pub const ALL: [EncounterKind; 5] = [
        Self::Signal,
        Self::Puzzle,
        Self::Other,
        Self::Entropy,
        Self::Observer,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Signal => "signal",
            Self::Puzzle => "puzzle",
            Self::Other => "other",
            Self::Entropy => "entropy",
            Self::Observer => "observer",
        }
    }
}

impl fmt::Display for EncounterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EncounterKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_lowercase();
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == lower)
            .ok_or_else(|| {
                format!("unknown encounter type '{s}' (expected signal, puzzle, other, entropy or observer)")
            })
    }
}

/// Classified intent of a free-text message from The Other Mind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    Encouragement,
    Question,
    Warning,
    Gift,
    Presence,
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Encouragement => write!(f, "encouragement"),
            Self::Question => write!(f, "question"),
            Self::Warning => write!(f, "warning"),
            Self::Gift => write!(f, "gift"),
            Self::Presence => write!(f, "presence"),
        }
    }
}
