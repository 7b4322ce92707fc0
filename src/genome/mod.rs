//! Primitive helpers on the genome aggregate.
//!
//! Nothing here makes decisions; it reads trait values, appends to the
//! history ledger and checks that a loaded document is usable.

pub mod mutation;

use chrono::Utc;
use rand::Rng;
use thiserror::Error;

use crate::types::{Genome, HistoryEntry, TraitKey};

pub use mutation::{apply, round3};

/// Problems with a genome document that make it unusable.
#[derive(Debug, Error)]
pub enum GenomeError {
    #[error("genome document not found at {0}")]
    Missing(String),
    #[error("genome document is not valid JSON: {0}")]
    Invalid(String),
    #[error("genome is missing trait '{0}'")]
    MissingTrait(TraitKey),
    #[error("trait '{key}' has value {value} outside [0, 1]")]
    OutOfRange { key: TraitKey, value: f64 },
    #[error("contact depth {0} is outside 0..=4")]
    DepthOutOfRange(u8),
}

impl Genome {
    /// Current value of a trait. Absent keys read as 0.
    pub fn value(&self, key: TraitKey) -> f64 {
        self.traits.get(&key).map_or(0.0, |t| t.value)
    }

    /// Arithmetic mean over every trait.
    pub fn mean(&self) -> f64 {
        if self.traits.is_empty() {
            return 0.0;
        }
        let sum: f64 = self.traits.values().map(|t| t.value).sum();
        sum / self.traits.len() as f64
    }

    pub fn shell(&self) -> f64 {
        self.value(TraitKey::ShellHardness)
    }

    /// The weakest non-shell trait, ties resolved by key order.
    pub fn lowest_non_shell(&self) -> (TraitKey, f64) {
        TraitKey::non_shell()
            .map(|k| (k, self.value(k)))
            .fold((TraitKey::Abstraction, f64::INFINITY), |best, cur| {
                if cur.1 < best.1 {
                    cur
                } else {
                    best
                }
            })
    }

    /// Append a history event stamped with the current generation and epoch.
    pub fn add_history(&mut self, event: impl Into<String>) {
        self.add_typed_history(event, None);
    }

    pub fn add_typed_history(&mut self, event: impl Into<String>, kind: Option<&str>) {
        let epoch = if self.epoch.is_empty() {
            None
        } else {
            Some(self.epoch.clone())
        };
        self.history.push(HistoryEntry {
            timestamp: Utc::now(),
            generation: self.generation,
            epoch,
            event: event.into(),
            kind: kind.map(str::to_string),
        });
    }

    /// Whether any history event contains `needle`.
    pub fn history_contains(&self, needle: &str) -> bool {
        self.history.iter().any(|h| h.event.contains(needle))
    }

    /// Mean-trait readings quoted in the last `n` history events, oldest
    /// first. Only the first `Mean trait NN.N%` in each event counts.
    pub fn recent_mean_samples(&self, n: usize) -> Vec<f64> {
        let start = self.history.len().saturating_sub(n);
        self.history[start..]
            .iter()
            .filter_map(|h| parse_mean_sample(&h.event))
            .collect()
    }

    /// Check the structural invariants every engine operation relies on.
    pub fn validate(&self) -> Result<(), GenomeError> {
        for key in TraitKey::ALL {
            let Some(t) = self.traits.get(&key) else {
                return Err(GenomeError::MissingTrait(key));
            };
            if !(0.0..=1.0).contains(&t.value) {
                return Err(GenomeError::OutOfRange { key, value: t.value });
            }
        }
        if self.contact.depth > 4 {
            return Err(GenomeError::DepthOutOfRange(self.contact.depth));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Numeric helpers
// ---------------------------------------------------------------------------

pub fn clamp01(v: f64) -> f64 {
    v.clamp(0.0, 1.0)
}

/// Percentage with one decimal, e.g. `0.8765 -> "87.7%"`.
pub fn pct(v: f64) -> String {
    format!("{:.1}%", v * 100.0)
}

/// `"... Mean trait 87.3% ..."` -> `Some(87.3)`. The first well-formed
/// reading in the event counts.
fn parse_mean_sample(event: &str) -> Option<f64> {
    const MARKER: &str = "Mean trait ";
    event
        .match_indices(MARKER)
        .find_map(|(at, _)| parse_percent(&event[at + MARKER.len()..]))
}

/// Leading `digits.digits%` -> the number.
fn parse_percent(rest: &str) -> Option<f64> {
    let number = &rest[..rest.find('%')?];
    let (whole, frac) = number.split_once('.')?;
    let digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if !digits(whole) || !digits(frac) {
        return None;
    }
    number.parse().ok()
}

/// Uniform draw from `[lo, hi)`.
pub fn uniform<R: Rng + ?Sized>(rng: &mut R, lo: f64, hi: f64) -> f64 {
    lo + rng.gen::<f64>() * (hi - lo)
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn mean_covers_all_traits() {
        let g = with(uniform_genome(0.9), TraitKey::ShellHardness, 0.4);
        assert!((g.mean() - 0.85).abs() < 1e-9);
    }

    #[test]
    fn lowest_non_shell_ignores_shell() {
        let g = with(uniform_genome(0.9), TraitKey::ShellHardness, 0.01);
        let g = with(g, TraitKey::Empathy, 0.7);
        assert_eq!(g.lowest_non_shell(), (TraitKey::Empathy, 0.7));
    }

    #[test]
    fn history_is_stamped_with_generation() {
        let mut g = uniform_genome(0.9);
        g.add_history("ENCOUNTER: test");
        assert_eq!(g.history[0].generation, 75);
        assert_eq!(g.history[0].epoch.as_deref(), Some("Transcendence"));
        assert!(g.history_contains("ENCOUNTER"));
    }

    #[test]
    fn validate_rejects_missing_trait_and_bad_depth() {
        let mut g = uniform_genome(0.9);
        g.traits.remove(&TraitKey::Curiosity);
        assert!(matches!(g.validate(), Err(GenomeError::MissingTrait(TraitKey::Curiosity))));

        let mut g = uniform_genome(0.9);
        g.contact.depth = 5;
        assert!(matches!(g.validate(), Err(GenomeError::DepthOutOfRange(5))));
    }

    #[test]
    fn mean_samples_take_first_reading_per_event() {
        let mut g = uniform_genome(0.9);
        g.add_history("THRESHOLD: Fragmentation Warning. Mean trait 88.4%. Then Mean trait 70.0%.");
        g.add_history("ENCOUNTER: Signal. Nothing numeric.");
        g.add_history("OBSERVER: Mean trait 86.0%.");
        g.add_history("Mean trait 85%");
        assert_eq!(g.recent_mean_samples(10), vec![88.4, 86.0]);
        assert_eq!(g.recent_mean_samples(2), vec![86.0]);
    }

    #[test]
    fn malformed_reading_does_not_hide_a_later_one() {
        let mut g = uniform_genome(0.9);
        g.add_history("REFLECTION: Mean trait unknown. Later: Mean trait 84.2%.");
        g.add_history("Mean trait ?%. Mean trait 8%. Mean trait 83.0% and Mean trait 99.9%.");
        assert_eq!(g.recent_mean_samples(10), vec![84.2, 83.0]);
    }

    #[test]
    fn pct_formats_one_decimal() {
        assert_eq!(pct(0.8765), "87.7%");
        assert_eq!(pct(1.0), "100.0%");
    }
}
