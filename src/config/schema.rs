//! Configuration schema for exocortex.toml.

use serde::{Deserialize, Serialize};

/// Root configuration structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExocortexConfig {
    /// Name given to the subject at seeding.
    pub name: String,

    /// Genome document. Relative paths are resolved against the home directory.
    pub genome_path: String,

    /// Markdown journal.
    pub journal_path: String,

    /// Self-modifiable decision weights.
    pub weights_path: String,

    /// Log level (debug, info, warn, error).
    pub log_level: String,

    /// Seconds between cycles in `live`.
    pub cycle_interval_secs: u64,

    /// Cycles `live` runs when none are requested.
    pub max_cycles: usize,

    /// Config version.
    pub version: u32,
}

impl Default for ExocortexConfig {
    fn default() -> Self {
        Self {
            name: "Fifth".into(),
            genome_path: "genome.json".into(),
            journal_path: "journal.md".into(),
            weights_path: "weights.json".into(),
            log_level: "info".into(),
            cycle_interval_secs: 2,
            max_cycles: 10,
            version: 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_fills_defaults() {
        let cfg: ExocortexConfig = toml::from_str("max_cycles = 3\n").unwrap();
        assert_eq!(cfg.max_cycles, 3);
        assert_eq!(cfg.cycle_interval_secs, 2);
        assert_eq!(cfg.weights_path, "weights.json");
    }
}
