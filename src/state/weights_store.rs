//! Decision weights persistence. Absent or unreadable documents fall back
//! to the defaults so the decision loop can always run.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::self_mod::Weights;

#[derive(Debug, Clone)]
pub struct WeightsStore {
    path: PathBuf,
}

impl WeightsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Weights {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(s) => s,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Weights::default(),
            Err(e) => {
                warn!("Failed to read weights ({}), using defaults", e);
                return Weights::default();
            }
        };
        match serde_json::from_str(&contents) {
            Ok(w) => w,
            Err(e) => {
                warn!("Corrupt weights document ({}), using defaults", e);
                Weights::default()
            }
        }
    }

    pub fn save(&self, weights: &Weights) -> Result<()> {
        let mut contents =
            serde_json::to_string_pretty(weights).context("Failed to serialize weights")?;
        contents.push('\n');
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(&self.path, contents).context("Failed to write weights file")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_and_corrupt_fall_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = WeightsStore::new(dir.path().join("weights.json"));
        assert_eq!(store.load(), Weights::default());

        std::fs::write(store.path(), "{not json").unwrap();
        assert_eq!(store.load(), Weights::default());
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = WeightsStore::new(dir.path().join("weights.json"));
        let weights = Weights {
            wait_chance: 0.04,
            ..Weights::default()
        };
        store.save(&weights).unwrap();
        assert_eq!(store.load(), weights);
    }
}
