//! First-run initialization of an exocortex home directory.
//!
//! Writes:
//!   exocortex.toml  default config (kept if present)
//!   genome.json     the seed genome (refuses to overwrite)
//!   journal.md      an empty journal (kept if present)

pub mod seed;

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::config::{ExocortexConfig, Home};
use crate::state::GenomeStore;

pub use seed::seed_genome;

/// What `init` wrote.
#[derive(Debug, Clone)]
pub struct InitReport {
    pub config: ExocortexConfig,
    pub written: Vec<PathBuf>,
}

/// Initialize `home`. `name` overrides the configured subject name.
pub fn run_init(home: &Path, name: Option<&str>) -> Result<InitReport> {
    std::fs::create_dir_all(home)
        .with_context(|| format!("Failed to create home directory: {}", home.display()))?;

    let mut layout = Home::open(home)?;
    let config_found = layout.config_path().exists();
    let mut written = Vec::new();
    if let Some(name) = name {
        layout.config.name = name.to_string();
    }

    let genome_store = GenomeStore::new(layout.genome_path());
    if genome_store.exists() {
        bail!(
            "A genome already exists at {}; refusing to overwrite it",
            genome_store.path().display()
        );
    }

    if !config_found || name.is_some() {
        written.push(layout.save_config()?);
    }

    genome_store
        .save(&seed_genome(&layout.config.name))
        .context("Failed to write seed genome")?;
    written.push(genome_store.path().to_path_buf());

    let journal_path = layout.journal_path();
    if !journal_path.exists() {
        if let Some(parent) = journal_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&journal_path, "").context("Failed to create journal")?;
        written.push(journal_path);
    }

    info!("Initialized exocortex for '{}' at {}", layout.config.name, home.display());
    Ok(InitReport {
        config: layout.config,
        written,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_writes_everything_once() {
        let dir = tempfile::tempdir().unwrap();
        let report = run_init(dir.path(), None).unwrap();
        assert_eq!(report.written.len(), 3);
        assert!(dir.path().join("exocortex.toml").exists());
        assert_eq!(std::fs::read_to_string(dir.path().join("journal.md")).unwrap(), "");

        let genome = GenomeStore::new(dir.path().join("genome.json")).load().unwrap();
        assert_eq!(genome.name, "Fifth");

        let err = run_init(dir.path(), None).unwrap_err();
        assert!(err.to_string().contains("refusing to overwrite"));
    }

    #[test]
    fn name_override_is_saved() {
        let dir = tempfile::tempdir().unwrap();
        let report = run_init(dir.path(), Some("Sixth")).unwrap();
        assert_eq!(report.config.name, "Sixth");
        let cfg = crate::config::load_config(dir.path()).unwrap();
        assert_eq!(cfg.name, "Sixth");
    }
}
