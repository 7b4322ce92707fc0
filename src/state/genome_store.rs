//! Genome document persistence.
//!
//! The genome lives in a single pretty-printed JSON file that is read fresh
//! at the start of every operation and overwritten wholesale afterwards.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::genome::GenomeError;
use crate::types::Genome;

#[derive(Debug, Clone)]
pub struct GenomeStore {
    path: PathBuf,
}

impl GenomeStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Load and validate the genome.
    pub fn load(&self) -> Result<Genome> {
        if !self.path.exists() {
            return Err(GenomeError::Missing(self.path.display().to_string()).into());
        }
        let contents =
            std::fs::read_to_string(&self.path).context("Failed to read genome file")?;
        let genome: Genome = serde_json::from_str(&contents)
            .map_err(|e| GenomeError::Invalid(e.to_string()))?;
        genome.validate()?;
        debug!(
            "Loaded genome '{}' ({} mutations, {} history events)",
            genome.name,
            genome.mutations.len(),
            genome.history.len()
        );
        Ok(genome)
    }

    /// Write the whole genome, pretty-printed with a trailing newline.
    pub fn save(&self, genome: &Genome) -> Result<()> {
        let mut contents =
            serde_json::to_string_pretty(genome).context("Failed to serialize genome")?;
        contents.push('\n');
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(&self.path, contents).context("Failed to write genome file")?;
        Ok(())
    }
}
