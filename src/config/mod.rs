//! The exocortex home directory and its `exocortex.toml`.
//!
//! Every file the engine touches is located through a [`Home`]: the config
//! names the genome, journal and weights documents, and relative names are
//! anchored at the home directory.

pub mod schema;

pub use schema::ExocortexConfig;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const CONFIG_FILE: &str = "exocortex.toml";

/// Default exocortex home directory (~/.exocortex).
pub fn default_home_dir() -> PathBuf {
    directories::BaseDirs::new()
        .map(|d| d.home_dir().join(".exocortex"))
        .unwrap_or_else(|| PathBuf::from(".exocortex"))
}

/// The `--home` argument with `~` expanded, or the default home.
pub fn resolve_home(arg: Option<&str>) -> PathBuf {
    match arg {
        Some(home) => PathBuf::from(shellexpand::tilde(home).into_owned()),
        None => default_home_dir(),
    }
}

/// Expand `~` in a configured path and anchor it at `home` when relative.
pub fn resolve_in(home: &Path, path: &str) -> PathBuf {
    let expanded = PathBuf::from(shellexpand::tilde(path).into_owned());
    if expanded.is_absolute() {
        expanded
    } else {
        home.join(expanded)
    }
}

/// Load `exocortex.toml` from `home`. A home without one runs on defaults.
pub fn load_config(home: &Path) -> Result<ExocortexConfig> {
    let path = home.join(CONFIG_FILE);
    if !path.exists() {
        info!("No {} in {}, using defaults", CONFIG_FILE, home.display());
        return Ok(ExocortexConfig::default());
    }
    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let config: ExocortexConfig = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse {} (TOML)", path.display()))?;
    debug!("Loaded config for '{}' from {}", config.name, path.display());
    Ok(config)
}

/// Write `config` as `exocortex.toml` in `home`, creating the directory.
pub fn save_config(config: &ExocortexConfig, home: &Path) -> Result<PathBuf> {
    let path = home.join(CONFIG_FILE);
    let contents = toml::to_string_pretty(config).context("Failed to serialize config")?;
    std::fs::create_dir_all(home)
        .with_context(|| format!("Failed to create home directory: {}", home.display()))?;
    std::fs::write(&path, contents)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}

// ---------------------------------------------------------------------------
// Home
// ---------------------------------------------------------------------------

/// A home directory together with the config read from it.
#[derive(Debug, Clone)]
pub struct Home {
    dir: PathBuf,
    pub config: ExocortexConfig,
}

impl Home {
    /// Read the config in `dir`. The directory itself need not exist yet.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        let config = load_config(&dir)?;
        Ok(Self { dir, config })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn config_path(&self) -> PathBuf {
        self.dir.join(CONFIG_FILE)
    }

    pub fn genome_path(&self) -> PathBuf {
        resolve_in(&self.dir, &self.config.genome_path)
    }

    pub fn journal_path(&self) -> PathBuf {
        resolve_in(&self.dir, &self.config.journal_path)
    }

    pub fn weights_path(&self) -> PathBuf {
        resolve_in(&self.dir, &self.config.weights_path)
    }

    pub fn save_config(&self) -> Result<PathBuf> {
        save_config(&self.config, &self.dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config(dir.path()).unwrap();
        assert_eq!(cfg, ExocortexConfig::default());
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let home = dir.path().join("nested");
        let cfg = ExocortexConfig {
            name: "Sixth".into(),
            cycle_interval_secs: 5,
            ..ExocortexConfig::default()
        };
        let path = save_config(&cfg, &home).unwrap();
        assert_eq!(path, home.join(CONFIG_FILE));
        assert_eq!(load_config(&home).unwrap(), cfg);
    }

    #[test]
    fn broken_toml_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "max_cycles = [").unwrap();
        let err = load_config(dir.path()).unwrap_err();
        assert!(format!("{err:#}").contains(CONFIG_FILE));
    }

    #[test]
    fn relative_paths_anchor_at_home() {
        let home = Path::new("/srv/exo");
        assert_eq!(resolve_in(home, "genome.json"), PathBuf::from("/srv/exo/genome.json"));
        assert_eq!(
            resolve_in(home, "/var/log/journal.md"),
            PathBuf::from("/var/log/journal.md")
        );
    }

    #[test]
    fn home_locates_configured_documents() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = ExocortexConfig {
            journal_path: "logs/journal.md".into(),
            ..ExocortexConfig::default()
        };
        save_config(&cfg, dir.path()).unwrap();

        let home = Home::open(dir.path()).unwrap();
        assert_eq!(home.config, cfg);
        assert_eq!(home.dir(), dir.path());
        assert_eq!(home.config_path(), dir.path().join(CONFIG_FILE));
        assert_eq!(home.genome_path(), dir.path().join("genome.json"));
        assert_eq!(home.journal_path(), dir.path().join("logs").join("journal.md"));
        assert_eq!(home.weights_path(), dir.path().join("weights.json"));
    }

    #[test]
    fn explicit_home_argument_wins() {
        assert_eq!(resolve_home(Some("/tmp/exo")), PathBuf::from("/tmp/exo"));
        assert_eq!(resolve_home(None), default_home_dir());
    }
}
