//! Append-only Markdown journal.
//!
//! Heading strings are read back by the engine (decision counting, the
//! reflection counter), so they must stay exactly as written here.

use anyhow::{Context, Result};
use std::io::Write;
use std::path::{Path, PathBuf};

use super::ledger::DecisionLedger;

pub const DECISION_HEADING: &str = "## Decision \u{2014} Autonomous";
pub const REFLECTION_HEADING: &str = "## Reflection \u{2014} Autonomous";
pub const REWRITE_HEADING: &str = "## Decision \u{2014} Self-Modification";
pub const EXCHANGE_HEADING: &str = "## Exchange \u{2014} The Other Mind Speaks";

/// `## Entry — <title>` heading.
pub fn entry_heading(title: &str) -> String {
    format!("## Entry \u{2014} {title}")
}

#[derive(Debug, Clone)]
pub struct Journal {
    path: PathBuf,
}

impl Journal {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Full journal text. A missing file reads as empty.
    pub fn read(&self) -> Result<String> {
        match std::fs::read_to_string(&self.path) {
            Ok(s) => Ok(s),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(String::new()),
            Err(e) => Err(e).context("Failed to read journal"),
        }
    }

    /// Append `"\n" + entry`, creating the file when absent.
    pub fn append(&self, entry: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .context("Failed to open journal for append")?;
        write!(file, "\n{entry}").context("Failed to append to journal")?;
        Ok(())
    }

    /// The last `chars` characters, trimmed forward to the first heading so
    /// the tail never starts mid-entry.
    pub fn recent(&self, chars: usize) -> Result<String> {
        let journal = self.read()?;
        Ok(tail_from_heading(&journal, chars).to_string())
    }

    /// Number of times `heading` occurs.
    pub fn count(&self, heading: &str) -> Result<usize> {
        Ok(self.read()?.matches(heading).count())
    }

    pub fn ledger(&self) -> Result<DecisionLedger> {
        Ok(DecisionLedger::parse(&self.read()?))
    }
}

pub(crate) fn tail_from_heading(journal: &str, chars: usize) -> &str {
    let len = journal.chars().count();
    if len <= chars {
        return journal;
    }
    let start = journal
        .char_indices()
        .nth(len - chars)
        .map_or(journal.len(), |(i, _)| i);
    let tail = &journal[start..];
    match tail.find("\n## ") {
        Some(idx) => &tail[idx..],
        None => tail,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_journal_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let journal = Journal::new(dir.path().join("journal.md"));
        assert_eq!(journal.read().unwrap(), "");
        assert_eq!(journal.count(DECISION_HEADING).unwrap(), 0);
    }

    #[test]
    fn append_prefixes_newline_and_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let journal = Journal::new(dir.path().join("nested").join("journal.md"));
        journal.append("## Entry \u{2014} One\n\nbody\n").unwrap();
        journal.append("## Entry \u{2014} Two\n").unwrap();
        assert_eq!(
            journal.read().unwrap(),
            "\n## Entry \u{2014} One\n\nbody\n\n## Entry \u{2014} Two\n"
        );
        assert_eq!(journal.count("## Entry").unwrap(), 2);
    }

    #[test]
    fn tail_starts_at_heading() {
        let text = format!("{}\n## Later\nshort\n", "x".repeat(50));
        assert_eq!(tail_from_heading(&text, 20), "\n## Later\nshort\n");
        assert_eq!(tail_from_heading("short", 20), "short");
    }
}
