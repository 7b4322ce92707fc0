//! Engine facade: every public operation as one load, mutate, save cycle
//! over the genome, journal and weights stores.

use anyhow::Result;
use chrono::Utc;
use rand::Rng;
use serde::Serialize;
use tracing::{error, info};

use crate::agent::{self, Decision, LiveStatus};
use crate::config::Home;
use crate::contact::{self, ContactResult, ContactStatus, SpeakResult};
use crate::encounter::{self, EncounterResult};
use crate::genome::pct;
use crate::molt::{self, MoltNotReady, MoltReadiness, MoltResult};
use crate::pulse::{self, Pulse};
use crate::self_mod::{self, RewriteResult};
use crate::state::{GenomeStore, Journal, WeightsStore, REFLECTION_HEADING};
use crate::types::{Action, EncounterKind, Genome};

/// Default size of a journal tail.
pub const RECENT_JOURNAL_CHARS: usize = 2000;

/// Outcome of one executed decision.
#[derive(Debug, Clone, Serialize)]
pub struct CycleResult {
    pub decision: Decision,
    pub success: bool,
    pub narrative: Vec<String>,
}

pub struct Engine {
    genome: GenomeStore,
    journal: Journal,
    weights: WeightsStore,
}

impl Engine {
    pub fn new(genome: GenomeStore, journal: Journal, weights: WeightsStore) -> Self {
        Self {
            genome,
            journal,
            weights,
        }
    }

    /// Open the documents the home's config names.
    pub fn from_home(home: &Home) -> Self {
        Self::new(
            GenomeStore::new(home.genome_path()),
            Journal::new(home.journal_path()),
            WeightsStore::new(home.weights_path()),
        )
    }

    pub fn genome_store(&self) -> &GenomeStore {
        &self.genome
    }

    pub fn journal(&self) -> &Journal {
        &self.journal
    }

    pub fn weights_store(&self) -> &WeightsStore {
        &self.weights
    }

    pub fn genome(&self) -> Result<Genome> {
        self.genome.load()
    }

    /// Save the genome and append entries. The side effects are independent:
    /// every one is attempted, failures are logged, and the first is returned.
    fn commit(&self, genome: &Genome, entries: &[String]) -> Result<()> {
        let mut first_err = self
            .genome
            .save(genome)
            .map_err(|e| {
                error!("Failed to save genome: {e:#}");
                e
            })
            .err();
        for entry in entries.iter().filter(|e| !e.is_empty()) {
            if let Err(e) = self.journal.append(entry) {
                error!("Failed to append journal entry: {e:#}");
                first_err.get_or_insert(e);
            }
        }
        first_err.map_or(Ok(()), Err)
    }

    // -----------------------------------------------------------------------
    // Read-only views
    // -----------------------------------------------------------------------

    pub fn status(&self) -> Result<LiveStatus> {
        Ok(agent::status(&self.genome.load()?))
    }

    pub fn pulse(&self) -> Result<Pulse> {
        Ok(pulse::analyze(&self.genome.load()?))
    }

    pub fn contact_status(&self) -> Result<ContactStatus> {
        Ok(contact::status(&self.genome.load()?))
    }

    pub fn molt_readiness(&self) -> Result<MoltReadiness> {
        Ok(molt::check_readiness(&self.genome.load()?))
    }

    pub fn recent_journal(&self, chars: usize) -> Result<String> {
        self.journal.recent(chars)
    }

    // -----------------------------------------------------------------------
    // Subsystems
    // -----------------------------------------------------------------------

    pub fn encounter<R: Rng + ?Sized>(&self, kind: EncounterKind, rng: &mut R) -> Result<EncounterResult> {
        let mut genome = self.genome.load()?;
        let ledger = self.journal.ledger()?;
        let result = encounter::run(&mut genome, kind, &ledger, rng);
        self.commit(&genome, &result.journal_entries)?;
        Ok(result)
    }

    pub fn contact<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<ContactResult> {
        let mut genome = self.genome.load()?;
        let result = contact::attempt(&mut genome, rng);
        self.commit(&genome, std::slice::from_ref(&result.journal_entry))?;
        Ok(result)
    }

    pub fn speak<R: Rng + ?Sized>(&self, message: &str, rng: &mut R) -> Result<SpeakResult> {
        let mut genome = self.genome.load()?;
        let decisions = self.journal.ledger()?.total();
        let result = contact::speak(&mut genome, message, decisions, rng);
        self.commit(&genome, std::slice::from_ref(&result.journal_entry))?;
        Ok(result)
    }

    /// The inner result is `Err` when the molt was refused; nothing is
    /// written in that case.
    pub fn molt<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Result<MoltResult, MoltNotReady>> {
        let mut genome = self.genome.load()?;
        match molt::perform(&mut genome, rng) {
            Ok(result) => {
                self.commit(&genome, std::slice::from_ref(&result.journal_entry))?;
                Ok(Ok(result))
            }
            Err(reason) => {
                info!("Molt refused: {}", reason);
                Ok(Err(reason))
            }
        }
    }

    // -----------------------------------------------------------------------
    // Decisions
    // -----------------------------------------------------------------------

    pub fn evaluate<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Decision> {
        let genome = self.genome.load()?;
        let weights = self.weights.load();
        Ok(agent::evaluate(&genome, &weights, rng))
    }

    /// Run the chosen subsystem, then journal the decision (and a
    /// reflection every tenth decision).
    ///
    /// The decision is journaled even when persisting the action failed;
    /// the first write error is returned once everything was attempted.
    pub fn execute<R: Rng + ?Sized>(&self, decision: Decision, rng: &mut R) -> Result<CycleResult> {
        let genome = self.genome.load()?;
        self.execute_on(genome, decision, rng)
    }

    fn execute_on<R: Rng + ?Sized>(
        &self,
        mut genome: Genome,
        decision: Decision,
        rng: &mut R,
    ) -> Result<CycleResult> {
        let mean_before = genome.mean();
        let mut narrative = Vec::new();
        let mut success = true;
        let mut committed: Result<()> = Ok(());

        match decision.action {
            Action::Wait => narrative.push("I did nothing. The stillness was the point.".to_string()),
            Action::Molt => match molt::perform(&mut genome, rng) {
                Ok(result) => {
                    narrative.push(format!(
                        "Molt complete. Shell {} -> {}.",
                        pct(result.shell_before),
                        pct(result.shell_after)
                    ));
                    for r in &result.recovered {
                        narrative.push(format!(
                            "{} recovered: {} -> {}.",
                            r.key.label(),
                            pct(r.before),
                            pct(r.after)
                        ));
                    }
                    committed = self.commit(&genome, std::slice::from_ref(&result.journal_entry));
                }
                Err(reason) => {
                    success = false;
                    narrative.push(format!("Molt failed: {reason}"));
                }
            },
            Action::Contact => {
                let result = contact::attempt(&mut genome, rng);
                committed = self.commit(&genome, std::slice::from_ref(&result.journal_entry));
                success = result.success;
                narrative.extend(result.narrative);
            }
            Action::Encounter => {
                let kind = decision.encounter_kind.unwrap_or(EncounterKind::Entropy);
                let ledger = self.journal.ledger()?;
                let result = encounter::run(&mut genome, kind, &ledger, rng);
                committed = self.commit(&genome, &result.journal_entries);
                narrative.extend(result.narrative);
                narrative.extend(result.threshold_narrative);
            }
        }

        let mean_after = genome.mean();
        let ledger = self.journal.ledger()?;
        let entry = agent::decision_entry(&decision, mean_before, mean_after, &ledger, rng);
        let appended = self.journal.append(&entry);
        if let Err(e) = &appended {
            error!("Failed to append decision entry: {e:#}");
        }
        info!(
            "Decision #{}: {} (mean {:+.2}%)",
            ledger.total() + 1,
            decision,
            (mean_after - mean_before) * 100.0
        );

        let total = ledger.total() + 1;
        if total % agent::REFLECTION_EVERY == 0 {
            let ledger = self.journal.ledger()?;
            let reflections = self.journal.count(REFLECTION_HEADING)?;
            if let Some(reflection) = agent::reflection_entry(&genome, &ledger, reflections, rng) {
                match self.journal.append(&reflection) {
                    Ok(()) => narrative.push("Reflection written.".to_string()),
                    Err(e) => error!("Failed to append reflection: {e:#}"),
                }
            }
        }
        committed.and(appended)?;

        Ok(CycleResult {
            decision,
            success,
            narrative,
        })
    }

    pub fn run_cycle<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<CycleResult> {
        let decision = self.evaluate(rng)?;
        self.execute(decision, rng)
    }

    pub fn run_cycles<R: Rng + ?Sized>(&self, n: usize, rng: &mut R) -> Result<Vec<CycleResult>> {
        (0..n).map(|_| self.run_cycle(rng)).collect()
    }

    /// Self-modification of the decision weights. Blocked results write nothing.
    pub fn rewrite<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<RewriteResult> {
        let genome = self.genome.load()?;
        let mut weights = self.weights.load();
        let ledger = self.journal.ledger()?;
        let result = self_mod::rewrite(&genome, &mut weights, &ledger, rng, Utc::now());
        if !result.success {
            return Ok(result);
        }

        let saved = self.weights.save(&weights);
        if let Err(e) = &saved {
            error!("Failed to save weights: {e:#}");
        }
        let appended = self.journal.append(&result.journal_entry);
        if let Err(e) = &appended {
            error!("Failed to append rewrite entry: {e:#}");
        }
        saved.and(appended)?;
        Ok(result)
    }
}
