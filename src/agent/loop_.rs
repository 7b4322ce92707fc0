//! Timed live loop: evaluate, act, journal, sleep, repeat.
//!
//! Cycles run one after another on the calling task. Cancellation is
//! checked before every cycle and interrupts the sleep between cycles;
//! a cycle that has started always completes.

use anyhow::{Context, Result};
use rand::Rng;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::info;

use super::decision::Decision;
use crate::engine::{CycleResult, Engine};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiveOptions {
    pub cycles: usize,
    pub interval: Duration,
    /// Evaluate only; nothing is executed or written.
    pub dry_run: bool,
}

/// What one cycle produced.
#[derive(Debug, Clone)]
pub enum CycleOutcome {
    Evaluated(Decision),
    Executed(CycleResult),
}

impl CycleOutcome {
    pub fn decision(&self) -> &Decision {
        match self {
            Self::Evaluated(d) => d,
            Self::Executed(r) => &r.decision,
        }
    }
}

/// Run up to `options.cycles` cycles, reporting each through `on_cycle`
/// (1-based index). Returns how many cycles ran.
pub async fn run_live_loop<R, F>(
    engine: &Engine,
    options: LiveOptions,
    rng: &mut R,
    cancel: CancellationToken,
    mut on_cycle: F,
) -> Result<usize>
where
    R: Rng + ?Sized,
    F: FnMut(usize, &CycleOutcome),
{
    info!(
        "Starting live loop ({} cycles, {}s interval{})",
        options.cycles,
        options.interval.as_secs(),
        if options.dry_run { ", dry run" } else { "" }
    );

    let mut completed = 0;
    for n in 1..=options.cycles {
        if cancel.is_cancelled() {
            break;
        }

        let outcome = if options.dry_run {
            CycleOutcome::Evaluated(engine.evaluate(rng).context("Failed to evaluate decision")?)
        } else {
            CycleOutcome::Executed(engine.run_cycle(rng).with_context(|| format!("Cycle {n} failed"))?)
        };
        on_cycle(n, &outcome);
        completed = n;

        if n < options.cycles {
            tokio::select! {
                _ = tokio::time::sleep(options.interval) => {}
                _ = cancel.cancelled() => {
                    info!("Live loop interrupted after {} cycle(s)", completed);
                    break;
                }
            }
        }
    }

    info!("Live loop finished: {} cycle(s)", completed);
    Ok(completed)
}
