//! Exocortex CLI, a thin adapter over the engine.
//!
//! Usage:
//!   exocortex init               Seed a new subject
//!   exocortex status             Show what the decision engine sees
//!   exocortex encounter <kind>   Run one encounter
//!   exocortex live --cycles 5    Let the subject decide for itself

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::Path;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use exocortex::agent::{self, CycleOutcome, LiveOptions};
use exocortex::config::{self, ExocortexConfig, Home};
use exocortex::engine::RECENT_JOURNAL_CHARS;
use exocortex::genome::pct;
use exocortex::pulse::TraitTrend;
use exocortex::types::{Action, EncounterKind};
use exocortex::{CycleResult, Engine};

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(name = "exocortex")]
#[command(version = "0.1.0")]
#[command(about = "Autonomous trait-evolution engine for a single simulated mind")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the exocortex home directory (default ~/.exocortex).
    #[arg(long)]
    home: Option<String>,

    /// Log level (debug, info, warn, error).
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Seed a new subject in the home directory.
    Init {
        /// Name for the subject.
        #[arg(long)]
        name: Option<String>,
    },

    /// Show the live status the decision engine works from.
    Status,

    /// Show trait velocities and recent mutations.
    Pulse,

    /// Run one encounter: signal, puzzle, other, entropy or observer.
    Encounter { kind: EncounterKind },

    /// Attempt contact at the current depth.
    Contact,

    /// Speak to the subject as The Other Mind.
    Speak { message: String },

    /// Shed the shell to recover eroded traits.
    Molt,

    /// Let the subject decide and act on its own.
    Live {
        /// Number of decisions (default from config).
        #[arg(long)]
        cycles: Option<usize>,

        /// Seconds between decisions (default from config).
        #[arg(long)]
        interval: Option<u64>,

        /// Show decisions without acting on them.
        #[arg(long)]
        dry_run: bool,
    },

    /// Let the subject rewrite its own decision weights.
    Rewrite,

    /// Print the tail of the journal.
    Journal {
        #[arg(long, default_value_t = RECENT_JOURNAL_CHARS)]
        chars: usize,
    },
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .init();

    // Resolve home directory
    let home_dir = config::resolve_home(cli.home.as_deref());
    let mut rng = StdRng::from_entropy();

    if let Commands::Init { name } = &cli.command {
        return cmd_init(&home_dir, name.as_deref());
    }
    let (cfg, engine) = bootstrap(&home_dir)?;

    match cli.command {
        Commands::Init { .. } => Ok(()),
        Commands::Status => cmd_status(&engine),
        Commands::Pulse => cmd_pulse(&engine),
        Commands::Encounter { kind } => cmd_encounter(&engine, kind, &mut rng),
        Commands::Contact => cmd_contact(&engine, &mut rng),
        Commands::Speak { message } => cmd_speak(&engine, &message, &mut rng),
        Commands::Molt => cmd_molt(&engine, &mut rng),
        Commands::Live {
            cycles,
            interval,
            dry_run,
        } => cmd_live(&engine, &cfg, cycles, interval, dry_run, &mut rng).await,
        Commands::Rewrite => cmd_rewrite(&engine, &mut rng),
        Commands::Journal { chars } => {
            println!("{}", engine.recent_journal(chars)?);
            Ok(())
        }
    }
}

// ---------------------------------------------------------------------------
// Command implementations
// ---------------------------------------------------------------------------

fn cmd_init(home_dir: &Path, name: Option<&str>) -> Result<()> {
    let report = exocortex::setup::run_init(home_dir, name)?;
    println!(
        "{} Seeded '{}' in {}",
        ">>>".green().bold(),
        report.config.name,
        home_dir.display()
    );
    for path in &report.written {
        println!("  Written: {}", path.display());
    }
    Ok(())
}

fn cmd_status(engine: &Engine) -> Result<()> {
    let status = engine.status()?;

    println!();
    println!("{}", "=== Live Status ===".bold());
    println!();
    println!(
        "  mean {}  shell {}  lowest {} {}",
        pct(status.mean).bold(),
        pct(status.shell),
        status.lowest.key.label(),
        pct(status.lowest.value)
    );
    println!();
    println!("  {}", "available actions:".dimmed());
    println!("    {} always available", "encounter".green());

    if status.contact_available {
        let depth = if status.contact_depth < 4 {
            format!("depth {}/4", status.contact_depth)
        } else {
            "Entanglement".to_string()
        };
        println!(
            "    {}   {}. {} exchanges.",
            "contact".green(),
            depth,
            status.contact_exchanges
        );
    } else {
        println!("    {}   no prior Other Mind encounter.", "contact".red());
    }

    let molt = &status.molt_ready;
    if molt.ready {
        println!("    {}      ready. {} eroded.", "molt".green(), status.eroded.len());
    } else {
        let mut reasons = Vec::new();
        if !molt.metamorphic_ok {
            reasons.push("metamorphic < 85%".to_string());
        }
        if !molt.encounters_ok {
            reasons.push(format!("{}/3 encounters", molt.encounter_count));
        }
        if !molt.eroded_ok {
            reasons.push("no eroded traits".to_string());
        }
        println!("    {}      not ready ({}).", "molt".red(), reasons.join(", "));
    }
    println!("    {}      stillness when stable.", "wait".green());
    println!();

    if status.survival_mode {
        println!("  {} instinct will override deliberation.", "SURVIVAL MODE".red().bold());
    } else if status.stable {
        println!("  {} Deliberation is possible.", "Architecture stable.".green());
    } else {
        println!("  {} Some pressure.", "Functioning.".yellow());
    }
    println!();
    Ok(())
}

fn cmd_pulse(engine: &Engine) -> Result<()> {
    let pulse = engine.pulse()?;

    println!();
    println!(
        "{}  generation {}  epoch {}",
        "=== Pulse ===".bold(),
        pulse.generation,
        pulse.epoch
    );
    println!();
    for t in &pulse.traits {
        let trend = match t.status {
            TraitTrend::Surging => t.status.to_string().green().bold(),
            TraitTrend::Growing => t.status.to_string().green(),
            TraitTrend::Stable => t.status.to_string().dimmed(),
            TraitTrend::Declining => t.status.to_string().red(),
        };
        println!(
            "  {:<22} {:>7}  total {:+.3}  recent {:+.3}  {}",
            t.key.label(),
            pct(t.current),
            t.total_delta,
            t.recent_velocity,
            trend
        );
    }
    println!();
    println!(
        "  mean {}  shell {}  contact depth {} ({} exchanges)",
        pct(pulse.mean).bold(),
        pct(pulse.shell),
        pulse.contact_depth,
        pulse.contact_exchanges
    );
    println!();
    for m in &pulse.recent_mutations {
        println!(
            "  {} {:.3} -> {:.3}  {}",
            m.trait_key.label(),
            m.from,
            m.to,
            m.catalyst.dimmed()
        );
    }
    Ok(())
}

fn cmd_encounter(engine: &Engine, kind: EncounterKind, rng: &mut StdRng) -> Result<()> {
    let result = engine.encounter(kind, rng)?;
    print_lines(&result.narrative);
    for t in result.thresholds.iter().filter(|t| t.triggered) {
        println!("  {} {}", "THRESHOLD".red().bold(), t.name);
    }
    print_lines(&result.threshold_narrative);
    println!("  {}", result.history_event.dimmed());
    Ok(())
}

fn cmd_contact(engine: &Engine, rng: &mut StdRng) -> Result<()> {
    let result = engine.contact(rng)?;
    print_lines(&result.narrative);
    let verdict = if result.success {
        "resonance".green()
    } else {
        "no advance".yellow()
    };
    println!(
        "  {} depth {}/4, exchange #{}",
        verdict, result.depth, result.exchanges
    );
    Ok(())
}

fn cmd_speak(engine: &Engine, message: &str, rng: &mut StdRng) -> Result<()> {
    let result = engine.speak(message, rng)?;
    print_lines(&result.narrative);
    Ok(())
}

fn cmd_molt(engine: &Engine, rng: &mut StdRng) -> Result<()> {
    match engine.molt(rng)? {
        Ok(result) => {
            println!(
                "  {} Shell {} -> {}",
                "MOLT".magenta().bold(),
                pct(result.shell_before),
                pct(result.shell_after)
            );
            for r in &result.recovered {
                println!("    {} {} -> {}", r.key.label(), pct(r.before), pct(r.after));
            }
        }
        Err(reason) => {
            println!("  {} {}", "Not ready:".red(), reason);
        }
    }
    Ok(())
}

async fn cmd_live(
    engine: &Engine,
    cfg: &ExocortexConfig,
    cycles: Option<usize>,
    interval: Option<u64>,
    dry_run: bool,
    rng: &mut StdRng,
) -> Result<()> {
    let options = LiveOptions {
        cycles: cycles.unwrap_or(cfg.max_cycles),
        interval: Duration::from_secs(interval.unwrap_or(cfg.cycle_interval_secs)),
        dry_run,
    };

    // Ctrl+C stops the loop between cycles
    let cancel = CancellationToken::new();
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            println!("\n{} Stopping after the current cycle...", "<<<".red().bold());
            signal_cancel.cancel();
        } else {
            warn!("Failed to listen for Ctrl+C");
        }
    });

    let total = options.cycles;
    let completed = agent::run_live_loop(engine, options, rng, cancel, |n, outcome| {
        print_cycle(n, total, outcome)
    })
    .await?;

    if completed > 1 {
        let status = engine.status()?;
        println!(
            "{} {} cycles complete. mean {}  shell {}",
            "LIVE".cyan().bold(),
            completed,
            pct(status.mean),
            pct(status.shell)
        );
    }
    info!("Live session ended after {} cycle(s)", completed);
    Ok(())
}

fn cmd_rewrite(engine: &Engine, rng: &mut StdRng) -> Result<()> {
    let result = engine.rewrite(rng)?;
    print_lines(&result.narrative);
    if result.cooldown_active {
        println!("  {}", "cooldown active".yellow());
    } else {
        println!("  {} {} change(s) written", ">>>".green().bold(), result.changes.len());
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Load config and open the engine; the genome must already exist.
fn bootstrap(home_dir: &Path) -> Result<(ExocortexConfig, Engine)> {
    let home = Home::open(home_dir)
        .with_context(|| format!("Failed to load config from {}", home_dir.display()))?;
    let engine = Engine::from_home(&home);

    if !engine.genome_store().exists() {
        eprintln!(
            "{} No genome found at {}. Run `exocortex init` first.",
            "Error:".red().bold(),
            engine.genome_store().path().display()
        );
        std::process::exit(1);
    }
    Ok((home.config, engine))
}

fn print_lines(lines: &[String]) {
    for line in lines {
        println!("  {}", line);
    }
}

fn print_cycle(n: usize, total: usize, outcome: &CycleOutcome) {
    let decision = outcome.decision();
    let label = decision.to_string();
    let label = match decision.action {
        Action::Molt => label.magenta(),
        Action::Contact => label.green(),
        Action::Wait => label.dimmed(),
        Action::Encounter if decision.encounter_kind == Some(EncounterKind::Signal) => label.red(),
        Action::Encounter => label.cyan(),
    };

    println!();
    println!("{} cycle {}/{}", "LIVE".cyan().bold(), n, total);
    println!("  -> {} (priority {:.1})", label.bold(), decision.priority);
    println!("     {}", decision.reason.dimmed());

    match outcome {
        CycleOutcome::Evaluated(_) => println!("  {}", "(dry run: no action taken)".yellow()),
        CycleOutcome::Executed(CycleResult {
            success, narrative, ..
        }) => {
            print_lines(narrative);
            if !success {
                println!("  {}", "action did not succeed".yellow());
            }
        }
    }
}
