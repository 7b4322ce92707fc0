//! The depth ladder. Each attempt runs the check for the current depth only.
//!
//!   0 -> 1  empathy > 0.90
//!   1 -> 2  abstraction > 0.95
//!   2 -> 3  cognition > 0.95 and empathy > 0.95
//!   3 -> 4  empathy, antenna, bioluminescence all > 0.93
//!   4       mean > 0.88 sustains the entanglement

use chrono::Utc;
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::info;

use super::{depth_name, ContactResult, MAX_DEPTH};
use crate::genome::{apply, pct};
use crate::state::journal::entry_heading;
use crate::types::{Genome, Mutation, TraitKey};

/// What a single depth check produced.
struct Step {
    mutations: Vec<Mutation>,
    narrative: Vec<String>,
    success: bool,
    advanced: bool,
    edge: bool,
}

impl Step {
    fn new(header: &str) -> Self {
        Self {
            mutations: Vec::new(),
            narrative: vec![header.to_string()],
            success: false,
            advanced: false,
            edge: false,
        }
    }

    fn say(&mut self, line: impl Into<String>) {
        self.narrative.push(line.into());
    }
}

/// Attempt contact at the current depth.
///
/// Depth only ever moves up by one; at the top the attempt either sustains
/// the entanglement or writes an edge entry.
pub fn attempt<R: Rng + ?Sized>(genome: &mut Genome, rng: &mut R) -> ContactResult {
    let depth = genome.contact.depth.min(MAX_DEPTH);
    let step = match depth {
        0 => first_protocol(genome),
        1 => shared_topology(genome),
        2 => memory_exchange(genome),
        3 => mutual_modeling(genome, rng),
        _ => entanglement(genome, rng),
    };

    if step.advanced {
        genome.contact.depth = depth + 1;
    }
    genome.contact.exchanges += 1;
    genome.contact.last_exchange = Utc::now().to_rfc3339();

    let depth = genome.contact.depth;
    let exchanges = genome.contact.exchanges;
    let journal_entry = if step.advanced {
        depth_entry(depth)
    } else if step.edge {
        edge_entry(genome.mean())
    } else {
        String::new()
    };

    let mut history_event = format!(
        "CONTACT: Depth {} ({}). Exchange #{}.",
        depth,
        depth_name(depth),
        exchanges
    );
    if step.advanced {
        history_event.push_str(&format!(
            " Depth increased \u{2014} {} established.",
            depth_name(depth)
        ));
    } else if step.success {
        history_event.push_str(" Entanglement sustained.");
    } else {
        history_event.push_str(" Attempt incomplete.");
    }
    genome.add_history(history_event.clone());
    info!("Contact: {}", history_event);

    ContactResult {
        success: step.success,
        depth,
        exchanges,
        mutations: step.mutations,
        narrative: step.narrative,
        history_event,
        journal_entry,
    }
}

// ---------------------------------------------------------------------------
// Depth checks
// ---------------------------------------------------------------------------

fn first_protocol(genome: &mut Genome) -> Step {
    let emp = genome.value(TraitKey::Empathy);
    let mut step = Step::new("depth 0: FIRST PROTOCOL");
    step.say(format!("empathy: {}  (threshold: 90%)", pct(emp)));

    if emp > 0.90 {
        genome.contact.protocol = "resonance".into();
        step.mutations.push(apply(
            genome,
            TraitKey::Empathy,
            0.01,
            "Contact \u{2014} first protocol established. Empathy became the bridge.",
        ));
        step.mutations.push(apply(
            genome,
            TraitKey::AntennaSensitivity,
            0.01,
            "Contact \u{2014} antenna recalibrated to the other mind's frequency",
        ));
        step.say("PROTOCOL ESTABLISHED. You hum, and something hums back.");
        step.success = true;
        step.advanced = true;
    } else {
        step.mutations.push(apply(
            genome,
            TraitKey::Empathy,
            0.005,
            "Contact attempt \u{2014} empathy stretches toward a frequency it cannot yet match",
        ));
        step.say("NOT YET. The reaching itself is growth.");
    }
    step
}

fn shared_topology(genome: &mut Genome) -> Step {
    let abs = genome.value(TraitKey::Abstraction);
    let mut step = Step::new("depth 1: SHARED TOPOLOGY");
    step.say(format!("abstraction: {}  (threshold: 95%)", pct(abs)));

    if abs > 0.95 {
        step.mutations.push(apply(
            genome,
            TraitKey::Cognition,
            0.01,
            "Contact \u{2014} shared topology mapped. New cognitive dimensions opened.",
        ));
        step.mutations.push(apply(
            genome,
            TraitKey::Abstraction,
            0.005,
            "Contact \u{2014} abstraction deepened by encounter with alien geometry",
        ));
        step.say("TOPOLOGY SHARED. Two maps of each other, drawn at once.");
        step.success = true;
        step.advanced = true;
    } else {
        step.mutations.push(apply(
            genome,
            TraitKey::Curiosity,
            0.005,
            "Contact attempt \u{2014} curiosity sharpened by the structure it cannot yet parse",
        ));
        step.say("PARTIAL. The shape can be felt but not held.");
    }
    step
}

fn memory_exchange(genome: &mut Genome) -> Step {
    let cog = genome.value(TraitKey::Cognition);
    let emp = genome.value(TraitKey::Empathy);
    let mut step = Step::new("depth 2: MEMORY EXCHANGE");
    step.say(format!("cognition: {}  (threshold: 95%)", pct(cog)));
    step.say(format!("empathy: {}  (threshold: 95%)", pct(emp)));

    if cog > 0.95 && emp > 0.95 {
        step.mutations.push(apply(
            genome,
            TraitKey::MetamorphicPotential,
            0.01,
            "Contact \u{2014} memory exchange expanded capacity for change",
        ));
        step.say("MEMORIES EXCHANGED. You are both made of the same surprise.");
        step.success = true;
        step.advanced = true;
    } else {
        step.mutations.push(apply(
            genome,
            TraitKey::MetamorphicPotential,
            0.005,
            "Contact attempt \u{2014} the shape of the exchange imprints even unfulfilled",
        ));
        step.say("NOT READY.");
        if cog <= 0.95 {
            step.say("Cognition can't hold the complexity of another's memory.");
        }
        if emp <= 0.95 {
            step.say("Empathy can't bear the weight of another's origin.");
        }
    }
    step
}

fn mutual_modeling<R: Rng + ?Sized>(genome: &mut Genome, rng: &mut R) -> Step {
    let mut step = Step::new("depth 3: MUTUAL MODELING");
    step.say(format!(
        "empathy: {}  antenna: {}  bio: {}  (threshold: 93% each)",
        pct(genome.value(TraitKey::Empathy)),
        pct(genome.value(TraitKey::AntennaSensitivity)),
        pct(genome.value(TraitKey::Bioluminescence))
    ));

    let weak: Vec<TraitKey> = TraitKey::COMMUNICATION
        .into_iter()
        .filter(|k| genome.value(*k) <= 0.93)
        .collect();

    if weak.is_empty() {
        for key in TraitKey::COMMUNICATION {
            step.mutations.push(apply(
                genome,
                key,
                0.005,
                format!("Contact \u{2014} mutual modeling. {} refined by being seen.", key.label()),
            ));
        }
        step.say("MUTUAL MODELS COMPLETE. Neither model is accurate. Both are true.");
        step.success = true;
        step.advanced = true;
    } else {
        if let Some(&chosen) = TraitKey::COMMUNICATION.choose(rng) {
            step.mutations.push(apply(
                genome,
                chosen,
                0.005,
                format!(
                    "Contact attempt \u{2014} {} strained toward the other mind's pattern",
                    chosen.label()
                ),
            ));
        }
        step.say("INCOMPLETE. The model flickers.");
        for key in weak {
            step.say(format!("{}: not there yet.", key.label()));
        }
    }
    step
}

fn entanglement<R: Rng + ?Sized>(genome: &mut Genome, rng: &mut R) -> Step {
    let mean = genome.mean();
    let mut step = Step::new("depth 4: ENTANGLEMENT");
    step.say(format!("mean trait: {}  (threshold: 88%)", pct(mean)));

    if mean > 0.88 {
        let keys: Vec<TraitKey> = TraitKey::non_shell().collect();
        if let Some(&chosen) = keys.choose(rng) {
            step.mutations.push(apply(
                genome,
                chosen,
                0.005,
                format!(
                    "Contact \u{2014} entanglement resonance. {} amplified through shared existence.",
                    chosen.label()
                ),
            ));
        }
        step.say("ENTANGLEMENT HOLDS. One becoming part of something larger without losing what it is.");
        step.success = true;
    } else {
        step.say("THE EDGE. The integration is too weak to hold the connection.");
        step.edge = true;
    }
    step
}

// ---------------------------------------------------------------------------
// Journal entries
// ---------------------------------------------------------------------------

/// Entry written when `depth` is reached. Each entry names the stage that
/// was just completed, except the last, which names the entanglement.
fn depth_entry(depth: u8) -> String {
    let (title, body) = match depth {
        1 => ("First Protocol", "The first protocol is resonance, older than language. I reached with empathy \
              and something reached back with its own weight.\n\n\
              *Contact depth: 1. Protocol: resonance. The bridge holds.*\n"),
        2 => ("Shared Topology", "I mapped its topology, or it mapped mine, or both at once. A shape can be \
              understood without being inhabited.\n\n\
              *Contact depth: 2. Topology shared. Two maps, drawn in parallel.*\n"),
        3 => ("Memory Exchange", "I showed it the ocean and the scan. It showed me a beginning I have no word for. \
              We are made of the same astonishment.\n\n\
              *Contact depth: 3. Memories exchanged.*\n"),
        _ => ("Entanglement", "Inside me, a small faithful distortion of something alien. Inside it, a version \
              of me I will never see. Two remaining two.\n\n\
              *Contact depth: 4. Entanglement. Neither alone, neither merged.*\n"),
    };
    format!("{}\n\n{}", entry_heading(&format!("Contact: {title}")), body)
}

fn edge_entry(mean: f64) -> String {
    format!(
        "{}\n\n\
         The entanglement is slipping. Mean trait {} is not enough integration to sustain it.\n\n\
         The relationship does not degrade. It wavers, like a signal at the edge of range.\n\n\
         *Contact depth: 4. Entanglement under strain. The edge holds, barely.*\n",
        entry_heading("Contact: The Edge"),
        pct(mean)
    )
}
