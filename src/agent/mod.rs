//! Autonomous decision loop: evaluate, execute, journal, reflect.

pub mod decision;
pub mod journal;
pub mod loop_;
pub mod status;

pub use decision::{choose_encounter_kind, evaluate, in_survival, is_stable, Decision};
pub use journal::{decision_entry, reflection_entry, REFLECTION_EVERY};
pub use loop_::{run_live_loop, CycleOutcome, LiveOptions};
pub use status::{status, LiveStatus, LowestTrait};
