//! Exocortex: autonomous trait-evolution engine for a single simulated mind.
//!
//! A fixed set of bounded traits is pushed around by encounters, a contact
//! protocol with The Other Mind, molts, and a decision loop that picks among
//! them and can rewrite its own decision weights.

pub mod agent;
pub mod config;
pub mod contact;
pub mod encounter;
pub mod engine;
pub mod genome;
pub mod molt;
pub mod pulse;
pub mod self_mod;
pub mod setup;
pub mod state;
pub mod threshold;
pub mod types;

pub use engine::{CycleResult, Engine};
