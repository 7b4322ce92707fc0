//! Self-modification of the decision weights.

pub mod audit_log;
pub mod rewrite;
pub mod weights;

pub use audit_log::{AuditLog, RewriteChange};
pub use rewrite::{rewrite, RewriteResult};
pub use weights::{Multiplier, WeightRewrite, Weights};
