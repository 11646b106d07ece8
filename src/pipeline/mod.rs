//! The four-stage case pipeline.
//!
//! Stages run in strict order per case: triage, guidance, booking,
//! follow-up. Each stage is a pure-ish function from the latest case record
//! to a [`StageOutcome`]; the orchestrator owns persistence, audit updates,
//! and outbound texts. Stage failures never cross the stage boundary: every
//! failure path produces a fallback outcome instead.

pub mod booking;
pub mod follow_up;
pub mod guidance;
pub mod narrative;
pub mod orchestrator;
pub mod outcome;
pub mod scheduler;
pub mod triage;

pub use orchestrator::Orchestrator;
pub use outcome::{Disposition, StageOutcome};
pub use scheduler::FollowUpScheduler;
