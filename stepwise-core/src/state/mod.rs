//! State and outcome types for the device state machines
//!
//! Both machines are explicit, finite and deterministic. Each step returns an
//! outcome value describing what happened; nothing is signalled by panics or
//! hidden side channels.

pub mod run;
pub mod trigger;

pub use run::{ExitReason, RunFault, RunState, StepOutcome};
pub use trigger::{TriggerFault, TriggerOutcome, TriggerState};
