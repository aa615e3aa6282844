//! Configuration types
//!
//! Board-agnostic tuning constants for the two device state machines.

pub mod types;

pub use types::*;
