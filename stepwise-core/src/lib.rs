//! Board-agnostic core logic for the step response rig
//!
//! This crate contains all device logic that does not depend on specific
//! hardware implementations:
//!
//! - Capability traits (drive motor, position encoder, digital input, control law)
//! - Step response state machine with steady-state and timeout detection
//! - Secondary actuator trigger state machine
//! - Cooperative priority scheduler
//! - Configuration type definitions

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod actuator;
pub mod config;
pub mod control;
pub mod scheduler;
pub mod state;
pub mod traits;
