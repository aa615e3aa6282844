//! Configuration type definitions
//!
//! Defaults hold the reference deployment values: a 10 ms control period,
//! a 50-sample settle window, a 2 s timeout and a half-turn target.

use heapless::String;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Maximum axis label length
pub const MAX_LABEL_LEN: usize = 32;

/// Step response run settings
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StepResponseConfig {
    /// Number of preceding samples that must equal the newest to declare steady state
    pub lookback: usize,
    /// Run is aborted once a sample's elapsed time exceeds this
    pub timeout_ms: u32,
    /// Target displacement from the zeroed position, in encoder ticks
    pub target_ticks: i32,
    /// Scheduling period (sets the sampling rate)
    pub period_ms: u32,
    /// Scheduling priority (higher runs first)
    pub priority: u8,
    /// Label of the time axis
    pub x_label: String<MAX_LABEL_LEN>,
    /// Label of the position axis
    pub y_label: String<MAX_LABEL_LEN>,
}

impl Default for StepResponseConfig {
    fn default() -> Self {
        Self {
            lookback: 50,
            timeout_ms: 2000,
            target_ticks: 1200,
            period_ms: 10,
            priority: 2,
            x_label: label("Time [ms]"),
            y_label: label("Position [Encoder Ticks]"),
        }
    }
}

/// Secondary actuator settings
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TriggerConfig {
    /// Drive level while extending or holding, in percent
    pub extend_drive: i16,
    /// Scheduling period
    pub period_ms: u32,
    /// Scheduling priority (higher runs first)
    pub priority: u8,
}

impl Default for TriggerConfig {
    fn default() -> Self {
        Self {
            extend_drive: 100,
            period_ms: 10,
            priority: 1,
        }
    }
}

/// Build a label, truncating at `MAX_LABEL_LEN` bytes on a char boundary
pub fn label(text: &str) -> String<MAX_LABEL_LEN> {
    let mut out = String::new();
    for c in text.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}
