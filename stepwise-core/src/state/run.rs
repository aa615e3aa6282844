//! Step response run states

use stepwise_protocol::GainError;

use crate::control::Sample;
use crate::traits::{EncoderError, MotorError};

/// Step response controller states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RunState {
    /// Hardware not yet brought to a known state
    #[default]
    Uninitialized,
    /// Motor stopped, waiting for a gain line
    AwaitingGain,
    /// Closed loop active, sampling every step
    Running,
}

/// Faults that abort a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RunFault {
    /// Position could not be read or zeroed
    Encoder(EncoderError),
    /// Drive command could not be applied
    Drive(MotorError),
    /// Sample storage exhausted
    DatasetFull,
    /// Outbound link rejected a write
    Link,
}

impl core::fmt::Display for RunFault {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            RunFault::Encoder(e) => write!(f, "{}", e),
            RunFault::Drive(e) => write!(f, "{}", e),
            RunFault::DatasetFull => f.write_str("sample buffer full"),
            RunFault::Link => f.write_str("link write failed"),
        }
    }
}

impl From<EncoderError> for RunFault {
    fn from(e: EncoderError) -> Self {
        RunFault::Encoder(e)
    }
}

impl From<MotorError> for RunFault {
    fn from(e: MotorError) -> Self {
        RunFault::Drive(e)
    }
}

/// Why a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ExitReason {
    /// Position held exactly for the whole lookback window
    SteadyStateReached,
    /// Elapsed time exceeded the timeout
    SteadyStateTimeout,
    /// An internal fault cut the run short
    Aborted(RunFault),
}

impl ExitReason {
    /// Whether the run ended by design rather than by fault
    pub fn is_expected(&self) -> bool {
        !matches!(self, ExitReason::Aborted(_))
    }
}

impl core::fmt::Display for ExitReason {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ExitReason::SteadyStateReached => f.write_str("Steady State Achieved"),
            ExitReason::SteadyStateTimeout => f.write_str("Steady State Timeout"),
            ExitReason::Aborted(fault) => write!(f, "Run aborted: {}", fault),
        }
    }
}

/// What a single controller step did
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StepOutcome {
    /// Nothing to do this period
    Idle,
    /// Hardware brought to rest; now awaiting a gain
    Initialized,
    /// A gain line was accepted and a run started
    Started { gain: f32 },
    /// A gain line was rejected; still awaiting a gain
    Rejected(GainError),
    /// One closed-loop sample taken
    Sampled { sample: Sample, command: i16 },
    /// Run ended and the dataset was sent (unless the link failed)
    Finished(ExitReason),
    /// Fault outside a run (initialization or run setup)
    Fault(RunFault),
}
