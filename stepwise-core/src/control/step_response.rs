//! Step response state machine
//!
//! Waits for a gain line, closes the loop toward `target_ticks`, records one
//! sample per step and streams the dataset once the position has settled or
//! the run has timed out. Every call to [`StepResponseController::step`]
//! returns immediately; "no gain yet" is an [`StepOutcome::Idle`] step.

use core::fmt::Write;

use heapless::String;
use stepwise_protocol::{write_dataset, GainCommand, LineWriter, ProtocolFrame, MAX_LINE_LEN};

use super::dataset::{Dataset, Sample};
use super::settle::{has_timed_out, is_settled};
use crate::config::StepResponseConfig;
use crate::state::{ExitReason, RunFault, RunState, StepOutcome};
use crate::traits::{ControlLaw, DriveMotor, MotorError, PositionEncoder};

/// Internal phase; carries the per-run control law and time reference
enum Phase<C> {
    Uninitialized,
    AwaitingGain,
    Running { law: C, t0_ms: u32 },
}

/// Closed-loop step response controller
///
/// Owns its motor and encoder for its whole lifetime. The control law `C` is
/// rebuilt from the received gain at the start of every run.
pub struct StepResponseController<M, E, C> {
    motor: M,
    encoder: E,
    config: StepResponseConfig,
    dataset: Dataset,
    phase: Phase<C>,
}

impl<M, E, C> StepResponseController<M, E, C>
where
    M: DriveMotor,
    E: PositionEncoder,
    C: ControlLaw,
{
    /// Create a controller in `Uninitialized`
    pub fn new(motor: M, encoder: E, config: StepResponseConfig) -> Self {
        let dataset = Dataset::new(config.x_label.clone(), config.y_label.clone());
        Self {
            motor,
            encoder,
            config,
            dataset,
            phase: Phase::Uninitialized,
        }
    }

    /// Current run state
    pub fn state(&self) -> RunState {
        match self.phase {
            Phase::Uninitialized => RunState::Uninitialized,
            Phase::AwaitingGain => RunState::AwaitingGain,
            Phase::Running { .. } => RunState::Running,
        }
    }

    /// Whether the next step consumes an inbound line
    ///
    /// Lines offered in any other state are ignored, so callers holding a
    /// queue should leave them queued until this returns true.
    pub fn accepts_input(&self) -> bool {
        matches!(self.phase, Phase::AwaitingGain)
    }

    /// Samples recorded so far in the current run
    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn config(&self) -> &StepResponseConfig {
        &self.config
    }

    /// Advance the machine by one scheduling period
    ///
    /// `inbound` is the next complete line from the host, if any. Frames for
    /// the host are written to `link`.
    pub fn step<W: LineWriter>(
        &mut self,
        inbound: Option<&str>,
        now_ms: u32,
        link: &mut W,
    ) -> StepOutcome {
        match self.phase {
            Phase::Uninitialized => match self.motor.stop() {
                Ok(()) => {
                    self.phase = Phase::AwaitingGain;
                    StepOutcome::Initialized
                }
                Err(e) => StepOutcome::Fault(e.into()),
            },
            Phase::AwaitingGain => match inbound {
                Some(line) if !line.trim().is_empty() => self.accept_gain(line, now_ms, link),
                _ => StepOutcome::Idle,
            },
            Phase::Running { ref mut law, t0_ms } => {
                let sampled = closed_loop(
                    &mut self.motor,
                    &mut self.encoder,
                    &mut self.dataset,
                    &self.config,
                    law,
                    now_ms.wrapping_sub(t0_ms),
                );
                match sampled {
                    Ok((sample, command, None)) => StepOutcome::Sampled { sample, command },
                    Ok((_, _, Some(reason))) => self.finish(reason, link),
                    Err(fault) => self.finish(ExitReason::Aborted(fault), link),
                }
            }
        }
    }

    /// Force the drive to zero and drop any run in progress
    ///
    /// Used on operator interrupt or link reset. The machine ends up in
    /// `AwaitingGain` even when the stop command fails, and the partial
    /// dataset is discarded without being sent.
    pub fn shutdown(&mut self) -> Result<(), MotorError> {
        let stopped = self.motor.stop();
        self.dataset.clear();
        self.phase = Phase::AwaitingGain;
        stopped
    }

    fn accept_gain<W: LineWriter>(&mut self, line: &str, now_ms: u32, link: &mut W) -> StepOutcome {
        let command = match GainCommand::parse(line) {
            Ok(command) => command,
            Err(e) => {
                return match diagnostic(link, format_args!("Invalid gain: {}", e)) {
                    Ok(()) => StepOutcome::Rejected(e),
                    Err(fault) => StepOutcome::Fault(fault),
                };
            }
        };

        let gain = command.gain();
        match self.start_run(gain, now_ms, link) {
            Ok(()) => StepOutcome::Started { gain },
            Err(fault) => {
                // Stop result is secondary to the fault that got us here
                let _ = self.motor.stop();
                self.phase = Phase::AwaitingGain;
                StepOutcome::Fault(fault)
            }
        }
    }

    fn start_run<W: LineWriter>(
        &mut self,
        gain: f32,
        now_ms: u32,
        link: &mut W,
    ) -> Result<(), RunFault> {
        diagnostic(link, format_args!("Kp = {}", gain))?;

        let law = C::with_gain(gain, self.config.target_ticks);
        self.encoder.zero()?;
        self.dataset.clear();

        diagnostic(link, format_args!("Setup Complete"))?;
        self.phase = Phase::Running { law, t0_ms: now_ms };
        Ok(())
    }

    /// Stop the motor, report the exit reason and stream the dataset
    fn finish<W: LineWriter>(&mut self, mut reason: ExitReason, link: &mut W) -> StepOutcome {
        self.phase = Phase::AwaitingGain;

        if let Err(e) = self.motor.stop() {
            if reason.is_expected() {
                reason = ExitReason::Aborted(RunFault::Drive(e));
            }
        }

        if reason != ExitReason::Aborted(RunFault::Link) {
            let sent = diagnostic(link, format_args!("{}", reason)).and_then(|()| {
                write_dataset(link, self.dataset.labels(), self.dataset.points())
                    .map(|_| ())
                    .map_err(|_| RunFault::Link)
            });
            if let Err(fault) = sent {
                reason = ExitReason::Aborted(fault);
            }
        }

        self.dataset.clear();
        StepOutcome::Finished(reason)
    }
}

/// One closed-loop sample: read, record, drive, then test the exit conditions
fn closed_loop<M, E, C>(
    motor: &mut M,
    encoder: &mut E,
    dataset: &mut Dataset,
    config: &StepResponseConfig,
    law: &mut C,
    elapsed_ms: u32,
) -> Result<(Sample, i16, Option<ExitReason>), RunFault>
where
    M: DriveMotor,
    E: PositionEncoder,
    C: ControlLaw,
{
    let position = encoder.read_position()?;
    let sample = dataset.push(Sample {
        elapsed_ms,
        position,
    })?;

    let command = law.command(position);
    // Drive sign is inverted by the mechanical linkage
    motor.set_drive(command.saturating_neg())?;

    let samples = dataset.samples();
    let exit = if is_settled(samples, config.lookback) {
        Some(ExitReason::SteadyStateReached)
    } else if has_timed_out(samples, config.timeout_ms) {
        Some(ExitReason::SteadyStateTimeout)
    } else {
        None
    };
    Ok((sample, command, exit))
}

/// Write one diagnostic line, truncated to the line limit
fn diagnostic<W: LineWriter>(link: &mut W, args: core::fmt::Arguments<'_>) -> Result<(), RunFault> {
    let mut text: String<MAX_LINE_LEN> = String::new();
    // Overflow just truncates
    let _ = text.write_fmt(args);
    ProtocolFrame::Diagnostic(&text)
        .write_to(link)
        .map_err(|_| RunFault::Link)
}
