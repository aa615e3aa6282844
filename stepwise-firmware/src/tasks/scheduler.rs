//! Cooperative scheduler task
//!
//! Owns both device state machines and steps them from a 1 ms ticker through
//! a [`TaskList`]. A stop request is handled before the next pass so the
//! drives are zeroed before anything else runs.

use defmt::*;
use embassy_rp::gpio::{Input, Output};
use embassy_rp::pwm::PwmOutput;
use embassy_rp::uart::BufferedUartTx;
use embassy_time::{Duration, Instant, Ticker};
use embedded_io::Write;

use stepwise_core::actuator::ActuatorTrigger;
use stepwise_core::config::{StepResponseConfig, TriggerConfig};
use stepwise_core::control::StepResponseController;
use stepwise_core::scheduler::{CooperativeTask, TaskList};
use stepwise_core::state::{StepOutcome, TriggerOutcome};
use stepwise_drivers::control::ProportionalController;
use stepwise_drivers::encoder::CounterEncoder;
use stepwise_drivers::input::PolarityInput;
use stepwise_drivers::motor::HBridgeMotor;
use stepwise_protocol::LineWriter;

use super::encoder::SharedCounter;
use crate::channels::{INBOUND_LINES, STOP};

/// Scheduler resolution
const TICK_INTERVAL_MS: u64 = 1;

pub type Motor = HBridgeMotor<Output<'static>, PwmOutput<'static>, PwmOutput<'static>>;
pub type Encoder = CounterEncoder<SharedCounter>;
pub type Switch = PolarityInput<Input<'static>>;

/// Hardware handed to the scheduler by `main`
pub struct Devices {
    pub motor: Motor,
    pub encoder: Encoder,
    pub actuator: Motor,
    pub trigger: Switch,
    pub limit: Switch,
}

/// Outbound half of the host link
///
/// The TX ring buffer is sized for a whole dataset, so writes only copy
/// into it and never wait on the wire.
struct UartLink(BufferedUartTx);

impl LineWriter for UartLink {
    type Error = embassy_rp::uart::Error;

    fn write_line(&mut self, line: &str) -> Result<(), Self::Error> {
        self.0.write_all(line.as_bytes())?;
        self.0.write_all(b"\n")
    }
}

struct StepResponseTask {
    controller: StepResponseController<Motor, Encoder, ProportionalController>,
    link: UartLink,
}

impl CooperativeTask for StepResponseTask {
    fn name(&self) -> &'static str {
        "step_response"
    }

    fn step(&mut self, now_ms: u32) {
        // Lines stay queued while a run is in progress
        let line = if self.controller.accepts_input() {
            INBOUND_LINES.try_receive().ok()
        } else {
            None
        };

        match self.controller.step(line.as_deref(), now_ms, &mut self.link) {
            StepOutcome::Idle => {}
            StepOutcome::Initialized => info!("Motor at rest, awaiting gain"),
            StepOutcome::Started { gain } => info!("Run started with Kp = {}", gain),
            StepOutcome::Rejected(e) => warn!("Gain rejected: {:?}", e),
            StepOutcome::Sampled { sample, command } => {
                trace!(
                    "t={}ms pos={} cmd={}",
                    sample.elapsed_ms,
                    sample.position,
                    command
                );
            }
            StepOutcome::Finished(reason) if reason.is_expected() => {
                info!("Run finished: {:?}", reason);
            }
            StepOutcome::Finished(reason) => warn!("Run finished: {:?}", reason),
            StepOutcome::Fault(fault) => error!("Step response fault: {:?}", fault),
        }
    }

    fn shutdown(&mut self) {
        if let Err(e) = self.controller.shutdown() {
            error!("Failed to stop motor: {:?}", e);
        }
    }
}

struct TriggerTask {
    machine: ActuatorTrigger<Motor, Switch, Switch>,
}

impl CooperativeTask for TriggerTask {
    fn name(&self) -> &'static str {
        "actuator_trigger"
    }

    fn step(&mut self, _now_ms: u32) {
        match self.machine.step() {
            TriggerOutcome::Stayed => {}
            TriggerOutcome::Entered(state) => debug!("Actuator -> {:?}", state),
            TriggerOutcome::Fault(fault) => error!("Actuator fault: {:?}", fault),
        }
    }

    fn shutdown(&mut self) {
        if let Err(e) = self.machine.shutdown() {
            error!("Failed to stop actuator: {:?}", e);
        }
    }
}

/// Scheduler task - steps both state machines at their configured periods
#[embassy_executor::task]
pub async fn scheduler_task(
    devices: Devices,
    tx: BufferedUartTx,
    step_config: StepResponseConfig,
    trigger_config: TriggerConfig,
) {
    info!("Scheduler task started");

    let (step_priority, step_period) = (step_config.priority, step_config.period_ms);
    let (trigger_priority, trigger_period) = (trigger_config.priority, trigger_config.period_ms);

    let mut step_response = StepResponseTask {
        controller: StepResponseController::new(devices.motor, devices.encoder, step_config),
        link: UartLink(tx),
    };
    let mut trigger = TriggerTask {
        machine: ActuatorTrigger::new(
            devices.actuator,
            devices.trigger,
            devices.limit,
            trigger_config,
        ),
    };

    let mut tasks: TaskList<'_> = TaskList::new();
    if let Err(e) = tasks.add(&mut step_response, step_priority, step_period) {
        error!("Cannot schedule step response: {:?}", e);
        return;
    }
    if let Err(e) = tasks.add(&mut trigger, trigger_priority, trigger_period) {
        error!("Cannot schedule actuator trigger: {:?}", e);
        return;
    }

    let mut ticker = Ticker::every(Duration::from_millis(TICK_INTERVAL_MS));

    loop {
        ticker.next().await;

        if STOP.try_take().is_some() {
            tasks.shutdown_all();
            for stats in tasks.stats() {
                info!(
                    "{}: prio={} period={}ms runs={} late={}",
                    stats.name,
                    stats.priority,
                    stats.period_ms,
                    stats.runs,
                    stats.late_runs
                );
            }
        }

        let now_ms = Instant::now().as_millis() as u32;
        tasks.run_ready(now_ms);
    }
}
