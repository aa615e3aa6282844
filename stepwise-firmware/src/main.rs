//! Stepwise - step response rig firmware
//!
//! Main firmware binary for RP2040-based boards. Waits for a proportional
//! gain over UART0, runs the motor to a fixed target under closed-loop
//! control and streams the recorded response back to the host.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::peripherals::UART0;
use embassy_rp::pwm::{Config as PwmConfig, Pwm};
use embassy_rp::uart::{BufferedInterruptHandler, BufferedUart, Config as UartConfig};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use stepwise_core::config::{StepResponseConfig, TriggerConfig};
use stepwise_drivers::encoder::CounterEncoder;
use stepwise_drivers::input::PolarityInput;
use stepwise_drivers::motor::HBridgeMotor;

mod channels;
mod tasks;

use tasks::{Devices, SharedCounter};

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
});

/// PWM top value: 125 MHz / 6250 = 20 kHz
const PWM_TOP: u16 = 6250;

// Static cells for UART buffers (must live forever)
// TX holds a whole dataset so streaming it never waits on the wire
static TX_BUF: StaticCell<[u8; 8192]> = StaticCell::new();
static RX_BUF: StaticCell<[u8; 256]> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Stepwise firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    // Host link on UART0 (GPIO0 TX, GPIO1 RX), 115200 baud default
    let tx_buf = TX_BUF.init([0u8; 8192]);
    let rx_buf = RX_BUF.init([0u8; 256]);
    let uart = BufferedUart::new(
        p.UART0,
        p.PIN_0,
        p.PIN_1,
        Irqs,
        tx_buf,
        rx_buf,
        UartConfig::default(),
    );
    let (tx, rx) = uart.split();
    info!("UART initialized for host link");

    let mut pwm_config = PwmConfig::default();
    pwm_config.top = PWM_TOP;

    // Main motor: EN=GPIO4, IN1/IN2 on PWM slice 1 (GPIO2/GPIO3)
    let (in1, in2) = Pwm::new_output_ab(p.PWM_SLICE1, p.PIN_2, p.PIN_3, pwm_config.clone()).split();
    let motor_enable = Output::new(p.PIN_4, Level::Low);

    // Actuator: EN=GPIO10, IN1/IN2 on PWM slice 4 (GPIO8/GPIO9)
    let (act1, act2) = Pwm::new_output_ab(p.PWM_SLICE4, p.PIN_8, p.PIN_9, pwm_config).split();
    let actuator_enable = Output::new(p.PIN_10, Level::Low);

    let (Some(in1), Some(in2), Some(act1), Some(act2)) = (in1, in2, act1, act2) else {
        error!("PWM outputs unavailable");
        return;
    };

    let motor = match HBridgeMotor::new(motor_enable, in1, in2) {
        Ok(motor) => motor,
        Err(e) => {
            error!("Motor init failed: {:?}", e);
            return;
        }
    };
    let actuator = match HBridgeMotor::new(actuator_enable, act1, act2) {
        Ok(actuator) => actuator,
        Err(e) => {
            error!("Actuator init failed: {:?}", e);
            return;
        }
    };
    info!("Motor drivers initialized");

    // Encoder channels A/B on GPIO6/GPIO7
    let enc_a = Input::new(p.PIN_6, Pull::Up);
    let enc_b = Input::new(p.PIN_7, Pull::Up);
    let encoder = match CounterEncoder::new(SharedCounter) {
        Ok(encoder) => encoder,
        Err(e) => {
            error!("Encoder init failed: {:?}", e);
            return;
        }
    };

    // Trigger (GPIO14) and limit (GPIO15) switches pull to ground when active
    let trigger = PolarityInput::active_low(Input::new(p.PIN_14, Pull::Up));
    let limit = PolarityInput::active_low(Input::new(p.PIN_15, Pull::Up));
    info!("Inputs initialized");

    let devices = Devices {
        motor,
        encoder,
        actuator,
        trigger,
        limit,
    };

    // Spawn tasks
    spawner.spawn(tasks::encoder_task(enc_a, enc_b)).unwrap();
    spawner.spawn(tasks::link_rx_task(rx)).unwrap();
    spawner
        .spawn(tasks::scheduler_task(
            devices,
            tx,
            StepResponseConfig::default(),
            TriggerConfig::default(),
        ))
        .unwrap();

    info!("All tasks spawned, firmware running");
}
