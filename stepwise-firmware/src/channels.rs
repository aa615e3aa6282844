//! Inter-task communication channels
//!
//! Defines the statics shared between Embassy tasks. Uses embassy-sync
//! primitives for the line queue and stop request, and a plain atomic for
//! the encoder count.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;
use heapless::String;
use portable_atomic::AtomicI32;

use stepwise_protocol::MAX_LINE_LEN;

/// Channel capacity for inbound host lines
const LINE_CHANNEL_SIZE: usize = 4;

/// Complete lines received from the host
///
/// Only drained while the step response controller is waiting for a gain,
/// so a gain sent mid-run starts the next run.
pub static INBOUND_LINES: Channel<
    CriticalSectionRawMutex,
    String<MAX_LINE_LEN>,
    LINE_CHANNEL_SIZE,
> = Channel::new();

/// Host requested a stop; the scheduler zeroes every drive before its next pass
pub static STOP: Signal<CriticalSectionRawMutex, ()> = Signal::new();

/// Quadrature count maintained by the encoder task
pub static ENCODER_COUNT: AtomicI32 = AtomicI32::new(0);
