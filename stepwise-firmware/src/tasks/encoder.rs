//! Quadrature encoder task
//!
//! Decodes A/B edges in software and publishes the running count. The
//! controller side reads it through [`SharedCounter`], which presents the
//! count as a wrapping 16-bit hardware-style counter.

use core::sync::atomic::Ordering;

use defmt::*;
use embassy_futures::select::select;
use embassy_rp::gpio::Input;

use stepwise_core::traits::EncoderError;
use stepwise_drivers::encoder::{CounterSource, QuadratureDecoder};

use crate::channels::ENCODER_COUNT;

/// Encoder task - counts every edge on either channel
#[embassy_executor::task]
pub async fn encoder_task(mut a: Input<'static>, mut b: Input<'static>) {
    info!("Encoder task started");

    let mut decoder = QuadratureDecoder::new(a.is_high(), b.is_high());
    let mut reported_errors = 0;

    loop {
        select(a.wait_for_any_edge(), b.wait_for_any_edge()).await;

        decoder.update(a.is_high(), b.is_high());
        ENCODER_COUNT.store(decoder.count(), Ordering::Relaxed);

        if decoder.errors() != reported_errors {
            reported_errors = decoder.errors();
            warn!("Encoder missed an edge ({} total)", reported_errors);
        }
    }
}

/// Counter view of [`ENCODER_COUNT`]
pub struct SharedCounter;

impl CounterSource for SharedCounter {
    fn read_counter(&mut self) -> Result<u16, EncoderError> {
        Ok(ENCODER_COUNT.load(Ordering::Relaxed) as u16)
    }
}
