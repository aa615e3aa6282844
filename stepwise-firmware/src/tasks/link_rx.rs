//! Host link receive task
//!
//! Assembles UART bytes into lines and queues them for the step response
//! controller. A stop line bypasses the queue.

use defmt::*;
use embassy_rp::uart::BufferedUartRx;
use embedded_io_async::Read;
use heapless::String;

use stepwise_protocol::{LineAssembler, MAX_LINE_LEN, STOP_COMMAND};

use crate::channels::{INBOUND_LINES, STOP};

/// Buffer size for UART receive
const RX_BUF_SIZE: usize = 64;

/// Link RX task - receives lines from the host
#[embassy_executor::task]
pub async fn link_rx_task(mut rx: BufferedUartRx) {
    info!("Link RX task started");

    let mut assembler: LineAssembler = LineAssembler::new();
    let mut buf = [0u8; RX_BUF_SIZE];

    loop {
        let n = match rx.read(&mut buf).await {
            Ok(n) => n,
            Err(e) => {
                warn!("UART read error: {:?}", e);
                continue;
            }
        };
        trace!("RX: {} bytes", n);

        for &byte in &buf[..n] {
            match assembler.feed(byte) {
                Ok(Some(line)) => handle_line(line),
                Ok(None) => {}
                Err(e) => warn!("Dropped malformed line: {:?}", e),
            }
        }
    }
}

fn handle_line(line: String<MAX_LINE_LEN>) {
    if line.trim() == STOP_COMMAND {
        info!("Stop requested by host");
        STOP.signal(());
        return;
    }

    debug!("Line queued: {}", line.as_str());
    if INBOUND_LINES.try_send(line).is_err() {
        warn!("Line queue full, dropping line");
    }
}
