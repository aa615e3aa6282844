//! Dataset receiver
//!
//! Turns the device's byte stream into finished datasets. Bytes are split
//! into lines, each line is classified by [`StreamDecoder`] and the points
//! of the current run are accumulated here. Nothing in the stream is fatal:
//! malformed lines are logged and skipped.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{debug, info, warn};
use stepwise_protocol::{DecodeEvent, LineAssembler, StreamDecoder};

use crate::dataset::Dataset;
use crate::error::{HostError, HostResult};
use crate::link::Link;

/// Read chunk size
const READ_BUF_SIZE: usize = 256;

/// Longest line the host accepts
///
/// Far above anything the device emits, so long labels or diagnostics
/// survive intact.
pub const HOST_LINE_LEN: usize = 4096;

/// Shared flag asking a blocking receive to give up
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Default)]
pub struct HostReceiver {
    assembler: LineAssembler<HOST_LINE_LEN>,
    decoder: StreamDecoder,
    current: Dataset,
    ready: VecDeque<Dataset>,
    skipped: usize,
}

impl HostReceiver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget any partial line or run and wait for a new start marker
    pub fn reset(&mut self) {
        self.assembler.reset();
        self.decoder.reset();
        self.current = Dataset::default();
        self.ready.clear();
    }

    /// Lines skipped as malformed since the receiver was created
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Feed raw bytes; returns how many datasets completed
    pub fn feed(&mut self, bytes: &[u8]) -> usize {
        let before = self.ready.len();
        for &byte in bytes {
            match self.assembler.feed(byte) {
                Ok(Some(line)) => self.push_line(&line),
                Ok(None) => {}
                Err(e) => {
                    self.skipped += 1;
                    self.decoder.skip_line();
                    warn!("Discarded malformed line: {}", e);
                }
            }
        }
        self.ready.len() - before
    }

    /// Take the oldest completed dataset
    pub fn take_dataset(&mut self) -> Option<Dataset> {
        self.ready.pop_front()
    }

    /// Classify one complete line
    pub fn push_line(&mut self, line: &str) {
        match self.decoder.push_line(line) {
            DecodeEvent::Diagnostic(text) => {
                if !text.is_empty() {
                    info!("device: {}", text);
                }
            }
            DecodeEvent::Started => {
                debug!("Start marker received");
                self.current = Dataset::default();
            }
            DecodeEvent::Header { x_label, y_label } => {
                debug!("Header: '{}' / '{}'", x_label, y_label);
                self.current.x_label = x_label.to_string();
                self.current.y_label = y_label.to_string();
            }
            DecodeEvent::Point { x, y } => self.current.points.push((x, y)),
            DecodeEvent::Skipped { line, error } => {
                self.skipped += 1;
                warn!("Read Error: skipped '{}' ({})", line, error);
            }
            DecodeEvent::Finished => {
                let dataset = std::mem::take(&mut self.current);
                info!("Dataset received: {} points", dataset.len());
                self.ready.push_back(dataset);
            }
        }
    }

    /// Block until a full dataset arrives or `cancel` is raised
    ///
    /// There is no timeout: a silent device keeps this waiting until the
    /// operator cancels. The cancel flag is checked between polls.
    pub fn receive<L: Link + ?Sized>(
        &mut self,
        link: &mut L,
        cancel: &CancelToken,
    ) -> HostResult<Dataset> {
        let mut buf = [0u8; READ_BUF_SIZE];
        loop {
            if let Some(dataset) = self.take_dataset() {
                return Ok(dataset);
            }
            if cancel.is_cancelled() {
                return Err(HostError::Interrupted);
            }
            let n = link.read_available(&mut buf)?;
            self.feed(&buf[..n]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stream(lines: &[&str]) -> Vec<u8> {
        lines.iter().flat_map(|l| format!("{}\n", l).into_bytes()).collect()
    }

    #[test]
    fn test_feed_in_small_chunks() {
        let bytes = stream(&[
            "Kp = 2.5",
            "Setup Complete",
            "Start Data Transfer",
            "Time [ms],Position [Encoder Ticks]",
            "0,0",
            "10,5",
            "End",
        ]);
        let mut receiver = HostReceiver::new();
        let completed: usize = bytes.chunks(3).map(|c| receiver.feed(c)).sum();
        assert_eq!(completed, 1);

        let dataset = receiver.take_dataset().unwrap();
        assert_eq!(dataset.x_label, "Time [ms]");
        assert_eq!(dataset.y_label, "Position [Encoder Ticks]");
        assert_eq!(dataset.points, vec![(0.0, 0.0), (10.0, 5.0)]);
        assert!(receiver.take_dataset().is_none());
    }

    #[test]
    fn test_space_separated_and_crlf_lines() {
        let bytes = b"Start Data Transfer\r\nt, y\r\n0 1\r\n10 2 extra\r\nEnd\r\n";
        let mut receiver = HostReceiver::new();
        receiver.feed(bytes);

        let dataset = receiver.take_dataset().unwrap();
        assert_eq!(dataset.y_label, "y");
        assert_eq!(dataset.points, vec![(0.0, 1.0), (10.0, 2.0)]);
    }

    #[test]
    fn test_bad_lines_are_skipped_not_fatal() {
        let bytes = stream(&[
            "Start Data Transfer",
            "x,y",
            "0,0",
            "garbage",
            "20,5",
            "End",
        ]);
        let mut receiver = HostReceiver::new();
        receiver.feed(&bytes);

        assert_eq!(receiver.skipped(), 1);
        let dataset = receiver.take_dataset().unwrap();
        assert_eq!(dataset.points, vec![(0.0, 0.0), (20.0, 5.0)]);
    }

    #[test]
    fn test_back_to_back_runs() {
        let mut bytes = stream(&["Start Data Transfer", "a,b", "1,1", "End"]);
        bytes.extend(stream(&["Start Data Transfer", "c,d", "2,2", "End"]));
        let mut receiver = HostReceiver::new();
        assert_eq!(receiver.feed(&bytes), 2);
        assert_eq!(receiver.take_dataset().unwrap().x_label, "a");
        assert_eq!(receiver.take_dataset().unwrap().x_label, "c");
    }

    #[test]
    fn test_reset_drops_partial_run() {
        let mut receiver = HostReceiver::new();
        receiver.feed(&stream(&["Start Data Transfer", "a,b", "1,1"]));
        receiver.reset();
        receiver.feed(&stream(&["2,2", "End"]));
        assert!(receiver.take_dataset().is_none());
    }

    #[test]
    fn test_header_longer_than_device_line_is_kept() {
        let x_label = "Elapsed time since the gain was accepted [milliseconds]";
        let y_label = "Shaft position relative to start [encoder ticks]";
        let header = format!("{},{}", x_label, y_label);
        assert!(header.len() > stepwise_protocol::MAX_LINE_LEN);

        let bytes = stream(&["Start Data Transfer", &header, "0,0", "10,5", "20,5", "End"]);
        let mut receiver = HostReceiver::new();
        assert_eq!(receiver.feed(&bytes), 1);

        let dataset = receiver.take_dataset().unwrap();
        assert_eq!(dataset.x_label, x_label);
        assert_eq!(dataset.y_label, y_label);
        assert_eq!(dataset.points, vec![(0.0, 0.0), (10.0, 5.0), (20.0, 5.0)]);
        assert_eq!(receiver.skipped(), 0);
    }

    #[test]
    fn test_overlong_header_does_not_shift_data_lines() {
        let header = "x".repeat(HOST_LINE_LEN + 10);
        let bytes = stream(&["Start Data Transfer", &header, "0,0", "10,5", "20,5", "End"]);
        let mut receiver = HostReceiver::new();
        assert_eq!(receiver.feed(&bytes), 1);

        let dataset = receiver.take_dataset().unwrap();
        assert!(dataset.x_label.is_empty());
        assert_eq!(dataset.points, vec![(0.0, 0.0), (10.0, 5.0), (20.0, 5.0)]);
        assert_eq!(receiver.skipped(), 1);
    }

    struct Silent;

    impl Link for Silent {
        fn read_available(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
            Ok(0)
        }

        fn send(&mut self, _bytes: &[u8]) -> std::io::Result<()> {
            Ok(())
        }

        fn discard_input(&mut self) -> std::io::Result<()> {
            Ok(())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_cancel_stops_waiting() {
        let cancel = CancelToken::new();
        cancel.cancel();
        let result = HostReceiver::new().receive(&mut Silent, &cancel);
        assert!(matches!(result, Err(HostError::Interrupted)));
    }
}
