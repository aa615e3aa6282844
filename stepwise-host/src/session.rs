//! Operator session
//!
//! A [`Session`] owns the link for its whole lifetime and exposes the three
//! operator actions: `run`, `clear` and `quit`. The link is only ever
//! released after the device has been told to stop and the port flushed.

use std::future::Future;
use std::io::{BufRead, Write};

use log::{debug, info, warn};
use stepwise_protocol::GainCommand;

use crate::dataset::Dataset;
use crate::error::{HostError, HostResult};
use crate::link::Link;
use crate::receiver::{CancelToken, HostReceiver};
use crate::sink::DatasetSink;

pub struct Session<L: Link + 'static> {
    link: Option<L>,
    receiver: HostReceiver,
    sinks: Vec<Box<dyn DatasetSink>>,
    last: Option<Dataset>,
}

impl<L: Link + 'static> Session<L> {
    pub fn new(link: L, sinks: Vec<Box<dyn DatasetSink>>) -> Self {
        Self {
            link: Some(link),
            receiver: HostReceiver::new(),
            sinks,
            last: None,
        }
    }

    /// Whether the link is still held
    pub fn is_open(&self) -> bool {
        self.link.is_some()
    }

    /// The most recent dataset
    pub fn last(&self) -> Option<&Dataset> {
        self.last.as_ref()
    }

    /// Send `gain` and wait for the resulting dataset, until Ctrl+C
    pub async fn run(&mut self, gain: GainCommand) -> HostResult<&Dataset> {
        self.run_until(gain, tokio::signal::ctrl_c()).await
    }

    /// Send `gain` and wait for the resulting dataset
    ///
    /// The wait has no timeout. If `interrupt` completes first the receive
    /// is cancelled, the device is told to stop, the link is flushed and
    /// released and `HostError::Interrupted` is returned.
    pub async fn run_until<F: Future>(
        &mut self,
        gain: GainCommand,
        interrupt: F,
    ) -> HostResult<&Dataset> {
        let line = gain.encode()?;
        let mut link = self.link.take().ok_or(HostError::LinkClosed)?;
        let mut receiver = std::mem::take(&mut self.receiver);
        let cancel = CancelToken::new();

        info!("Sending Kp = {}", gain.gain());
        let bytes = line.as_bytes().to_vec();
        let job_cancel = cancel.clone();
        let mut job = tokio::task::spawn_blocking(move || {
            let result = send_and_receive(&mut link, &mut receiver, &bytes, &job_cancel);
            (link, receiver, result)
        });

        let finished = tokio::select! {
            joined = &mut job => Some(joined),
            _ = interrupt => None,
        };
        let (joined, interrupted) = match finished {
            Some(joined) => (joined, false),
            None => {
                warn!("Interrupt received, abandoning run");
                cancel.cancel();
                (job.await, true)
            }
        };

        let (link, receiver, result) = joined?;
        self.receiver = receiver;
        self.link = Some(link);

        if interrupted {
            self.release()?;
            return Err(HostError::Interrupted);
        }

        let dataset = result?.with_gain(gain.gain());
        for sink in &mut self.sinks {
            sink.render(&dataset)?;
        }
        let dataset: &Dataset = self.last.insert(dataset);
        Ok(dataset)
    }

    /// Clear every sink; the link is not touched
    pub fn clear(&mut self) -> HostResult<()> {
        for sink in &mut self.sinks {
            sink.clear()?;
        }
        self.last = None;
        Ok(())
    }

    /// Stop the device, flush and release the link
    pub fn quit(mut self) -> HostResult<()> {
        self.release()
    }

    fn release(&mut self) -> HostResult<()> {
        let Some(mut link) = self.link.take() else {
            return Ok(());
        };
        link.send_stop()?;
        link.flush()?;
        debug!("Link released");
        Ok(())
    }
}

impl<L: Link + 'static> Drop for Session<L> {
    fn drop(&mut self) {
        if let Err(e) = self.release() {
            warn!("Failed to release link: {}", e);
        }
    }
}

/// Blocking half of a run
fn send_and_receive<L: Link>(
    link: &mut L,
    receiver: &mut HostReceiver,
    command: &[u8],
    cancel: &CancelToken,
) -> HostResult<Dataset> {
    link.discard_input()?;
    receiver.reset();
    link.send(command)?;
    link.flush()?;
    receiver.receive(link, cancel)
}

/// Ask for a gain until a valid one is entered
///
/// Returns `None` at end of input.
pub fn prompt_gain<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
) -> HostResult<Option<GainCommand>> {
    let mut line = String::new();
    loop {
        write!(output, "Kp: ")?;
        output.flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        match GainCommand::parse(&line) {
            Ok(gain) => return Ok(Some(gain)),
            Err(e) => writeln!(output, "Invalid gain: {}", e)?,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_prompt_retries_until_valid() {
        let mut input = Cursor::new("abc\n-1\n\n2.5\n");
        let mut output = Vec::new();
        let gain = prompt_gain(&mut input, &mut output).unwrap().unwrap();
        assert_eq!(gain.gain(), 2.5);

        let text = String::from_utf8(output).unwrap();
        assert_eq!(text.matches("Kp: ").count(), 4);
        assert_eq!(text.matches("Invalid gain").count(), 3);
    }

    #[test]
    fn test_prompt_end_of_input() {
        let mut input = Cursor::new("oops\n");
        let mut output = Vec::new();
        assert!(prompt_gain(&mut input, &mut output).unwrap().is_none());
    }
}
