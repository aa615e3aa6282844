//! Serial link to the device
//!
//! [`Link`] is the narrow byte interface the receiver and session need;
//! [`SerialLink`] implements it over the `serialport` crate. The port is
//! owned by the link and released on drop, after a final flush.

use std::io::{self, Read, Write};

use log::{debug, warn};
use serialport::{ClearBuffer, SerialPort};
use stepwise_protocol::STOP_COMMAND;

use crate::config::LinkConfig;
use crate::error::{HostError, HostResult};

/// Byte-level connection to the device
pub trait Link: Send {
    /// Read whatever is available
    ///
    /// Blocks for at most the link's poll timeout; `Ok(0)` means no data
    /// arrived in that window.
    fn read_available(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Write raw bytes to the device
    fn send(&mut self, bytes: &[u8]) -> io::Result<()>;

    /// Drop anything received but not yet read
    fn discard_input(&mut self) -> io::Result<()>;

    /// Push any buffered output to the device
    fn flush(&mut self) -> io::Result<()>;

    /// Ask the device to abandon its run and stop the motor
    fn send_stop(&mut self) -> io::Result<()> {
        self.send(STOP_COMMAND.as_bytes())?;
        self.send(b"\n")?;
        self.flush()
    }
}

/// A host serial port
pub struct SerialLink {
    name: String,
    port: Box<dyn SerialPort>,
}

impl SerialLink {
    /// Open the configured port
    ///
    /// Failure here is fatal for the session: there is no retry.
    pub fn open(config: &LinkConfig) -> HostResult<Self> {
        let port = serialport::new(&config.port, config.baud_rate)
            .timeout(config.poll_timeout())
            .open()
            .map_err(|source| HostError::LinkUnavailable {
                port: config.port.clone(),
                source,
            })?;

        debug!(
            "Serial port '{}' opened at {} baud",
            config.port, config.baud_rate
        );
        Ok(Self {
            name: config.port.clone(),
            port,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Link for SerialLink {
    fn read_available(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.port.read(buf) {
            Ok(n) => Ok(n),
            Err(e) if e.kind() == io::ErrorKind::TimedOut => Ok(0),
            Err(e) => Err(e),
        }
    }

    fn send(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.port.write_all(bytes)
    }

    fn discard_input(&mut self) -> io::Result<()> {
        self.port.clear(ClearBuffer::Input).map_err(io::Error::from)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.port.flush()
    }
}

impl Drop for SerialLink {
    fn drop(&mut self) {
        if let Err(e) = self.port.flush() {
            warn!("Failed to flush serial port '{}': {}", self.name, e);
        }
        debug!("Serial port '{}' closed", self.name);
    }
}
