//! Stepwise host
//!
//! Sends a proportional gain to the rig over a serial link, receives the
//! streamed step response and hands each finished dataset to one or more
//! sinks.
//!
//! The receive path blocks on link I/O with no timeout; an unresponsive
//! device keeps [`Session::run`] waiting until the operator interrupts.

pub mod config;
pub mod dataset;
pub mod error;
pub mod link;
pub mod receiver;
pub mod session;
pub mod sink;

pub use config::{HostConfig, LinkConfig, OutputConfig, DEFAULT_CONFIG_FILE};
pub use dataset::Dataset;
pub use error::{HostError, HostResult};
pub use link::{Link, SerialLink};
pub use receiver::{CancelToken, HostReceiver, HOST_LINE_LEN};
pub use session::{prompt_gain, Session};
pub use sink::{CsvSink, DatasetSink, LogSink};
