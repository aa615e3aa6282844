//! Host error type
//!
//! Per-line problems never surface here: malformed lines are logged and
//! skipped by the receiver. What remains is either fatal for the session
//! (link missing at startup, operator interrupt) or reported back to the
//! operator (bad gain, unwritable output).

use std::path::PathBuf;

use stepwise_protocol::GainError;
use thiserror::Error;

/// Convenience alias for results using the host error type.
pub type HostResult<T> = std::result::Result<T, HostError>;

#[derive(Error, Debug)]
pub enum HostError {
    #[error("serial port '{port}' unavailable: {source}")]
    LinkUnavailable {
        port: String,
        #[source]
        source: serialport::Error,
    },

    #[error("link I/O error: {0}")]
    Link(#[from] std::io::Error),

    #[error("link already released")]
    LinkClosed,

    #[error("interrupted by operator")]
    Interrupted,

    #[error("invalid gain: {0}")]
    InvalidGain(#[from] GainError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("dataset output error: {0}")]
    Sink(#[from] csv::Error),

    #[error("cannot write '{}': {source}", path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("receive worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

impl HostError {
    pub(crate) fn output(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| HostError::Output { path, source }
    }
}
