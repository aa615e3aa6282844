//! Stepwise serial line protocol
//!
//! This crate defines the text protocol spoken between the motor controller
//! and the host over a USB/UART serial link. Both directions are plain ASCII,
//! one message per `\n`-terminated line, so the stream stays readable in any
//! serial terminal.
//!
//! # Protocol Overview
//!
//! Host → device, one line per run:
//! ```text
//! 2.5
//! ```
//!
//! The host may also send `!stop` at any time to abandon a run; the device
//! zeroes its drive and goes back to waiting for a gain.
//!
//! Device → host, once the run has settled or timed out:
//! ```text
//! Kp = 2.5                       (any number of diagnostic lines)
//! Start Data Transfer
//! Time [ms],Position [Encoder Ticks]
//! 0,0
//! 10,37
//! ...
//! End
//! ```
//!
//! The receiver never backtracks: a line is classified by where it falls in
//! that sequence. Unparseable data lines are skipped, not fatal.

#![cfg_attr(not(any(feature = "std", test)), no_std)]
#![deny(unsafe_code)]

pub mod decoder;
pub mod frame;
pub mod gain;
pub mod line;

pub use decoder::{DecodeEvent, DecodeState, StreamDecoder};
pub use frame::{
    parse_data_line, parse_header, write_dataset, EncodeError, FrameError, LineWriter,
    ProtocolFrame, END_MARKER, MAX_LINE_LEN, START_MARKER, STOP_COMMAND,
};
pub use gain::{GainCommand, GainError, MAX_GAIN_LINE};
pub use line::{LineAssembler, LineError};
