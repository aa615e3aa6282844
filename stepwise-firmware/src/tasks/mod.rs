//! Embassy async tasks
//!
//! Each task runs independently and communicates via channels/signals.

pub mod encoder;
pub mod link_rx;
pub mod scheduler;

pub use encoder::{encoder_task, SharedCounter};
pub use link_rx::link_rx_task;
pub use scheduler::{scheduler_task, Devices};
