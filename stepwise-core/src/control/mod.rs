//! Closed-loop step response
//!
//! Runs the motor toward a fixed target under a host-supplied gain, records
//! the response and stops once it has settled or timed out.

pub mod dataset;
pub mod settle;
pub mod step_response;

pub use dataset::{Dataset, Sample, MAX_SAMPLES};
pub use settle::{has_timed_out, is_settled};
pub use step_response::StepResponseController;
