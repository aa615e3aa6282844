//! Motor driver implementations

pub mod hbridge;

pub use hbridge::HBridgeMotor;
