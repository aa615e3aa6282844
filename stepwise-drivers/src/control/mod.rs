//! Control laws

pub mod proportional;

pub use proportional::ProportionalController;
