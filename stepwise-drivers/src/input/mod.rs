//! Digital input implementations

pub mod polarity;

pub use polarity::{Polarity, PolarityInput};
