//! Position encoder implementations
//!
//! - [`QuadratureDecoder`]: software decoding of A/B channel levels
//! - [`CounterEncoder`]: signed position from a wrapping 16-bit counter

pub mod counter;
pub mod quadrature;

pub use counter::{CounterEncoder, CounterSource};
pub use quadrature::QuadratureDecoder;
