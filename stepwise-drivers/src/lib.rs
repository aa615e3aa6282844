//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in stepwise-core, written against `embedded-hal` 1.0:
//!
//! - Proportional control law with output saturation
//! - H-bridge DC motor (enable line plus two PWM legs)
//! - Quadrature decoding and wraparound-safe counter accumulation
//! - Polarity-aware digital inputs

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod control;
pub mod encoder;
pub mod input;
pub mod motor;
