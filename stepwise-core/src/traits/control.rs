//! Closed-loop control law trait

/// Maps a measured position to a drive command
///
/// A fresh instance is built for every run from the gain received from the
/// host and the configured target.
pub trait ControlLaw {
    /// Build a controller for one run
    fn with_gain(gain: f32, setpoint: i32) -> Self
    where
        Self: Sized;

    /// Drive command for the given position, in percent of full drive
    fn command(&mut self, position: i32) -> i16;
}
