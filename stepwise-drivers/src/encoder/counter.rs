//! Counter-backed position encoder
//!
//! Hardware quadrature counters are typically 16 bits wide and wrap. The
//! encoder reads the raw counter each time it is asked for a position and
//! accumulates the signed difference, so it stays correct across wraps as
//! long as it is read at least once per half counter range of travel.

use stepwise_core::traits::{EncoderError, PositionEncoder};

/// A free-running 16-bit up/down counter
pub trait CounterSource {
    fn read_counter(&mut self) -> Result<u16, EncoderError>;
}

impl<T: CounterSource + ?Sized> CounterSource for &mut T {
    fn read_counter(&mut self) -> Result<u16, EncoderError> {
        (**self).read_counter()
    }
}

/// Signed 32-bit position accumulated from a [`CounterSource`]
pub struct CounterEncoder<C> {
    source: C,
    last_raw: u16,
    position: i32,
}

impl<C: CounterSource> CounterEncoder<C> {
    /// Take the counter; its current value becomes position zero
    pub fn new(mut source: C) -> Result<Self, EncoderError> {
        let last_raw = source.read_counter()?;
        Ok(Self {
            source,
            last_raw,
            position: 0,
        })
    }

    /// Read the counter and fold the movement since the last read
    pub fn update(&mut self) -> Result<i32, EncoderError> {
        let raw = self.source.read_counter()?;
        let delta = raw.wrapping_sub(self.last_raw) as i16;
        self.last_raw = raw;
        self.position = self.position.wrapping_add(delta as i32);
        Ok(self.position)
    }

    /// Position as of the last read, without touching the counter
    pub fn position(&self) -> i32 {
        self.position
    }
}

impl<C: CounterSource> PositionEncoder for CounterEncoder<C> {
    fn read_position(&mut self) -> Result<i32, EncoderError> {
        self.update()
    }

    fn zero(&mut self) -> Result<(), EncoderError> {
        self.update()?;
        self.position = 0;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    struct Counter(u16);

    impl CounterSource for Counter {
        fn read_counter(&mut self) -> Result<u16, EncoderError> {
            Ok(self.0)
        }
    }

    struct Broken;

    impl CounterSource for Broken {
        fn read_counter(&mut self) -> Result<u16, EncoderError> {
            Err(EncoderError::Hardware)
        }
    }

    #[test]
    fn test_forward_wrap_is_positive() {
        let mut encoder = CounterEncoder::new(Counter(65530)).unwrap();
        encoder.source.0 = 4;
        assert_eq!(encoder.read_position(), Ok(10));
    }

    #[test]
    fn test_reverse_wrap_is_negative() {
        let mut encoder = CounterEncoder::new(Counter(3)).unwrap();
        encoder.source.0 = 65533;
        assert_eq!(encoder.read_position(), Ok(-6));
    }

    #[test]
    fn test_zero_rebases_position() {
        let mut encoder = CounterEncoder::new(Counter(100)).unwrap();
        encoder.source.0 = 600;
        assert_eq!(encoder.read_position(), Ok(500));

        encoder.zero().unwrap();
        assert_eq!(encoder.position(), 0);
        encoder.source.0 = 580;
        assert_eq!(encoder.read_position(), Ok(-20));
    }

    #[test]
    fn test_read_failure_propagates() {
        assert!(CounterEncoder::new(Broken).is_err());
    }

    proptest! {
        #[test]
        fn prop_tracks_small_steps(
            start: u16,
            steps in proptest::collection::vec(-1000i32..1000, 1..50),
        ) {
            let mut encoder = CounterEncoder::new(Counter(start)).unwrap();
            let mut expected = 0i32;
            for step in steps {
                expected += step;
                encoder.source.0 = encoder.source.0.wrapping_add(step as u16);
                prop_assert_eq!(encoder.read_position().unwrap(), expected);
            }
        }
    }
}
