//! Quadrature decoder
//!
//! Gray-code state machine over the A/B channel levels. Feed it the levels
//! on every edge; a forward cycle `00 -> 01 -> 11 -> 10 -> 00` counts +4.
//! Both channels changing at once means an edge was missed; that is counted
//! as an error and leaves the position unchanged.

/// Marker for transitions that skip a state
const INVALID: i8 = 2;

/// Count delta indexed by `(previous << 2) | current`
const TRANSITIONS: [i8; 16] = [
    0, 1, -1, INVALID, // from 00
    -1, 0, INVALID, 1, // from 01
    1, INVALID, 0, -1, // from 10
    INVALID, -1, 1, 0, // from 11
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct QuadratureDecoder {
    state: u8,
    count: i32,
    errors: u32,
}

impl QuadratureDecoder {
    /// Start from the current channel levels
    pub const fn new(a: bool, b: bool) -> Self {
        Self {
            state: levels(a, b),
            count: 0,
            errors: 0,
        }
    }

    /// Process new channel levels, returning the count delta
    pub fn update(&mut self, a: bool, b: bool) -> i32 {
        let next = levels(a, b);
        let delta = TRANSITIONS[((self.state << 2) | next) as usize];
        self.state = next;
        if delta == INVALID {
            self.errors = self.errors.wrapping_add(1);
            return 0;
        }
        self.count = self.count.wrapping_add(delta as i32);
        delta as i32
    }

    /// Accumulated count (wraps on overflow)
    pub fn count(&self) -> i32 {
        self.count
    }

    /// Number of skipped-state transitions seen
    pub fn errors(&self) -> u32 {
        self.errors
    }
}

const fn levels(a: bool, b: bool) -> u8 {
    ((a as u8) << 1) | b as u8
}
