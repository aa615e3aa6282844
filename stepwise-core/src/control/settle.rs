//! Run termination tests

use super::Sample;

/// Whether the response has settled
///
/// True iff there are more than `lookback` samples and each of the
/// `lookback` samples before the newest has exactly the newest position.
/// No tolerance band: one tick of jitter restarts the window.
pub fn is_settled(samples: &[Sample], lookback: usize) -> bool {
    if lookback == 0 || samples.len() <= lookback {
        return false;
    }
    let Some((current, history)) = samples.split_last() else {
        return false;
    };
    history[history.len() - lookback..]
        .iter()
        .all(|s| s.position == current.position)
}

/// Whether the newest sample is past the timeout
pub fn has_timed_out(samples: &[Sample], timeout_ms: u32) -> bool {
    samples
        .last()
        .is_some_and(|s| s.elapsed_ms > timeout_ms)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const LOOKBACK: usize = 50;

    fn series(positions: &[i32]) -> std::vec::Vec<Sample> {
        positions
            .iter()
            .enumerate()
            .map(|(i, &position)| Sample {
                elapsed_ms: i as u32 * 10,
                position,
            })
            .collect()
    }

    #[test]
    fn test_fires_on_fifty_first_equal_sample() {
        let mut positions = std::vec![0, 300, 700, 1100];
        positions.extend(std::iter::repeat(1200).take(51));
        let samples = series(&positions);

        // Every prefix ending before the 51st equal sample is unsettled
        for end in 1..samples.len() {
            assert!(!is_settled(&samples[..end], LOOKBACK), "fired at {}", end);
        }
        assert!(is_settled(&samples, LOOKBACK));
    }

    #[test]
    fn test_needs_more_than_lookback_samples() {
        let samples = series(&[7; LOOKBACK]);
        assert!(!is_settled(&samples, LOOKBACK));
        let samples = series(&[7; LOOKBACK + 1]);
        assert!(is_settled(&samples, LOOKBACK));
    }

    #[test]
    fn test_single_tick_jitter_restarts_window() {
        let mut positions = std::vec![1200; 60];
        positions[30] = 1201;
        let samples = series(&positions);
        // Window of the last sample still contains the jitter at index 30
        assert!(!is_settled(&samples, LOOKBACK));
    }

    #[test]
    fn test_zero_lookback_never_settles() {
        assert!(!is_settled(&series(&[1, 1, 1]), 0));
    }

    #[test]
    fn test_timeout_is_strictly_greater() {
        let at_limit = [Sample { elapsed_ms: 2000, position: 0 }];
        let past_limit = [Sample { elapsed_ms: 2001, position: 0 }];
        assert!(!has_timed_out(&at_limit, 2000));
        assert!(has_timed_out(&past_limit, 2000));
        assert!(!has_timed_out(&[], 2000));
    }

    proptest! {
        #[test]
        fn prop_settled_iff_window_all_equal(
            positions in proptest::collection::vec(0i32..3, 0..120),
            lookback in 1usize..60,
        ) {
            let samples = series(&positions);
            let expected = positions.len() > lookback && {
                let last = positions[positions.len() - 1];
                positions[positions.len() - 1 - lookback..].iter().all(|&p| p == last)
            };
            prop_assert_eq!(is_settled(&samples, lookback), expected);
        }
    }
}
