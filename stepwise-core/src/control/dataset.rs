//! Recorded time/position series

use heapless::{String, Vec};

use crate::config::MAX_LABEL_LEN;
use crate::state::RunFault;

/// Sample capacity of one run
///
/// 2 s at 10 ms needs about 200; the rest is headroom for faster periods.
pub const MAX_SAMPLES: usize = 512;

/// One closed-loop measurement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Sample {
    /// Time since the run started
    pub elapsed_ms: u32,
    /// Encoder position in ticks
    pub position: i32,
}

/// Samples of one run plus their axis labels
///
/// Labels are fixed at construction; samples are kept in capture order and
/// never go back in time.
#[derive(Debug, Clone)]
pub struct Dataset {
    x_label: String<MAX_LABEL_LEN>,
    y_label: String<MAX_LABEL_LEN>,
    samples: Vec<Sample, MAX_SAMPLES>,
}

impl Dataset {
    /// Create an empty dataset with fixed labels
    pub fn new(x_label: String<MAX_LABEL_LEN>, y_label: String<MAX_LABEL_LEN>) -> Self {
        Self {
            x_label,
            y_label,
            samples: Vec::new(),
        }
    }

    /// Append a sample, returning it as stored
    ///
    /// A sample older than the last one is clamped to the last timestamp so
    /// the series stays non-decreasing.
    pub fn push(&mut self, mut sample: Sample) -> Result<Sample, RunFault> {
        if let Some(last) = self.samples.last() {
            sample.elapsed_ms = sample.elapsed_ms.max(last.elapsed_ms);
        }
        self.samples.push(sample).map_err(|_| RunFault::DatasetFull)?;
        Ok(sample)
    }

    /// Drop all samples, keeping the labels
    pub fn clear(&mut self) {
        self.samples.clear();
    }

    /// Samples in capture order
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// Most recent sample
    pub fn last(&self) -> Option<&Sample> {
        self.samples.last()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Axis labels `(x, y)`
    pub fn labels(&self) -> (&str, &str) {
        (self.x_label.as_str(), self.y_label.as_str())
    }

    /// Samples as plot points `(elapsed_ms, position)`
    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.samples
            .iter()
            .map(|s| (s.elapsed_ms as f64, s.position as f64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::label;

    fn dataset() -> Dataset {
        Dataset::new(label("Time [ms]"), label("Position [Encoder Ticks]"))
    }

    #[test]
    fn test_push_keeps_order() {
        let mut data = dataset();
        data.push(Sample { elapsed_ms: 0, position: 0 }).unwrap();
        data.push(Sample { elapsed_ms: 10, position: 5 }).unwrap();

        assert_eq!(data.len(), 2);
        assert_eq!(data.last().unwrap().position, 5);
        assert_eq!(data.labels(), ("Time [ms]", "Position [Encoder Ticks]"));
    }

    #[test]
    fn test_time_never_goes_backwards() {
        let mut data = dataset();
        data.push(Sample { elapsed_ms: 20, position: 1 }).unwrap();
        let stored = data.push(Sample { elapsed_ms: 15, position: 2 }).unwrap();
        assert_eq!(stored, Sample { elapsed_ms: 20, position: 2 });
        assert_eq!(data.samples()[1], stored);
    }

    #[test]
    fn test_full_dataset_is_a_fault() {
        let mut data = dataset();
        for i in 0..MAX_SAMPLES as u32 {
            data.push(Sample { elapsed_ms: i, position: 0 }).unwrap();
        }
        assert_eq!(
            data.push(Sample { elapsed_ms: 9999, position: 0 }),
            Err(RunFault::DatasetFull)
        );
    }

    #[test]
    fn test_points_and_clear() {
        let mut data = dataset();
        data.push(Sample { elapsed_ms: 10, position: -3 }).unwrap();
        let points: Vec<(f64, f64), 4> = data.points().collect();
        assert_eq!(points.as_slice(), &[(10.0, -3.0)]);

        data.clear();
        assert!(data.is_empty());
        assert_eq!(data.labels().0, "Time [ms]");
    }
}
