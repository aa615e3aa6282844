//! Dataset output
//!
//! A received dataset is handed to every configured sink. `LogSink` prints a
//! one-line summary; `CsvSink` keeps one file per run so successive runs can
//! be overlaid by whatever plotting tool the operator prefers.

use std::fs;
use std::path::{Path, PathBuf};

use log::info;

use crate::dataset::Dataset;
use crate::error::{HostError, HostResult};

/// Somewhere a finished dataset is shown or stored
pub trait DatasetSink: Send {
    /// Add one dataset to the output
    fn render(&mut self, dataset: &Dataset) -> HostResult<()>;

    /// Remove everything rendered so far
    fn clear(&mut self) -> HostResult<()>;
}

/// Logs a summary of each run
#[derive(Debug, Default)]
pub struct LogSink {
    runs: usize,
}

impl LogSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn runs(&self) -> usize {
        self.runs
    }
}

impl DatasetSink for LogSink {
    fn render(&mut self, dataset: &Dataset) -> HostResult<()> {
        self.runs += 1;
        let duration = dataset.xs().last().unwrap_or(0.0);
        match dataset.final_value() {
            Some(y) => info!(
                "Run {} ({}): {} points over {} {}, final {} = {}",
                self.runs,
                dataset.legend(),
                dataset.len(),
                duration,
                dataset.x_label,
                dataset.y_label,
                y
            ),
            None => info!("Run {} ({}): no data points", self.runs, dataset.legend()),
        }
        Ok(())
    }

    fn clear(&mut self) -> HostResult<()> {
        info!("Cleared {} run(s)", self.runs);
        self.runs = 0;
        Ok(())
    }
}

/// Writes each run to `run-NNN-kpG.csv` in a directory
///
/// The gain part is left out when the run's gain is unknown.
#[derive(Debug)]
pub struct CsvSink {
    dir: PathBuf,
    written: Vec<PathBuf>,
}

impl CsvSink {
    /// Create the sink, creating `dir` if needed
    pub fn new(dir: impl Into<PathBuf>) -> HostResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(HostError::output(&dir))?;
        Ok(Self {
            dir,
            written: Vec::new(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Files written since the last clear, oldest first
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    fn next_path(&self, dataset: &Dataset) -> PathBuf {
        let run = self.written.len() + 1;
        let name = match dataset.gain {
            Some(gain) => format!("run-{:03}-kp{}.csv", run, gain),
            None => format!("run-{:03}.csv", run),
        };
        self.dir.join(name)
    }
}

impl DatasetSink for CsvSink {
    fn render(&mut self, dataset: &Dataset) -> HostResult<()> {
        let path = self.next_path(dataset);
        let mut writer = csv::Writer::from_path(&path)?;
        writer.write_record([dataset.x_label.as_str(), dataset.y_label.as_str()])?;
        for (x, y) in &dataset.points {
            writer.write_record([x.to_string(), y.to_string()])?;
        }
        writer.flush()?;

        info!("Wrote {} points to {}", dataset.len(), path.display());
        self.written.push(path);
        Ok(())
    }

    fn clear(&mut self) -> HostResult<()> {
        for path in self.written.drain(..) {
            fs::remove_file(&path).map_err(HostError::output(&path))?;
        }
        Ok(())
    }
}
