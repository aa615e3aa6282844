//! Host configuration
//!
//! Loaded from an optional TOML file; every field has a default so an empty
//! or missing file is valid. Command line flags override file values.
//!
//! ```toml
//! [link]
//! port = "/dev/ttyACM0"
//! baud_rate = 115200
//! poll_timeout_ms = 100
//!
//! [output]
//! csv_dir = "runs"
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::{HostError, HostResult};

/// File looked up in the working directory when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "stepwise.toml";

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HostConfig {
    pub link: LinkConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LinkConfig {
    /// Serial device path (e.g. "/dev/ttyACM0", "COM3")
    pub port: String,
    pub baud_rate: u32,
    /// Read timeout; bounds how long a cancel request goes unnoticed
    pub poll_timeout_ms: u64,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            port: default_port().to_string(),
            baud_rate: 115_200,
            poll_timeout_ms: 100,
        }
    }
}

impl LinkConfig {
    pub fn poll_timeout(&self) -> Duration {
        Duration::from_millis(self.poll_timeout_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// Write each received dataset as CSV into this directory
    pub csv_dir: Option<PathBuf>,
}

impl HostConfig {
    /// Load configuration
    ///
    /// An explicit path must exist. Without one, `stepwise.toml` in the
    /// working directory is used if present, otherwise the defaults.
    pub fn load(path: Option<&Path>) -> HostResult<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let fallback = Path::new(DEFAULT_CONFIG_FILE);
                if fallback.exists() {
                    Self::from_file(fallback)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn from_file(path: &Path) -> HostResult<Self> {
        let text = fs::read_to_string(path)
            .map_err(|e| HostError::Config(format!("cannot read {}: {}", path.display(), e)))?;
        Self::from_toml(&text)
            .map_err(|e| HostError::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn from_toml(text: &str) -> HostResult<Self> {
        let config: Self = toml::from_str(text).map_err(|e| HostError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> HostResult<()> {
        if self.link.port.trim().is_empty() {
            return Err(HostError::Config("link.port must not be empty".into()));
        }
        if self.link.baud_rate == 0 {
            return Err(HostError::Config("link.baud_rate must be non-zero".into()));
        }
        if self.link.poll_timeout_ms == 0 {
            return Err(HostError::Config("link.poll_timeout_ms must be non-zero".into()));
        }
        Ok(())
    }
}

fn default_port() -> &'static str {
    if cfg!(windows) {
        "COM3"
    } else {
        "/dev/ttyACM0"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_file_gives_defaults() {
        let config = HostConfig::from_toml("").unwrap();
        assert_eq!(config, HostConfig::default());
        assert_eq!(config.link.baud_rate, 115_200);
        assert_eq!(config.link.poll_timeout(), Duration::from_millis(100));
        assert!(config.output.csv_dir.is_none());
    }

    #[test]
    fn test_partial_override() {
        let config = HostConfig::from_toml(
            r#"
            [link]
            port = "/dev/ttyUSB1"

            [output]
            csv_dir = "runs"
            "#,
        )
        .unwrap();
        assert_eq!(config.link.port, "/dev/ttyUSB1");
        assert_eq!(config.link.baud_rate, 115_200);
        assert_eq!(config.output.csv_dir, Some(PathBuf::from("runs")));
    }

    #[test]
    fn test_rejects_unknown_keys_and_bad_values() {
        assert!(matches!(
            HostConfig::from_toml("[link]\nbaud = 9600"),
            Err(HostError::Config(_))
        ));
        assert!(matches!(
            HostConfig::from_toml("[link]\nbaud_rate = 0"),
            Err(HostError::Config(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[link]\nbaud_rate = 9600").unwrap();

        let config = HostConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.link.baud_rate, 9600);
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(matches!(
            HostConfig::load(Some(&missing)),
            Err(HostError::Config(_))
        ));
    }
}
