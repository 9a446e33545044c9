//! Catcam configuration.
//!
//! Loaded from `~/.catcam/config.toml` unless `--config` points elsewhere.
//! Read once at startup and never changed afterwards.
//!
//! ```toml
//! store-path = "/home/pi/catcam"
//! idle-timeout-secs = 15
//! video-settings = "-w 1280 -h 720 -rot 180"
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use jiff::Zoned;
use serde::{Deserialize, Serialize};
use tracing::level_filters::LevelFilter;

use crate::camera::CaptureCommand;
use crate::naming::{DEFAULT_TIMESTAMP_FORMAT, Naming};

/// Errors that can occur while loading the configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("no config file found at {}\nCreate one with at minimum:\n\n    store-path = \"/path/to/recordings\"", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config at {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid config at {}: {reason}", .path.display())]
    Invalid { path: PathBuf, reason: String },

    #[error("could not determine home directory")]
    NoHome,
}

/// Catcam configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Config {
    /// Seconds without motion before recording is paused.
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u32,

    /// Directory recordings are written to.
    pub store_path: PathBuf,

    #[serde(default = "default_stub")]
    pub filename_stub: String,

    #[serde(default = "default_extension")]
    pub file_extension: String,

    #[serde(default = "default_timestamp_format")]
    pub timestamp_format: String,

    /// The capture program; must understand `raspivid`'s signal mode flags.
    #[serde(default = "default_capture_program")]
    pub capture_program: String,

    /// Extra options for the capture program, whitespace separated.
    #[serde(default)]
    pub video_settings: String,

    /// Passed as `-t`. 0 records until terminated.
    #[serde(default)]
    pub record_time_ms: u64,

    /// BCM number of the PIR sensor pin.
    #[serde(default = "default_motion_pin")]
    pub motion_pin: u8,

    /// Default log filter when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_idle_timeout() -> u32 {
    15
}

fn default_stub() -> String {
    "catcam".to_string()
}

fn default_extension() -> String {
    "h264".to_string()
}

fn default_timestamp_format() -> String {
    DEFAULT_TIMESTAMP_FORMAT.to_string()
}

fn default_capture_program() -> String {
    "raspivid".to_string()
}

// WiringPi pin 6.
fn default_motion_pin() -> u8 {
    25
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load from `path`, or from the default location when `None`.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => Self::load_from(p),
            None => Self::load_from(&Self::path().ok_or(ConfigError::NoHome)?),
        }
    }

    /// Load and validate the config file at `path`.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = match fs::read_to_string(path) {
            Ok(s) => s,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        let config: Self = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        config.validate().map_err(|reason| ConfigError::Invalid {
            path: path.to_path_buf(),
            reason,
        })?;

        Ok(config)
    }

    /// The default config file path: `~/.catcam/config.toml`.
    pub fn path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".catcam").join("config.toml"))
    }

    pub fn naming(&self) -> Naming {
        Naming::new(
            &self.store_path,
            &self.filename_stub,
            &self.file_extension,
            &self.timestamp_format,
        )
    }

    pub fn capture_command(&self) -> CaptureCommand {
        CaptureCommand::new(
            &self.capture_program,
            &self.video_settings,
            self.record_time_ms,
        )
    }

    fn validate(&self) -> Result<(), String> {
        if self.idle_timeout_secs == 0 {
            return Err("idle-timeout-secs must be at least 1".to_string());
        }
        if self.filename_stub.trim().is_empty() {
            return Err("filename-stub is empty".to_string());
        }
        if self.capture_program.trim().is_empty() {
            return Err("capture-program is empty".to_string());
        }
        if self.log_level.parse::<LevelFilter>().is_err() {
            return Err(format!(
                "log-level `{}` is not one of off, error, warn, info, debug, trace",
                self.log_level
            ));
        }
        // Catch a broken timestamp format now rather than at the first rollover.
        self.naming()
            .output_path(&Zoned::now())
            .map_err(|e| e.to_string())?;
        Ok(())
    }
}
