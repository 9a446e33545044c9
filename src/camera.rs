//! Capture-process control: launching the recorder and steering it with signals.
//!
//! The recorder is an external program started in a paused state. It flips
//! between paused and recording on a toggle signal and exits cleanly on a
//! termination signal:
//!
//! ```text
//! spawn (paused) ──SIGUSR1──▶ recording ──SIGUSR1──▶ paused ── … ──SIGTERM──▶ exit
//! ```
//!
//! [`Capture`] is the seam between the controller and the operating system;
//! [`Launcher`] running a [`CaptureCommand`] is the real implementation.

mod command;
mod process;

use std::fmt;
use std::io;
use std::path::Path;

pub use command::{CaptureCommand, Launcher};
pub use process::RecordingProcess;

/// Errors that can occur while driving the capture process.
#[derive(Debug, thiserror::Error)]
pub enum CameraError {
    #[error("failed to launch `{program}`: {source}")]
    Launch {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to send {signal} to pid {pid}: {source}")]
    SignalDelivery {
        signal: Signal,
        pid: u32,
        #[source]
        source: io::Error,
    },

    #[error("cannot format a timestamp with `{format}`: {source}")]
    DateFormatting {
        format: String,
        #[source]
        source: jiff::Error,
    },
}

/// Signals understood by the capture process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    /// Flip between paused and recording.
    Toggle,
    /// Finish the file and exit.
    Terminate,
}

impl Signal {
    /// The flag passed to `kill(1)` for this signal.
    pub fn kill_flag(self) -> &'static str {
        match self {
            Self::Toggle => "-USR1",
            Self::Terminate => "-TERM",
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Toggle => f.write_str("SIGUSR1"),
            Self::Terminate => f.write_str("SIGTERM"),
        }
    }
}

/// Whether the capture process is currently writing frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordingState {
    Paused,
    Recording,
}

impl fmt::Display for RecordingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Paused => f.write_str("paused"),
            Self::Recording => f.write_str("recording"),
        }
    }
}

/// Launches capture processes and delivers signals to them.
pub trait Capture: Send + Sync {
    /// Start a capture process writing to `output`, paused. Returns its pid.
    fn spawn(&self, output: &Path) -> Result<u32, CameraError>;

    /// Deliver `signal` to the process with the given pid.
    fn send_signal(&self, pid: u32, signal: Signal) -> io::Result<()>;
}
