//! Handle to one running capture process.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{error, info, warn};

use super::{CameraError, Capture, RecordingState, Signal};

/// A capture process writing one session file.
///
/// The process always starts paused. Toggle signals are only sent when the
/// requested state differs from the current one: the recorder flips on every
/// toggle, so a redundant signal would invert its real state.
pub struct RecordingProcess {
    pid: u32,
    output: PathBuf,
    state: RecordingState,
    terminated: bool,
    capture: Arc<dyn Capture>,
}

impl RecordingProcess {
    /// Launch a paused capture process writing to `output`.
    pub fn start(capture: Arc<dyn Capture>, output: PathBuf) -> Result<Self, CameraError> {
        let pid = capture.spawn(&output)?;
        info!(pid, path = %output.display(), "capture process started paused");

        Ok(Self {
            pid,
            output,
            state: RecordingState::Paused,
            terminated: false,
            capture,
        })
    }

    /// Move to recording (`true`) or paused (`false`).
    ///
    /// Sends exactly one toggle signal per actual state change and nothing
    /// otherwise. A failed send is logged; the state still moves to the
    /// requested one.
    pub fn activate(&mut self, want_recording: bool) {
        let target = if want_recording {
            RecordingState::Recording
        } else {
            RecordingState::Paused
        };

        if self.terminated {
            error!(
                pid = self.pid,
                state = %self.state,
                %target,
                "ignoring activation of a terminated capture process"
            );
            return;
        }

        if self.state == target {
            return;
        }

        let current = self.state;
        self.state = target;

        match self.capture.send_signal(self.pid, Signal::Toggle) {
            Ok(()) if want_recording => info!(pid = self.pid, "camera activated"),
            Ok(()) => info!(pid = self.pid, "camera deactivated"),
            Err(source) => {
                let err = CameraError::SignalDelivery {
                    signal: Signal::Toggle,
                    pid: self.pid,
                    source,
                };
                error!(pid = self.pid, state = %current, %target, "{err}");
            }
        }
    }

    pub fn status(&self) -> RecordingState {
        self.state
    }

    pub fn pid(&self) -> u32 {
        self.pid
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    /// Ask the capture process to exit.
    ///
    /// Not idempotent: a second call signals again, most likely to a pid that
    /// no longer exists. That failure is logged like any other.
    pub fn terminate(&mut self) {
        if self.terminated {
            warn!(pid = self.pid, "capture process already terminated; signalling again");
        }
        self.terminated = true;

        match self.capture.send_signal(self.pid, Signal::Terminate) {
            Ok(()) => info!(pid = self.pid, path = %self.output.display(), "capture process terminated"),
            Err(source) => {
                let err = CameraError::SignalDelivery {
                    signal: Signal::Terminate,
                    pid: self.pid,
                    source,
                };
                error!(pid = self.pid, state = %self.state, "{err}");
            }
        }
    }
}
