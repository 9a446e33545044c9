//! The real capture backend: `raspivid` (or a compatible program) plus `kill(1)`.

use std::collections::HashMap;
use std::io;
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::sync::{Mutex, MutexGuard};

use tracing::{debug, info, warn};

use super::{CameraError, Capture, Signal};

/// Flags that put the recorder under signal control, starting paused.
const SIGNAL_MODE: [&str; 3] = ["-s", "-i", "pause"];

/// Flags placed just before the output path: no preview window, write to file.
const OUTPUT_FLAGS: [&str; 2] = ["-n", "-o"];

/// How to launch the capture program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureCommand {
    program: String,
    options: Vec<String>,
}

impl CaptureCommand {
    /// Build a command from the program name, its free-form video options
    /// (whitespace separated), and the recording duration in milliseconds.
    ///
    /// A duration of 0 keeps the recorder running until it is terminated.
    pub fn new(program: impl Into<String>, video_settings: &str, record_time_ms: u64) -> Self {
        let mut options: Vec<String> = video_settings
            .split_whitespace()
            .map(String::from)
            .collect();
        options.push("-t".to_string());
        options.push(record_time_ms.to_string());

        Self {
            program: program.into(),
            options,
        }
    }

    /// Arguments for a session writing to `output`.
    pub fn args(&self, output: &Path) -> Vec<String> {
        SIGNAL_MODE
            .iter()
            .map(|s| (*s).to_string())
            .chain(self.options.iter().cloned())
            .chain(OUTPUT_FLAGS.iter().map(|s| (*s).to_string()))
            .chain(std::iter::once(output.display().to_string()))
            .collect()
    }

    /// The full command line, for display.
    pub fn command_line(&self, output: &Path) -> String {
        let mut parts = vec![self.program.clone()];
        parts.extend(self.args(output));
        parts.join(" ")
    }
}

/// Spawns [`CaptureCommand`]s and signals the children it started.
///
/// Children are kept until they are seen to have exited, and reaped only
/// while the table is locked for a signal or a spawn. A pid is signalled
/// only while its child is still unreaped, so it cannot have been reused.
#[derive(Debug)]
pub struct Launcher {
    command: CaptureCommand,
    children: Mutex<HashMap<u32, Child>>,
}

impl Launcher {
    pub fn new(command: CaptureCommand) -> Self {
        Self {
            command,
            children: Mutex::new(HashMap::new()),
        }
    }

    /// Whether `pid` is a child of ours that has not exited yet.
    #[cfg(test)]
    pub fn is_running(&self, pid: u32) -> bool {
        let mut children = self.children();
        reap(&mut children);
        children.contains_key(&pid)
    }

    fn children(&self) -> MutexGuard<'_, HashMap<u32, Child>> {
        self.children
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

/// Drop every child that has exited, logging its status.
fn reap(children: &mut HashMap<u32, Child>) {
    children.retain(|&pid, child| match child.try_wait() {
        Ok(Some(status)) => {
            info!(pid, %status, "capture process exited");
            false
        }
        Ok(None) => true,
        Err(e) => {
            warn!(pid, error = %e, "failed to poll capture process");
            true
        }
    });
}

impl Capture for Launcher {
    fn spawn(&self, output: &Path) -> Result<u32, CameraError> {
        let command = &self.command;
        info!(command = %command.command_line(output), "launching capture process");

        let mut children = self.children();
        reap(&mut children);

        let child = Command::new(&command.program)
            .args(command.args(output))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .spawn()
            .map_err(|source| CameraError::Launch {
                program: command.program.clone(),
                source,
            })?;

        let pid = child.id();
        children.insert(pid, child);
        Ok(pid)
    }

    fn send_signal(&self, pid: u32, signal: Signal) -> io::Result<()> {
        // Held across `kill` so the child can't be reaped in between.
        let mut children = self.children();
        reap(&mut children);
        if !children.contains_key(&pid) {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("capture process {pid} is not running"),
            ));
        }

        debug!(pid, %signal, "sending signal");

        let status = Command::new("kill")
            .arg(signal.kill_flag())
            .arg(pid.to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()?;

        if status.success() {
            Ok(())
        } else {
            Err(io::Error::other(format!("kill exited with {status}")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::path::PathBuf;
    use std::thread;
    use std::time::{Duration, Instant};

    #[test]
    fn args_put_signal_mode_first_and_output_last() {
        let command = CaptureCommand::new("raspivid", "-w 1280 -h 720", 0);
        let args = command.args(&PathBuf::from("/srv/cam/catcam-2026-03-14-08-00-00.h264"));

        assert_eq!(
            args,
            vec![
                "-s",
                "-i",
                "pause",
                "-w",
                "1280",
                "-h",
                "720",
                "-t",
                "0",
                "-n",
                "-o",
                "/srv/cam/catcam-2026-03-14-08-00-00.h264",
            ]
        );
    }

    #[test]
    fn empty_settings_still_carry_record_time() {
        let command = CaptureCommand::new("raspivid", "   ", 10_000);
        let args = command.args(&PathBuf::from("out.h264"));

        assert_eq!(args, vec!["-s", "-i", "pause", "-t", "10000", "-n", "-o", "out.h264"]);
    }

    #[test]
    fn command_line_is_program_then_args() {
        let command = CaptureCommand::new("raspivid", "-rot 180", 0);
        let line = command.command_line(&PathBuf::from("a.h264"));

        assert_eq!(line, "raspivid -s -i pause -rot 180 -t 0 -n -o a.h264");
    }

    #[test]
    fn spawning_a_missing_program_is_a_launch_error() {
        let launcher = Launcher::new(CaptureCommand::new("/nonexistent/catcam-capture", "", 0));
        let err = launcher.spawn(&PathBuf::from("out.h264")).unwrap_err();

        assert!(matches!(err, CameraError::Launch { ref program, .. } if program == "/nonexistent/catcam-capture"));
    }

    #[test]
    fn unknown_pid_is_never_signalled() {
        let launcher = Launcher::new(CaptureCommand::new("raspivid", "", 0));
        let err = launcher.send_signal(1, Signal::Terminate).unwrap_err();

        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn exited_child_is_not_signalled() {
        // `true` ignores the raspivid flags and exits straight away.
        let launcher = Launcher::new(CaptureCommand::new("true", "", 0));
        let pid = launcher.spawn(&PathBuf::from("out.h264")).unwrap();

        let deadline = Instant::now() + Duration::from_secs(5);
        while launcher.is_running(pid) {
            assert!(Instant::now() < deadline, "`true` did not exit");
            thread::sleep(Duration::from_millis(20));
        }

        let err = launcher.send_signal(pid, Signal::Toggle).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
