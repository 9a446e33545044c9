//! Test doubles shared across module tests.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use jiff::tz::TimeZone;
use jiff::{SignedDuration, Zoned, civil};

use crate::camera::{CameraError, Capture, Signal};
use crate::rollover::Clock;

/// Capture backend that records what it was asked to do.
#[derive(Default)]
pub struct FakeCapture {
    spawned: Mutex<Vec<(u32, PathBuf)>>,
    signals: Mutex<Vec<(u32, Signal)>>,
    fail_spawn: AtomicBool,
    fail_signals: AtomicBool,
}

impl FakeCapture {
    pub fn fail_spawn(&self, fail: bool) {
        self.fail_spawn.store(fail, Ordering::SeqCst);
    }

    pub fn fail_signals(&self, fail: bool) {
        self.fail_signals.store(fail, Ordering::SeqCst);
    }

    pub fn spawned(&self) -> Vec<(u32, PathBuf)> {
        self.spawned.lock().unwrap().clone()
    }

    pub fn signals(&self) -> Vec<(u32, Signal)> {
        self.signals.lock().unwrap().clone()
    }

    /// How many times `signal` was sent to `pid`.
    pub fn count(&self, pid: u32, signal: Signal) -> usize {
        self.signals()
            .iter()
            .filter(|(p, s)| *p == pid && *s == signal)
            .count()
    }
}

impl Capture for FakeCapture {
    fn spawn(&self, output: &Path) -> Result<u32, CameraError> {
        if self.fail_spawn.load(Ordering::SeqCst) {
            return Err(CameraError::Launch {
                program: "fake".into(),
                source: io::Error::other("spawn refused"),
            });
        }
        let mut spawned = self.spawned.lock().unwrap();
        let pid = 1000 + u32::try_from(spawned.len()).unwrap();
        spawned.push((pid, output.to_path_buf()));
        Ok(pid)
    }

    fn send_signal(&self, pid: u32, signal: Signal) -> io::Result<()> {
        self.signals.lock().unwrap().push((pid, signal));
        if self.fail_signals.load(Ordering::SeqCst) {
            return Err(io::Error::from(io::ErrorKind::NotFound));
        }
        Ok(())
    }
}

/// A clock that only moves when told to.
pub struct ManualClock {
    now: Mutex<Zoned>,
}

impl ManualClock {
    pub fn at(year: i16, month: i8, day: i8, hour: i8, minute: i8, second: i8) -> Self {
        Self {
            now: Mutex::new(zoned(year, month, day, hour, minute, second)),
        }
    }

    pub fn advance_secs(&self, secs: i64) {
        let mut now = self.now.lock().unwrap();
        *now = now.checked_add(SignedDuration::from_secs(secs)).unwrap();
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Zoned {
        self.now.lock().unwrap().clone()
    }
}

/// A UTC instant built from civil fields.
pub fn zoned(year: i16, month: i8, day: i8, hour: i8, minute: i8, second: i8) -> Zoned {
    civil::date(year, month, day)
        .at(hour, minute, second, 0)
        .to_zoned(TimeZone::UTC)
        .unwrap()
}
