//! The controller: idle countdown, recording session, and the once-a-second loop.
//!
//! Two contexts touch the controller. The sensor thread reports motion
//! through [`Controller::on_edge`]; the control loop calls
//! [`Controller::tick`] once per second. Both go through a single lock that
//! guards the idle timer together with the open recording session, so a
//! fresh motion event can never interleave with an idle-expiry deactivation.
//!
//! ```text
//!           tick() > 0                      tick() == 0
//!   Active ─────────────▶ Active    Active ─────────────▶ Idle
//!                                                          │ pause recording
//!   Idle ◀── motion resets timer ── …                      │ roll over if a new day
//! ```

mod listener;

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use jiff::Zoned;
use jiff::civil::Date;
use tracing::{debug, error, info, warn};

use crate::camera::{CameraError, Capture, RecordingProcess, RecordingState};
use crate::motion::{MotionSensor, SensorError};
use crate::naming::Naming;
use crate::rollover::{Clock, should_rollover};
use crate::timer::IdleTimer;

pub use listener::listener;

/// Control loop cadence.
pub const TICK: Duration = Duration::from_secs(1);

/// Where the idle countdown stands after a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Motion was seen within the idle threshold.
    Active,
    /// The countdown has expired; recording is paused.
    Idle,
}

/// One open recording: the process and the day its file belongs to.
struct Session {
    process: RecordingProcess,
    date: Date,
}

struct State {
    timer: IdleTimer,
    /// `None` only after a failed relaunch; retried on every idle tick.
    session: Option<Session>,
}

/// Owns the single live recording session and the idle timer.
pub struct Controller {
    state: Mutex<State>,
    capture: Arc<dyn Capture>,
    clock: Arc<dyn Clock>,
    naming: Naming,
    shut_down: AtomicBool,
}

impl Controller {
    /// Open the first session and build the controller.
    ///
    /// Failing to launch the first capture process is fatal.
    pub fn start(
        capture: Arc<dyn Capture>,
        clock: Arc<dyn Clock>,
        naming: Naming,
        idle_timeout_secs: u32,
    ) -> Result<Self, CameraError> {
        let now = clock.now();
        let session = open_session(&capture, &naming, &now)?;

        Ok(Self {
            state: Mutex::new(State {
                timer: IdleTimer::new(idle_timeout_secs),
                session: Some(session),
            }),
            capture,
            clock,
            naming,
            shut_down: AtomicBool::new(false),
        })
    }

    /// Advance the idle countdown by one second.
    ///
    /// On expiry the recording is paused, and once paused the day-rollover
    /// check runs. An in-progress recording is never interrupted by a rollover.
    pub fn tick(&self) -> Phase {
        let mut state = self.lock();
        if self.is_shut_down() {
            return Phase::Idle;
        }

        let remaining = state.timer.tick();
        if remaining > 0 {
            debug!(remaining, "idle countdown");
            return Phase::Active;
        }

        let now = self.clock.now();
        match state.session.take() {
            Some(mut session) => {
                if session.process.status() == RecordingState::Recording {
                    info!(
                        pid = session.process.pid(),
                        idle_secs = state.timer.threshold(),
                        "no motion, pausing"
                    );
                }
                session.process.activate(false);

                let due = session.process.status() == RecordingState::Paused
                    && should_rollover(session.date, &now);
                if due {
                    info!(
                        pid = session.process.pid(),
                        from = %session.date,
                        to = %now.date(),
                        "day changed, starting a new recording session"
                    );
                    session.process.terminate();
                    drop(session);
                    state.session = self.reopen(&now);
                } else {
                    state.session = Some(session);
                }
            }
            None => state.session = self.reopen(&now),
        }

        Phase::Idle
    }

    /// Pause and terminate the recording. Runs at most once; later calls
    /// return `false` and do nothing.
    pub fn shutdown(&self) -> bool {
        if self.shut_down.swap(true, Ordering::SeqCst) {
            return false;
        }

        let mut state = self.lock();
        if let Some(mut session) = state.session.take() {
            session.process.activate(false);
            info!("disabled camera");
            session.process.terminate();
            info!("shutdown camera");
        }
        true
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down.load(Ordering::SeqCst)
    }

    /// State of the open session, if any.
    pub fn status(&self) -> Option<RecordingState> {
        self.lock().session.as_ref().map(|s| s.process.status())
    }

    pub fn remaining(&self) -> u32 {
        self.lock().timer.remaining()
    }

    pub fn session_date(&self) -> Option<Date> {
        self.lock().session.as_ref().map(|s| s.date)
    }

    pub fn output(&self) -> Option<PathBuf> {
        self.lock()
            .session
            .as_ref()
            .map(|s| s.process.output().to_path_buf())
    }

    fn reopen(&self, now: &Zoned) -> Option<Session> {
        match open_session(&self.capture, &self.naming, now) {
            Ok(session) => Some(session),
            Err(e) => {
                error!(error = %e, "could not open a recording session; retrying on the next idle tick");
                None
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn open_session(
    capture: &Arc<dyn Capture>,
    naming: &Naming,
    now: &Zoned,
) -> Result<Session, CameraError> {
    let output = naming.output_path(now)?;
    let process = RecordingProcess::start(Arc::clone(capture), output)?;

    Ok(Session {
        process,
        date: now.date(),
    })
}

/// Run the control loop until a shutdown request arrives on `shutdown`.
///
/// Subscribes the controller to `sensor`, ticks once per [`TICK`], and on
/// exit pauses and terminates the recording before releasing the sensor.
/// A dropped sender counts as a shutdown request.
pub fn run(
    controller: &Arc<Controller>,
    sensor: &mut dyn MotionSensor,
    shutdown: &Receiver<()>,
) -> Result<(), SensorError> {
    if let Err(e) = sensor.subscribe(listener(Arc::clone(controller))) {
        controller.shutdown();
        return Err(e);
    }
    info!("ready for capture");

    let mut deadline = Instant::now() + TICK;
    loop {
        let wait = deadline.saturating_duration_since(Instant::now());
        match shutdown.recv_timeout(wait) {
            Err(RecvTimeoutError::Timeout) => {
                controller.tick();
                deadline += TICK;

                // Fell far behind (suspended, clock trouble): resync instead of bursting.
                let now = Instant::now();
                if deadline + TICK < now {
                    warn!("control loop fell behind, resynchronizing");
                    deadline = now + TICK;
                }
            }
            Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    info!(
        state = ?controller.status(),
        remaining = controller.remaining(),
        session_date = ?controller.session_date(),
        "shutdown requested"
    );
    controller.shutdown();
    sensor.unsubscribe();
    info!("exiting");
    Ok(())
}
