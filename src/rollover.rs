//! Day rollover: each calendar day gets its own recording file.

use jiff::Zoned;
use jiff::civil::Date;

/// Source of the current local time.
pub trait Clock: Send + Sync {
    fn now(&self) -> Zoned;
}

/// The system clock in the system time zone.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Zoned {
        Zoned::now()
    }
}

/// True when `now` falls on a later calendar day than the session was opened on.
///
/// Time of day is ignored, and a clock stepping backwards never triggers a
/// rollover. Callers only act on this while the session is paused.
pub fn should_rollover(session_date: Date, now: &Zoned) -> bool {
    now.date() > session_date
}
