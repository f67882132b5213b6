//! Wall-clock source used by the engine and the view

use chrono::{DateTime, Local, NaiveDate, Utc};

/// Source of the current time.
///
/// The engine derives everything from absolute deadlines, so the clock must be
/// a wall clock: after a system suspend it has to jump forward.
pub trait Clock: Send + Sync {
    /// Current instant.
    fn now(&self) -> DateTime<Utc>;

    /// Local calendar day of the current instant.
    fn today(&self) -> NaiveDate {
        local_date(self.now())
    }
}

/// Local calendar day of an instant.
pub fn local_date(instant: DateTime<Utc>) -> NaiveDate {
    instant.with_timezone(&Local).date_naive()
}

/// Clock backed by the system time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
