use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Duration, Utc};

/// The source of "now" for every election operation.
/// This struct becomes managed state.
pub enum Clock {
    /// Wall-clock time that never runs backwards.
    System(Mutex<DateTime<Utc>>),
    /// Time that only moves when told to.
    Manual(ManualClock),
}

impl Clock {
    pub fn system() -> Self {
        Self::System(Mutex::new(Utc::now()))
    }

    pub fn manual(clock: ManualClock) -> Self {
        Self::Manual(clock)
    }

    /// The current time. Successive calls never go backwards.
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Self::System(last) => {
                let mut last = last.lock().unwrap_or_else(PoisonError::into_inner);
                *last = Utc::now().max(*last);
                *last
            }
            Self::Manual(clock) => clock.now(),
        }
    }
}

/// A shared, settable time source.
#[derive(Debug, Clone)]
pub struct ManualClock(Arc<Mutex<DateTime<Utc>>>);

impl ManualClock {
    pub fn new(at: DateTime<Utc>) -> Self {
        Self(Arc::new(Mutex::new(at)))
    }

    pub fn now(&self) -> DateTime<Utc> {
        *self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Jump to `at`. Refuses to move backwards.
    pub fn set(&self, at: DateTime<Utc>) {
        let mut now = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        if at > *now {
            *now = at;
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        *now = *now + by;
    }
}
