//! Wall-clock sources for the scheduler.
//!
//! The controller never reads the system time directly; it asks a [`Clock`].
//! [`TokioClock`] ties wall time to tokio's clock so paused-time runs advance
//! both together.

use chrono::{DateTime, Local};
use tokio::time::Instant;

/// Source of the current local time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Local>;
}

/// The operating system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// A clock anchored at a fixed wall time that advances with tokio's clock.
///
/// Under `tokio::time::pause` the returned time only moves when tokio time
/// moves, which makes timer behaviour reproducible.
#[derive(Debug, Clone)]
pub struct TokioClock {
    anchor: DateTime<Local>,
    started: Instant,
}

impl TokioClock {
    pub fn starting_at(anchor: DateTime<Local>) -> Self {
        Self {
            anchor,
            started: Instant::now(),
        }
    }
}

impl Clock for TokioClock {
    fn now(&self) -> DateTime<Local> {
        let elapsed = chrono::Duration::from_std(self.started.elapsed()).unwrap_or_default();
        self.anchor + elapsed
    }
}
