//! Alarm scheduling core.
//!
//! One alarm, one pending trigger. The [`AlarmService`] task owns the
//! [`AlarmController`]; callers talk to it through an [`AlarmHandle`].

mod alarm;
mod clock;
mod controller;
mod error;
mod recovery;
mod recurrence;
mod service;
mod timer;

pub use alarm::{
    Alarm, AlarmId, Parameters, RECURRING_ALARM_NAME, USER_ALARM_NAME, next_time_of_day,
};
pub use clock::{Clock, SystemClock, TokioClock};
pub use controller::{ActionOutcome, AlarmController, AlarmState};
pub use error::{Result, SchedulerError};
pub use recurrence::RecurrenceRule;
pub use service::{AlarmHandle, AlarmService, AlarmServiceConfig};
pub use timer::{TimerArmer, TriggerId};
