//! Alarm data structures.

use chrono::{DateTime, Duration, Local, NaiveDate, NaiveTime, TimeZone};
use serde::{Deserialize, Serialize};

/// Name given to alarms set explicitly by a user.
pub const USER_ALARM_NAME: &str = "User Alarm";

/// Name given to alarms derived from the recurrence rule.
pub const RECURRING_ALARM_NAME: &str = "Default Cron Alarm";

/// Unique identifier for a stored alarm.
pub type AlarmId = String;

/// The single alarm the system will fire for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alarm {
    /// Opaque record identifier.
    pub id: AlarmId,
    /// Descriptive name; not used for scheduling.
    pub name: String,
    /// When the alarm fires.
    pub scheduled_time: DateTime<Local>,
}

impl Alarm {
    /// Create an alarm with a fresh ID.
    pub fn new(name: impl Into<String>, scheduled_time: DateTime<Local>) -> Self {
        Self {
            id: Self::generate_id(),
            name: name.into(),
            scheduled_time,
        }
    }

    /// Create an alarm derived from the recurrence rule.
    pub fn recurring(scheduled_time: DateTime<Local>) -> Self {
        Self::new(RECURRING_ALARM_NAME, scheduled_time)
    }

    /// Generate a new alarm ID.
    pub fn generate_id() -> AlarmId {
        format!("alarm_{}", ulid::Ulid::new())
    }
}

/// Result values of an action, handed to the response renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameters {
    pub alarm_time: Option<DateTime<Local>>,
    pub alarm_name: String,
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            alarm_time: None,
            alarm_name: RECURRING_ALARM_NAME.to_string(),
        }
    }
}

impl From<&Alarm> for Parameters {
    fn from(alarm: &Alarm) -> Self {
        Self {
            alarm_time: Some(alarm.scheduled_time),
            alarm_name: alarm.name.clone(),
        }
    }
}

/// The next instant at wall-clock `time` that lies strictly after `now`.
///
/// Today's occurrence if it is still ahead, otherwise tomorrow's. A time that
/// does not exist on a given day (DST gap) resolves to the next day that has it.
pub fn next_time_of_day<Tz: TimeZone>(now: &DateTime<Tz>, time: NaiveTime) -> DateTime<Tz> {
    let tz = now.timezone();
    let mut date = now.date_naive();

    for _ in 0..3 {
        if let Some(candidate) = at_wall_time(&tz, date, time)
            && candidate > *now
        {
            return candidate;
        }
        match date.succ_opt() {
            Some(next) => date = next,
            None => break,
        }
    }

    now.clone() + Duration::days(1)
}

fn at_wall_time<Tz: TimeZone>(tz: &Tz, date: NaiveDate, time: NaiveTime) -> Option<DateTime<Tz>> {
    tz.from_local_datetime(&date.and_time(time)).earliest()
}
