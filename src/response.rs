//! Answer text for each action.

use chrono::{DateTime, Local};

use crate::action::Action;
use crate::scheduler::Parameters;

const HELP_TEXT: &str = "I manage a single recurring alarm. Say 'set' to set an alarm, \
'skip' to skip the next one, 'break' to stop the schedule, 'continue' to resume it, \
ask for the 'current' alarm, or say 'help' to hear this again.";

/// Render the answer for `action` with its result parameters.
pub fn render(action: Action, parameters: &Parameters) -> String {
    match (action, parameters.alarm_time) {
        (Action::Help, _) => HELP_TEXT.to_string(),
        (Action::Set, Some(time)) => format!("The new alarm is set for {}.", time.format("%H:%M")),
        (Action::Set, None) => "The new alarm is set.".to_string(),
        (Action::GetActive, Some(time)) => {
            format!("Current active alarm is set for {}.", long_time(&time))
        }
        (Action::GetActive, None) => "No active alarm is set at the moment.".to_string(),
        (Action::Skip, Some(time)) => format!(
            "Skipped the next alarm. The new alarm is set for {}.",
            long_time(&time)
        ),
        (Action::Skip, None) => "Skipped the next alarm.".to_string(),
        (Action::Break, _) => {
            "The current alarm has been cancelled and future executions stopped.".to_string()
        }
        (Action::Continue, Some(time)) => format!(
            "Alarm schedule has been resumed. The next alarm is set for {}.",
            long_time(&time)
        ),
        (Action::Continue, None) => "Alarm schedule has been resumed.".to_string(),
    }
}

/// `Wednesday, March 15 at 06:30`
fn long_time(time: &DateTime<Local>) -> String {
    time.format("%A, %B %d at %H:%M").to_string()
}
