//! Request actions.
//!
//! Free text is mapped onto one of six actions by keyword sets. A Set request
//! may also carry a time of day, picked up from number hints such as
//! `7 o'clock` or `30 minutes`.

use std::fmt;

use chrono::{DateTime, Local, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::scheduler::next_time_of_day;

/// What a request asks the scheduler to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Help,
    Set,
    Skip,
    Break,
    Continue,
    GetActive,
}

impl Action {
    /// All actions, in matching order.
    pub const ALL: [Action; 6] = [
        Action::Help,
        Action::Set,
        Action::Skip,
        Action::Break,
        Action::Continue,
        Action::GetActive,
    ];

    /// Words that must all appear in a request for it to match this action.
    pub fn keywords(self) -> &'static [&'static str] {
        match self {
            Action::Help => &["help"],
            Action::Set => &["set"],
            Action::Skip => &["skip"],
            Action::Break => &["break"],
            Action::Continue => &["continue"],
            Action::GetActive => &["current"],
        }
    }

    /// The first action whose keywords all appear in `text`.
    ///
    /// Matching ignores case and ASCII punctuation.
    pub fn find_matching(text: &str) -> Option<Action> {
        let words = words(text);
        Self::ALL.into_iter().find(|action| {
            action
                .keywords()
                .iter()
                .all(|keyword| words.iter().any(|w| w == keyword))
        })
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Action::Help => "help",
            Action::Set => "set",
            Action::Skip => "skip",
            Action::Break => "break",
            Action::Continue => "continue",
            Action::GetActive => "get_active",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A structured request for the alarm controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRequest {
    pub action: Action,
    /// Target time for Set. When absent Set uses the configured default time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explicit_time: Option<DateTime<Local>>,
    /// Name for the scheduled alarm. Descriptive only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl ActionRequest {
    pub fn new(action: Action) -> Self {
        Self {
            action,
            explicit_time: None,
            name: None,
        }
    }

    /// Parse free text into a request.
    ///
    /// Returns `None` if no action matches. For Set, time hints in the text
    /// are applied on top of `default_time` and the result is the next such
    /// time after `now`.
    pub fn from_text(text: &str, now: DateTime<Local>, default_time: NaiveTime) -> Option<Self> {
        let action = Action::find_matching(text)?;
        let mut request = Self::new(action);

        if action == Action::Set
            && let Some(time) = time_hint(text, default_time)
        {
            request.explicit_time = Some(next_time_of_day(&now, time));
        }

        Some(request)
    }
}

// ============================================================================
// Text helpers
// ============================================================================

/// Lowercased words with ASCII punctuation removed.
fn words(text: &str) -> Vec<String> {
    text.chars()
        .filter(|c| !c.is_ascii_punctuation())
        .collect::<String>()
        .to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Which component of the time a number sets.
#[derive(Debug, Clone, Copy)]
enum TimeUnit {
    Hour,
    HourAm,
    HourPm,
    Minute,
    Second,
}

impl TimeUnit {
    fn from_word(word: &str) -> Option<Self> {
        match word {
            "oclock" | "hour" | "hours" => Some(Self::Hour),
            "am" => Some(Self::HourAm),
            "pm" => Some(Self::HourPm),
            "minute" | "minutes" => Some(Self::Minute),
            "second" | "seconds" => Some(Self::Second),
            _ => None,
        }
    }

    fn apply(self, time: NaiveTime, value: u32) -> Option<NaiveTime> {
        match self {
            Self::Hour => time.with_hour(value),
            Self::HourAm if (1..=12).contains(&value) => time.with_hour(value % 12),
            Self::HourPm if (1..=12).contains(&value) => time.with_hour(value % 12 + 12),
            Self::HourAm | Self::HourPm => None,
            Self::Minute => time.with_minute(value),
            Self::Second => time.with_second(value),
        }
    }
}

/// Time of day described by number hints in `text`, starting from `base`.
///
/// Returns `None` when the text carries no usable hint. Out-of-range values
/// are ignored.
fn time_hint(text: &str, base: NaiveTime) -> Option<NaiveTime> {
    let words = words(text);
    let mut time = base;
    let mut hinted = false;

    for pair in words.windows(2) {
        let (Ok(value), Some(unit)) = (pair[0].parse::<u32>(), TimeUnit::from_word(&pair[1]))
        else {
            continue;
        };
        if let Some(updated) = unit.apply(time, value) {
            time = updated;
            hinted = true;
        }
    }

    hinted.then_some(time)
}
