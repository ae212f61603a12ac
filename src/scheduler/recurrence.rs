//! Recurrence rule evaluation.
//!
//! Wraps a cron expression and answers "what is the n-th occurrence after
//! this instant". Evaluation is pure: the caller supplies the reference
//! instant and its timezone.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, TimeZone};

use super::error::{Result, SchedulerError};

/// A parsed cron-style recurrence rule.
///
/// Accepts standard five-field expressions (`min hour dom mon dow`) as well as
/// the six/seven-field form with leading seconds and optional trailing year.
#[derive(Clone)]
pub struct RecurrenceRule {
    expr: String,
    schedule: cron::Schedule,
}

impl RecurrenceRule {
    /// Parse a cron expression.
    pub fn parse(expr: &str) -> Result<Self> {
        let normalized = normalize(expr);
        let schedule = cron::Schedule::from_str(&normalized)
            .map_err(|e| SchedulerError::InvalidRule(format!("'{}': {}", expr.trim(), e)))?;

        Ok(Self {
            expr: expr.trim().to_string(),
            schedule,
        })
    }

    /// The expression as configured.
    pub fn expr(&self) -> &str {
        &self.expr
    }

    /// The `(skip + 1)`-th occurrence strictly after `after`.
    ///
    /// `skip = 0` is the immediate next occurrence, `skip = 1` the one after it.
    pub fn next_occurrence<Tz: TimeZone>(
        &self,
        after: &DateTime<Tz>,
        skip: usize,
    ) -> Result<DateTime<Tz>> {
        self.schedule
            .after(after)
            .skip_while(|t| t <= after)
            .nth(skip)
            .ok_or_else(|| SchedulerError::NoUpcomingOccurrence(self.expr.clone()))
    }
}

impl fmt::Debug for RecurrenceRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RecurrenceRule").field(&self.expr).finish()
    }
}

impl FromStr for RecurrenceRule {
    type Err = SchedulerError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Prefix a seconds field onto five-field expressions; the cron crate wants it.
fn normalize(expr: &str) -> String {
    let trimmed = expr.trim();
    if trimmed.split_whitespace().count() == 5 {
        format!("0 {trimmed}")
    } else {
        trimmed.to_string()
    }
}
