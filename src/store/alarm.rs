//! Alarm storage trait.
//!
//! Defines the interface for persisting the single active alarm.

use async_trait::async_trait;
use chrono::{DateTime, Local};

use crate::scheduler::Alarm;

use super::error::StorageResult;

/// Storage interface for the active alarm record.
///
/// The store holds at most one alarm. Writers are serialized by the alarm
/// service; readers may run concurrently with a write and must observe either
/// the previous record or the new one, never a mix.
#[async_trait]
pub trait AlarmStore: Send + Sync {
    /// Load the stored alarm regardless of its scheduled time.
    ///
    /// Returns `Ok(None)` if no alarm is stored.
    async fn load(&self) -> StorageResult<Option<Alarm>>;

    /// Replace whatever is stored with `alarm`.
    ///
    /// Must be atomic - either fully succeeds or has no effect.
    async fn replace(&self, alarm: &Alarm) -> StorageResult<()>;

    /// Delete the stored alarm.
    ///
    /// No-op if nothing is stored.
    async fn clear(&self) -> StorageResult<()>;

    /// Load the stored alarm only if it is scheduled strictly after `now`.
    ///
    /// Past alarms are treated as absent.
    async fn get_active(&self, now: DateTime<Local>) -> StorageResult<Option<Alarm>> {
        Ok(self
            .load()
            .await?
            .filter(|alarm| alarm.scheduled_time > now))
    }
}
