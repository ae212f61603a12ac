//! Restart recovery.
//!
//! The pending trigger lives only in memory. On startup the stored alarm, if
//! it is still ahead of now, is re-armed exactly as it was stored.

use tracing::info;

use super::alarm::Alarm;
use super::controller::AlarmController;
use super::error::Result;

impl AlarmController {
    /// Re-arm the stored alarm if it is still in the future.
    ///
    /// The store is only read. A past or missing record leaves the controller
    /// idle.
    pub async fn recover(&mut self) -> Result<Option<Alarm>> {
        let now = self.clock.now();

        match self.store.get_active(now).await? {
            Some(alarm) => {
                info!(
                    alarm_id = %alarm.id,
                    alarm_name = %alarm.name,
                    alarm_time = %alarm.scheduled_time,
                    "Recovered alarm"
                );
                self.arm(alarm.clone());
                Ok(Some(alarm))
            }
            None => {
                info!("No upcoming alarm to recover");
                Ok(None)
            }
        }
    }
}
