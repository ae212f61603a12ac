//! Alarm state machine.
//!
//! The controller owns the timer and is the only code that writes the alarm
//! store. It is not shared: the [`AlarmService`](super::AlarmService) task
//! holds it and feeds it one request or trigger at a time, which serializes
//! every store-write-then-arm sequence.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Local, NaiveTime};
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::action::{Action, ActionRequest};
use crate::notify::{Notifier, NotifyError};
use crate::response;
use crate::store::AlarmStore;

use super::alarm::{Alarm, Parameters, RECURRING_ALARM_NAME, USER_ALARM_NAME, next_time_of_day};
use super::clock::Clock;
use super::error::Result;
use super::recurrence::RecurrenceRule;
use super::service::AlarmServiceConfig;
use super::timer::{TimerArmer, TriggerId};

// ============================================================================
// Public Types
// ============================================================================

/// Whether the controller has a trigger pending.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AlarmState {
    /// Nothing will fire.
    #[default]
    Idle,
    /// A trigger is pending for this alarm.
    Armed(Alarm),
}

impl AlarmState {
    pub fn is_armed(&self) -> bool {
        matches!(self, Self::Armed(_))
    }

    pub fn alarm(&self) -> Option<&Alarm> {
        match self {
            Self::Armed(alarm) => Some(alarm),
            Self::Idle => None,
        }
    }
}

/// Result of executing one action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionOutcome {
    pub action: Action,
    pub parameters: Parameters,
}

impl ActionOutcome {
    pub fn new(action: Action, parameters: Parameters) -> Self {
        Self { action, parameters }
    }

    /// Outcome of a GetActive query.
    pub fn active(alarm: Option<&Alarm>) -> Self {
        Self::new(
            Action::GetActive,
            alarm.map(Parameters::from).unwrap_or_default(),
        )
    }

    /// Human-readable answer for this outcome.
    pub fn answer(&self) -> String {
        response::render(self.action, &self.parameters)
    }
}

// ============================================================================
// Controller
// ============================================================================

/// Coordinates the recurrence rule, the alarm store, the timer and the
/// notifier.
pub struct AlarmController {
    rule: RecurrenceRule,
    pub(super) store: Arc<dyn AlarmStore>,
    notifier: Arc<dyn Notifier>,
    pub(super) clock: Arc<dyn Clock>,
    timer: TimerArmer,
    state: AlarmState,
    /// Elapsed triggers are sent here and come back through [`Self::fire`].
    fire_tx: mpsc::Sender<TriggerId>,
    default_time: NaiveTime,
    notify_timeout: Duration,
}

impl AlarmController {
    /// Create an idle controller. Elapsed triggers are delivered on `fire_tx`.
    pub fn new(config: AlarmServiceConfig, fire_tx: mpsc::Sender<TriggerId>) -> Self {
        Self {
            rule: config.rule,
            store: config.store,
            notifier: config.notifier,
            clock: config.clock,
            timer: TimerArmer::new(),
            state: AlarmState::Idle,
            fire_tx,
            default_time: config.default_time,
            notify_timeout: config.notify_timeout,
        }
    }

    /// Current in-memory state.
    pub fn state(&self) -> &AlarmState {
        &self.state
    }

    /// Execute one action.
    ///
    /// Storage failures abort the action: the timer and state are left as
    /// they were.
    pub async fn execute(&mut self, request: ActionRequest) -> Result<ActionOutcome> {
        let parameters = match request.action {
            Action::Help => Parameters::default(),
            Action::GetActive => {
                let now = self.clock.now();
                let alarm = self.store.get_active(now).await?;
                return Ok(ActionOutcome::active(alarm.as_ref()));
            }
            Action::Set => {
                let time = request
                    .explicit_time
                    .unwrap_or_else(|| next_time_of_day(&self.clock.now(), self.default_time));
                let name = request.name.unwrap_or_else(|| USER_ALARM_NAME.to_string());
                let alarm = self.schedule(Alarm::new(name, time)).await?;
                Parameters::from(&alarm)
            }
            Action::Skip => {
                let alarm = self.schedule_from_rule(1, request.name).await?;
                Parameters::from(&alarm)
            }
            Action::Continue => {
                let alarm = self.schedule_from_rule(0, request.name).await?;
                Parameters::from(&alarm)
            }
            Action::Break => {
                self.break_schedule().await?;
                Parameters::default()
            }
        };

        Ok(ActionOutcome::new(request.action, parameters))
    }

    /// Handle an elapsed trigger.
    ///
    /// Triggers that were cancelled or replaced after their delay elapsed are
    /// dropped. Otherwise the notifier is called and the next occurrence of
    /// the rule is scheduled whatever the delivery outcome. Returns whether
    /// the trigger was live.
    pub async fn fire(&mut self, id: TriggerId) -> bool {
        if !self.timer.disarm(id) {
            debug!(trigger = %id, "Ignoring stale trigger");
            return false;
        }

        let fired = match std::mem::take(&mut self.state) {
            AlarmState::Armed(alarm) => alarm,
            AlarmState::Idle => {
                warn!(trigger = %id, "Trigger fired while idle");
                return false;
            }
        };

        info!(
            alarm_id = %fired.id,
            alarm_time = %fired.scheduled_time,
            "Alarm fired"
        );

        self.deliver(&fired).await;

        // Never reschedule at or before the alarm that just fired, even if the
        // wall clock lags the timer.
        let after = self.clock.now().max(fired.scheduled_time);
        if let Err(e) = self.reschedule_after(after).await {
            error!(error = %e, "Failed to schedule next alarm after firing");
        }

        true
    }

    /// Cancel the pending trigger without touching the store.
    pub fn shutdown(&mut self) {
        if self.timer.cancel() {
            debug!("Pending trigger cancelled on shutdown");
        }
        self.state = AlarmState::Idle;
    }

    /// Install a trigger for `alarm` without writing the store.
    pub(super) fn arm(&mut self, alarm: Alarm) {
        let now = self.clock.now();
        let fire_tx = self.fire_tx.clone();
        self.timer.arm(alarm.scheduled_time, now, move |id| async move {
            if fire_tx.send(id).await.is_err() {
                debug!(trigger = %id, "Alarm service stopped before trigger delivery");
            }
        });
        self.state = AlarmState::Armed(alarm);
    }

    async fn schedule(&mut self, alarm: Alarm) -> Result<Alarm> {
        self.store.replace(&alarm).await?;
        self.arm(alarm.clone());

        info!(
            alarm_id = %alarm.id,
            alarm_name = %alarm.name,
            alarm_time = %alarm.scheduled_time,
            "Alarm scheduled"
        );
        Ok(alarm)
    }

    async fn schedule_from_rule(&mut self, skip: usize, name: Option<String>) -> Result<Alarm> {
        let now = self.clock.now();
        let time = self.rule.next_occurrence(&now, skip)?;
        let name = name.unwrap_or_else(|| RECURRING_ALARM_NAME.to_string());
        self.schedule(Alarm::new(name, time)).await
    }

    async fn break_schedule(&mut self) -> Result<()> {
        self.store.clear().await?;
        self.timer.cancel();
        self.state = AlarmState::Idle;
        info!("Alarm schedule stopped");
        Ok(())
    }

    async fn deliver(&self, alarm: &Alarm) {
        let delivery = self.notifier.notify(alarm);
        let outcome = match tokio::time::timeout(self.notify_timeout, delivery).await {
            Ok(result) => result,
            Err(_) => Err(NotifyError::Timeout(self.notify_timeout)),
        };

        match outcome {
            Ok(()) => info!(alarm_id = %alarm.id, "Alarm delivered"),
            Err(e) => error!(
                alarm_id = %alarm.id,
                alarm_time = %alarm.scheduled_time,
                error = %e,
                "Alarm delivery failed"
            ),
        }
    }

    /// Schedule the rule's next occurrence after `after`.
    ///
    /// A failed store write is logged and the trigger is armed anyway: the
    /// timer decides whether the recurrence keeps firing.
    async fn reschedule_after(&mut self, after: DateTime<Local>) -> Result<()> {
        let time = self.rule.next_occurrence(&after, 0)?;
        let alarm = Alarm::recurring(time);

        if let Err(e) = self.store.replace(&alarm).await {
            error!(
                alarm_time = %alarm.scheduled_time,
                error = %e,
                "Failed to persist rescheduled alarm"
            );
        }

        info!(
            alarm_id = %alarm.id,
            alarm_time = %alarm.scheduled_time,
            "Next alarm scheduled"
        );
        self.arm(alarm);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::TokioClock;
    use crate::store::file::FileAlarmStore;
    use crate::store::{StorageError, StorageResult};
    use async_trait::async_trait;
    use chrono::TimeZone;
    use std::sync::Mutex;
    use tempfile::TempDir;

    #[derive(Default)]
    struct RecordingNotifier {
        delivered: Mutex<Vec<DateTime<Local>>>,
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn notify(&self, alarm: &Alarm) -> std::result::Result<(), NotifyError> {
            self.delivered.lock().unwrap().push(alarm.scheduled_time);
            Ok(())
        }
    }

    struct BrokenStore;

    #[async_trait]
    impl AlarmStore for BrokenStore {
        async fn load(&self) -> StorageResult<Option<Alarm>> {
            Ok(None)
        }

        async fn replace(&self, _alarm: &Alarm) -> StorageResult<()> {
            Err(StorageError::encode("disk full"))
        }

        async fn clear(&self) -> StorageResult<()> {
            Err(StorageError::encode("disk full"))
        }
    }

    fn monday_7am() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 4, 7, 0, 0).unwrap()
    }

    fn controller(
        store: Arc<dyn AlarmStore>,
        notifier: Arc<dyn Notifier>,
    ) -> (AlarmController, mpsc::Receiver<TriggerId>) {
        let (fire_tx, fire_rx) = mpsc::channel(8);
        let config = AlarmServiceConfig {
            rule: RecurrenceRule::parse("0 6 * * *").unwrap(),
            store,
            notifier,
            clock: Arc::new(TokioClock::starting_at(monday_7am())),
            default_time: NaiveTime::from_hms_opt(6, 0, 0).unwrap(),
            notify_timeout: Duration::from_secs(10),
        };
        (AlarmController::new(config, fire_tx), fire_rx)
    }

    fn request(action: Action) -> ActionRequest {
        ActionRequest::new(action)
    }

    #[tokio::test(start_paused = true)]
    async fn continue_arms_next_occurrence() {
        let temp_dir = TempDir::new().unwrap();
        let store = Arc::new(FileAlarmStore::new(temp_dir.path()));
        let notifier = Arc::new(RecordingNotifier::default());
        let (mut controller, _fire_rx) = controller(store.clone(), notifier);

        let outcome = controller.execute(request(Action::Continue)).await.unwrap();

        let expected = Local.with_ymd_and_hms(2024, 3, 5, 6, 0, 0).unwrap();
        assert_eq!(outcome.parameters.alarm_time, Some(expected));
        assert_eq!(outcome.parameters.alarm_name, RECURRING_ALARM_NAME);
        assert_eq!(
            controller.state().alarm().map(|a| a.scheduled_time),
            Some(expected)
        );
        assert_eq!(store.load().await.unwrap().unwrap().scheduled_time, expected);
    }

    #[tokio::test(start_paused = true)]
    async fn help_leaves_state_unchanged() {
        let temp_dir = TempDir::new().unwrap();
        let store = Arc::new(FileAlarmStore::new(temp_dir.path()));
        let notifier = Arc::new(RecordingNotifier::default());
        let (mut controller, _fire_rx) = controller(store.clone(), notifier);

        let outcome = controller.execute(request(Action::Help)).await.unwrap();

        assert_eq!(outcome.action, Action::Help);
        assert!(!controller.state().is_armed());
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn fire_delivers_and_rearms() {
        let temp_dir = TempDir::new().unwrap();
        let store = Arc::new(FileAlarmStore::new(temp_dir.path()));
        let notifier = Arc::new(RecordingNotifier::default());
        let (mut controller, mut fire_rx) = controller(store.clone(), notifier.clone());

        controller.execute(request(Action::Continue)).await.unwrap();

        let id = fire_rx.recv().await.unwrap();
        assert!(controller.fire(id).await);

        let tuesday = Local.with_ymd_and_hms(2024, 3, 5, 6, 0, 0).unwrap();
        let wednesday = Local.with_ymd_and_hms(2024, 3, 6, 6, 0, 0).unwrap();
        assert_eq!(*notifier.delivered.lock().unwrap(), vec![tuesday]);
        assert_eq!(
            controller.state().alarm().map(|a| a.scheduled_time),
            Some(wednesday)
        );
        assert_eq!(store.load().await.unwrap().unwrap().scheduled_time, wednesday);
    }

    #[tokio::test(start_paused = true)]
    async fn replaced_trigger_is_ignored() {
        let temp_dir = TempDir::new().unwrap();
        let store = Arc::new(FileAlarmStore::new(temp_dir.path()));
        let notifier = Arc::new(RecordingNotifier::default());
        let (mut controller, mut fire_rx) = controller(store, notifier.clone());

        let soon = monday_7am() + chrono::Duration::seconds(1);
        let mut set = request(Action::Set);
        set.explicit_time = Some(soon);
        controller.execute(set).await.unwrap();

        // Let the trigger elapse and queue its id, then replace it.
        let stale = fire_rx.recv().await.unwrap();
        controller.execute(request(Action::Continue)).await.unwrap();

        assert!(!controller.fire(stale).await);
        assert!(notifier.delivered.lock().unwrap().is_empty());
        assert!(controller.state().is_armed());
    }

    #[tokio::test(start_paused = true)]
    async fn storage_failure_aborts_set() {
        let (mut controller, _fire_rx) =
            controller(Arc::new(BrokenStore), Arc::new(RecordingNotifier::default()));

        let result = controller.execute(request(Action::Set)).await;

        assert!(matches!(
            result,
            Err(crate::scheduler::SchedulerError::Storage(_))
        ));
        assert!(!controller.state().is_armed());
    }

    #[tokio::test(start_paused = true)]
    async fn storage_failure_during_fire_still_rearms() {
        let (mut controller, mut fire_rx) =
            controller(Arc::new(BrokenStore), Arc::new(RecordingNotifier::default()));

        // Recovery-style arming skips the store.
        let tuesday = Local.with_ymd_and_hms(2024, 3, 5, 6, 0, 0).unwrap();
        controller.arm(Alarm::recurring(tuesday));

        let id = fire_rx.recv().await.unwrap();
        assert!(controller.fire(id).await);

        let wednesday = Local.with_ymd_and_hms(2024, 3, 6, 6, 0, 0).unwrap();
        assert_eq!(
            controller.state().alarm().map(|a| a.scheduled_time),
            Some(wednesday)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn break_failure_keeps_trigger() {
        let (mut controller, _fire_rx) =
            controller(Arc::new(BrokenStore), Arc::new(RecordingNotifier::default()));

        let tuesday = Local.with_ymd_and_hms(2024, 3, 5, 6, 0, 0).unwrap();
        controller.arm(Alarm::recurring(tuesday));

        assert!(controller.execute(request(Action::Break)).await.is_err());
        assert!(controller.state().is_armed());
    }
}
