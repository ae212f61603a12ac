//! Common test utilities.
#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use chrono::{DateTime, Local, NaiveTime, TimeZone};

use alarm_scheduler::notify::{Notifier, NotifyError};
use alarm_scheduler::scheduler::{
    Alarm, AlarmHandle, AlarmService, AlarmServiceConfig, Clock, RecurrenceRule, SchedulerError,
    SystemClock, TokioClock,
};
use alarm_scheduler::server::{self, AppState};
use alarm_scheduler::store::{AlarmStore, StorageError, StorageResult};

/// Daily at 06:00.
pub const DAILY_SIX: &str = "0 6 * * *";

/// Upper bound on one notifier call in tests.
pub const NOTIFY_TIMEOUT: Duration = Duration::from_secs(10);

/// Local wall time on Monday 2024-03-04.
pub fn monday_at(hour: u32, minute: u32) -> DateTime<Local> {
    Local.with_ymd_and_hms(2024, 3, 4, hour, minute, 0).unwrap()
}

/// Local wall time at `hour:minute` on 2024-03-`day`.
pub fn march_at(day: u32, hour: u32, minute: u32) -> DateTime<Local> {
    Local.with_ymd_and_hms(2024, 3, day, hour, minute, 0).unwrap()
}

// ============================================================================
// Store
// ============================================================================

/// In-memory alarm store that counts writes and can be made to fail.
#[derive(Default)]
pub struct MemoryAlarmStore {
    record: Mutex<Option<Alarm>>,
    writes: AtomicUsize,
    fail_writes: AtomicBool,
}

impl MemoryAlarmStore {
    pub fn with_alarm(alarm: Alarm) -> Self {
        let store = Self::default();
        *store.record.lock().unwrap() = Some(alarm);
        store
    }

    pub fn failing() -> Self {
        let store = Self::default();
        store.fail_writes.store(true, Ordering::SeqCst);
        store
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn stored(&self) -> Option<Alarm> {
        self.record.lock().unwrap().clone()
    }

    fn check_writable(&self) -> StorageResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::encode("simulated write failure"));
        }
        Ok(())
    }
}

#[async_trait]
impl AlarmStore for MemoryAlarmStore {
    async fn load(&self) -> StorageResult<Option<Alarm>> {
        Ok(self.stored())
    }

    async fn replace(&self, alarm: &Alarm) -> StorageResult<()> {
        self.check_writable()?;
        self.writes.fetch_add(1, Ordering::SeqCst);
        *self.record.lock().unwrap() = Some(alarm.clone());
        Ok(())
    }

    async fn clear(&self) -> StorageResult<()> {
        self.check_writable()?;
        self.writes.fetch_add(1, Ordering::SeqCst);
        *self.record.lock().unwrap() = None;
        Ok(())
    }
}

// ============================================================================
// Notifier
// ============================================================================

/// How a [`RecordingNotifier`] answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Succeed,
    /// Fails like a webhook answering 500.
    Fail,
    /// Never answers.
    Hang,
}

/// Records every alarm it is asked to deliver.
pub struct RecordingNotifier {
    delivery: Delivery,
    attempts: Mutex<Vec<DateTime<Local>>>,
}

impl RecordingNotifier {
    pub fn new(delivery: Delivery) -> Self {
        Self {
            delivery,
            attempts: Mutex::new(Vec::new()),
        }
    }

    /// Scheduled times of every delivery attempt, in order.
    pub fn attempts(&self) -> Vec<DateTime<Local>> {
        self.attempts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, alarm: &Alarm) -> Result<(), NotifyError> {
        self.attempts.lock().unwrap().push(alarm.scheduled_time);
        match self.delivery {
            Delivery::Succeed => Ok(()),
            Delivery::Fail => Err(NotifyError::Status {
                status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
                body: "server error".to_string(),
            }),
            Delivery::Hang => std::future::pending().await,
        }
    }
}

// ============================================================================
// Service
// ============================================================================

/// Start a service on tokio time anchored at `now`.
pub async fn start_service(
    store: Arc<dyn AlarmStore>,
    notifier: Arc<dyn Notifier>,
    now: DateTime<Local>,
) -> AlarmHandle {
    start_with_clock(store, notifier, Arc::new(TokioClock::starting_at(now))).await
}

/// Start a service on the system clock.
pub async fn start_system_service(
    store: Arc<dyn AlarmStore>,
    notifier: Arc<dyn Notifier>,
) -> AlarmHandle {
    start_with_clock(store, notifier, Arc::new(SystemClock)).await
}

/// Start a service on the system clock, returning any recovery failure.
pub async fn try_start_system_service(
    store: Arc<dyn AlarmStore>,
    notifier: Arc<dyn Notifier>,
) -> Result<AlarmHandle, SchedulerError> {
    service(store, notifier, Arc::new(SystemClock)).start().await
}

async fn start_with_clock(
    store: Arc<dyn AlarmStore>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
) -> AlarmHandle {
    service(store, notifier, clock).start().await.unwrap()
}

fn service(
    store: Arc<dyn AlarmStore>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
) -> AlarmService {
    AlarmService::new(AlarmServiceConfig {
        rule: RecurrenceRule::parse(DAILY_SIX).unwrap(),
        store,
        notifier,
        clock,
        default_time: NaiveTime::from_hms_opt(6, 0, 0).unwrap(),
        notify_timeout: NOTIFY_TIMEOUT,
    })
}

/// Create a test app around a running service.
pub fn test_app(alarms: AlarmHandle) -> Router {
    server::build_app(AppState { alarms }, 30)
}
