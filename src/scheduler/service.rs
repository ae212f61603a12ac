//! Alarm service.
//!
//! Runs the [`AlarmController`] on a single background task. Mutating actions
//! and elapsed triggers arrive as messages on that task, so they never
//! interleave. Read-only queries are answered by the handle, from the store or
//! from the state the task publishes after every change.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveTime;
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{error, info};

use crate::action::{Action, ActionRequest};
use crate::notify::Notifier;
use crate::store::AlarmStore;

use super::alarm::{Alarm, Parameters};
use super::clock::Clock;
use super::controller::{ActionOutcome, AlarmController, AlarmState};
use super::error::{Result, SchedulerError};
use super::recurrence::RecurrenceRule;
use super::timer::TriggerId;

/// Capacity of the command channel.
const COMMAND_CHANNEL_CAPACITY: usize = 100;

/// Capacity of the trigger channel. At most one trigger is live, stale ones
/// only need room to be drained.
const FIRE_CHANNEL_CAPACITY: usize = 8;

// ============================================================================
// Public API
// ============================================================================

/// Handle for interacting with the alarm service.
#[derive(Clone)]
pub struct AlarmHandle {
    command_tx: mpsc::Sender<AlarmCommand>,
    state_rx: watch::Receiver<AlarmState>,
    store: Arc<dyn AlarmStore>,
    clock: Arc<dyn Clock>,
    default_time: NaiveTime,
}

impl AlarmHandle {
    /// Execute a structured action.
    ///
    /// Help and GetActive are answered here with at most one store read;
    /// everything else goes through the service task.
    pub async fn execute(&self, request: ActionRequest) -> Result<ActionOutcome> {
        match request.action {
            Action::Help => Ok(ActionOutcome::new(Action::Help, Parameters::default())),
            Action::GetActive => {
                let alarm = self.active_alarm().await?;
                Ok(ActionOutcome::active(alarm.as_ref()))
            }
            _ => {
                let (reply_tx, reply_rx) = oneshot::channel();
                self.send(AlarmCommand::Execute {
                    request: Box::new(request),
                    reply: reply_tx,
                })
                .await?;
                reply_rx
                    .await
                    .map_err(|_| SchedulerError::ServiceUnavailable)?
            }
        }
    }

    /// Match free text to an action and execute it.
    ///
    /// Text that matches no action is logged and rejected with
    /// [`SchedulerError::UnrecognizedAction`].
    pub async fn process_text(&self, text: &str) -> Result<ActionOutcome> {
        let Some(request) = ActionRequest::from_text(text, self.clock.now(), self.default_time)
        else {
            error!(text = %text, "Unrecognized request");
            return Err(SchedulerError::UnrecognizedAction(text.to_string()));
        };

        self.execute(request).await
    }

    /// The stored alarm if it is still ahead.
    pub async fn active_alarm(&self) -> Result<Option<Alarm>> {
        let now = self.clock.now();
        Ok(self.store.get_active(now).await?)
    }

    /// The controller's in-memory state as last published by the service.
    ///
    /// Does not wait for the service task, so it answers while a delivery is
    /// in flight.
    pub fn status(&self) -> Result<AlarmState> {
        if self.state_rx.has_changed().is_err() {
            return Err(SchedulerError::ServiceUnavailable);
        }
        Ok(self.state_rx.borrow().clone())
    }

    /// Stop the service, cancelling the pending trigger.
    ///
    /// Returns once the service task has exited.
    pub async fn shutdown(&self) {
        if self.command_tx.send(AlarmCommand::Shutdown).await.is_err() {
            return;
        }

        // The sender is dropped when the service loop returns
        let mut state_rx = self.state_rx.clone();
        while state_rx.changed().await.is_ok() {}
    }

    async fn send(&self, command: AlarmCommand) -> Result<()> {
        self.command_tx
            .send(command)
            .await
            .map_err(|_| SchedulerError::ServiceUnavailable)
    }
}

/// Configuration for the alarm service.
pub struct AlarmServiceConfig {
    pub rule: RecurrenceRule,
    /// Storage backend for the alarm record.
    pub store: Arc<dyn AlarmStore>,
    pub notifier: Arc<dyn Notifier>,
    pub clock: Arc<dyn Clock>,
    /// Time of day used by Set when no time is given.
    pub default_time: NaiveTime,
    /// Upper bound on a single notifier call.
    pub notify_timeout: Duration,
}

/// The alarm service.
pub struct AlarmService {
    controller: AlarmController,
    fire_rx: mpsc::Receiver<TriggerId>,
    store: Arc<dyn AlarmStore>,
    clock: Arc<dyn Clock>,
    default_time: NaiveTime,
}

impl AlarmService {
    /// Create a new alarm service.
    pub fn new(config: AlarmServiceConfig) -> Self {
        let (fire_tx, fire_rx) = mpsc::channel(FIRE_CHANNEL_CAPACITY);
        let store = config.store.clone();
        let clock = config.clock.clone();
        let default_time = config.default_time;

        Self {
            controller: AlarmController::new(config, fire_tx),
            fire_rx,
            store,
            clock,
            default_time,
        }
    }

    /// Start the alarm service.
    ///
    /// Recovers the stored alarm, then spawns the service loop. Returns a
    /// handle for interacting with the service.
    ///
    /// Fails if the stored alarm cannot be read, so a broken record is not
    /// mistaken for an empty schedule.
    pub async fn start(mut self) -> Result<AlarmHandle> {
        if let Err(e) = self.controller.recover().await {
            error!(error = %e, "Failed to recover alarm");
            return Err(e);
        }

        let (command_tx, command_rx) = mpsc::channel(COMMAND_CHANNEL_CAPACITY);
        let (state_tx, state_rx) = watch::channel(self.controller.state().clone());
        let handle = AlarmHandle {
            command_tx,
            state_rx,
            store: self.store.clone(),
            clock: self.clock.clone(),
            default_time: self.default_time,
        };

        tokio::spawn(self.run(command_rx, state_tx));

        Ok(handle)
    }

    /// Main service loop.
    async fn run(
        mut self,
        mut command_rx: mpsc::Receiver<AlarmCommand>,
        state_tx: watch::Sender<AlarmState>,
    ) {
        info!("Alarm service started");

        loop {
            tokio::select! {
                cmd = command_rx.recv() => match cmd {
                    Some(AlarmCommand::Execute { request, reply }) => {
                        let result = self.controller.execute(*request).await;
                        // Publish before replying so the caller reads its own write
                        state_tx.send_replace(self.controller.state().clone());
                        let _ = reply.send(result);
                    }
                    Some(AlarmCommand::Shutdown) | None => {
                        info!("Alarm service shutting down");
                        self.controller.shutdown();
                        break;
                    }
                },
                Some(id) = self.fire_rx.recv() => {
                    if self.controller.fire(id).await {
                        state_tx.send_replace(self.controller.state().clone());
                    }
                }
            }
        }

        info!("Alarm service stopped");
    }
}

// ============================================================================
// Internal Types
// ============================================================================

/// Command to the alarm service.
enum AlarmCommand {
    /// Execute a mutating action.
    Execute {
        request: Box<ActionRequest>,
        reply: oneshot::Sender<Result<ActionOutcome>>,
    },
    /// Shutdown the service.
    Shutdown,
}
