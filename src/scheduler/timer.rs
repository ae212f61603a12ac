//! Cancellable delayed trigger.
//!
//! [`TimerArmer`] owns at most one pending trigger. Arming cancels the
//! previous trigger before installing the new one; each trigger carries a
//! fresh [`TriggerId`] so that a firing which raced with a cancel can be
//! recognised and dropped by the owner.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, Local};
use tokio::sync::oneshot;
use tokio::time::Instant;
use tracing::debug;

/// Identifies one armed trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TriggerId(u64);

impl fmt::Display for TriggerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "trigger-{}", self.0)
    }
}

/// The single in-flight trigger. Dropping it cancels the sleep.
struct PendingTrigger {
    id: TriggerId,
    at: DateTime<Local>,
    cancel: oneshot::Sender<()>,
}

/// Owner of the one live delayed trigger.
///
/// Not `Clone`: exactly one owner decides what is armed. Dropping the armer
/// cancels whatever it has pending.
#[derive(Default)]
pub struct TimerArmer {
    pending: Option<PendingTrigger>,
    next_id: u64,
}

impl TimerArmer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm a trigger for `at`, replacing any pending one.
    ///
    /// The delay is `at - now`, clamped to zero. When it elapses the future
    /// built by `on_fire` is run once. Must be called inside a tokio runtime.
    pub fn arm<F, Fut>(
        &mut self,
        at: DateTime<Local>,
        now: DateTime<Local>,
        on_fire: F,
    ) -> TriggerId
    where
        F: FnOnce(TriggerId) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.cancel();

        self.next_id += 1;
        let id = TriggerId(self.next_id);
        let delay = (at - now).to_std().unwrap_or(Duration::ZERO);
        let deadline = Instant::now() + delay;
        let (cancel_tx, cancel_rx) = oneshot::channel();
        let fire = on_fire(id);

        debug!(
            trigger = %id,
            alarm_time = %at,
            delay_secs = delay.as_secs(),
            "Arming timer"
        );

        tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = cancel_rx => {
                    debug!(trigger = %id, "Timer cancelled");
                }
                _ = tokio::time::sleep_until(deadline) => {
                    fire.await;
                }
            }
        });

        self.pending = Some(PendingTrigger {
            id,
            at,
            cancel: cancel_tx,
        });
        id
    }

    /// Cancel the pending trigger, if any.
    ///
    /// Returns whether something was cancelled.
    pub fn cancel(&mut self) -> bool {
        match self.pending.take() {
            Some(pending) => {
                let _ = pending.cancel.send(());
                true
            }
            None => false,
        }
    }

    /// Release the pending entry after trigger `id` has fired.
    ///
    /// Returns `false` if `id` is not the live trigger, i.e. it was
    /// cancelled or replaced after its delay elapsed.
    pub fn disarm(&mut self, id: TriggerId) -> bool {
        if self.is_live(id) {
            self.pending = None;
            true
        } else {
            false
        }
    }

    /// Whether `id` is the currently pending trigger.
    pub fn is_live(&self, id: TriggerId) -> bool {
        self.pending.as_ref().is_some_and(|p| p.id == id)
    }

    pub fn is_armed(&self) -> bool {
        self.pending.is_some()
    }
}

impl fmt::Debug for TimerArmer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerArmer")
            .field("pending", &self.pending.as_ref().map(|p| (p.id, p.at)))
            .finish()
    }
}
