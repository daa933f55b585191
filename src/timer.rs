//! Cancellable one-shot timers.
//!
//! `arm` schedules an action on the tokio runtime and returns a handle.
//! Firing and cancelling race on a single atomic state, so exactly one of
//! them wins; cancelling a fired or already-cancelled timer does nothing.

use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::AbortHandle;

const ARMED: u8 = 0;
const FIRED: u8 = 1;
const CANCELLED: u8 = 2;

static NEXT_TIMER_ID: AtomicU64 = AtomicU64::new(1);

/// Identifies one arming of a timer. Ids are never reused within a process.
pub type TimerId = u64;

#[derive(Debug)]
pub struct TimerHandle {
    id: TimerId,
    state: Arc<AtomicU8>,
    task: AbortHandle,
}

/// Runs `action` once after `duration` unless the returned handle is cancelled first.
/// The action receives the id of this arming.
///
/// Must be called from within a tokio runtime.
pub fn arm<F>(duration: Duration, action: F) -> TimerHandle
where
    F: FnOnce(TimerId) + Send + 'static,
{
    let id = NEXT_TIMER_ID.fetch_add(1, Ordering::Relaxed);
    let state = Arc::new(AtomicU8::new(ARMED));

    let task_state = Arc::clone(&state);
    let task = tokio::spawn(async move {
        tokio::time::sleep(duration).await;
        if task_state
            .compare_exchange(ARMED, FIRED, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
        {
            action(id);
        }
    });

    TimerHandle {
        id,
        state,
        task: task.abort_handle(),
    }
}

impl TimerHandle {
    pub fn id(&self) -> TimerId {
        self.id
    }

    /// Cancels the timer. Returns `true` only if this call prevented the action.
    pub fn cancel(&self) -> bool {
        let cancelled = self
            .state
            .compare_exchange(ARMED, CANCELLED, Ordering::AcqRel, Ordering::Acquire)
            .is_ok();
        if cancelled {
            self.task.abort();
        }
        cancelled
    }

    /// Still waiting to fire.
    pub fn is_pending(&self) -> bool {
        self.state.load(Ordering::Acquire) == ARMED
    }

    pub fn has_fired(&self) -> bool {
        self.state.load(Ordering::Acquire) == FIRED
    }
}
