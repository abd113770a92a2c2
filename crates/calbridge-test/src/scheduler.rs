//! Virtual-time scheduler
//!
//! Deferred tasks run only when the test advances virtual time. Tasks due at
//! the same instant run in scheduling order.

use std::time::Duration;

use calbridge_core::{DeferredTask, Scheduler, TimerId};
use parking_lot::Mutex;

struct Pending {
    id: TimerId,
    due: Duration,
    task: DeferredTask,
}

#[derive(Default)]
pub struct ManualScheduler {
    now: Mutex<Duration>,
    pending: Mutex<Vec<Pending>>,
    next_id: Mutex<u64>,
    cancelled: Mutex<u64>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Virtual time elapsed since creation
    pub fn now(&self) -> Duration {
        *self.now.lock()
    }

    pub fn pending(&self) -> usize {
        self.pending.lock().len()
    }

    /// Number of successful cancellations
    pub fn cancelled(&self) -> u64 {
        *self.cancelled.lock()
    }

    /// Advance virtual time by `dt`, running every task that falls due.
    /// Returns the number of tasks run.
    pub fn advance(&self, dt: Duration) -> usize {
        let target = self.now().saturating_add(dt);
        let mut ran = 0;

        while let Some(next) = self.pop_due(target) {
            *self.now.lock() = next.due;
            // Task may schedule or cancel; no lock held here
            (next.task)();
            ran += 1;
        }

        *self.now.lock() = target;
        ran
    }

    /// Run tasks already due without moving time forward
    pub fn run_due(&self) -> usize {
        self.advance(Duration::ZERO)
    }

    fn pop_due(&self, target: Duration) -> Option<Pending> {
        let mut pending = self.pending.lock();
        let idx = pending
            .iter()
            .enumerate()
            .filter(|(_, p)| p.due <= target)
            .min_by_key(|(i, p)| (p.due, *i))
            .map(|(i, _)| i)?;
        Some(pending.remove(idx))
    }
}

impl Scheduler for ManualScheduler {
    fn schedule_once(&self, delay: Duration, task: DeferredTask) -> TimerId {
        let id = {
            let mut next = self.next_id.lock();
            *next += 1;
            TimerId::new(*next)
        };
        let due = self.now().saturating_add(delay);
        self.pending.lock().push(Pending { id, due, task });
        id
    }

    fn cancel(&self, id: TimerId) -> bool {
        let mut pending = self.pending.lock();
        let before = pending.len();
        pending.retain(|p| p.id != id);
        let removed = pending.len() != before;
        if removed {
            *self.cancelled.lock() += 1;
        }
        removed
    }
}
