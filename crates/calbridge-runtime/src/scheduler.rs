//! Deferred execution on a tokio runtime

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use calbridge_core::{DeferredTask, Scheduler, TimerId};
use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

/// Scheduler spawning one sleeping task per deferred action
pub struct TokioScheduler {
    handle: Handle,
    pending: Arc<Mutex<HashMap<TimerId, JoinHandle<()>>>>,
    next_id: AtomicU64,
}

impl TokioScheduler {
    pub fn from_handle(handle: Handle) -> Self {
        TokioScheduler {
            handle,
            pending: Arc::new(Mutex::new(HashMap::new())),
            next_id: AtomicU64::new(0),
        }
    }

    /// Scheduler bound to the runtime of the calling context, if any
    pub fn try_current() -> Option<Self> {
        Handle::try_current().ok().map(Self::from_handle)
    }

    /// Number of tasks not yet fired or cancelled
    pub fn pending(&self) -> usize {
        self.pending.lock().len()
    }
}

impl Scheduler for TokioScheduler {
    fn schedule_once(&self, delay: Duration, task: DeferredTask) -> TimerId {
        let id = TimerId::new(self.next_id.fetch_add(1, Ordering::Relaxed) + 1);
        let pending = Arc::clone(&self.pending);

        // Hold the map while spawning so the task cannot remove its entry
        // before it has been inserted.
        let mut map = self.pending.lock();
        let join = self.handle.spawn(async move {
            tokio::time::sleep(delay).await;
            if pending.lock().remove(&id).is_some() {
                task();
            }
        });
        map.insert(id, join);
        id
    }

    fn cancel(&self, id: TimerId) -> bool {
        match self.pending.lock().remove(&id) {
            Some(join) => {
                join.abort();
                true
            }
            None => false,
        }
    }
}
