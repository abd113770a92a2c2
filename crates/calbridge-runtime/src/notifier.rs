//! Legacy listener registry
//!
//! Listeners run synchronously, in registration order, on the thread that
//! emits. The registry lock is released before any listener runs, so a
//! listener may subscribe, unsubscribe or trigger a nested emission.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use calbridge_core::{LegacyEvent, ListenerId};
use parking_lot::Mutex;

/// Callback receiving legacy notifications
pub type LegacyListener = Arc<dyn Fn(&LegacyEvent) + Send + Sync>;

#[derive(Default)]
pub struct Notifier {
    listeners: Mutex<Vec<(ListenerId, LegacyListener)>>,
    next_id: AtomicU64,
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, listener: LegacyListener) -> ListenerId {
        let id = ListenerId::new(self.next_id.fetch_add(1, Ordering::Relaxed) + 1);
        self.listeners.lock().push((id, listener));
        id
    }

    /// Returns false if `id` was not registered
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.lock();
        let before = listeners.len();
        listeners.retain(|(lid, _)| *lid != id);
        listeners.len() != before
    }

    pub fn len(&self) -> usize {
        self.listeners.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Deliver `event` to every listener registered at call time
    pub fn emit(&self, event: &LegacyEvent) {
        let snapshot: Vec<LegacyListener> = self
            .listeners
            .lock()
            .iter()
            .map(|(_, l)| Arc::clone(l))
            .collect();

        for listener in snapshot {
            listener(event);
        }
    }
}
