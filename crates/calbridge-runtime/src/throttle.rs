//! UI notification throttle
//!
//! Sits between the bridge and display widgets: at most one notification
//! per element key per window. Later updates are admitted again once the
//! window has elapsed, so legitimate repeated updates are never lost for
//! good.

use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

pub struct Throttle<K> {
    window: Duration,
    last: Mutex<HashMap<K, Instant>>,
}

impl<K: Eq + Hash> Throttle<K> {
    pub fn new(window: Duration) -> Self {
        Throttle {
            window,
            last: Mutex::new(HashMap::new()),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Admit a notification for `key` at `now`; records it when admitted.
    /// Entries whose window has elapsed are dropped first.
    pub fn admit_at(&self, key: K, now: Instant) -> bool {
        let mut last = self.last.lock();
        last.retain(|_, prev| now.saturating_duration_since(*prev) < self.window);
        if last.contains_key(&key) {
            return false;
        }
        last.insert(key, now);
        true
    }

    pub fn admit(&self, key: K) -> bool {
        self.admit_at(key, Instant::now())
    }

    /// Forget `key`, e.g. when its element is removed
    pub fn forget(&self, key: &K) {
        self.last.lock().remove(key);
    }

    /// Keys currently inside their window
    pub fn tracked(&self) -> usize {
        self.last.lock().len()
    }
}
