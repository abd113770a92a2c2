//! Minimal collaborators for unit tests in this crate

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use calbridge_core::{
    Authority, AuthorityDate, AuthorityError, AuthorityEvent, AuthorityHandler, DeferredTask,
    HostClock, MutationFuture, Participant, ParticipantId, ParticipantRoster, Scheduler,
    SubscriptionId, TimeUnit, TimerId, Timestamp,
};
use parking_lot::Mutex;

pub(crate) struct StubAuthority {
    name: &'static str,
    pub date: Mutex<AuthorityDate>,
    pub fail: Mutex<bool>,
    pub advance_units: Vec<TimeUnit>,
    pub advanced: Mutex<Vec<(TimeUnit, i64)>>,
    handlers: Mutex<BTreeMap<u64, (AuthorityEvent, AuthorityHandler)>>,
}

impl StubAuthority {
    pub fn named(name: &'static str) -> Self {
        StubAuthority {
            name,
            date: Mutex::new(AuthorityDate::new(2024, 1, 1)),
            fail: Mutex::new(false),
            advance_units: vec![TimeUnit::Day, TimeUnit::Hour, TimeUnit::Minute],
            advanced: Mutex::new(Vec::new()),
            handlers: Mutex::new(BTreeMap::new()),
        }
    }

    pub fn fire(&self, event: AuthorityEvent) {
        let matching: Vec<AuthorityHandler> = self
            .handlers
            .lock()
            .values()
            .filter(|(e, _)| *e == event)
            .map(|(_, h)| Arc::clone(h))
            .collect();
        for handler in matching {
            handler(event);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.handlers.lock().len()
    }

    fn check(&self) -> Result<(), AuthorityError> {
        if *self.fail.lock() {
            return Err(AuthorityError::Failed("stub failure".into()));
        }
        Ok(())
    }
}

impl Authority for StubAuthority {
    fn name(&self) -> &str {
        self.name
    }

    fn current_date(&self) -> Result<AuthorityDate, AuthorityError> {
        self.check()?;
        Ok(*self.date.lock())
    }

    fn to_structured(&self, ts: Timestamp) -> Result<AuthorityDate, AuthorityError> {
        self.check()?;
        let mut date = *self.date.lock();
        date.time.second = (ts.as_secs() % 60) as i32;
        Ok(date)
    }

    fn to_timestamp(&self, date: &AuthorityDate) -> Result<Timestamp, AuthorityError> {
        self.check()?;
        Ok(Timestamp::from_secs(i64::from(date.year) * 1_000 + i64::from(date.month)))
    }

    fn supports_advance(&self, unit: TimeUnit) -> bool {
        self.advance_units.contains(&unit)
    }

    fn advance_by(&self, unit: TimeUnit, amount: i64) -> MutationFuture<'_> {
        Box::pin(async move {
            self.advanced.lock().push((unit, amount));
            Ok(())
        })
    }

    fn subscribe(&self, event: AuthorityEvent, handler: AuthorityHandler) -> SubscriptionId {
        let mut handlers = self.handlers.lock();
        let id = handlers.keys().next_back().map_or(1, |k| k + 1);
        handlers.insert(id, (event, handler));
        SubscriptionId::new(id)
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        self.handlers.lock().remove(&id.0);
    }
}

/// Scheduler that only runs tasks when told to
#[derive(Default)]
pub(crate) struct QueueScheduler {
    tasks: Mutex<Vec<(TimerId, Duration, DeferredTask)>>,
    next: Mutex<u64>,
}

impl QueueScheduler {
    pub fn run_all(&self) -> usize {
        let tasks = std::mem::take(&mut *self.tasks.lock());
        let n = tasks.len();
        for (_, _, task) in tasks {
            task();
        }
        n
    }

    pub fn pending(&self) -> usize {
        self.tasks.lock().len()
    }

    pub fn delays(&self) -> Vec<Duration> {
        self.tasks.lock().iter().map(|(_, d, _)| *d).collect()
    }
}

impl Scheduler for QueueScheduler {
    fn schedule_once(&self, delay: Duration, task: DeferredTask) -> TimerId {
        let mut next = self.next.lock();
        *next += 1;
        let id = TimerId::new(*next);
        self.tasks.lock().push((id, delay, task));
        id
    }

    fn cancel(&self, id: TimerId) -> bool {
        let mut tasks = self.tasks.lock();
        let before = tasks.len();
        tasks.retain(|(tid, _, _)| *tid != id);
        tasks.len() != before
    }
}

pub(crate) struct StaticRoster {
    pub local: ParticipantId,
    pub all: Vec<Participant>,
}

impl StaticRoster {
    /// Local participant is the only, privileged, participant
    pub fn privileged(id: &str) -> Self {
        StaticRoster {
            local: ParticipantId::from(id),
            all: vec![Participant::new(id, true, true)],
        }
    }

    /// Local participant without elevation
    pub fn unprivileged(id: &str) -> Self {
        StaticRoster {
            local: ParticipantId::from(id),
            all: vec![Participant::new(id, true, false)],
        }
    }
}

impl ParticipantRoster for StaticRoster {
    fn local_id(&self) -> ParticipantId {
        self.local.clone()
    }

    fn participants(&self) -> Vec<Participant> {
        self.all.clone()
    }
}

#[derive(Default)]
pub(crate) struct StubClock {
    pub now: Mutex<Option<Timestamp>>,
    pub advances: Mutex<Vec<i64>>,
}

impl StubClock {
    pub fn at(secs: i64) -> Self {
        StubClock {
            now: Mutex::new(Some(Timestamp::from_secs(secs))),
            advances: Mutex::new(Vec::new()),
        }
    }
}

impl HostClock for StubClock {
    fn world_time(&self) -> Option<Timestamp> {
        *self.now.lock()
    }

    fn advance(&self, delta: i64) -> MutationFuture<'_> {
        Box::pin(async move {
            self.advances.lock().push(delta);
            let mut now = self.now.lock();
            *now = Some(now.unwrap_or_default() + delta);
            Ok(())
        })
    }
}
