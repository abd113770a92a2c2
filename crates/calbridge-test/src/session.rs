//! Session harness
//!
//! Builds a `CalendarApi` over the fake collaborators and records every
//! legacy notification it emits.

use std::sync::Arc;
use std::time::Duration;

use calbridge_core::{AuthorityHandle, BridgeResult, LegacyEvent, Participant, Timestamp};
use calbridge_runtime::{BridgeConfig, CalendarApi, HostContext, HostEnvironment, LegacyListener};
use parking_lot::Mutex;

use crate::{
    FakeAuthority, FakeCelestial, FakeHostClock, FakeRegistry, FakeRoster, ManualScheduler,
};

/// Collects legacy notifications in delivery order
#[derive(Clone, Default)]
pub struct RecordingListener {
    events: Arc<Mutex<Vec<LegacyEvent>>>,
}

impl RecordingListener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn listener(&self) -> LegacyListener {
        let events = Arc::clone(&self.events);
        Arc::new(move |e: &LegacyEvent| events.lock().push(e.clone()))
    }

    pub fn events(&self) -> Vec<LegacyEvent> {
        self.events.lock().clone()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.events.lock().iter().map(LegacyEvent::name).collect()
    }

    pub fn count(&self, name: &str) -> usize {
        self.events.lock().iter().filter(|e| e.name() == name).count()
    }

    pub fn last(&self) -> Option<LegacyEvent> {
        self.events.lock().last().cloned()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

/// Builder for a single participant's view of a session
pub struct SessionBuilder {
    authority: Option<Arc<FakeAuthority>>,
    clock: Option<Arc<FakeHostClock>>,
    roster: FakeRoster,
    registry: Option<Arc<FakeRegistry>>,
    celestial: FakeCelestial,
    config: BridgeConfig,
}

impl SessionBuilder {
    /// Privileged solo participant, authority and clock at timestamp zero
    pub fn new() -> Self {
        SessionBuilder {
            authority: Some(Arc::new(FakeAuthority::new("fake-authority"))),
            clock: Some(Arc::new(FakeHostClock::at(Timestamp::ZERO))),
            roster: FakeRoster::solo("gm", true),
            registry: None,
            celestial: FakeCelestial::default(),
            config: BridgeConfig::default(),
        }
    }

    pub fn authority(mut self, authority: FakeAuthority) -> Self {
        self.authority = Some(Arc::new(authority));
        self
    }

    pub fn without_authority(mut self) -> Self {
        self.authority = None;
        self
    }

    pub fn clock(mut self, clock: FakeHostClock) -> Self {
        self.clock = Some(Arc::new(clock));
        self
    }

    pub fn without_clock(mut self) -> Self {
        self.clock = None;
        self
    }

    pub fn local(mut self, local: &str, participants: Vec<Participant>) -> Self {
        self.roster = FakeRoster::new(local, participants);
        self
    }

    pub fn unprivileged(mut self) -> Self {
        self.roster = FakeRoster::solo("player", false);
        self
    }

    pub fn registry(mut self, registry: Arc<FakeRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn celestial(mut self, celestial: FakeCelestial) -> Self {
        self.celestial = celestial;
        self
    }

    pub fn ready_delay(mut self, delay: Duration) -> Self {
        self.config = self.config.with_ready_delay(delay);
        self
    }

    pub fn config(mut self, config: BridgeConfig) -> Self {
        self.config = config;
        self
    }

    /// Build the session without starting the bridge
    pub fn build(self) -> TestSession {
        let scheduler = Arc::new(ManualScheduler::new());
        let roster = Arc::new(self.roster);

        let mut ctx = HostContext::new(roster.clone(), scheduler.clone())
            .with_authority(self.authority.clone().map(|a| a as AuthorityHandle))
            .with_celestial(Arc::new(self.celestial));
        if let Some(clock) = self.clock.clone() {
            ctx = ctx.with_clock(clock);
        }
        if let Some(registry) = self.registry.clone() {
            ctx = ctx.with_registry(registry);
        }

        let api = CalendarApi::new(ctx, self.config);
        let recorder = RecordingListener::new();
        api.on(recorder.listener());

        TestSession {
            api,
            authority: self.authority,
            clock: self.clock,
            roster,
            registry: self.registry,
            scheduler,
            recorder,
        }
    }

    /// Build and start the bridge through host bootstrap. The listener is
    /// attached before `init` is emitted.
    pub fn bootstrap(self) -> BridgeResult<TestSession> {
        let session = self.build();
        session.api.bridge().initialize()?;
        Ok(session)
    }

    /// Bootstrap with an explicit host environment; the authority is
    /// detected, not injected
    pub fn bootstrap_in(
        self,
        env: &HostEnvironment,
    ) -> BridgeResult<(CalendarApi, Arc<ManualScheduler>)> {
        let scheduler = Arc::new(ManualScheduler::new());
        let mut ctx = HostContext::new(Arc::new(self.roster), scheduler.clone())
            .with_celestial(Arc::new(self.celestial));
        if let Some(clock) = self.clock {
            ctx = ctx.with_clock(clock);
        }
        if let Some(registry) = self.registry {
            ctx = ctx.with_registry(registry);
        }
        let api = CalendarApi::bootstrap(env, ctx, self.config)?;
        Ok((api, scheduler))
    }
}

impl Default for SessionBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A built session and handles to its fakes
pub struct TestSession {
    pub api: CalendarApi,
    pub authority: Option<Arc<FakeAuthority>>,
    pub clock: Option<Arc<FakeHostClock>>,
    pub roster: Arc<FakeRoster>,
    pub registry: Option<Arc<FakeRegistry>>,
    pub scheduler: Arc<ManualScheduler>,
    pub recorder: RecordingListener,
}

impl TestSession {
    /// Advance the scheduler's virtual time
    pub fn advance(&self, dt: Duration) -> usize {
        self.scheduler.advance(dt)
    }
}
