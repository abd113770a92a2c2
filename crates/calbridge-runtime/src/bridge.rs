//! Event Bridge - lifecycle and legacy re-emission
//!
//! Owns the bridge lifecycle and the session-local clock flag. Authority
//! change notifications are funnelled into a single recompute-and-emit
//! action and re-emitted as `date-time-changed`, in the order the authority
//! delivers them. No lock is held while legacy listeners run.

use std::sync::{Arc, Weak};
use std::time::Duration;

use calbridge_core::{
    AuthorityEvent, AuthorityHandle, AuthorityHandler, BridgeError, BridgeResult,
    CelestialSource, DateTimeChanged, LegacyEvent, LifecycleState, ListenerId, Scheduler,
    SubscriptionId, TimerId,
};
use calbridge_time::FormatConverter;
use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::{BridgeConfig, HostContext, LegacyListener, Notifier, PrimaryElector};

#[derive(Debug, Default)]
struct BridgeState {
    lifecycle: LifecycleState,
    clock_running: bool,
    ready_timer: Option<TimerId>,
    subscriptions: Vec<SubscriptionId>,
}

struct Shared {
    state: Mutex<BridgeState>,
    notifier: Notifier,
    authority: Option<AuthorityHandle>,
    celestial: Arc<dyn CelestialSource>,
    elector: PrimaryElector,
    scheduler: Arc<dyn Scheduler>,
    ready_delay: Duration,
}

/// Event Bridge
///
/// Cloning yields another handle to the same bridge.
#[derive(Clone)]
pub struct EventBridge {
    shared: Arc<Shared>,
}

impl EventBridge {
    pub fn new(ctx: &HostContext, config: &BridgeConfig) -> Self {
        EventBridge {
            shared: Arc::new(Shared {
                state: Mutex::new(BridgeState::default()),
                notifier: Notifier::new(),
                authority: ctx.authority.clone(),
                celestial: Arc::clone(&ctx.celestial),
                elector: PrimaryElector::new(Arc::clone(&ctx.roster)),
                scheduler: Arc::clone(&ctx.scheduler),
                ready_delay: config.ready_delay,
            }),
        }
    }

    fn from_shared(shared: Arc<Shared>) -> Self {
        EventBridge { shared }
    }

    fn downgrade(&self) -> Weak<Shared> {
        Arc::downgrade(&self.shared)
    }

    pub fn state(&self) -> LifecycleState {
        self.shared.state.lock().lifecycle
    }

    pub fn is_ready(&self) -> bool {
        self.state() == LifecycleState::Ready
    }

    pub fn is_clock_running(&self) -> bool {
        self.shared.state.lock().clock_running
    }

    pub fn is_local_primary(&self) -> bool {
        self.shared.elector.is_local_primary()
    }

    /// Election and privilege view of the session roster
    pub fn elector(&self) -> &PrimaryElector {
        &self.shared.elector
    }

    /// Register a legacy listener
    pub fn subscribe(&self, listener: LegacyListener) -> ListenerId {
        self.shared.notifier.subscribe(listener)
    }

    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        self.shared.notifier.unsubscribe(id)
    }

    /// Start the bridge.
    ///
    /// Subscribes to authority notifications, emits `init`, emits
    /// `primary-elected` on the primary participant and schedules `ready`.
    pub fn initialize(&self) -> BridgeResult<()> {
        {
            let mut st = self.shared.state.lock();
            if !st.lifecycle.can_transition_to(LifecycleState::Initializing) {
                return Err(BridgeError::InvalidLifecycle {
                    from: st.lifecycle,
                    operation: "initialize",
                });
            }
            st.lifecycle = LifecycleState::Initializing;
        }
        debug!("bridge initializing");

        let subscriptions = self.subscribe_authority();
        self.shared.state.lock().subscriptions = subscriptions;

        self.emit(LegacyEvent::Init);

        if self.shared.elector.is_local_primary() {
            debug!(local = %self.shared.elector.local_id(), "local participant is primary");
            self.emit(LegacyEvent::PrimaryElected { is_primary: true });
        }

        self.schedule_ready();
        Ok(())
    }

    fn subscribe_authority(&self) -> Vec<SubscriptionId> {
        let Some(authority) = self.shared.authority.as_ref() else {
            debug!("no authority, date notifications disabled");
            return Vec::new();
        };

        AuthorityEvent::ALL
            .iter()
            .map(|&event| {
                let weak = self.downgrade();
                let handler: AuthorityHandler = Arc::new(move |e: AuthorityEvent| {
                    if let Some(shared) = weak.upgrade() {
                        debug!(event = ?e, "authority change");
                        EventBridge::from_shared(shared).refresh();
                    }
                });
                authority.subscribe(event, handler)
            })
            .collect()
    }

    fn schedule_ready(&self) {
        let weak = self.downgrade();
        let id = self.shared.scheduler.schedule_once(
            self.shared.ready_delay,
            Box::new(move || {
                if let Some(shared) = weak.upgrade() {
                    EventBridge::from_shared(shared).emit_ready();
                }
            }),
        );

        let mut st = self.shared.state.lock();
        let lifecycle = st.lifecycle;
        match lifecycle {
            LifecycleState::Initializing => st.ready_timer = Some(id),
            LifecycleState::Destroyed => {
                drop(st);
                self.shared.scheduler.cancel(id);
            }
            // Scheduler ran the task inline
            _ => {}
        }
    }

    /// Transition to Ready and emit `ready`; no-op in any other state than
    /// Initializing. Returns whether `ready` was emitted.
    pub fn emit_ready(&self) -> bool {
        {
            let mut st = self.shared.state.lock();
            if st.lifecycle != LifecycleState::Initializing {
                debug!(state = %st.lifecycle, "ready skipped");
                return false;
            }
            st.lifecycle = LifecycleState::Ready;
            st.ready_timer = None;
        }
        debug!("bridge ready");
        self.shared.notifier.emit(&LegacyEvent::Ready);
        true
    }

    /// Recompute the current date and emit `date-time-changed`.
    ///
    /// Only between `init` and destroy. Returns false when the occurrence
    /// was skipped.
    pub fn refresh(&self) -> bool {
        let state = self.state();
        if state == LifecycleState::Uninitialized || !state.can_emit() {
            debug!(%state, "refresh skipped");
            return false;
        }
        let Some(authority) = self.shared.authority.as_ref() else {
            return false;
        };

        let date = match authority.current_date() {
            Ok(date) => date,
            Err(e) => {
                warn!(authority = authority.name(), error = %e, "current date unavailable, notification skipped");
                return false;
            }
        };

        let names = authority.calendar_names();
        let payload = DateTimeChanged {
            date: FormatConverter::authority_to_legacy_display(&date, names.as_ref()),
            moons: self.shared.celestial.moons(&date),
            seasons: self.shared.celestial.seasons(&date),
        };
        self.emit(LegacyEvent::DateTimeChanged(payload))
    }

    pub fn start_clock(&self) -> bool {
        self.set_clock(true)
    }

    pub fn stop_clock(&self) -> bool {
        self.set_clock(false)
    }

    fn set_clock(&self, running: bool) -> bool {
        {
            let mut st = self.shared.state.lock();
            if !st.lifecycle.can_emit() {
                return false;
            }
            st.clock_running = running;
        }
        self.shared
            .notifier
            .emit(&LegacyEvent::ClockStartStop { started: running });
        true
    }

    /// Tear down: cancel the pending `ready`, drop authority subscriptions
    /// and silence all further emissions. Idempotent.
    pub fn destroy(&self) {
        let (timer, subscriptions) = {
            let mut st = self.shared.state.lock();
            if st.lifecycle.is_terminal() {
                return;
            }
            st.lifecycle = LifecycleState::Destroyed;
            (st.ready_timer.take(), std::mem::take(&mut st.subscriptions))
        };

        if let Some(id) = timer {
            self.shared.scheduler.cancel(id);
        }
        if let Some(authority) = self.shared.authority.as_ref() {
            for id in subscriptions {
                authority.unsubscribe(id);
            }
        }
        debug!("bridge destroyed");
    }

    fn emit(&self, event: LegacyEvent) -> bool {
        if !self.state().can_emit() {
            debug!(event = event.name(), "emission after destroy dropped");
            return false;
        }
        self.shared.notifier.emit(&event);
        true
    }
}
