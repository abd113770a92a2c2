//! Legacy calendar API facade
//!
//! One `CalendarApi` is built at host bootstrap and handed to consumers by
//! reference. Read methods always answer: when the authority is missing or
//! fails they fall back to the degraded converter. Privileged write methods
//! report every failure to the caller.

use std::sync::Arc;

use calbridge_core::{
    AuthorityDate, AuthorityHandle, BridgeError, BridgeResult, HostClock, Interval, LegacyDate,
    LegacyDateFields, LifecycleState, ListenerId, TimeUnit, Timestamp,
};
use calbridge_time::{FormatConverter, IntervalEngine};
use tracing::{debug, info, warn};

use crate::{
    detect_authority, BridgeConfig, EventBridge, HostContext, HostEnvironment, LegacyListener,
    DEFAULT_STRATEGIES,
};

const HOST_CLOCK_CAPABILITY: &str = "host-clock";

/// Legacy calendar API
pub struct CalendarApi {
    ctx: HostContext,
    converter: FormatConverter,
    intervals: IntervalEngine,
    bridge: EventBridge,
    config: BridgeConfig,
}

impl CalendarApi {
    /// Build the facade over an explicit context. The bridge is not started.
    pub fn new(ctx: HostContext, config: BridgeConfig) -> Self {
        let bridge = EventBridge::new(&ctx, &config);
        CalendarApi {
            converter: FormatConverter::with_config(config.approximation.clone()),
            intervals: IntervalEngine::with_authority(
                ctx.authority.clone(),
                config.approximation.clone(),
            ),
            bridge,
            ctx,
            config,
        }
    }

    /// Host bootstrap: detect the authority, register the capability
    /// descriptor and start the bridge.
    ///
    /// An authority already present in `ctx` takes precedence over
    /// detection.
    pub fn bootstrap(
        env: &HostEnvironment,
        mut ctx: HostContext,
        config: BridgeConfig,
    ) -> BridgeResult<Self> {
        if ctx.authority.is_none() {
            ctx.authority = detect_authority(env, &DEFAULT_STRATEGIES);
        }

        if let Some(registry) = ctx.registry.as_ref() {
            registry.register(config.capability.clone())?;
            info!(
                id = %config.capability.id,
                api_version = %config.capability.api_version,
                "legacy capability registered"
            );
        }

        let api = CalendarApi::new(ctx, config);
        api.bridge.initialize()?;
        Ok(api)
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn authority(&self) -> Option<&AuthorityHandle> {
        self.ctx.authority.as_ref()
    }

    pub fn has_authority(&self) -> bool {
        self.ctx.authority.is_some()
    }

    pub fn bridge(&self) -> &EventBridge {
        &self.bridge
    }

    pub fn state(&self) -> LifecycleState {
        self.bridge.state()
    }

    pub fn is_ready(&self) -> bool {
        self.bridge.is_ready()
    }

    /// Whether the local participant is the elected primary
    pub fn is_primary(&self) -> bool {
        self.bridge.is_local_primary()
    }

    /// Register a legacy listener
    pub fn on(&self, listener: LegacyListener) -> ListenerId {
        self.bridge.subscribe(listener)
    }

    pub fn off(&self, id: ListenerId) -> bool {
        self.bridge.unsubscribe(id)
    }

    // ---- read path ----

    /// Host world time; zero when the host has none
    pub fn timestamp(&self) -> Timestamp {
        self.ctx
            .clock
            .as_ref()
            .and_then(|clock| clock.world_time())
            .unwrap_or(Timestamp::ZERO)
    }

    pub fn timestamp_to_date(&self, ts: Timestamp) -> LegacyDate {
        let Some(authority) = self.ctx.authority.as_ref() else {
            debug!(ts = ts.as_secs(), "no authority, using fallback date");
            return self.converter.fallback_date(ts);
        };

        match authority.to_structured(ts) {
            Ok(date) => legacy_with_display(authority, &date),
            Err(e) => {
                warn!(
                    authority = authority.name(),
                    error = %BridgeError::from(e),
                    ts = ts.as_secs(),
                    "timestamp conversion failed, using fallback date"
                );
                self.converter.fallback_date(ts)
            }
        }
    }

    /// Legacy date fields to a timestamp; zero on failure or without
    /// authority
    pub fn date_to_timestamp(&self, fields: &LegacyDateFields) -> Timestamp {
        let Some(authority) = self.ctx.authority.as_ref() else {
            debug!("no authority, date_to_timestamp returns zero");
            return Timestamp::ZERO;
        };

        let date = FormatConverter::legacy_to_authority(fields);
        authority.to_timestamp(&date).unwrap_or_else(|e| {
            warn!(
                authority = authority.name(),
                error = %BridgeError::from(e),
                "date conversion failed, returning zero"
            );
            Timestamp::ZERO
        })
    }

    pub fn timestamp_plus_interval(&self, ts: Timestamp, interval: Option<&Interval>) -> Timestamp {
        self.intervals.apply(ts, interval)
    }

    pub fn current_date(&self) -> LegacyDate {
        let Some(authority) = self.ctx.authority.as_ref() else {
            return self.converter.fallback_date(self.timestamp());
        };

        match authority.current_date() {
            Ok(date) => legacy_with_display(authority, &date),
            Err(e) => {
                warn!(
                    authority = authority.name(),
                    error = %e,
                    "current date unavailable, using fallback date"
                );
                self.converter.fallback_date(self.timestamp())
            }
        }
    }

    // ---- clock ----

    pub fn start_clock(&self) -> bool {
        self.bridge.start_clock()
    }

    pub fn stop_clock(&self) -> bool {
        self.bridge.stop_clock()
    }

    pub fn is_clock_running(&self) -> bool {
        self.bridge.is_clock_running()
    }

    // ---- privileged write path ----

    fn require_privilege(&self, operation: &'static str) -> BridgeResult<()> {
        let elector = self.bridge.elector();
        if elector.is_local_privileged() {
            return Ok(());
        }
        warn!(
            operation,
            participant = %elector.local_id(),
            "privileged operation denied"
        );
        Err(BridgeError::PrivilegeDenied { operation })
    }

    /// Advance the authority's date by `amount` units
    pub async fn advance_by(&self, unit: TimeUnit, amount: i64) -> BridgeResult<()> {
        self.require_privilege("advance")?;

        let authority = self
            .ctx
            .authority
            .as_ref()
            .ok_or(BridgeError::AuthorityUnavailable)?;
        if !authority.supports_advance(unit) {
            return Err(BridgeError::missing_advance(unit));
        }

        debug!(%unit, amount, authority = authority.name(), "advancing authority");
        authority
            .advance_by(unit, amount)
            .await
            .map_err(BridgeError::from_mutation)
    }

    pub async fn advance_days(&self, days: i64) -> BridgeResult<()> {
        self.advance_by(TimeUnit::Day, days).await
    }

    pub async fn advance_hours(&self, hours: i64) -> BridgeResult<()> {
        self.advance_by(TimeUnit::Hour, hours).await
    }

    pub async fn advance_minutes(&self, minutes: i64) -> BridgeResult<()> {
        self.advance_by(TimeUnit::Minute, minutes).await
    }

    /// Move the host clock to `ts` by advancing it by the difference
    pub async fn set_time(&self, ts: Timestamp) -> BridgeResult<()> {
        self.require_privilege("set-time")?;

        let clock: &Arc<dyn HostClock> =
            self.ctx
                .clock
                .as_ref()
                .ok_or_else(|| BridgeError::CapabilityMissing {
                    capability: HOST_CLOCK_CAPABILITY.to_string(),
                })?;

        let delta = ts - self.timestamp();
        if delta == 0 {
            debug!(ts = ts.as_secs(), "set_time: already there");
            return Ok(());
        }

        debug!(ts = ts.as_secs(), delta, "advancing host clock");
        clock.advance(delta).await.map_err(BridgeError::from_mutation)
    }

    /// Tear the bridge down. In-flight mutations are not interrupted.
    pub fn destroy(&self) {
        self.bridge.destroy();
    }
}

fn legacy_with_display(authority: &AuthorityHandle, date: &AuthorityDate) -> LegacyDate {
    let names = authority.calendar_names();
    FormatConverter::authority_to_legacy_display(date, names.as_ref())
}
