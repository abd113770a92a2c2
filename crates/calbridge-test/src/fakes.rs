//! Fake host collaborators
//!
//! In-memory stand-ins for everything the bridge consumes:
//! - FakeAuthority: a fixed-month-length calendar with a settable "now"
//! - FakeHostClock: world time that can be unset or advanced
//! - FakeRoster: mutable session membership
//! - FakeRegistry: records capability descriptors
//! - FakeCelestial: constant moons and seasons

use std::collections::BTreeMap;
use std::sync::Arc;

use calbridge_core::{
    Authority, AuthorityDate, AuthorityError, AuthorityEvent, AuthorityHandler, BridgeError,
    BridgeResult, CalendarNames, CapabilityDescriptor, CapabilityRegistry, CelestialSource,
    HostClock, Moon, MutationFuture, Participant, ParticipantId, ParticipantRoster, Season,
    SubscriptionId, TimeOfDay, TimeUnit, Timestamp, SECONDS_PER_DAY, SECONDS_PER_HOUR,
    SECONDS_PER_MINUTE,
};
use parking_lot::Mutex;

/// Bound on recorded `to_timestamp` arguments
const MAX_RECORDED_CALLS: usize = 1_024;

// ============================================================================
// CALENDAR
// ============================================================================

/// Calendar with fixed month lengths and no leap years.
///
/// Timestamp zero is midnight on the first day of `epoch_year`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FakeCalendar {
    pub epoch_year: i32,
    pub month_lengths: Vec<i64>,
}

impl Default for FakeCalendar {
    fn default() -> Self {
        FakeCalendar {
            epoch_year: 2024,
            month_lengths: vec![31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31],
        }
    }
}

impl FakeCalendar {
    pub fn year_length(&self) -> i64 {
        self.month_lengths.iter().sum()
    }

    pub fn to_structured(&self, ts: Timestamp) -> AuthorityDate {
        let days = ts.day_index();
        let sod = ts.second_of_day();
        let year_len = self.year_length().max(1);

        let mut remaining = days.rem_euclid(year_len);
        let mut month = 1;
        for len in &self.month_lengths {
            if remaining < *len {
                break;
            }
            remaining -= len;
            month += 1;
        }

        AuthorityDate {
            year: self.epoch_year + days.div_euclid(year_len) as i32,
            month,
            day: remaining as i32 + 1,
            weekday: days.rem_euclid(7) as i32,
            time: TimeOfDay::new(
                (sod / SECONDS_PER_HOUR) as i32,
                ((sod % SECONDS_PER_HOUR) / SECONDS_PER_MINUTE) as i32,
                (sod % SECONDS_PER_MINUTE) as i32,
            ),
        }
    }

    /// Inverse of `to_structured`; rejects months and days the calendar
    /// does not have
    pub fn to_timestamp(&self, date: &AuthorityDate) -> Result<Timestamp, AuthorityError> {
        let month_idx = usize::try_from(date.month - 1)
            .ok()
            .filter(|m| *m < self.month_lengths.len())
            .ok_or_else(|| AuthorityError::InvalidDate(format!("month {}", date.month)))?;
        let month_len = self.month_lengths[month_idx];
        if date.day < 1 || i64::from(date.day) > month_len {
            return Err(AuthorityError::InvalidDate(format!(
                "day {} of month {}",
                date.day, date.month
            )));
        }

        let days = i64::from(date.year - self.epoch_year) * self.year_length()
            + self.month_lengths[..month_idx].iter().sum::<i64>()
            + i64::from(date.day - 1);
        let secs = i64::from(date.time.hour) * SECONDS_PER_HOUR
            + i64::from(date.time.minute) * SECONDS_PER_MINUTE
            + i64::from(date.time.second);
        Ok(Timestamp::from_secs(days * SECONDS_PER_DAY + secs))
    }
}

// ============================================================================
// AUTHORITY
// ============================================================================

/// In-memory calendar authority
pub struct FakeAuthority {
    name: String,
    calendar: FakeCalendar,
    now: Mutex<Timestamp>,
    names: Option<CalendarNames>,
    advance_units: Vec<TimeUnit>,
    failing: Mutex<bool>,
    handlers: Mutex<BTreeMap<u64, (AuthorityEvent, AuthorityHandler)>>,
    next_sub: Mutex<u64>,
    to_timestamp_calls: Mutex<Vec<AuthorityDate>>,
    advances: Mutex<Vec<(TimeUnit, i64)>>,
}

impl FakeAuthority {
    pub fn new(name: &str) -> Self {
        Self::with_calendar(name, FakeCalendar::default())
    }

    pub fn with_calendar(name: &str, calendar: FakeCalendar) -> Self {
        FakeAuthority {
            name: name.to_string(),
            calendar,
            now: Mutex::new(Timestamp::ZERO),
            names: None,
            advance_units: vec![TimeUnit::Day, TimeUnit::Hour, TimeUnit::Minute],
            failing: Mutex::new(false),
            handlers: Mutex::new(BTreeMap::new()),
            next_sub: Mutex::new(0),
            to_timestamp_calls: Mutex::new(Vec::new()),
            advances: Mutex::new(Vec::new()),
        }
    }

    pub fn with_names(mut self, names: CalendarNames) -> Self {
        self.names = Some(names);
        self
    }

    pub fn with_advance_units(mut self, units: &[TimeUnit]) -> Self {
        self.advance_units = units.to_vec();
        self
    }

    pub fn calendar(&self) -> &FakeCalendar {
        &self.calendar
    }

    pub fn now(&self) -> Timestamp {
        *self.now.lock()
    }

    /// Move "now" without notifying subscribers
    pub fn set_now(&self, ts: Timestamp) {
        *self.now.lock() = ts;
    }

    /// Move "now" to `date` without notifying subscribers
    pub fn set_date(&self, date: &AuthorityDate) -> Result<(), AuthorityError> {
        let ts = self.calendar.to_timestamp(date)?;
        self.set_now(ts);
        Ok(())
    }

    /// Make every call fail until reset
    pub fn set_failing(&self, failing: bool) {
        *self.failing.lock() = failing;
    }

    /// Deliver `event` to its subscribers, outside the handler lock
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

    /// Most recent dates passed to `to_timestamp`, in call order
    pub fn to_timestamp_calls(&self) -> Vec<AuthorityDate> {
        self.to_timestamp_calls.lock().clone()
    }

    pub fn advances(&self) -> Vec<(TimeUnit, i64)> {
        self.advances.lock().clone()
    }

    fn check(&self) -> Result<(), AuthorityError> {
        if *self.failing.lock() {
            return Err(AuthorityError::Failed(format!("{} is failing", self.name)));
        }
        Ok(())
    }
}

fn unit_seconds(unit: TimeUnit) -> Option<i64> {
    match unit {
        TimeUnit::Week => Some(7 * SECONDS_PER_DAY),
        TimeUnit::Day => Some(SECONDS_PER_DAY),
        TimeUnit::Hour => Some(SECONDS_PER_HOUR),
        TimeUnit::Minute => Some(SECONDS_PER_MINUTE),
        TimeUnit::Second => Some(1),
        TimeUnit::Year | TimeUnit::Month => None,
    }
}

impl Authority for FakeAuthority {
    fn name(&self) -> &str {
        &self.name
    }

    fn current_date(&self) -> Result<AuthorityDate, AuthorityError> {
        self.check()?;
        Ok(self.calendar.to_structured(self.now()))
    }

    fn to_structured(&self, ts: Timestamp) -> Result<AuthorityDate, AuthorityError> {
        self.check()?;
        Ok(self.calendar.to_structured(ts))
    }

    fn to_timestamp(&self, date: &AuthorityDate) -> Result<Timestamp, AuthorityError> {
        self.check()?;
        {
            let mut calls = self.to_timestamp_calls.lock();
            if calls.len() == MAX_RECORDED_CALLS {
                calls.remove(0);
            }
            calls.push(*date);
        }
        self.calendar.to_timestamp(date)
    }

    fn calendar_names(&self) -> Option<CalendarNames> {
        self.names.clone()
    }

    fn supports_advance(&self, unit: TimeUnit) -> bool {
        self.advance_units.contains(&unit)
    }

    fn advance_by(&self, unit: TimeUnit, amount: i64) -> MutationFuture<'_> {
        Box::pin(async move {
            self.check()?;
            let step = unit_seconds(unit)
                .filter(|_| self.supports_advance(unit))
                .ok_or_else(|| AuthorityError::Unsupported(format!("advance-{unit}")))?;

            {
                let mut now = self.now.lock();
                *now = now.saturating_add_secs(step.saturating_mul(amount));
            }
            self.advances.lock().push((unit, amount));
            self.fire(AuthorityEvent::DateChanged);
            Ok::<(), AuthorityError>(())
        })
    }

    fn subscribe(&self, event: AuthorityEvent, handler: AuthorityHandler) -> SubscriptionId {
        let mut next = self.next_sub.lock();
        *next += 1;
        self.handlers.lock().insert(*next, (event, handler));
        SubscriptionId::new(*next)
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        self.handlers.lock().remove(&id.0);
    }
}

// ============================================================================
// HOST CLOCK
// ============================================================================

/// Host world clock
#[derive(Default)]
pub struct FakeHostClock {
    now: Mutex<Option<Timestamp>>,
    advances: Mutex<Vec<i64>>,
    rejecting: Mutex<bool>,
}

impl FakeHostClock {
    pub fn at(ts: Timestamp) -> Self {
        FakeHostClock {
            now: Mutex::new(Some(ts)),
            ..Self::default()
        }
    }

    /// Clock the host has not started yet
    pub fn stopped() -> Self {
        Self::default()
    }

    pub fn set(&self, ts: Option<Timestamp>) {
        *self.now.lock() = ts;
    }

    pub fn set_rejecting(&self, rejecting: bool) {
        *self.rejecting.lock() = rejecting;
    }

    pub fn advances(&self) -> Vec<i64> {
        self.advances.lock().clone()
    }
}

impl HostClock for FakeHostClock {
    fn world_time(&self) -> Option<Timestamp> {
        *self.now.lock()
    }

    fn advance(&self, delta: i64) -> MutationFuture<'_> {
        Box::pin(async move {
            if *self.rejecting.lock() {
                return Err(AuthorityError::Failed("world time is locked".into()));
            }
            self.advances.lock().push(delta);
            let mut now = self.now.lock();
            *now = Some(now.unwrap_or_default().saturating_add_secs(delta));
            Ok(())
        })
    }
}

// ============================================================================
// ROSTER
// ============================================================================

/// Mutable session membership
pub struct FakeRoster {
    local: ParticipantId,
    participants: Mutex<Vec<Participant>>,
}

impl FakeRoster {
    pub fn new(local: &str, participants: Vec<Participant>) -> Self {
        FakeRoster {
            local: ParticipantId::from(local),
            participants: Mutex::new(participants),
        }
    }

    /// Single-participant session
    pub fn solo(local: &str, privileged: bool) -> Self {
        Self::new(local, vec![Participant::new(local, true, privileged)])
    }

    pub fn join(&self, participant: Participant) {
        let mut all = self.participants.lock();
        all.retain(|p| p.id != participant.id);
        all.push(participant);
    }

    pub fn leave(&self, id: &str) {
        self.participants.lock().retain(|p| p.id.as_str() != id);
    }

    pub fn set_active(&self, id: &str, active: bool) {
        for p in self.participants.lock().iter_mut() {
            if p.id.as_str() == id {
                p.active = active;
            }
        }
    }
}

impl ParticipantRoster for FakeRoster {
    fn local_id(&self) -> ParticipantId {
        self.local.clone()
    }

    fn participants(&self) -> Vec<Participant> {
        self.participants.lock().clone()
    }
}

// ============================================================================
// REGISTRY / CELESTIAL
// ============================================================================

/// Capability registry that records descriptors
#[derive(Default)]
pub struct FakeRegistry {
    registered: Mutex<Vec<CapabilityDescriptor>>,
    reject: Mutex<bool>,
}

impl FakeRegistry {
    pub fn rejecting() -> Self {
        FakeRegistry {
            reject: Mutex::new(true),
            ..Self::default()
        }
    }

    pub fn registered(&self) -> Vec<CapabilityDescriptor> {
        self.registered.lock().clone()
    }
}

impl CapabilityRegistry for FakeRegistry {
    fn register(&self, descriptor: CapabilityDescriptor) -> BridgeResult<()> {
        if *self.reject.lock() {
            return Err(BridgeError::Mutation(format!(
                "registry refused {}",
                descriptor.id
            )));
        }
        self.registered.lock().push(descriptor);
        Ok(())
    }
}

/// Constant moons and seasons
#[derive(Clone, Debug, Default)]
pub struct FakeCelestial {
    pub moons: Vec<Moon>,
    pub seasons: Vec<Season>,
}

impl FakeCelestial {
    /// One moon, four seasons
    pub fn standard() -> Self {
        FakeCelestial {
            moons: vec![Moon {
                name: "Luna".into(),
                phase: "waxing-crescent".into(),
                color: Some("#ffffff".into()),
            }],
            seasons: ["Spring", "Summer", "Autumn", "Winter"]
                .iter()
                .zip([2, 5, 8, 11])
                .map(|(name, month)| Season {
                    name: (*name).to_string(),
                    starting_month: month,
                    starting_day: 19,
                })
                .collect(),
        }
    }
}

impl CelestialSource for FakeCelestial {
    fn moons(&self, _date: &AuthorityDate) -> Vec<Moon> {
        self.moons.clone()
    }

    fn seasons(&self, _date: &AuthorityDate) -> Vec<Season> {
        self.seasons.clone()
    }
}
