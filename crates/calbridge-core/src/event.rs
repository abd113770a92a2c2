//! Notification vocabularies
//!
//! `AuthorityEvent` is what the authority announces. `LegacyEvent` is what
//! legacy callers listen for; its string identifiers are part of the
//! compatibility contract and must not change.

use serde::{Deserialize, Serialize};

use crate::LegacyDate;

pub const EVENT_INIT: &str = "init";
pub const EVENT_DATE_TIME_CHANGED: &str = "date-time-changed";
pub const EVENT_CLOCK_START_STOP: &str = "clock-start-stop";
pub const EVENT_PRIMARY_ELECTED: &str = "primary-elected";
pub const EVENT_READY: &str = "ready";

/// Authority-side change notification
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AuthorityEvent {
    /// Current date/time moved
    DateChanged,
    /// Active calendar definition replaced
    CalendarChanged,
    /// A setting that affects time presentation changed
    SettingChanged,
}

impl AuthorityEvent {
    pub const ALL: [AuthorityEvent; 3] = [
        AuthorityEvent::DateChanged,
        AuthorityEvent::CalendarChanged,
        AuthorityEvent::SettingChanged,
    ];
}

/// Moon state supplied by the celestial collaborator
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Moon {
    pub name: String,
    pub phase: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// Season supplied by the celestial collaborator
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Season {
    pub name: String,
    /// 0-based, legacy convention
    pub starting_month: i32,
    /// 0-based, legacy convention
    pub starting_day: i32,
}

/// Payload of `date-time-changed`
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateTimeChanged {
    pub date: LegacyDate,
    pub moons: Vec<Moon>,
    pub seasons: Vec<Season>,
}

/// Legacy notification
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LegacyEvent {
    Init,
    DateTimeChanged(DateTimeChanged),
    ClockStartStop { started: bool },
    PrimaryElected { is_primary: bool },
    Ready,
}

#[derive(Serialize)]
struct ClockPayload {
    started: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PrimaryPayload {
    is_primary: bool,
}

impl LegacyEvent {
    /// Wire identifier of this notification
    pub fn name(&self) -> &'static str {
        match self {
            LegacyEvent::Init => EVENT_INIT,
            LegacyEvent::DateTimeChanged(_) => EVENT_DATE_TIME_CHANGED,
            LegacyEvent::ClockStartStop { .. } => EVENT_CLOCK_START_STOP,
            LegacyEvent::PrimaryElected { .. } => EVENT_PRIMARY_ELECTED,
            LegacyEvent::Ready => EVENT_READY,
        }
    }

    /// JSON payload in legacy field naming, `None` for payload-less events
    pub fn payload(&self) -> Result<Option<serde_json::Value>, serde_json::Error> {
        let value = match self {
            LegacyEvent::Init | LegacyEvent::Ready => return Ok(None),
            LegacyEvent::DateTimeChanged(p) => serde_json::to_value(p)?,
            LegacyEvent::ClockStartStop { started } => {
                serde_json::to_value(ClockPayload { started: *started })?
            }
            LegacyEvent::PrimaryElected { is_primary } => serde_json::to_value(PrimaryPayload {
                is_primary: *is_primary,
            })?,
        };
        Ok(Some(value))
    }
}
