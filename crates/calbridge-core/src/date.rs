//! Date shapes
//!
//! Two shapes describe the same instant:
//! - `LegacyDate`: caller-facing, 0-based month and day, flat time fields,
//!   seconds field named `seconds`
//! - `AuthorityDate`: 1-based month and day, nested time, seconds field
//!   named `second`
//!
//! Weekday is 0-based on both sides.

use serde::{Deserialize, Serialize};

/// Time of day as the authority reports it
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeOfDay {
    pub hour: i32,
    pub minute: i32,
    pub second: i32,
}

impl TimeOfDay {
    pub fn new(hour: i32, minute: i32, second: i32) -> Self {
        TimeOfDay {
            hour,
            minute,
            second,
        }
    }

    pub const MIDNIGHT: TimeOfDay = TimeOfDay {
        hour: 0,
        minute: 0,
        second: 0,
    };
}

/// Structured date in the authority's conventions
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AuthorityDate {
    pub year: i32,
    /// 1..=12
    pub month: i32,
    /// 1..=month length
    pub day: i32,
    /// 0..=6
    #[serde(default)]
    pub weekday: i32,
    #[serde(default)]
    pub time: TimeOfDay,
}

impl AuthorityDate {
    pub fn new(year: i32, month: i32, day: i32) -> Self {
        AuthorityDate {
            year,
            month,
            day,
            weekday: 0,
            time: TimeOfDay::MIDNIGHT,
        }
    }

    pub fn with_weekday(mut self, weekday: i32) -> Self {
        self.weekday = weekday;
        self
    }

    pub fn with_time(mut self, hour: i32, minute: i32, second: i32) -> Self {
        self.time = TimeOfDay::new(hour, minute, second);
        self
    }
}

/// Pre-formatted strings for display widgets
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateDisplay {
    /// `YYYY-MM-DD`, 1-based
    pub date: String,
    /// `HH:MM:SS`
    pub time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub month_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weekday_name: Option<String>,
}

/// Month and weekday names the authority may expose
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarNames {
    pub months: Vec<String>,
    pub weekdays: Vec<String>,
}

impl CalendarNames {
    /// Name for a 1-based month
    pub fn month(&self, month: i32) -> Option<&str> {
        let idx = usize::try_from(month.checked_sub(1)?).ok()?;
        self.months.get(idx).map(String::as_str)
    }

    /// Name for a 0-based weekday
    pub fn weekday(&self, weekday: i32) -> Option<&str> {
        let idx = usize::try_from(weekday).ok()?;
        self.weekdays.get(idx).map(String::as_str)
    }
}

/// Caller-facing date in legacy conventions
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyDate {
    pub year: i32,
    /// 0..=11
    pub month: i32,
    /// 0..=month length - 1
    pub day: i32,
    pub hour: i32,
    pub minute: i32,
    pub seconds: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weekday: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<DateDisplay>,
}

/// Lenient legacy date input
///
/// Callers hand over partially filled objects, use either spelling of the
/// seconds field and sometimes the `dayOfTheWeek` alias instead of
/// `weekday`. Every field is optional.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyDateFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub month: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hour: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minute: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub second: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seconds: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weekday: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_of_the_week: Option<i32>,
}

impl LegacyDateFields {
    /// Seconds from either spelling, `second` first
    pub fn any_second(&self) -> Option<i32> {
        self.second.or(self.seconds)
    }

    /// Weekday, preferring the `dayOfTheWeek` alias
    pub fn any_weekday(&self) -> Option<i32> {
        self.day_of_the_week.or(self.weekday)
    }
}

impl From<&LegacyDate> for LegacyDateFields {
    fn from(date: &LegacyDate) -> Self {
        LegacyDateFields {
            year: Some(date.year),
            month: Some(date.month),
            day: Some(date.day),
            hour: Some(date.hour),
            minute: Some(date.minute),
            second: None,
            seconds: Some(date.seconds),
            weekday: date.weekday,
            day_of_the_week: None,
        }
    }
}

impl From<LegacyDate> for LegacyDateFields {
    fn from(date: LegacyDate) -> Self {
        LegacyDateFields::from(&date)
    }
}
