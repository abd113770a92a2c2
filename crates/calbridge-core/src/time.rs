//! Time primitives for calbridge
//!
//! Both calendar subsystems agree on one epoch and count whole seconds
//! from it. Intervals are sparse symbolic deltas: a missing field means
//! "no change", which is distinct from an explicit zero only for the
//! purpose of serialization.

use std::fmt;
use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};

pub const SECONDS_PER_MINUTE: i64 = 60;
pub const SECONDS_PER_HOUR: i64 = 3_600;
pub const SECONDS_PER_DAY: i64 = 86_400;

/// Timestamp - whole seconds since the shared epoch
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(pub i64);

impl Timestamp {
    pub const ZERO: Timestamp = Timestamp(0);

    #[inline]
    pub fn from_secs(secs: i64) -> Self {
        Timestamp(secs)
    }

    #[inline]
    pub fn as_secs(self) -> i64 {
        self.0
    }

    #[inline]
    pub fn saturating_add_secs(self, secs: i64) -> Self {
        Timestamp(self.0.saturating_add(secs))
    }

    /// Signed distance in seconds from `earlier` to `self`
    #[inline]
    pub fn secs_since(self, earlier: Timestamp) -> i64 {
        self.0.saturating_sub(earlier.0)
    }

    /// Whole days since the epoch (floored, so negative timestamps land on
    /// the previous day)
    #[inline]
    pub fn day_index(self) -> i64 {
        self.0.div_euclid(SECONDS_PER_DAY)
    }

    /// Seconds into the current day, always in `[0, 86400)`
    #[inline]
    pub fn second_of_day(self) -> i64 {
        self.0.rem_euclid(SECONDS_PER_DAY)
    }
}

impl Add<i64> for Timestamp {
    type Output = Timestamp;

    #[inline]
    fn add(self, rhs: i64) -> Self::Output {
        self.saturating_add_secs(rhs)
    }
}

impl Sub<Timestamp> for Timestamp {
    type Output = i64;

    #[inline]
    fn sub(self, rhs: Timestamp) -> Self::Output {
        self.secs_since(rhs)
    }
}

impl fmt::Debug for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ts({}s)", self.0)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for Timestamp {
    fn from(secs: i64) -> Self {
        Timestamp(secs)
    }
}

/// Sparse symbolic time delta
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interval {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub month: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hour: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minute: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub second: Option<i64>,
}

impl Interval {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn years(mut self, n: i64) -> Self {
        self.year = Some(n);
        self
    }

    pub fn months(mut self, n: i64) -> Self {
        self.month = Some(n);
        self
    }

    pub fn days(mut self, n: i64) -> Self {
        self.day = Some(n);
        self
    }

    pub fn hours(mut self, n: i64) -> Self {
        self.hour = Some(n);
        self
    }

    pub fn minutes(mut self, n: i64) -> Self {
        self.minute = Some(n);
        self
    }

    pub fn seconds(mut self, n: i64) -> Self {
        self.second = Some(n);
        self
    }

    /// True when no field carries a non-zero delta
    pub fn is_empty(&self) -> bool {
        [
            self.year,
            self.month,
            self.day,
            self.hour,
            self.minute,
            self.second,
        ]
        .iter()
        .all(|f| f.unwrap_or(0) == 0)
    }

    /// True when the delta needs calendar-aware arithmetic
    #[inline]
    pub fn has_calendar_component(&self) -> bool {
        self.year.unwrap_or(0) != 0 || self.month.unwrap_or(0) != 0
    }

    /// Day/hour/minute/second part collapsed into seconds
    pub fn flat_seconds(&self) -> i64 {
        self.day
            .unwrap_or(0)
            .saturating_mul(SECONDS_PER_DAY)
            .saturating_add(self.hour.unwrap_or(0).saturating_mul(SECONDS_PER_HOUR))
            .saturating_add(self.minute.unwrap_or(0).saturating_mul(SECONDS_PER_MINUTE))
            .saturating_add(self.second.unwrap_or(0))
    }
}

/// Unit accepted by relative advance operations
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    Year,
    Month,
    Week,
    Day,
    Hour,
    Minute,
    Second,
}

impl TimeUnit {
    pub fn as_str(self) -> &'static str {
        match self {
            TimeUnit::Year => "year",
            TimeUnit::Month => "month",
            TimeUnit::Week => "week",
            TimeUnit::Day => "day",
            TimeUnit::Hour => "hour",
            TimeUnit::Minute => "minute",
            TimeUnit::Second => "second",
        }
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
