//! Interval Engine - applies sparse symbolic deltas to timestamps
//!
//! Day, hour, minute and second deltas are flat second counts. Year and
//! month deltas depend on variable month lengths, so they go through the
//! authority: timestamp → structured date, shift and normalize the month,
//! structured date → timestamp. Flat parts are added on top afterwards.

use calbridge_core::{AuthorityError, AuthorityHandle, Interval, Timestamp, SECONDS_PER_DAY};
use tracing::{debug, warn};

use crate::convert::clamp_i32;
use crate::ApproximationConfig;

const MONTHS_PER_YEAR: i64 = 12;

/// Normalize a 1-based month into `[1, 12]`, carrying whole years.
///
/// Returns `None` if the carried year overflows.
pub fn normalize_month(year: i64, month: i64) -> Option<(i64, i64)> {
    let zero_based = month.checked_sub(1)?;
    let year = year.checked_add(zero_based.div_euclid(MONTHS_PER_YEAR))?;
    Some((year, zero_based.rem_euclid(MONTHS_PER_YEAR) + 1))
}

/// Interval Engine
#[derive(Clone, Default)]
pub struct IntervalEngine {
    authority: Option<AuthorityHandle>,
    approx: ApproximationConfig,
}

impl IntervalEngine {
    /// Engine backed by an authority
    pub fn new(authority: AuthorityHandle) -> Self {
        IntervalEngine {
            authority: Some(authority),
            approx: ApproximationConfig::default(),
        }
    }

    /// Engine for degraded mode, approximating years and months
    pub fn detached() -> Self {
        Self::default()
    }

    pub fn with_authority(authority: Option<AuthorityHandle>, approx: ApproximationConfig) -> Self {
        IntervalEngine { authority, approx }
    }

    pub fn has_authority(&self) -> bool {
        self.authority.is_some()
    }

    /// Apply `interval` to `ts`.
    ///
    /// Never fails: authority errors on the year/month path are logged and
    /// the input timestamp is returned unchanged.
    pub fn apply(&self, ts: Timestamp, interval: Option<&Interval>) -> Timestamp {
        let Some(iv) = interval else {
            return ts;
        };
        if iv.is_empty() {
            return ts;
        }

        if !iv.has_calendar_component() {
            return ts + iv.flat_seconds();
        }

        let Some(authority) = self.authority.as_ref() else {
            return self.approximate(ts, iv);
        };

        match self.apply_calendar(authority, ts, iv) {
            Ok(result) => result,
            Err(e) => {
                warn!(
                    authority = authority.name(),
                    error = %e,
                    ts = ts.as_secs(),
                    "interval arithmetic failed, keeping timestamp"
                );
                ts
            }
        }
    }

    fn apply_calendar(
        &self,
        authority: &AuthorityHandle,
        ts: Timestamp,
        iv: &Interval,
    ) -> Result<Timestamp, AuthorityError> {
        let mut date = authority.to_structured(ts)?;

        let (year, month) = normalize_month(
            i64::from(date.year).saturating_add(iv.year.unwrap_or(0)),
            i64::from(date.month).saturating_add(iv.month.unwrap_or(0)),
        )
        .ok_or_else(|| AuthorityError::InvalidDate("year out of range".into()))?;
        date.year = i32::try_from(year)
            .map_err(|_| AuthorityError::InvalidDate(format!("year {year} out of range")))?;
        date.month = clamp_i32(month);

        let base = authority.to_timestamp(&date)?;
        debug!(
            from = ts.as_secs(),
            to = base.as_secs(),
            year = date.year,
            month = date.month,
            "applied calendar interval"
        );
        Ok(base + iv.flat_seconds())
    }

    /// Flat approximation used without an authority
    fn approximate(&self, ts: Timestamp, iv: &Interval) -> Timestamp {
        let days = iv
            .year
            .unwrap_or(0)
            .saturating_mul(self.approx.year_days())
            .saturating_add(iv.month.unwrap_or(0).saturating_mul(self.approx.month_days()));
        ts + days.saturating_mul(SECONDS_PER_DAY).saturating_add(iv.flat_seconds())
    }
}
