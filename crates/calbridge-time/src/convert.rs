//! Format conversion between legacy and authority date shapes
//!
//! The mapping is purely numeric: month and day shift by one, the seconds
//! field is renamed and time is flattened or nested. Nothing here can fail;
//! missing fields default to zero.

use calbridge_core::{
    AuthorityDate, CalendarNames, DateDisplay, LegacyDate, LegacyDateFields, TimeOfDay, Timestamp,
    SECONDS_PER_HOUR, SECONDS_PER_MINUTE,
};

use crate::ApproximationConfig;

const MONTHS_PER_YEAR: i64 = 12;

/// Stateless converter between the two date shapes
#[derive(Clone, Debug, Default)]
pub struct FormatConverter {
    approx: ApproximationConfig,
}

impl FormatConverter {
    pub fn new() -> Self {
        Self::with_config(ApproximationConfig::default())
    }

    pub fn with_config(approx: ApproximationConfig) -> Self {
        FormatConverter { approx }
    }

    pub fn config(&self) -> &ApproximationConfig {
        &self.approx
    }

    /// Authority date → legacy date (1-based month/day become 0-based)
    pub fn authority_to_legacy(date: &AuthorityDate) -> LegacyDate {
        LegacyDate {
            year: date.year,
            month: date.month.saturating_sub(1),
            day: date.day.saturating_sub(1),
            hour: date.time.hour,
            minute: date.time.minute,
            seconds: date.time.second,
            weekday: Some(date.weekday),
            display: None,
        }
    }

    /// Legacy fields → authority date (0-based month/day become 1-based)
    pub fn legacy_to_authority(fields: &LegacyDateFields) -> AuthorityDate {
        AuthorityDate {
            year: fields.year.unwrap_or(0),
            month: fields.month.unwrap_or(0).saturating_add(1),
            day: fields.day.unwrap_or(0).saturating_add(1),
            weekday: fields.any_weekday().unwrap_or(0),
            time: TimeOfDay {
                hour: fields.hour.unwrap_or(0),
                minute: fields.minute.unwrap_or(0),
                second: fields.any_second().unwrap_or(0),
            },
        }
    }

    /// Display strings for an authority date
    pub fn describe(date: &AuthorityDate, names: Option<&CalendarNames>) -> DateDisplay {
        DateDisplay {
            date: format!("{:04}-{:02}-{:02}", date.year, date.month, date.day),
            time: format!(
                "{:02}:{:02}:{:02}",
                date.time.hour, date.time.minute, date.time.second
            ),
            month_name: names.and_then(|n| n.month(date.month)).map(str::to_string),
            weekday_name: names
                .and_then(|n| n.weekday(date.weekday))
                .map(str::to_string),
        }
    }

    /// Authority date → legacy date with the display block filled in
    pub fn authority_to_legacy_display(
        date: &AuthorityDate,
        names: Option<&CalendarNames>,
    ) -> LegacyDate {
        let mut legacy = Self::authority_to_legacy(date);
        legacy.display = Some(Self::describe(date, names));
        legacy
    }

    /// Degraded date for when no authority is available.
    ///
    /// Flat day counter from the anchor year: fixed-length years and months,
    /// with the year's leftover days folded into the last month. No weekday
    /// is reported. Not calendar-accurate; only deterministic.
    pub fn fallback_date(&self, ts: Timestamp) -> LegacyDate {
        let days = ts.day_index();
        let second_of_day = ts.second_of_day();

        let year_days = self.approx.year_days();
        let month_days = self.approx.month_days();

        let year_offset = days.div_euclid(year_days);
        let day_of_year = days.rem_euclid(year_days);
        let month = (day_of_year / month_days).min(MONTHS_PER_YEAR - 1);
        let day = day_of_year - month * month_days;

        LegacyDate {
            year: clamp_i32(i64::from(self.approx.anchor_year) + year_offset),
            month: clamp_i32(month),
            day: clamp_i32(day),
            hour: clamp_i32(second_of_day / SECONDS_PER_HOUR),
            minute: clamp_i32((second_of_day % SECONDS_PER_HOUR) / SECONDS_PER_MINUTE),
            seconds: clamp_i32(second_of_day % SECONDS_PER_MINUTE),
            weekday: None,
            display: None,
        }
    }
}

#[inline]
pub(crate) fn clamp_i32(v: i64) -> i32 {
    v.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}
