//! Degraded-mode constants

/// Constants used when no authority is available
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApproximationConfig {
    /// Year that timestamp 0 falls in
    pub anchor_year: i32,
    /// Flat year length
    pub days_per_year: i64,
    /// Flat month length; the year's remainder folds into the last month
    pub days_per_month: i64,
}

impl Default for ApproximationConfig {
    fn default() -> Self {
        ApproximationConfig {
            anchor_year: 2024,
            days_per_year: 365,
            days_per_month: 30,
        }
    }
}

impl ApproximationConfig {
    /// Twelve equal 30-day months, no remainder
    pub fn uniform_360() -> Self {
        ApproximationConfig {
            days_per_year: 360,
            ..Self::default()
        }
    }

    pub fn with_anchor_year(mut self, year: i32) -> Self {
        self.anchor_year = year;
        self
    }

    #[inline]
    pub(crate) fn year_days(&self) -> i64 {
        self.days_per_year.max(1)
    }

    #[inline]
    pub(crate) fn month_days(&self) -> i64 {
        self.days_per_month.max(1)
    }
}
