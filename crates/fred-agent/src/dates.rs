//! Date range repair for model-supplied tool arguments

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Wire format used at every boundary
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Inclusive calendar range; `start <= end` once it leaves the resolver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days()
    }

    /// Same end, start moved `days` earlier
    pub fn widened(&self, days: u64) -> Self {
        Self {
            start: days_before(self.start, days),
            end: self.end,
        }
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} to {}",
            self.start.format(DATE_FORMAT),
            self.end.format(DATE_FORMAT)
        )
    }
}

/// Parse a `YYYY-MM-DD` string, tolerating surrounding whitespace
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).ok()
}

pub(crate) fn days_before(date: NaiveDate, days: u64) -> NaiveDate {
    date.checked_sub_days(Days::new(days))
        .unwrap_or(NaiveDate::MIN)
}

/// Turns whatever dates the model produced into a usable range
///
/// ```
/// use chrono::NaiveDate;
/// use fred_agent::DateRangeResolver;
///
/// let today = NaiveDate::from_ymd_opt(2025, 6, 30).unwrap();
/// let range = DateRangeResolver::default().resolve("2025-06-30", "2025-06-30", today);
/// assert_eq!(range.start, NaiveDate::from_ymd_opt(2024, 6, 30).unwrap());
/// assert_eq!(range.end, today);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRangeResolver {
    window_days: u64,
}

impl Default for DateRangeResolver {
    fn default() -> Self {
        Self { window_days: 365 }
    }
}

impl DateRangeResolver {
    pub fn new(window_days: u64) -> Self {
        Self { window_days }
    }

    pub fn window_days(&self) -> u64 {
        self.window_days
    }

    /// `[today - window, today]`
    pub fn default_window(&self, today: NaiveDate) -> DateRange {
        DateRange::new(days_before(today, self.window_days), today)
    }

    pub fn resolve(&self, start: &str, end: &str, today: NaiveDate) -> DateRange {
        let (Some(start), Some(end)) = (parse_date(start), parse_date(end)) else {
            debug!(start, end, "Unparsable dates, using default window");
            return self.default_window(today);
        };
        self.resolve_dates(start, end, today)
    }

    pub fn resolve_dates(&self, start: NaiveDate, end: NaiveDate, today: NaiveDate) -> DateRange {
        if start == end {
            debug!(%start, "Same-day range, using default window");
            self.default_window(today)
        } else if start > end {
            debug!(%start, %end, "Start after end, moving start back");
            DateRange::new(days_before(end, self.window_days), end)
        } else {
            DateRange::new(start, end)
        }
    }
}
