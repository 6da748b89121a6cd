//! Date parsing and report period normalization.
//!
//! Dates arrive as strings. A bare `YYYY-MM-DD` means UTC midnight; RFC 3339 timestamps
//! and `datetime-local` style values (`YYYY-MM-DDTHH:MM[:SS]`, read as UTC) are also accepted.

use crate::errors::{Error, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Utc};

const LOCAL_DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// Parses a date or timestamp into a UTC instant.
///
/// # Errors
/// Returns `Validation` for an empty or unrecognized value.
pub fn parse_instant(raw: &str) -> Result<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(Error::validation("date is required"));
    }

    if let Ok(instant) = DateTime::parse_from_rfc3339(raw) {
        return Ok(instant.with_timezone(&Utc));
    }

    for format in LOCAL_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(|date| date.and_time(NaiveTime::MIN).and_utc())
        .map_err(|_| Error::validation(format!("invalid date format: {raw:?}")))
}

/// Last representable millisecond of the instant's UTC calendar day (23:59:59.999).
#[must_use]
pub fn end_of_day(instant: DateTime<Utc>) -> DateTime<Utc> {
    let midnight = instant.date_naive().and_time(NaiveTime::MIN).and_utc();
    midnight + TimeDelta::days(1) - TimeDelta::milliseconds(1)
}

/// An inclusive reporting range with `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportPeriod {
    /// First instant included
    pub start: DateTime<Utc>,
    /// Last instant included, always 23:59:59.999 of its day
    pub end: DateTime<Utc>,
}

impl ReportPeriod {
    /// Validates raw period bounds.
    ///
    /// Both bounds are required. The end is moved to the end of its day before the
    /// ordering check, so `start == end` covers one whole day.
    ///
    /// # Errors
    /// Returns `Validation` for a missing or unparsable bound, or a start after the end.
    pub fn parse(period_start: Option<&str>, period_end: Option<&str>) -> Result<Self> {
        let (Some(start), Some(end)) = (
            period_start.filter(|s| !s.trim().is_empty()),
            period_end.filter(|s| !s.trim().is_empty()),
        ) else {
            return Err(Error::validation(
                "period_start and period_end are both required",
            ));
        };

        let start = parse_instant(start)?;
        let end = end_of_day(parse_instant(end)?);

        if start > end {
            return Err(Error::validation(
                "period_start cannot be later than period_end",
            ));
        }

        Ok(Self { start, end })
    }

    /// Whether the instant falls inside the period, bounds included.
    #[must_use]
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant <= self.end
    }
}
