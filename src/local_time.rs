//! Fixed-offset local display time.
//!
//! Stations report in UTC; forms display UTC+6. This is a plain arithmetic
//! shift, not a timezone rule: there is no DST handling and no tz database.
//! Changing it to a real zone would alter historical and future dates.

use crate::error::SlotError;
use chrono::{DateTime, Duration, NaiveDateTime, Utc};

pub const LOCAL_OFFSET_HOURS: i64 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalProjector {
    offset: Duration,
}

impl Default for LocalProjector {
    fn default() -> Self {
        Self::with_offset_hours(LOCAL_OFFSET_HOURS)
    }
}

impl LocalProjector {
    pub fn with_offset_hours(hours: i64) -> Self {
        Self {
            offset: Duration::hours(hours),
        }
    }

    pub fn to_local(&self, instant: &DateTime<Utc>) -> Result<NaiveDateTime, SlotError> {
        instant
            .naive_utc()
            .checked_add_signed(self.offset)
            .ok_or_else(|| SlotError::InvalidTimestamp(format!("{instant} out of range")))
    }
}

/// Project with the default UTC+6 offset.
pub fn to_local(instant: &DateTime<Utc>) -> Result<NaiveDateTime, SlotError> {
    LocalProjector::default().to_local(instant)
}

/// Parse an RFC 3339 timestamp into UTC.
pub fn parse_utc(text: &str) -> Result<DateTime<Utc>, SlotError> {
    DateTime::parse_from_rfc3339(text.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|err| SlotError::InvalidTimestamp(format!("{text:?}: {err}")))
}
