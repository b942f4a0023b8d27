//! Observation hour codes.
//!
//! An hour code is the two-digit UTC hour an observer picks (`"00".."23"`).
//! Encoding anchors it to a reference UTC calendar date; decoding only
//! recovers the hour, never the date.

use crate::error::SlotError;
use chrono::{DateTime, Duration, DurationRound, NaiveDate, NaiveTime, TimeZone, Timelike, Utc};

/// Resolve `hour_code` into an absolute UTC instant on `reference_date`.
pub fn encode(hour_code: &str, reference_date: NaiveDate) -> Result<DateTime<Utc>, SlotError> {
    let hour = parse_hour(hour_code)?;
    let time = NaiveTime::from_hms_opt(hour, 0, 0)
        .ok_or_else(|| SlotError::InvalidHourCode(hour_code.to_string()))?;
    Ok(Utc.from_utc_datetime(&reference_date.and_time(time)))
}

/// Like [`encode`], anchored to the current UTC date. The result is only
/// meaningful for "today".
pub fn encode_today(hour_code: &str) -> Result<DateTime<Utc>, SlotError> {
    encode(hour_code, Utc::now().date_naive())
}

/// Two-digit, zero-padded UTC hour of `instant`.
pub fn decode(instant: &DateTime<Utc>) -> String {
    format!("{:02}", instant.hour())
}

pub fn truncate_to_hour(instant: DateTime<Utc>) -> DateTime<Utc> {
    instant.duration_trunc(Duration::hours(1)).unwrap_or(instant)
}

/// Midnight UTC at the start of `date`.
pub fn day_start(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(NaiveTime::default()))
}

/// All 24 hour codes of a day, in order.
pub fn hour_codes() -> impl Iterator<Item = String> {
    (0..24u32).map(|h| format!("{h:02}"))
}

fn parse_hour(hour_code: &str) -> Result<u32, SlotError> {
    let invalid = || SlotError::InvalidHourCode(hour_code.to_string());
    let value: i64 = hour_code.trim().parse().map_err(|_| invalid())?;
    if !(0..=23).contains(&value) {
        return Err(invalid());
    }
    u32::try_from(value).map_err(|_| invalid())
}
