use thiserror::Error;
use time::{
    format_description::BorrowedFormatItem, macros::format_description, Date, Duration,
    OffsetDateTime, UtcOffset,
};

const ISO_DATE: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

#[derive(Debug, Error)]
#[error("Invalid ISO date: {0}")]
pub struct DateParseError(String);

pub fn now_utc() -> OffsetDateTime {
    OffsetDateTime::now_utc()
}

pub fn today_utc() -> Date {
    now_utc().date()
}

/// Parses a calendar date like `2024-05-31`.
pub fn parse_iso_date(s: &str) -> Result<Date, DateParseError> {
    Date::parse(s.trim(), ISO_DATE)
        .map_err(|_| DateParseError(s.to_string()))
}

pub fn format_iso_date(date: Date) -> String {
    // A date always provides all components of the description.
    date.format(ISO_DATE).unwrap_or_else(|_| date.to_string())
}

/// The next 00:00 UTC strictly after `now`.
pub fn next_utc_midnight(now: OffsetDateTime) -> OffsetDateTime {
    let now = now.to_offset(UtcOffset::UTC);
    let today = now.date();
    let next_day = today.next_day().unwrap_or(today);
    next_day.midnight().assume_utc()
}

pub fn duration_until_next_utc_midnight(now: OffsetDateTime) -> Duration {
    next_utc_midnight(now) - now
}
