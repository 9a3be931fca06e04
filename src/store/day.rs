//! Day-keys: calendar dates rendered as `Mon Oct 19 2026`.

use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{Date, OffsetDateTime};

const DAY_KEY: &[BorrowedFormatItem<'_>] = format_description!("[weekday repr:short] [month repr:short] [day] [year]");

/// Parsed after the weekday has been split off.
const DATE_PART: &[BorrowedFormatItem<'_>] = format_description!("[month repr:short] [day] [year]");

/// Current UTC date.
#[must_use]
pub fn today() -> Date {
    OffsetDateTime::now_utc().date()
}

#[must_use]
pub fn day_key(date: Date) -> String {
    date.format(DAY_KEY).unwrap_or_else(|_| date.to_string())
}

/// Inverse of [`day_key`]. The weekday is ignored.
#[must_use]
pub fn parse_day_key(raw: &str) -> Option<Date> {
    let (_weekday, rest) = raw.trim().split_once(' ')?;
    Date::parse(rest.trim_start(), DATE_PART).ok()
}
