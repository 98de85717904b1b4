use time::{
    OffsetDateTime,
    format_description::{BorrowedFormatItem, well_known::Rfc3339},
    macros::format_description,
};

pub mod activities;
pub mod envelope;
pub mod health;
pub mod images;
pub mod mods;
pub mod stats;
pub mod validation;

/// Calendar day layout of the statistics reset marker.
const DAY_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// Current instant as an RFC 3339 timestamp, the format used by stored records.
pub fn timestamp_now() -> String {
    format_timestamp(OffsetDateTime::now_utc())
}

fn format_timestamp(time: OffsetDateTime) -> String {
    time.format(&Rfc3339)
        .unwrap_or_else(|_| "invalid-timestamp".into())
}

/// Current UTC calendar day formatted as `YYYY-MM-DD`.
pub fn today() -> String {
    format_day(OffsetDateTime::now_utc())
}

fn format_day(time: OffsetDateTime) -> String {
    time.format(DAY_FORMAT)
        .unwrap_or_else(|_| "invalid-date".into())
}
