/*
 * Parsing and formatting of the naive local dates and times used by the
 * calendar. Stored timestamps use `yyyy-MM-ddTHH:mm:ss`; user input uses
 * `HH:mm` for times and `YYYY-MM-DD` for dates.
 */
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{Date, OffsetDateTime, PrimitiveDateTime, Time};

const ISO_DATE_TIME: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");
const ISO_DATE: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");
const HOUR_MINUTE: &[BorrowedFormatItem<'static>] = format_description!("[hour]:[minute]");

pub fn parse_iso_date_time(text: &str) -> Result<PrimitiveDateTime, time::error::Parse> {
    PrimitiveDateTime::parse(text.trim(), ISO_DATE_TIME)
}

pub fn parse_iso_date(text: &str) -> Result<Date, time::error::Parse> {
    Date::parse(text.trim(), ISO_DATE)
}

pub fn parse_hour_minute(text: &str) -> Result<Time, time::error::Parse> {
    Time::parse(text.trim(), HOUR_MINUTE)
}

pub fn format_iso_date_time(value: PrimitiveDateTime) -> Result<String, time::error::Format> {
    value.format(ISO_DATE_TIME)
}

pub fn format_date(value: Date) -> Result<String, time::error::Format> {
    value.format(ISO_DATE)
}

pub fn format_hour_minute(value: Time) -> Result<String, time::error::Format> {
    value.format(HOUR_MINUTE)
}

/*
 * The current wall-clock time without offset. Falls back to UTC when the
 * local offset cannot be determined (e.g. on multi-threaded Unix processes).
 */
pub fn local_now() -> PrimitiveDateTime {
    let now = OffsetDateTime::now_local().unwrap_or_else(|e| {
        log::warn!("DateUtils: Local offset unavailable ({e}); using UTC.");
        OffsetDateTime::now_utc()
    });
    PrimitiveDateTime::new(now.date(), now.time())
}

/// The most recent Sunday on or before `date`.
pub fn sunday_on_or_before(date: Date) -> Option<Date> {
    let back = i64::from(date.weekday().number_days_from_sunday());
    date.checked_sub(time::Duration::days(back))
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{date, datetime, time};

    #[test]
    fn test_iso_date_time_formats_and_parses() {
        let value = datetime!(2025 - 10 - 05 14:30:07);
        let text = format_iso_date_time(value).unwrap();
        assert_eq!(text, "2025-10-05T14:30:07");
        assert_eq!(parse_iso_date_time(&text).unwrap(), value);
    }

    #[test]
    fn test_four_digit_years_keep_their_sign() {
        let ancient = datetime!(-0005 - 01 - 01 09:00);
        let text = format_iso_date_time(ancient).unwrap();
        assert_eq!(text, "-0005-01-01T09:00:00");
        assert_eq!(parse_iso_date_time(&text).unwrap(), ancient);

        let early = datetime!(0005 - 01 - 01 09:00);
        let text = format_iso_date_time(early).unwrap();
        assert_eq!(text, "0005-01-01T09:00:00");
        assert_eq!(parse_iso_date_time(&text).unwrap(), early);
    }

    #[test]
    fn test_hour_minute_requires_two_digit_fields() {
        assert_eq!(parse_hour_minute("14:30").unwrap(), time!(14:30));
        assert_eq!(parse_hour_minute(" 09:05 ").unwrap(), time!(09:05));
        assert!(parse_hour_minute("25:00").is_err());
        assert!(parse_hour_minute("2pm").is_err());
        assert!(parse_hour_minute("").is_err());
        assert_eq!(format_hour_minute(time!(09:05)).unwrap(), "09:05");
    }

    #[test]
    fn test_parse_iso_date() {
        assert_eq!(parse_iso_date("2025-02-28").unwrap(), date!(2025 - 02 - 28));
        assert!(parse_iso_date("2025-02-30").is_err());
        assert!(parse_iso_date("28/02/2025").is_err());
        assert_eq!(format_date(date!(2025 - 02 - 03)).unwrap(), "2025-02-03");
    }

    #[test]
    fn test_sunday_on_or_before() {
        // 2025-01-08 is a Wednesday.
        assert_eq!(
            sunday_on_or_before(date!(2025 - 01 - 08)),
            Some(date!(2025 - 01 - 05))
        );
        assert_eq!(
            sunday_on_or_before(date!(2025 - 01 - 05)),
            Some(date!(2025 - 01 - 05))
        );
        assert_eq!(
            sunday_on_or_before(date!(2025 - 01 - 04)),
            Some(date!(2024 - 12 - 29))
        );
    }
}
