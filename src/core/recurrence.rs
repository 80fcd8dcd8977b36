/*
 * Fixed-interval calendar arithmetic shared by recurrence expansion and view
 * navigation. A `RecurrenceUnit` shifts a date or date-time by a signed number
 * of days, weeks or calendar months. Month shifts keep the day of month when
 * possible and otherwise clamp to the last day of the target month
 * (Jan 31 + 1 month = Feb 28/29).
 */
use time::{Date, Duration, Month, PrimitiveDateTime};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecurrenceUnit {
    Day,
    Week,
    Month,
}

impl RecurrenceUnit {
    /*
     * Shifts `date` by `steps` units. Returns `None` only when the result
     * leaves the range representable by `time::Date`.
     */
    pub fn shift_date(self, date: Date, steps: i64) -> Option<Date> {
        match self {
            RecurrenceUnit::Day => date.checked_add(Duration::days(steps)),
            RecurrenceUnit::Week => date.checked_add(Duration::weeks(steps)),
            RecurrenceUnit::Month => add_months_clamped(date, steps),
        }
    }

    /// Shifts a date-time, keeping its time of day.
    pub fn shift(self, date_time: PrimitiveDateTime, steps: i64) -> Option<PrimitiveDateTime> {
        self.shift_date(date_time.date(), steps)
            .map(|date| PrimitiveDateTime::new(date, date_time.time()))
    }
}

pub fn last_day_of_month(date: Date) -> Option<Date> {
    Date::from_calendar_date(date.year(), date.month(), date.month().length(date.year())).ok()
}

pub fn first_day_of_month(date: Date) -> Option<Date> {
    Date::from_calendar_date(date.year(), date.month(), 1).ok()
}

/*
 * Adds a signed number of calendar months. The month index is computed on a
 * zero-based absolute scale (year * 12 + month - 1) so negative steps across
 * year boundaries fall out of euclidean division.
 */
fn add_months_clamped(date: Date, months: i64) -> Option<Date> {
    let month_index = i64::from(date.year()) * 12 + i64::from(u8::from(date.month())) - 1;
    let target = month_index.checked_add(months)?;
    let year = i32::try_from(target.div_euclid(12)).ok()?;
    let month_number = u8::try_from(target.rem_euclid(12) + 1).ok()?;
    let month = Month::try_from(month_number).ok()?;
    let day = date.day().min(month.length(year));
    Date::from_calendar_date(year, month, day).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{date, datetime};

    #[test]
    fn test_day_and_week_shifts() {
        let d = date!(2025 - 01 - 05);
        assert_eq!(RecurrenceUnit::Day.shift_date(d, 3), Some(date!(2025 - 01 - 08)));
        assert_eq!(RecurrenceUnit::Week.shift_date(d, 2), Some(date!(2025 - 01 - 19)));
        assert_eq!(RecurrenceUnit::Day.shift_date(d, -5), Some(date!(2024 - 12 - 31)));
    }

    #[test]
    fn test_month_shift_clamps_to_last_day() {
        let d = date!(2025 - 01 - 31);
        assert_eq!(RecurrenceUnit::Month.shift_date(d, 1), Some(date!(2025 - 02 - 28)));
        assert_eq!(RecurrenceUnit::Month.shift_date(d, 2), Some(date!(2025 - 03 - 31)));
        assert_eq!(RecurrenceUnit::Month.shift_date(d, 3), Some(date!(2025 - 04 - 30)));
        assert_eq!(
            RecurrenceUnit::Month.shift_date(date!(2024 - 01 - 31), 1),
            Some(date!(2024 - 02 - 29))
        );
    }

    #[test]
    fn test_month_shift_crosses_year_in_both_directions() {
        assert_eq!(
            RecurrenceUnit::Month.shift_date(date!(2025 - 11 - 15), 3),
            Some(date!(2026 - 02 - 15))
        );
        assert_eq!(
            RecurrenceUnit::Month.shift_date(date!(2025 - 01 - 15), -1),
            Some(date!(2024 - 12 - 15))
        );
        assert_eq!(
            RecurrenceUnit::Month.shift_date(date!(2025 - 03 - 31), -13),
            Some(date!(2024 - 02 - 29))
        );
    }

    #[test]
    fn test_shift_keeps_time_of_day() {
        let dt = datetime!(2025 - 01 - 31 14:30);
        assert_eq!(
            RecurrenceUnit::Month.shift(dt, 1),
            Some(datetime!(2025 - 02 - 28 14:30))
        );
    }

    #[test]
    fn test_month_boundaries() {
        let d = date!(2024 - 02 - 10);
        assert_eq!(first_day_of_month(d), Some(date!(2024 - 02 - 01)));
        assert_eq!(last_day_of_month(d), Some(date!(2024 - 02 - 29)));
        assert_eq!(last_day_of_month(date!(2100 - 02 - 01)), Some(date!(2100 - 02 - 28)));
        assert_eq!(last_day_of_month(date!(2000 - 02 - 01)), Some(date!(2000 - 02 - 29)));
        assert_eq!(last_day_of_month(date!(2025 - 04 - 15)), Some(date!(2025 - 04 - 30)));
    }
}
