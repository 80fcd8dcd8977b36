/*
 * What the calendar is currently showing: display mode, time scale and the
 * reference date the visible range is anchored on. Navigation and range
 * computation use the same `RecurrenceUnit` arithmetic as recurrence
 * expansion.
 */
use super::date_utils::sunday_on_or_before;
use super::recurrence::{RecurrenceUnit, first_day_of_month, last_day_of_month};
use serde::{Deserialize, Serialize};
use std::fmt;
use time::{Date, Duration, Month};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ViewMode {
    #[default]
    Calendar,
    List,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TimeScale {
    Day,
    Week,
    #[default]
    Month,
}

impl TimeScale {
    pub fn unit(self) -> RecurrenceUnit {
        match self {
            TimeScale::Day => RecurrenceUnit::Day,
            TimeScale::Week => RecurrenceUnit::Week,
            TimeScale::Month => RecurrenceUnit::Month,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationDirection {
    Previous,
    Next,
}

impl NavigationDirection {
    fn steps(self) -> i64 {
        match self {
            NavigationDirection::Previous => -1,
            NavigationDirection::Next => 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectorError {
    InvalidYear(String),
    InvalidMonth(u8),
}

impl fmt::Display for SelectorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectorError::InvalidYear(_) => write!(f, "Year must be a number."),
            SelectorError::InvalidMonth(_) => write!(f, "Month must be between 1 and 12."),
        }
    }
}

impl std::error::Error for SelectorError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarViewState {
    mode: ViewMode,
    scale: TimeScale,
    reference_date: Date,
}

impl CalendarViewState {
    pub fn new(mode: ViewMode, scale: TimeScale, reference_date: Date) -> Self {
        CalendarViewState {
            mode,
            scale,
            reference_date,
        }
    }

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: ViewMode) {
        self.mode = mode;
    }

    pub fn scale(&self) -> TimeScale {
        self.scale
    }

    pub fn set_scale(&mut self, scale: TimeScale) {
        self.scale = scale;
    }

    pub fn reference_date(&self) -> Date {
        self.reference_date
    }

    pub fn set_reference_date(&mut self, date: Date) {
        self.reference_date = date;
    }

    /*
     * Moves the reference date one unit of the current scale. A shift past
     * the representable date range leaves the reference date unchanged.
     */
    pub fn navigate(&mut self, direction: NavigationDirection) {
        match self
            .scale
            .unit()
            .shift_date(self.reference_date, direction.steps())
        {
            Some(date) => self.reference_date = date,
            None => log::warn!(
                "CalendarViewState: Cannot navigate {direction:?} from {}",
                self.reference_date
            ),
        }
    }

    pub fn start_of_range(&self) -> Date {
        let start = match self.scale {
            TimeScale::Day => Some(self.reference_date),
            TimeScale::Week => sunday_on_or_before(self.reference_date),
            TimeScale::Month => first_day_of_month(self.reference_date),
        };
        start.unwrap_or(self.reference_date)
    }

    /// Inclusive last day of the visible range.
    pub fn end_of_range(&self) -> Date {
        let end = match self.scale {
            TimeScale::Day => Some(self.reference_date),
            TimeScale::Week => self.start_of_range().checked_add(Duration::days(6)),
            TimeScale::Month => last_day_of_month(self.reference_date),
        };
        end.unwrap_or(self.reference_date)
    }

    /*
     * Jumps to day 1 of the month picked in the month/year selectors.
     * `month_index` is zero-based (0 = January).
     */
    pub fn set_reference_date_from_selectors(
        &mut self,
        month_index: u8,
        year_text: &str,
    ) -> Result<(), SelectorError> {
        let year = year_text
            .trim()
            .parse::<i32>()
            .map_err(|_| SelectorError::InvalidYear(year_text.to_string()))?;
        let month = Month::try_from(month_index.saturating_add(1))
            .map_err(|_| SelectorError::InvalidMonth(month_index))?;
        let date = Date::from_calendar_date(year, month, 1)
            .map_err(|_| SelectorError::InvalidYear(year_text.to_string()))?;
        self.reference_date = date;
        Ok(())
    }
}
