/*
 * Domain types of the calendar: the `Event` value, its recurrence settings, and
 * the `Occurrence` view that recurrence expansion yields. Events are immutable
 * values; an edit constructs a new `Event` and replaces the old one by id.
 */
use super::recurrence::RecurrenceUnit;
use std::fmt;
use time::{Date, Duration, PrimitiveDateTime};

pub type EventId = u32;

/*
 * How an event repeats. `Unrecognized` keeps a value read from disk that this
 * build does not understand, so it round-trips unchanged; such events occur
 * only once.
 */
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RecurType {
    #[default]
    None,
    Daily,
    Weekly,
    Monthly,
    Unrecognized(String),
}

impl RecurType {
    /*
     * Parses a stored value. Never fails: unknown text becomes `Unrecognized`
     * and an empty field is treated as `None`.
     */
    pub fn parse_lenient(text: &str) -> Self {
        Self::parse_known(text).unwrap_or_else(|| RecurType::Unrecognized(text.trim().to_string()))
    }

    /// Parses user input; only the four known kinds are accepted.
    pub fn parse_known(text: &str) -> Option<Self> {
        let trimmed = text.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("NONE") {
            Some(RecurType::None)
        } else if trimmed.eq_ignore_ascii_case("DAILY") {
            Some(RecurType::Daily)
        } else if trimmed.eq_ignore_ascii_case("WEEKLY") {
            Some(RecurType::Weekly)
        } else if trimmed.eq_ignore_ascii_case("MONTHLY") {
            Some(RecurType::Monthly)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            RecurType::None => "NONE",
            RecurType::Daily => "DAILY",
            RecurType::Weekly => "WEEKLY",
            RecurType::Monthly => "MONTHLY",
            RecurType::Unrecognized(raw) => raw,
        }
    }

    /// The shift applied per generated occurrence, if this kind expands at all.
    pub fn unit(&self) -> Option<RecurrenceUnit> {
        match self {
            RecurType::Daily => Some(RecurrenceUnit::Day),
            RecurType::Weekly => Some(RecurrenceUnit::Week),
            RecurType::Monthly => Some(RecurrenceUnit::Month),
            RecurType::None | RecurType::Unrecognized(_) => None,
        }
    }
}

impl fmt::Display for RecurType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    id: EventId,
    title: String,
    description: String,
    start: PrimitiveDateTime,
    end: PrimitiveDateTime,
    recur_type: RecurType,
    recur_count: u32,
}

impl Event {
    /*
     * Creates a non-recurring event. No ordering check is made between `start`
     * and `end`; the controller validates user input, while persisted records
     * are accepted as stored.
     */
    pub fn new(
        id: EventId,
        title: impl Into<String>,
        description: impl Into<String>,
        start: PrimitiveDateTime,
        end: PrimitiveDateTime,
    ) -> Self {
        Event {
            id,
            title: title.into(),
            description: description.into(),
            start,
            end,
            recur_type: RecurType::None,
            recur_count: 0,
        }
    }

    pub fn with_recurrence(mut self, recur_type: RecurType, recur_count: u32) -> Self {
        self.recur_type = recur_type;
        self.recur_count = recur_count;
        self
    }

    pub fn id(&self) -> EventId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn start(&self) -> PrimitiveDateTime {
        self.start
    }

    pub fn end(&self) -> PrimitiveDateTime {
        self.end
    }

    pub fn recur_type(&self) -> &RecurType {
        &self.recur_type
    }

    pub fn recur_count(&self) -> u32 {
        self.recur_count
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    pub fn is_recurring(&self) -> bool {
        self.recur_type.unit().is_some() && self.recur_count > 0
    }

    /// Number of occurrences generated after the original.
    pub fn generated_occurrences(&self) -> u32 {
        if self.recur_type.unit().is_some() {
            self.recur_count
        } else {
            0
        }
    }

    /*
     * Start of occurrence `index`. Index 0 is the original; kinds that do not
     * expand return the original for every index. `None` means the shifted
     * date is outside the representable calendar.
     */
    pub fn occurrence_start(&self, index: u32) -> Option<PrimitiveDateTime> {
        match self.recur_type.unit() {
            Some(unit) if index > 0 => unit.shift(self.start, i64::from(index)),
            _ => Some(self.start),
        }
    }

    /// End of occurrence `index`; always `occurrence_start(index) + duration()`.
    pub fn occurrence_end(&self, index: u32) -> Option<PrimitiveDateTime> {
        self.occurrence_start(index)?.checked_add(self.duration())
    }

    pub fn occurrence(&self, index: u32) -> Option<Occurrence<'_>> {
        let start = self.occurrence_start(index)?;
        let end = start.checked_add(self.duration())?;
        Some(Occurrence {
            event: self,
            index,
            start,
            end,
        })
    }

    /// The original followed by every generated occurrence, in date order.
    pub fn occurrences(&self) -> impl Iterator<Item = Occurrence<'_>> + '_ {
        (0..=self.generated_occurrences()).map_while(move |index| self.occurrence(index))
    }

    /*
     * Finds the occurrence whose start falls on `date`. The original is checked
     * first regardless of recurrence kind; generated occurrences are scanned in
     * ascending order and the scan stops once it passes `date`.
     */
    pub fn occurrence_on(&self, date: Date) -> Option<Occurrence<'_>> {
        self.occurrences()
            .take_while(|occurrence| occurrence.date() <= date)
            .find(|occurrence| occurrence.date() == date)
    }

    pub fn occurs_on(&self, date: Date) -> bool {
        self.occurrence_on(date).is_some()
    }
}

/// One concrete instance of an event: the original (index 0) or a recurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Occurrence<'a> {
    pub event: &'a Event,
    pub index: u32,
    pub start: PrimitiveDateTime,
    pub end: PrimitiveDateTime,
}

impl Occurrence<'_> {
    pub fn date(&self) -> Date {
        self.start.date()
    }

    pub fn is_original(&self) -> bool {
        self.index == 0
    }
}
