/*
 * Read-only queries over an event collection: day membership, inclusive date
 * ranges, text search, upcoming events and scheduling conflicts. Every query
 * works on expanded occurrences (the original plus generated recurrences), so
 * a recurring event matches on any date it actually occurs on.
 *
 * All functions are pure; they borrow the slice and return references or
 * borrowed `Occurrence` values into it.
 */
use super::models::{Event, Occurrence};
use time::{Date, Duration, PrimitiveDateTime};

/// A half-open time interval `[span_start, span_end)`.
pub trait TimeSpan {
    fn span_start(&self) -> PrimitiveDateTime;
    fn span_end(&self) -> PrimitiveDateTime;

    /// Touching endpoints do not overlap.
    fn overlaps<T: TimeSpan + ?Sized>(&self, other: &T) -> bool {
        self.span_start() < other.span_end() && self.span_end() > other.span_start()
    }
}

// An event's own span is its original occurrence.
impl TimeSpan for Event {
    fn span_start(&self) -> PrimitiveDateTime {
        self.start()
    }

    fn span_end(&self) -> PrimitiveDateTime {
        self.end()
    }
}

impl TimeSpan for Occurrence<'_> {
    fn span_start(&self) -> PrimitiveDateTime {
        self.start
    }

    fn span_end(&self) -> PrimitiveDateTime {
        self.end
    }
}

impl<T: TimeSpan + ?Sized> TimeSpan for &T {
    fn span_start(&self) -> PrimitiveDateTime {
        (**self).span_start()
    }

    fn span_end(&self) -> PrimitiveDateTime {
        (**self).span_end()
    }
}

pub fn events_on_date(events: &[Event], date: Date) -> Vec<&Event> {
    events.iter().filter(|event| event.occurs_on(date)).collect()
}

/// True if the original or any generated occurrence falls in `[start, end]`.
pub fn occurs_in_range(event: &Event, start: Date, end: Date) -> bool {
    event
        .occurrences()
        .take_while(|occurrence| occurrence.date() <= end)
        .any(|occurrence| occurrence.date() >= start)
}

/*
 * Events with at least one occurrence in the inclusive range, ordered by
 * their original start. The sort is stable, so equal starts keep collection
 * order.
 */
pub fn events_in_range(events: &[Event], start: Date, end: Date) -> Vec<&Event> {
    let mut matching: Vec<&Event> = events
        .iter()
        .filter(|event| occurs_in_range(event, start, end))
        .collect();
    matching.sort_by_key(|event| event.start());
    matching
}

pub fn matches_text(event: &Event, needle_lowercase: &str) -> bool {
    event.title().to_lowercase().contains(needle_lowercase)
        || event.description().to_lowercase().contains(needle_lowercase)
}

/*
 * Case-insensitive substring search over title and description. Each matching
 * event contributes every one of its occurrences. A blank query returns
 * nothing rather than everything.
 */
pub fn search<'a>(events: &'a [Event], query: &str) -> Vec<Occurrence<'a>> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        log::trace!("Query: Blank search query, returning no results.");
        return Vec::new();
    }

    let mut hits: Vec<Occurrence<'a>> = events
        .iter()
        .filter(|event| matches_text(event, &needle))
        .flat_map(|event| event.occurrences())
        .collect();
    hits.sort_by_key(|occurrence| occurrence.start);
    log::debug!("Query: Search '{query}' produced {} occurrence(s).", hits.len());
    hits
}

/// Every occurrence whose date lies in `[start, end]`, in date order.
pub fn search_by_date_range(events: &[Event], start: Date, end: Date) -> Vec<Occurrence<'_>> {
    let mut hits: Vec<Occurrence<'_>> = events
        .iter()
        .flat_map(|event| {
            event
                .occurrences()
                .take_while(move |occurrence| occurrence.date() <= end)
                .filter(move |occurrence| occurrence.date() >= start)
        })
        .collect();
    hits.sort_by_key(|occurrence| occurrence.start);
    hits
}

/// First occurrence starting strictly between `after` and `before`.
pub fn first_occurrence_between(
    event: &Event,
    after: PrimitiveDateTime,
    before: PrimitiveDateTime,
) -> Option<Occurrence<'_>> {
    event
        .occurrences()
        .take_while(|occurrence| occurrence.start < before)
        .find(|occurrence| occurrence.start > after)
}

/*
 * Events whose original or any recurring start lies strictly inside
 * `(now, now + hours_ahead)`, ordered by original start.
 */
pub fn upcoming_events(events: &[Event], now: PrimitiveDateTime, hours_ahead: i64) -> Vec<&Event> {
    let Some(window_end) = now.checked_add(Duration::hours(hours_ahead)) else {
        log::warn!("Query: Upcoming window of {hours_ahead}h from {now} overflows the calendar.");
        return Vec::new();
    };
    let mut upcoming: Vec<&Event> = events
        .iter()
        .filter(|event| first_occurrence_between(event, now, window_end).is_some())
        .collect();
    upcoming.sort_by_key(|event| event.start());
    upcoming
}

/// Checks every unordered pair once; an item is never compared with itself.
pub fn any_conflict_among<T: TimeSpan>(items: &[T]) -> bool {
    items.iter().enumerate().any(|(i, a)| {
        items[i + 1..].iter().any(|b| a.overlaps(b))
    })
}

/// Occurrences of all events projected onto `date`, in collection order.
pub fn occurrences_on_date(events: &[Event], date: Date) -> Vec<Occurrence<'_>> {
    events
        .iter()
        .filter_map(|event| event.occurrence_on(date))
        .collect()
}

/// Whether any two events occurring on `date` overlap there.
pub fn day_has_conflict(events: &[Event], date: Date) -> bool {
    any_conflict_among(&occurrences_on_date(events, date))
}

/*
 * Whether another event occurring on `event`'s start date overlaps `event`'s
 * interval. Other events are compared through their occurrence on that date.
 * Entries sharing `event`'s id are treated as `event` itself, so checking an
 * edited copy does not report a conflict with its stored original.
 */
pub fn has_conflict(events: &[Event], event: &Event) -> bool {
    let date = event.start().date();
    occurrences_on_date(events, date)
        .iter()
        .filter(|occurrence| occurrence.event.id() != event.id())
        .any(|occurrence| occurrence.overlaps(event))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::RecurType;
    use time::macros::{date, datetime};

    fn event(id: u32, title: &str, start: PrimitiveDateTime, end: PrimitiveDateTime) -> Event {
        Event::new(id, title, "", start, end)
    }

    fn daily_from_jan_5() -> Event {
        event(
            1,
            "Workout",
            datetime!(2025 - 01 - 05 07:00),
            datetime!(2025 - 01 - 05 08:00),
        )
        .with_recurrence(RecurType::Daily, 10)
    }

    #[test]
    fn test_events_in_range_matches_generated_occurrence() {
        let events = vec![daily_from_jan_5()];
        let hit = events_in_range(&events, date!(2025 - 01 - 08), date!(2025 - 01 - 08));
        assert_eq!(hit.len(), 1);

        let miss = events_in_range(&events, date!(2025 - 02 - 01), date!(2025 - 02 - 28));
        assert!(miss.is_empty());

        // Last occurrence is index 10, on 2025-01-15.
        assert_eq!(
            events_in_range(&events, date!(2025 - 01 - 15), date!(2025 - 01 - 20)).len(),
            1
        );
        assert!(events_in_range(&events, date!(2025 - 01 - 16), date!(2025 - 01 - 20)).is_empty());
    }

    #[test]
    fn test_events_in_range_sorted_by_original_start_with_stable_ties() {
        let late = event(1, "Late", datetime!(2025 - 03 - 03 15:00), datetime!(2025 - 03 - 03 16:00));
        let early_recurring = event(
            2,
            "Early",
            datetime!(2025 - 02 - 24 09:00),
            datetime!(2025 - 02 - 24 10:00),
        )
        .with_recurrence(RecurType::Weekly, 2);
        let tie_a = event(3, "TieA", datetime!(2025 - 03 - 04 09:00), datetime!(2025 - 03 - 04 10:00));
        let tie_b = event(4, "TieB", datetime!(2025 - 03 - 04 09:00), datetime!(2025 - 03 - 04 09:30));
        let events = vec![late, tie_a, early_recurring, tie_b];

        let ids: Vec<u32> = events_in_range(&events, date!(2025 - 03 - 01), date!(2025 - 03 - 31))
            .iter()
            .map(|e| e.id())
            .collect();
        assert_eq!(ids, vec![2, 1, 3, 4]);
    }

    #[test]
    fn test_events_on_date_includes_recurrences() {
        let single = event(2, "Once", datetime!(2025 - 01 - 08 12:00), datetime!(2025 - 01 - 08 13:00));
        let elsewhere = event(3, "Other", datetime!(2025 - 01 - 09 12:00), datetime!(2025 - 01 - 09 13:00));
        let events = vec![daily_from_jan_5(), single, elsewhere];

        let ids: Vec<u32> = events_on_date(&events, date!(2025 - 01 - 08))
            .iter()
            .map(|e| e.id())
            .collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_conflict_detection_with_touching_endpoints() {
        let a = event(1, "A", datetime!(2025 - 05 - 01 09:00), datetime!(2025 - 05 - 01 10:00));
        let b = event(2, "B", datetime!(2025 - 05 - 01 09:30), datetime!(2025 - 05 - 01 10:30));
        let c = event(3, "C", datetime!(2025 - 05 - 01 10:00), datetime!(2025 - 05 - 01 11:00));

        assert!(any_conflict_among(&[a.clone(), b.clone()]));
        assert!(any_conflict_among(&[b.clone(), a.clone()]));
        assert!(!any_conflict_among(&[a.clone(), c.clone()]));
        assert!(!any_conflict_among(&[a]));
        assert!(!any_conflict_among::<Event>(&[]));
    }

    #[test]
    fn test_has_conflict_uses_occurrence_on_that_day() {
        // Weekly meeting created a week earlier recurs on 2025-05-08 at 09:00.
        let weekly = event(1, "Weekly", datetime!(2025 - 05 - 01 09:00), datetime!(2025 - 05 - 01 10:00))
            .with_recurrence(RecurType::Weekly, 4);
        let overlapping = event(2, "Dentist", datetime!(2025 - 05 - 08 09:30), datetime!(2025 - 05 - 08 10:15));
        let later = event(3, "Lunch", datetime!(2025 - 05 - 08 12:00), datetime!(2025 - 05 - 08 13:00));
        let events = vec![weekly, overlapping.clone(), later.clone()];

        assert!(has_conflict(&events, &overlapping));
        assert!(!has_conflict(&events, &later));
        assert!(day_has_conflict(&events, date!(2025 - 05 - 08)));
        assert!(!day_has_conflict(&events, date!(2025 - 05 - 01)));
    }

    #[test]
    fn test_has_conflict_ignores_stored_copy_of_same_event() {
        let stored = event(5, "Review", datetime!(2025 - 06 - 02 14:00), datetime!(2025 - 06 - 02 15:00));
        let edited = event(5, "Review v2", datetime!(2025 - 06 - 02 14:30), datetime!(2025 - 06 - 02 15:30));
        let events = vec![stored];
        assert!(!has_conflict(&events, &edited));
    }

    #[test]
    fn test_search_returns_every_occurrence() {
        let standup = Event::new(
            1,
            "Standup",
            "daily sync",
            datetime!(2025 - 01 - 06 09:00),
            datetime!(2025 - 01 - 06 09:15),
        )
        .with_recurrence(RecurType::Weekly, 4);
        let other = event(2, "Retro", datetime!(2025 - 01 - 02 16:00), datetime!(2025 - 01 - 02 17:00));
        let events = vec![standup, other];

        let hits = search(&events, "standup");
        assert_eq!(hits.len(), 5);
        let mut dates: Vec<Date> = hits.iter().map(|h| h.date()).collect();
        assert!(dates.windows(2).all(|w| w[0] < w[1]));
        dates.dedup();
        assert_eq!(dates.len(), 5);
    }

    #[test]
    fn test_search_matches_description_case_insensitively() {
        let events = vec![
            Event::new(1, "Call", "Discuss BUDGET", datetime!(2025 - 01 - 10 10:00), datetime!(2025 - 01 - 10 11:00)),
            Event::new(2, "Budget review", "", datetime!(2025 - 01 - 03 10:00), datetime!(2025 - 01 - 03 11:00)),
        ];
        let hits = search(&events, "budget");
        let ids: Vec<u32> = hits.iter().map(|h| h.event.id()).collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[test]
    fn test_blank_search_returns_nothing() {
        let events = vec![daily_from_jan_5()];
        assert!(search(&events, "").is_empty());
        assert!(search(&events, "   ").is_empty());
    }

    #[test]
    fn test_search_by_date_range_emits_each_qualifying_occurrence() {
        let once = event(2, "Once", datetime!(2025 - 01 - 07 06:00), datetime!(2025 - 01 - 07 06:30));
        let events = vec![daily_from_jan_5(), once];

        let hits = search_by_date_range(&events, date!(2025 - 01 - 06), date!(2025 - 01 - 08));
        let summary: Vec<(u32, u32)> = hits.iter().map(|h| (h.event.id(), h.index)).collect();
        assert_eq!(summary, vec![(1, 1), (2, 0), (1, 2), (1, 3)]);
    }

    #[test]
    fn test_upcoming_events_considers_recurrences_and_strict_bounds() {
        let now = datetime!(2025 - 01 - 10 12:00);
        let recurring = daily_from_jan_5();
        let exactly_now = event(2, "Now", now, datetime!(2025 - 01 - 10 13:00));
        let soon = event(3, "Soon", datetime!(2025 - 01 - 10 18:00), datetime!(2025 - 01 - 10 19:00));
        let at_window_end = event(4, "Edge", datetime!(2025 - 01 - 11 12:00), datetime!(2025 - 01 - 11 13:00));
        let past = event(5, "Past", datetime!(2025 - 01 - 09 12:00), datetime!(2025 - 01 - 09 13:00));
        let events = vec![soon, exactly_now, at_window_end, past, recurring];

        let ids: Vec<u32> = upcoming_events(&events, now, 24)
            .iter()
            .map(|e| e.id())
            .collect();
        // The daily event recurs at 2025-01-11 07:00, inside the window.
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn test_first_occurrence_between() {
        let recurring = daily_from_jan_5();
        let occurrence = first_occurrence_between(
            &recurring,
            datetime!(2025 - 01 - 08 07:00),
            datetime!(2025 - 01 - 20 00:00),
        )
        .unwrap();
        assert_eq!(occurrence.index, 4);
        assert_eq!(occurrence.start, datetime!(2025 - 01 - 09 07:00));
    }
}
