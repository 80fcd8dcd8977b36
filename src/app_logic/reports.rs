/*
 * Plain-text reports shown by the presentation layer: the upcoming-events
 * notification, a search result listing and a one-week agenda.
 */
use super::handler::OccurrenceHit;
use crate::core::date_utils::{format_date, format_hour_minute};
use crate::core::{Event, RecurType, query};
use time::{Date, Duration, PrimitiveDateTime};

pub type Result<T> = std::result::Result<T, time::error::Format>;

const DAY_NAMES: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

fn recurrence_tag(recur_type: &RecurType) -> String {
    match recur_type {
        RecurType::None => String::new(),
        other => format!(" [{other}]"),
    }
}

fn format_date_time(value: PrimitiveDateTime) -> Result<String> {
    Ok(format!(
        "{} {}",
        format_date(value.date())?,
        format_hour_minute(value.time())?
    ))
}

/*
 * Lists events starting within `hours_ahead` of `now`. The countdown is
 * measured to the occurrence that falls inside the window, so a recurring
 * event shows its next instance rather than its original start.
 */
pub fn notification_summary(
    events: &[Event],
    now: PrimitiveDateTime,
    hours_ahead: i64,
) -> Result<String> {
    let upcoming = query::upcoming_events(events, now, hours_ahead);
    if upcoming.is_empty() {
        return Ok(format!("No upcoming events in the next {hours_ahead} hours."));
    }

    let window_end = now.saturating_add(Duration::hours(hours_ahead));
    let mut summary = format!("Upcoming Events (Next {hours_ahead} Hours):\n\n");
    for event in upcoming {
        let start = query::first_occurrence_between(event, now, window_end)
            .map_or(event.start(), |occurrence| occurrence.start);
        let minutes_until = (start - now).whole_minutes();
        summary.push_str(&format!(
            "• {}\n  Time: {}\n  In: {}h {}m\n\n",
            event.title(),
            format_date_time(start)?,
            minutes_until / 60,
            minutes_until % 60
        ));
    }
    Ok(summary)
}

pub fn search_results_summary(hits: &[OccurrenceHit]) -> Result<String> {
    if hits.is_empty() {
        return Ok("No events found.".to_string());
    }

    let mut summary = format!("Found {} event(s):\n\n", hits.len());
    for hit in hits {
        summary.push_str(&format!(
            "• {} - {}{}\n",
            format_date_time(hit.start)?,
            hit.event.title(),
            recurrence_tag(hit.event.recur_type())
        ));
    }
    Ok(summary)
}

/// Seven day rows starting at `week_start`, each listing that day's events.
pub fn week_list_view(events: &[Event], week_start: Date) -> Result<String> {
    let mut view = format!("=== Week of {} ===\n\n", format_date(week_start)?);
    for (offset, day_name) in DAY_NAMES.iter().enumerate() {
        let Some(day) = week_start.checked_add(Duration::days(offset as i64)) else {
            break;
        };
        view.push_str(&format!("{day_name} {}: ", format_date(day)?));

        let day_events = query::events_on_date(events, day);
        if day_events.is_empty() {
            view.push_str("No events\n");
            continue;
        }
        view.push('\n');
        for event in day_events {
            view.push_str(&format!(
                "  • {} - {}{}\n",
                format_hour_minute(event.start().time())?,
                event.title(),
                recurrence_tag(event.recur_type())
            ));
        }
    }
    Ok(view)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{date, datetime};

    fn weekly_standup() -> Event {
        Event::new(
            1,
            "Standup",
            "",
            datetime!(2025 - 01 - 06 09:00),
            datetime!(2025 - 01 - 06 09:15),
        )
        .with_recurrence(RecurType::Weekly, 3)
    }

    fn dentist() -> Event {
        Event::new(
            2,
            "Dentist",
            "",
            datetime!(2025 - 01 - 08 15:00),
            datetime!(2025 - 01 - 08 16:00),
        )
    }

    #[test]
    fn test_notification_summary_empty_window() {
        let events = vec![dentist()];
        assert_eq!(
            notification_summary(&events, datetime!(2025 - 02 - 01 08:00), 24).unwrap(),
            "No upcoming events in the next 24 hours."
        );
    }

    #[test]
    fn test_notification_summary_counts_down_to_recurring_instance() {
        let events = vec![weekly_standup(), dentist()];
        let summary = notification_summary(&events, datetime!(2025 - 01 - 12 18:30), 24).unwrap();
        assert_eq!(
            summary,
            "Upcoming Events (Next 24 Hours):\n\n\
             • Standup\n  Time: 2025-01-13 09:00\n  In: 14h 30m\n\n"
        );
    }

    #[test]
    fn test_search_results_summary() {
        assert_eq!(search_results_summary(&[]).unwrap(), "No events found.");

        let standup = weekly_standup();
        let dentist = dentist();
        let hits: Vec<OccurrenceHit> = [standup.occurrence(2), dentist.occurrence(0)]
            .into_iter()
            .flatten()
            .map(OccurrenceHit::from)
            .collect();
        assert_eq!(
            search_results_summary(&hits).unwrap(),
            "Found 2 event(s):\n\n\
             • 2025-01-20 09:00 - Standup [WEEKLY]\n\
             • 2025-01-08 15:00 - Dentist\n"
        );
    }

    #[test]
    fn test_week_list_view() {
        let events = vec![weekly_standup(), dentist()];
        let view = week_list_view(&events, date!(2025 - 01 - 12)).unwrap();
        let lines: Vec<&str> = view.lines().collect();
        assert_eq!(lines[0], "=== Week of 2025-01-12 ===");
        assert_eq!(lines[1], "");
        assert_eq!(lines[2], "Sun 2025-01-12: No events");
        assert_eq!(lines[3], "Mon 2025-01-13: ");
        assert_eq!(lines[4], "  • 09:00 - Standup [WEEKLY]");
        assert_eq!(lines[5], "Tue 2025-01-14: No events");
        assert_eq!(lines[6], "Wed 2025-01-15: No events");
        assert_eq!(lines.last(), Some(&"Sat 2025-01-18: No events"));
        assert_eq!(lines.len(), 10);
    }
}
