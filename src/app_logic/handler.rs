use crate::core::date_utils::{parse_hour_minute, parse_iso_date};
use crate::core::{
    AppSettings, BackupSummary, CalendarViewState, Event, EventId, EventStoreError,
    EventStoreOperations, NavigationDirection, Occurrence, RecurType, RestoreMode, SelectorError,
    TimeScale, ViewMode, query,
};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use time::{Date, PrimitiveDateTime};

use super::reports;

pub const APP_NAME: &str = "DeskCalendar";

pub(crate) const MSG_INVALID_TIME: &str = "Invalid time format. Please use HH:mm (e.g., 14:30)";
pub(crate) const MSG_END_BEFORE_START: &str = "End time must be after start time!";
pub(crate) const MSG_INVALID_RECUR_COUNT: &str = "Recurrence count must be a number.";
pub(crate) const MSG_INVALID_DATE: &str = "Invalid date format. Use YYYY-MM-DD.";

#[derive(Debug)]
pub enum CalendarError {
    /// Rejected user input; the message is meant to be shown as-is.
    Validation(String),
    /// Every id up to `u32::MAX` is taken; new events cannot be numbered.
    IdsExhausted,
    Store(EventStoreError),
    Format(time::error::Format),
}

impl From<EventStoreError> for CalendarError {
    fn from(err: EventStoreError) -> Self {
        CalendarError::Store(err)
    }
}

impl From<time::error::Format> for CalendarError {
    fn from(err: time::error::Format) -> Self {
        CalendarError::Format(err)
    }
}

impl From<SelectorError> for CalendarError {
    fn from(err: SelectorError) -> Self {
        CalendarError::Validation(err.to_string())
    }
}

impl fmt::Display for CalendarError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CalendarError::Validation(message) => write!(f, "{message}"),
            CalendarError::IdsExhausted => write!(f, "No event ids are left."),
            CalendarError::Store(e) => write!(f, "{e}"),
            CalendarError::Format(e) => write!(f, "Could not format date: {e}"),
        }
    }
}

impl std::error::Error for CalendarError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CalendarError::Validation(_) | CalendarError::IdsExhausted => None,
            CalendarError::Store(e) => Some(e),
            CalendarError::Format(e) => Some(e),
        }
    }
}

pub type Result<T> = std::result::Result<T, CalendarError>;

/*
 * One occurrence returned by a search. Owns a copy of its event so the caller
 * can keep results across later mutations of the collection.
 */
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OccurrenceHit {
    pub event: Event,
    pub index: u32,
    pub start: PrimitiveDateTime,
    pub end: PrimitiveDateTime,
}

impl From<Occurrence<'_>> for OccurrenceHit {
    fn from(occurrence: Occurrence<'_>) -> Self {
        OccurrenceHit {
            event: occurrence.event.clone(),
            index: occurrence.index,
            start: occurrence.start,
            end: occurrence.end,
        }
    }
}

/// Raw text from the event editor.
#[derive(Debug, Clone, Copy, Default)]
pub struct EventForm<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub start_time: &'a str,
    pub end_time: &'a str,
    pub recur_type: &'a str,
    pub recur_count: &'a str,
}

/*
 * Owns the live event collection and the view state, and is the single entry
 * point a presentation layer drives. Queries are delegated to `core::query`;
 * every mutation rewrites the persisted collection through the
 * `EventStoreOperations` gateway. The in-memory collection stays authoritative
 * when a save fails: the error is returned and the change is kept.
 */
pub struct CalendarController {
    pub(crate) events: Vec<Event>,
    pub(crate) view_state: CalendarViewState,
    pub(crate) revision: u64,
    pub(crate) upcoming_window_hours: i64,
    pub(crate) backup_file_name: String,
    pub(crate) event_store: Arc<dyn EventStoreOperations>,
}

impl CalendarController {
    /*
     * Loads the persisted collection and opens the view on `today` with the
     * mode and scale from `settings`. A failed load is logged and the
     * calendar starts empty.
     */
    pub fn new(
        event_store: Arc<dyn EventStoreOperations>,
        settings: &AppSettings,
        today: Date,
    ) -> Self {
        let events = event_store.load_events().unwrap_or_else(|e| {
            log::error!("CalendarController: Failed to load events, starting empty: {e}");
            Vec::new()
        });
        log::debug!("CalendarController: Started with {} events.", events.len());
        CalendarController {
            events,
            view_state: CalendarViewState::new(
                settings.default_mode,
                settings.default_scale,
                today,
            ),
            revision: 0,
            upcoming_window_hours: settings.upcoming_window_hours,
            backup_file_name: settings.backup_file_name.clone(),
            event_store,
        }
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Incremented on every change to the collection.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn mode(&self) -> ViewMode {
        self.view_state.mode()
    }

    pub fn set_mode(&mut self, mode: ViewMode) {
        log::trace!("CalendarController: View mode set to {mode:?}");
        self.view_state.set_mode(mode);
    }

    pub fn scale(&self) -> TimeScale {
        self.view_state.scale()
    }

    pub fn set_scale(&mut self, scale: TimeScale) {
        log::trace!("CalendarController: Time scale set to {scale:?}");
        self.view_state.set_scale(scale);
    }

    pub fn reference_date(&self) -> Date {
        self.view_state.reference_date()
    }

    pub fn set_reference_date(&mut self, date: Date) {
        self.view_state.set_reference_date(date);
    }

    pub fn navigate(&mut self, direction: NavigationDirection) {
        self.view_state.navigate(direction);
        log::trace!(
            "CalendarController: Navigated {direction:?} to {}",
            self.view_state.reference_date()
        );
    }

    pub fn start_of_range(&self) -> Date {
        self.view_state.start_of_range()
    }

    pub fn end_of_range(&self) -> Date {
        self.view_state.end_of_range()
    }

    pub fn set_reference_date_from_selectors(
        &mut self,
        month_index: u8,
        year_text: &str,
    ) -> Result<()> {
        self.view_state
            .set_reference_date_from_selectors(month_index, year_text)?;
        Ok(())
    }

    /// One past the largest id in use, or 1 for an empty calendar.
    pub fn next_event_id(&self) -> Result<EventId> {
        match self.events.iter().map(Event::id).max() {
            None => Ok(1),
            Some(max_id) => max_id.checked_add(1).ok_or_else(|| {
                log::warn!("CalendarController: Event id {max_id} is in use; no ids are left.");
                CalendarError::IdsExhausted
            }),
        }
    }

    fn persist(&self) -> Result<()> {
        self.event_store.save_events(&self.events).map_err(|e| {
            log::error!("CalendarController: Failed to save events: {e}");
            CalendarError::from(e)
        })
    }

    /// Replaces every event with the same id, then saves.
    pub fn add_or_update_event(&mut self, event: Event) -> Result<()> {
        let id = event.id();
        self.events.retain(|existing| existing.id() != id);
        self.events.push(event);
        self.revision += 1;
        log::debug!("CalendarController: Stored event {id}.");
        self.persist()
    }

    /*
     * Removes the first event with the id of `event` and saves. Returns whether
     * an event was removed; nothing is saved when none matched.
     */
    pub fn delete_event(&mut self, event: &Event) -> Result<bool> {
        let id = event.id();
        let Some(position) = self.events.iter().position(|existing| existing.id() == id) else {
            log::debug!(
                "CalendarController: Event {} not in collection; nothing deleted.",
                event.id()
            );
            return Ok(false);
        };
        self.events.remove(position);
        self.revision += 1;
        log::debug!("CalendarController: Deleted event {}.", event.id());
        self.persist()?;
        Ok(true)
    }

    /*
     * Validates editor input and creates (no `existing_id`) or replaces an
     * event on `target_date`. Returns the id of the stored event. Validation
     * failures leave the collection untouched.
     */
    pub fn process_event_upsert(
        &mut self,
        existing_id: Option<EventId>,
        target_date: Date,
        form: &EventForm<'_>,
    ) -> Result<EventId> {
        let invalid_time =
            |_: time::error::Parse| CalendarError::Validation(MSG_INVALID_TIME.to_string());
        let start_time = parse_hour_minute(form.start_time).map_err(invalid_time)?;
        let end_time = parse_hour_minute(form.end_time).map_err(invalid_time)?;
        let start = PrimitiveDateTime::new(target_date, start_time);
        let end = PrimitiveDateTime::new(target_date, end_time);
        if end <= start {
            return Err(CalendarError::Validation(MSG_END_BEFORE_START.to_string()));
        }

        let recur_type = RecurType::parse_known(form.recur_type).ok_or_else(|| {
            CalendarError::Validation(format!("Unknown recurrence type: {}", form.recur_type))
        })?;
        let recur_count = form
            .recur_count
            .trim()
            .parse::<u32>()
            .map_err(|_| CalendarError::Validation(MSG_INVALID_RECUR_COUNT.to_string()))?;

        let id = match existing_id {
            Some(id) => id,
            None => self.next_event_id()?,
        };
        let event = Event::new(id, form.title, form.description, start, end)
            .with_recurrence(recur_type, recur_count);
        self.add_or_update_event(event)?;
        Ok(id)
    }

    pub fn events_in_current_range(&self) -> Vec<&Event> {
        query::events_in_range(&self.events, self.start_of_range(), self.end_of_range())
    }

    pub fn events_on_date(&self, date: Date) -> Vec<&Event> {
        query::events_on_date(&self.events, date)
    }

    pub fn search_events(&self, text: &str) -> Vec<OccurrenceHit> {
        query::search(&self.events, text)
            .into_iter()
            .map(OccurrenceHit::from)
            .collect()
    }

    pub fn search_events_by_date(&self, start: Date, end: Date) -> Vec<OccurrenceHit> {
        query::search_by_date_range(&self.events, start, end)
            .into_iter()
            .map(OccurrenceHit::from)
            .collect()
    }

    /// Date-range search from `YYYY-MM-DD` text fields.
    pub fn process_date_range_search(
        &self,
        start_text: &str,
        end_text: &str,
    ) -> Result<Vec<OccurrenceHit>> {
        let invalid_date =
            |_: time::error::Parse| CalendarError::Validation(MSG_INVALID_DATE.to_string());
        let start = parse_iso_date(start_text).map_err(invalid_date)?;
        let end = parse_iso_date(end_text).map_err(invalid_date)?;
        Ok(self.search_events_by_date(start, end))
    }

    /// Events starting within the configured notification window after `now`.
    pub fn upcoming_events(&self, now: PrimitiveDateTime) -> Vec<&Event> {
        query::upcoming_events(&self.events, now, self.upcoming_window_hours)
    }

    pub fn has_conflict(&self, event: &Event) -> bool {
        query::has_conflict(&self.events, event)
    }

    pub fn check_for_conflict_on_date(&self, date: Date) -> bool {
        query::day_has_conflict(&self.events, date)
    }

    pub fn perform_backup(&self, destination: &Path) -> Result<BackupSummary> {
        let summary = self.event_store.backup(destination)?;
        log::debug!(
            "CalendarController: Backup of {} events written to {:?}.",
            summary.event_count,
            summary.path
        );
        Ok(summary)
    }

    /// `backup_file_name` from the settings, inside the store's data directory.
    pub fn default_backup_path(&self) -> PathBuf {
        self.event_store.data_dir().join(&self.backup_file_name)
    }

    pub fn perform_default_backup(&self) -> Result<BackupSummary> {
        self.perform_backup(&self.default_backup_path())
    }

    /*
     * Restores from a backup, either replacing the collection or appending to
     * it. Appended events keep their ids even when they collide. Returns the
     * new collection size. On error the collection is unchanged.
     */
    pub fn perform_restore(&mut self, source: &Path, append: bool) -> Result<usize> {
        let mode = if append {
            RestoreMode::Append
        } else {
            RestoreMode::Replace
        };
        let restored = self.event_store.restore(source, &self.events, mode)?;
        self.events = restored;
        self.revision += 1;
        log::debug!(
            "CalendarController: Restored from {source:?} ({mode:?}); {} events now.",
            self.events.len()
        );
        Ok(self.events.len())
    }

    pub fn notification_summary(&self, now: PrimitiveDateTime) -> Result<String> {
        Ok(reports::notification_summary(
            &self.events,
            now,
            self.upcoming_window_hours,
        )?)
    }

    pub fn search_results_summary(&self, hits: &[OccurrenceHit]) -> Result<String> {
        Ok(reports::search_results_summary(hits)?)
    }

    pub fn week_list_view(&self, week_start: Date) -> Result<String> {
        Ok(reports::week_list_view(&self.events, week_start)?)
    }
}
