/*
 * The platform-agnostic core of the calendar: the event model and recurrence
 * arithmetic, the pure query engine, the line codec for persisted events, the
 * file-backed event store and backup archiver, the view state, and settings.
 * Storage concerns sit behind `*Operations` traits so the controller can be
 * tested against mocks.
 */
pub mod archiver;
pub mod checksum_utils;
pub mod config;
pub mod date_utils;
pub mod event_codec;
pub mod event_store;
pub mod models;
pub mod path_utils;
pub mod query;
pub mod recurrence;
pub mod view_state;

// Re-export key structures and enums
pub use models::{Event, EventId, Occurrence, RecurType};
pub use recurrence::RecurrenceUnit;
pub use view_state::{CalendarViewState, NavigationDirection, SelectorError, TimeScale, ViewMode};

// Re-export persistence related items
pub use archiver::{ArchiveEntry, ArchiveError, ArchiverOperations, CoreArchiver};
pub use event_store::{
    BackupSummary, CoreEventStore, EventStoreError, EventStoreOperations, RestoreMode,
};

// Re-export config related items
pub use config::{AppSettings, ConfigError, ConfigManagerOperations, CoreConfigManager, LogLevel};
