/*
 * The application logic layer: `CalendarController`, which owns the event
 * collection and view state and is driven by the presentation layer, plus the
 * plain-text reports it renders. Unit tests for the controller are in
 * `handler_tests.rs`.
 */
pub mod handler;
pub mod reports;


pub use handler::{CalendarController, CalendarError, EventForm, OccurrenceHit};
