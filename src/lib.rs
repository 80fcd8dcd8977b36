/*
 * Desk calendar core: the event model, recurrence expansion and query engine
 * (`core`), and the controller a presentation layer drives (`app_logic`).
 */
pub mod app_logic;
pub mod core;
