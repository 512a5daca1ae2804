//! Terminal front-end: argument parsing, configuration, effect execution and
//! progress rendering around the core state machine.
mod app;
pub mod cli;
mod config;
mod effects;
mod ui;

pub use app::run_app;
