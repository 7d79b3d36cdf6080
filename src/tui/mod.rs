//! Terminal UI for the support chat client
//!
//! Ratatui rendering over the sync core; one async event loop.

mod app;
mod dialog;
mod forms;
mod help;
mod input;
mod log_view;
mod messages;
mod sidebar;
mod ui;

pub use app::run;
pub use log_view::LogBuffer;
