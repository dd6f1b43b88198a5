//! Ratatui front-end: one screen with a tab per bucket, a popup form for
//! adding and editing, an inline title search and a notice footer.

mod app;
mod forms;
mod helpers;
mod terminal;

pub use app::{App, ShelfHandle};
pub use terminal::run_app;
