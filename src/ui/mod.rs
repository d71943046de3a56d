//! Ratatui front-end: a book list with search and sort, modal forms for new
//! authors and books, and a delete confirmation.

mod app;
mod forms;
mod helpers;
mod screens;
mod terminal;

pub use app::App;
pub use terminal::run_app;
