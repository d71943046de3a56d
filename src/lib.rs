//! Core library surface for the Bookshelf Manager.
//!
//! The catalog store (`db`) owns authors and books and enforces the one
//! cascade rule: deleting an author's last book deletes the author. The `ui`
//! module is a thin terminal front-end over it.
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod models;
pub mod ui;

/// Catalog lifecycle and operations, re-exported for the binary and tests.
pub use db::{
    author_of, close_catalog, count_books_of, create_author, create_book, delete_book, get_author,
    get_book, list_authors, list_books, open_catalog, open_in_memory, BookQuery, BookSort,
};

pub use error::{CatalogError, Result};
pub use models::{Author, Book, BookListing, DeleteOutcome};

/// The interactive application entry point and state container.
pub use ui::{run_app, App};
