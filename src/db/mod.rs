//! Catalog store: SQLite persistence for authors and books, split across
//! logical submodules.

mod authors;
mod books;
mod connection;
mod query;

pub use authors::{author_of, count_books_of, create_author, get_author, list_authors};
pub use books::{create_book, delete_book, get_book, parse_publication_year};
pub use connection::{close_catalog, open_catalog, open_in_memory};
pub use query::{list_books, BookQuery, BookSort};
