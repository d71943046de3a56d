//! Domain models that mirror the SQLite schema. They stay plain data holders;
//! every relationship is resolved through an explicit store query instead of
//! a live object graph.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
/// A book author. Dates are stored exactly as typed.
pub struct Author {
    /// Primary key assigned by SQLite.
    pub id: i64,
    pub name: String,
    pub birth_date: String,
    pub date_of_death: String,
}

impl fmt::Display for Author {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A catalogued book. `author_id` always names an existing author.
pub struct Book {
    pub id: i64,
    pub isbn: String,
    pub title: String,
    pub publication_year: i64,
    pub author_id: i64,
}

impl fmt::Display for Book {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Row returned by the book listing: the book plus its author's name so the
/// list view never has to look the author up again.
pub struct BookListing {
    pub book: Book,
    pub author_name: String,
}

impl BookListing {
    /// `Title (Year) by Author` line used by the list view.
    pub fn display_line(&self) -> String {
        format!(
            "{} ({}) by {}",
            self.book.title, self.book.publication_year, self.author_name
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Result of deleting a book. `deleted_author` is set when the book was the
/// author's last one and the author went with it.
pub struct DeleteOutcome {
    pub book: Book,
    pub deleted_author: Option<Author>,
}

impl DeleteOutcome {
    /// Status line shown after the delete completes.
    pub fn summary(&self) -> String {
        match &self.deleted_author {
            Some(author) => format!(
                "Book '{}' and author '{}' deleted successfully.",
                self.book.title, author.name
            ),
            None => format!("Book '{}' deleted successfully.", self.book.title),
        }
    }
}
