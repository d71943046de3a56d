//! Book listing query. Search and sort are independent knobs that compose
//! into one `SELECT`, so the UI never assembles SQL itself.

use rusqlite::{params_from_iter, Connection};
use tracing::debug;

use crate::error::Result;
use crate::models::BookListing;

use super::books::book_from_row;

/// Ordering applied to the book list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookSort {
    Title,
    Author,
}

impl BookSort {
    /// Map a request parameter onto a sort. Unknown values mean "no sort".
    pub fn from_param(param: Option<&str>) -> Option<BookSort> {
        match param.map(str::trim) {
            Some("title") => Some(BookSort::Title),
            Some("author") => Some(BookSort::Author),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            BookSort::Title => "title",
            BookSort::Author => "author",
        }
    }
}

/// Optional title filter plus optional ordering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookQuery {
    title_contains: Option<String>,
    sort: Option<BookSort>,
}

impl BookQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict to titles containing `needle`, ignoring case. Blank input
    /// clears the filter.
    pub fn title_contains(mut self, needle: impl AsRef<str>) -> Self {
        let needle = needle.as_ref().trim();
        self.title_contains = if needle.is_empty() {
            None
        } else {
            Some(needle.to_string())
        };
        self
    }

    pub fn sort(mut self, sort: Option<BookSort>) -> Self {
        self.sort = sort;
        self
    }

    pub fn search_term(&self) -> Option<&str> {
        self.title_contains.as_deref()
    }

    pub fn sort_order(&self) -> Option<BookSort> {
        self.sort
    }

    /// Build the SQL text and its bound parameters. Every book is joined to
    /// its author for the display name; the join never changes the row count
    /// because `author_id` is a non-null foreign key.
    fn to_sql(&self) -> (String, Vec<String>) {
        let mut sql = String::from(
            "SELECT b.id, b.isbn, b.title, b.publication_year, b.author_id, a.name
             FROM book b
             INNER JOIN author a ON a.id = b.author_id",
        );
        let mut params = Vec::new();

        if let Some(needle) = &self.title_contains {
            sql.push_str(" WHERE b.title LIKE ?1 ESCAPE '\\'");
            params.push(format!("%{}%", escape_like(needle)));
        }

        sql.push_str(match self.sort {
            Some(BookSort::Title) => " ORDER BY b.title, b.id",
            Some(BookSort::Author) => " ORDER BY a.name, b.id",
            None => " ORDER BY b.id",
        });

        (sql, params)
    }
}

/// Run `query` and return the matching books with their author names.
pub fn list_books(conn: &Connection, query: &BookQuery) -> Result<Vec<BookListing>> {
    let (sql, params) = query.to_sql();
    let mut stmt = conn.prepare(&sql)?;

    let listings = stmt
        .query_map(params_from_iter(params.iter()), |row| {
            Ok(BookListing {
                book: book_from_row(row)?,
                author_name: row.get(5)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    debug!(
        search = query.search_term(),
        sort = query.sort.map(BookSort::label),
        count = listings.len(),
        "listed books"
    );
    Ok(listings)
}

/// Escape LIKE wildcards so the search term is matched literally.
fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}
