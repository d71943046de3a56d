use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::{debug, info};

use crate::error::{CatalogError, Result};
use crate::models::{Author, Book};

fn author_from_row(row: &Row<'_>) -> rusqlite::Result<Author> {
    Ok(Author {
        id: row.get(0)?,
        name: row.get(1)?,
        birth_date: row.get(2)?,
        date_of_death: row.get(3)?,
    })
}

/// Insert a new author and echo the hydrated struct. Dates are kept as the
/// raw text the user typed.
pub fn create_author(
    conn: &Connection,
    name: &str,
    birth_date: &str,
    date_of_death: &str,
) -> Result<Author> {
    conn.execute(
        "INSERT INTO author (name, birth_date, date_of_death) VALUES (?1, ?2, ?3)",
        params![name, birth_date, date_of_death],
    )?;

    let id = conn.last_insert_rowid();
    info!(author_id = id, name, "created author");
    Ok(Author {
        id,
        name: name.to_string(),
        birth_date: birth_date.to_string(),
        date_of_death: date_of_death.to_string(),
    })
}

/// Every author in insertion order. Feeds the author picker of the book form.
pub fn list_authors(conn: &Connection) -> Result<Vec<Author>> {
    let mut stmt = conn
        .prepare("SELECT id, name, birth_date, date_of_death FROM author ORDER BY id")?;

    let authors = stmt
        .query_map([], author_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    debug!(count = authors.len(), "listed authors");
    Ok(authors)
}

/// Look up a single author.
pub fn get_author(conn: &Connection, id: i64) -> Result<Author> {
    find_author(conn, id)?.ok_or(CatalogError::NotFound {
        entity: "Author",
        id,
    })
}

/// The author that owns `book`.
pub fn author_of(conn: &Connection, book: &Book) -> Result<Author> {
    get_author(conn, book.author_id)
}

/// Number of books that still reference `author`.
pub fn count_books_of(conn: &Connection, author: &Author) -> Result<i64> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM book WHERE author_id = ?1",
        params![author.id],
        |row| row.get(0),
    )?;
    Ok(count)
}

pub(crate) fn find_author(conn: &Connection, id: i64) -> Result<Option<Author>> {
    let author = conn
        .query_row(
            "SELECT id, name, birth_date, date_of_death FROM author WHERE id = ?1",
            params![id],
            author_from_row,
        )
        .optional()?;
    Ok(author)
}
