use rusqlite::{
    params, Connection, Error as SqlError, ErrorCode, OptionalExtension, Row, TransactionBehavior,
};
use tracing::info;

use crate::error::{CatalogError, Result};
use crate::models::{Book, DeleteOutcome};

use super::authors::{author_of, count_books_of};

pub(crate) fn book_from_row(row: &Row<'_>) -> rusqlite::Result<Book> {
    Ok(Book {
        id: row.get(0)?,
        isbn: row.get(1)?,
        title: row.get(2)?,
        publication_year: row.get(3)?,
        author_id: row.get(4)?,
    })
}

/// Coerce the raw publication year into an integer. Surrounding whitespace is
/// tolerated, anything else is rejected.
pub fn parse_publication_year(raw: &str) -> Result<i64> {
    raw.trim().parse::<i64>().map_err(|_| {
        CatalogError::Validation(format!(
            "Publication year must be a whole number, got '{}'.",
            raw.trim()
        ))
    })
}

/// Insert a book for an existing author. The year arrives as user text and is
/// validated before anything is written; an unknown `author_id` is rejected
/// by the foreign key and leaves the table untouched.
pub fn create_book(
    conn: &Connection,
    title: &str,
    isbn: &str,
    publication_year: &str,
    author_id: i64,
) -> Result<Book> {
    let publication_year = parse_publication_year(publication_year)?;

    conn.execute(
        "INSERT INTO book (isbn, title, publication_year, author_id) VALUES (?1, ?2, ?3, ?4)",
        params![isbn, title, publication_year, author_id],
    )
    .map_err(|err| map_foreign_key(err, author_id))?;

    let id = conn.last_insert_rowid();
    info!(book_id = id, author_id, title, "created book");
    Ok(Book {
        id,
        isbn: isbn.to_string(),
        title: title.to_string(),
        publication_year,
        author_id,
    })
}

/// Look up a single book.
pub fn get_book(conn: &Connection, id: i64) -> Result<Book> {
    conn.query_row(
        "SELECT id, isbn, title, publication_year, author_id FROM book WHERE id = ?1",
        params![id],
        book_from_row,
    )
    .optional()?
    .ok_or(CatalogError::NotFound { entity: "Book", id })
}

/// Delete a book and, if it was the author's last one, the author as well.
/// Both removals share one IMMEDIATE transaction: the write lock is taken
/// before the book is read, so a second deleter waits on the busy timeout
/// instead of failing its lock upgrade, and never sees a half-finished state.
pub fn delete_book(conn: &mut Connection, id: i64) -> Result<DeleteOutcome> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let book = get_book(&tx, id)?;
    let author = author_of(&tx, &book)?;

    tx.execute("DELETE FROM book WHERE id = ?1", params![book.id])?;

    let deleted_author = if count_books_of(&tx, &author)? == 0 {
        tx.execute("DELETE FROM author WHERE id = ?1", params![author.id])?;
        Some(author)
    } else {
        None
    };

    tx.commit()?;

    match &deleted_author {
        Some(author) => info!(
            book_id = book.id,
            author_id = author.id,
            "deleted book and its last author"
        ),
        None => info!(book_id = book.id, "deleted book"),
    }

    Ok(DeleteOutcome {
        book,
        deleted_author,
    })
}

/// Translate a foreign-key violation into a `Reference` error. Any other
/// failure stays a storage error.
fn map_foreign_key(err: SqlError, author_id: i64) -> CatalogError {
    let is_foreign_key = err.sqlite_error().is_some_and(|code| {
        code.code == ErrorCode::ConstraintViolation
            && code.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY
    });

    if is_foreign_key {
        CatalogError::Reference { author_id }
    } else {
        err.into()
    }
}
