use std::sync::{Arc, Barrier};
use std::thread;

use bookshelf_manager::{
    close_catalog, count_books_of, create_author, create_book, delete_book, get_book,
    list_authors, list_books, open_catalog, BookQuery, BookSort, CatalogError,
};
use tempfile::TempDir;

#[test]
fn catalog_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("library.sqlite");

    let conn = open_catalog(&path).unwrap();
    let author = create_author(&conn, "J.R.R. Tolkien", "1892", "1973").unwrap();
    let book = create_book(&conn, "The Hobbit", "0-000-0", "1937", author.id).unwrap();
    close_catalog(conn).unwrap();

    let conn = open_catalog(&path).unwrap();
    assert_eq!(list_authors(&conn).unwrap(), vec![author]);
    assert_eq!(get_book(&conn, book.id).unwrap(), book);
}

#[test]
fn sole_book_delete_removes_author_on_disk() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("library.sqlite");

    let mut conn = open_catalog(&path).unwrap();
    let author = create_author(&conn, "J.R.R. Tolkien", "1892", "1973").unwrap();
    assert_eq!(author.id, 1);
    let book = create_book(&conn, "The Hobbit", "0-000-0", "1937", author.id).unwrap();
    assert_eq!(book.id, 1);

    let outcome = delete_book(&mut conn, 1).unwrap();
    assert_eq!(outcome.deleted_author.as_ref().map(|a| a.id), Some(1));
    close_catalog(conn).unwrap();

    let conn = open_catalog(&path).unwrap();
    assert!(list_authors(&conn).unwrap().is_empty());
    assert!(list_books(&conn, &BookQuery::new()).unwrap().is_empty());
}

#[test]
fn shared_author_survives_partial_delete() {
    let dir = TempDir::new().unwrap();
    let mut conn = open_catalog(&dir.path().join("library.sqlite")).unwrap();

    let author = create_author(&conn, "J.R.R. Tolkien", "1892", "1973").unwrap();
    create_book(&conn, "The Hobbit", "0-000-0", "1937", author.id).unwrap();
    let kept = create_book(&conn, "The Silmarillion", "0-000-1", "1977", author.id).unwrap();

    let outcome = delete_book(&mut conn, 1).unwrap();
    assert!(outcome.deleted_author.is_none());
    assert_eq!(outcome.summary(), "Book 'The Hobbit' deleted successfully.");

    let books = list_books(&conn, &BookQuery::new()).unwrap();
    assert_eq!(books.len(), 1);
    assert_eq!(books[0].book, kept);
    assert_eq!(books[0].author_name, "J.R.R. Tolkien");
    assert_eq!(count_books_of(&conn, &author).unwrap(), 1);
}

#[test]
fn rejected_inserts_leave_no_rows() {
    let dir = TempDir::new().unwrap();
    let conn = open_catalog(&dir.path().join("library.sqlite")).unwrap();

    let err = create_book(&conn, "Ghost", "0", "2000", 5).unwrap_err();
    assert!(matches!(err, CatalogError::Reference { author_id: 5 }));
    assert!(err.is_rejected_input());

    let author = create_author(&conn, "Someone", "", "").unwrap();
    let err = create_book(&conn, "Ghost", "0", "MMXX", author.id).unwrap_err();
    assert!(matches!(err, CatalogError::Validation(_)));

    assert!(list_books(&conn, &BookQuery::new()).unwrap().is_empty());
}

#[test]
fn search_and_sort_over_a_mixed_catalog() {
    let dir = TempDir::new().unwrap();
    let conn = open_catalog(&dir.path().join("library.sqlite")).unwrap();

    let pratchett = create_author(&conn, "Terry Pratchett", "1948", "2015").unwrap();
    let austen = create_author(&conn, "Jane Austen", "1775", "1817").unwrap();
    create_book(&conn, "The Colour of Magic", "1", "1983", pratchett.id).unwrap();
    create_book(&conn, "Emma", "2", "1815", austen.id).unwrap();
    create_book(&conn, "Mort", "3", "1987", pratchett.id).unwrap();
    create_book(&conn, "Persuasion", "4", "1817", austen.id).unwrap();

    let by_author = list_books(&conn, &BookQuery::new().sort(Some(BookSort::Author))).unwrap();
    let names: Vec<&str> = by_author.iter().map(|l| l.author_name.as_str()).collect();
    assert_eq!(
        names,
        ["Jane Austen", "Jane Austen", "Terry Pratchett", "Terry Pratchett"]
    );

    let query = BookQuery::new()
        .title_contains("O")
        .sort(BookSort::from_param(Some("title")));
    let titles: Vec<String> = list_books(&conn, &query)
        .unwrap()
        .into_iter()
        .map(|l| l.book.title)
        .collect();
    assert_eq!(titles, ["Mort", "Persuasion", "The Colour of Magic"]);
}

#[test]
fn concurrent_deletes_of_an_authors_last_two_books_both_succeed() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("library.sqlite");
    let setup = open_catalog(&path).unwrap();

    for run in 0..50 {
        let author = create_author(&setup, &format!("Author {run}"), "", "").unwrap();
        let first = create_book(&setup, "First", "1", "2000", author.id).unwrap();
        let second = create_book(&setup, "Second", "2", "2001", author.id).unwrap();

        let barrier = Arc::new(Barrier::new(2));
        let handles: Vec<_> = [first.id, second.id]
            .into_iter()
            .map(|book_id| {
                let mut conn = open_catalog(&path).unwrap();
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    delete_book(&mut conn, book_id)
                        .map(|outcome| outcome.deleted_author.is_some())
                })
            })
            .collect();

        let cascaded: Vec<bool> = handles
            .into_iter()
            .map(|handle| handle.join().unwrap().unwrap())
            .collect();

        assert_eq!(cascaded.iter().filter(|removed| **removed).count(), 1);
        assert!(list_authors(&setup)
            .unwrap()
            .iter()
            .all(|listed| listed.id != author.id));
    }

    assert!(list_books(&setup, &BookQuery::new()).unwrap().is_empty());
}
