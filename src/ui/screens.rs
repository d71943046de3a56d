use anyhow::{Context, Result};
use rusqlite::Connection;

use crate::db::{list_books, BookQuery, BookSort};
use crate::models::BookListing;

/// The home screen: the current book query and the rows it produced.
pub(crate) struct BookListScreen {
    pub(crate) listings: Vec<BookListing>,
    pub(crate) query: BookQuery,
    pub(crate) selected: usize,
}

impl BookListScreen {
    pub(crate) fn new() -> Self {
        Self {
            listings: Vec::new(),
            query: BookQuery::new(),
            selected: 0,
        }
    }

    /// Re-run the query. When `focus_id` is given and still listed, the
    /// selection jumps to that book.
    pub(crate) fn reload(&mut self, conn: &Connection, focus_id: Option<i64>) -> Result<()> {
        self.listings = list_books(conn, &self.query).context("failed to load books")?;

        if let Some(id) = focus_id {
            if let Some(idx) = self.listings.iter().position(|l| l.book.id == id) {
                self.selected = idx;
                return Ok(());
            }
        }

        self.ensure_in_bounds();
        Ok(())
    }

    /// Replace the title filter. Blank input clears it.
    pub(crate) fn set_search(&mut self, needle: &str) {
        self.query = self.query.clone().title_contains(needle);
        self.selected = 0;
    }

    /// Rotate through no sort, title, author.
    pub(crate) fn cycle_sort(&mut self) -> Option<BookSort> {
        let next = match self.query.sort_order() {
            None => Some(BookSort::Title),
            Some(BookSort::Title) => Some(BookSort::Author),
            Some(BookSort::Author) => None,
        };
        self.query = self.query.clone().sort(next);
        next
    }

    pub(crate) fn current_listing(&self) -> Option<&BookListing> {
        self.listings.get(self.selected)
    }

    pub(crate) fn move_selection(&mut self, offset: isize) {
        if self.listings.is_empty() {
            return;
        }
        let len = self.listings.len() as isize;
        let new = (self.selected as isize + offset).clamp(0, len - 1);
        self.selected = new as usize;
    }

    pub(crate) fn select_first(&mut self) {
        self.selected = 0;
    }

    pub(crate) fn select_last(&mut self) {
        self.selected = self.listings.len().saturating_sub(1);
    }

    fn ensure_in_bounds(&mut self) {
        if self.listings.is_empty() {
            self.selected = 0;
        } else if self.selected >= self.listings.len() {
            self.selected = self.listings.len() - 1;
        }
    }

    /// Short description of the active search and sort for the header.
    pub(crate) fn describe_query(&self) -> String {
        let search = match self.query.search_term() {
            Some(term) => format!("title contains \"{term}\""),
            None => "all titles".to_string(),
        };
        let sort = match self.query.sort_order() {
            Some(sort) => format!("sorted by {}", sort.label()),
            None => "unsorted".to_string(),
        };
        format!("{search}  |  {sort}  |  {} books", self.listings.len())
    }
}
