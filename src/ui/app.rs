use std::mem;

use anyhow::{Context, Result};
use crossterm::event::KeyCode;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;
use rusqlite::Connection;
use tracing::{debug, warn};

use crate::db::{
    author_of, count_books_of, create_author, create_book, delete_book, get_book, list_authors,
};
use crate::error::CatalogError;
use crate::models::BookListing;

use super::forms::{AuthorField, AuthorForm, BookField, BookForm, ConfirmBookDelete};
use super::helpers::{centered_rect, cursor_position, surface_error};
use super::screens::BookListScreen;

/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;
/// Height of the query summary above the book list.
const HEADER_HEIGHT: u16 = 3;
/// Rows skipped by PageUp/PageDown.
const PAGE_STEP: isize = 10;

/// Fine-grained modes layered over the book list.
enum Mode {
    Normal,
    Searching(SearchState),
    AddingAuthor(AuthorForm),
    AddingBook(BookForm),
    ConfirmDelete(ConfirmBookDelete),
}

/// State for an active inline title search.
struct SearchState {
    query: String,
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

/// Severity levels shown in the footer.
enum StatusKind {
    Info,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// Central application state. It owns the catalog connection for the life of
/// the session and hands it out by reference to each store call.
pub struct App {
    conn: Connection,
    books: BookListScreen,
    mode: Mode,
    status: Option<StatusMessage>,
}

impl App {
    /// Wrap an open catalog and load the initial book list.
    pub fn new(conn: Connection) -> Result<Self> {
        let mut books = BookListScreen::new();
        books.reload(&conn, None)?;
        Ok(Self {
            conn,
            books,
            mode: Mode::Normal,
            status: None,
        })
    }

    /// Hand the connection back so the caller can close it explicitly.
    pub fn into_connection(self) -> Connection {
        self.conn
    }

    /// Route a key press to the active mode. Returns `true` when the user asked
    /// to quit.
    pub fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        let mut exit = false;
        let mode = mem::replace(&mut self.mode, Mode::Normal);

        self.mode = match mode {
            Mode::Normal => self.handle_normal_key(code, &mut exit)?,
            Mode::Searching(state) => self.handle_search(code, state)?,
            Mode::AddingAuthor(form) => self.handle_add_author(code, form)?,
            Mode::AddingBook(form) => self.handle_add_book(code, form)?,
            Mode::ConfirmDelete(confirm) => self.handle_confirm_delete(code, confirm)?,
        };

        Ok(exit)
    }

    fn handle_normal_key(&mut self, code: KeyCode, exit: &mut bool) -> Result<Mode> {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => {
                *exit = true;
            }
            KeyCode::Up => self.books.move_selection(-1),
            KeyCode::Down => self.books.move_selection(1),
            KeyCode::PageUp => self.books.move_selection(-PAGE_STEP),
            KeyCode::PageDown => self.books.move_selection(PAGE_STEP),
            KeyCode::Home => self.books.select_first(),
            KeyCode::End => self.books.select_last(),
            KeyCode::Char('/') => {
                self.clear_status();
                let query = self
                    .books
                    .query
                    .search_term()
                    .unwrap_or_default()
                    .to_string();
                return Ok(Mode::Searching(SearchState { query }));
            }
            KeyCode::Char('s') => {
                let sort = self.books.cycle_sort();
                self.refresh_books(None);
                let message = match sort {
                    Some(sort) => format!("Sorted by {}.", sort.label()),
                    None => "Sorting cleared.".to_string(),
                };
                self.set_status(message, StatusKind::Info);
            }
            KeyCode::Char('r') => {
                self.refresh_books(None);
                self.set_status("Reloaded.", StatusKind::Info);
            }
            KeyCode::Char('a') => {
                self.clear_status();
                return Ok(Mode::AddingAuthor(AuthorForm::default()));
            }
            KeyCode::Char('b') => match list_authors(&self.conn) {
                Ok(authors) if authors.is_empty() => {
                    self.set_status("Add an author before adding books.", StatusKind::Error);
                }
                Ok(authors) => {
                    self.clear_status();
                    return Ok(Mode::AddingBook(BookForm::new(authors)));
                }
                Err(err) => self.report_error(err.into()),
            },
            KeyCode::Char('d') | KeyCode::Delete => {
                if let Some(listing) = self.books.current_listing().cloned() {
                    match self.prepare_delete(listing) {
                        Ok(confirm) => return Ok(Mode::ConfirmDelete(confirm)),
                        Err(err) => self.report_error(err),
                    }
                } else {
                    self.set_status("No book selected.", StatusKind::Error);
                }
            }
            _ => {}
        }
        Ok(Mode::Normal)
    }

    fn handle_search(&mut self, code: KeyCode, mut state: SearchState) -> Result<Mode> {
        match code {
            KeyCode::Esc => {
                self.books.set_search("");
                self.refresh_books(None);
                return Ok(Mode::Normal);
            }
            KeyCode::Enter => {
                return Ok(Mode::Normal);
            }
            KeyCode::Up => {
                self.books.move_selection(-1);
                return Ok(Mode::Searching(state));
            }
            KeyCode::Down => {
                self.books.move_selection(1);
                return Ok(Mode::Searching(state));
            }
            KeyCode::Backspace => {
                state.query.pop();
            }
            KeyCode::Char(ch) if !ch.is_control() => {
                state.query.push(ch);
            }
            _ => return Ok(Mode::Searching(state)),
        }

        self.books.set_search(&state.query);
        self.refresh_books(None);
        Ok(Mode::Searching(state))
    }

    fn handle_add_author(&mut self, code: KeyCode, mut form: AuthorForm) -> Result<Mode> {
        let mut keep_open = true;
        match code {
            KeyCode::Esc => {
                self.set_status("Add author cancelled.", StatusKind::Info);
                keep_open = false;
            }
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Down | KeyCode::Up => form.toggle_field(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => match self.save_new_author(&form) {
                Ok(_) => keep_open = false,
                Err(err) => {
                    let message = surface_error(&err);
                    form.error = Some(message.clone());
                    self.set_status(message, StatusKind::Error);
                }
            },
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }

        if keep_open {
            Ok(Mode::AddingAuthor(form))
        } else {
            Ok(Mode::Normal)
        }
    }

    fn handle_add_book(&mut self, code: KeyCode, mut form: BookForm) -> Result<Mode> {
        let mut keep_open = true;
        match code {
            KeyCode::Esc => {
                self.set_status("Add book cancelled.", StatusKind::Info);
                keep_open = false;
            }
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Down | KeyCode::Up => form.toggle_field(),
            KeyCode::Left if form.active == BookField::Author => form.cycle_author(-1),
            KeyCode::Right if form.active == BookField::Author => form.cycle_author(1),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => match self.save_new_book(&form) {
                Ok(_) => keep_open = false,
                Err(err) => {
                    let message = surface_error(&err);
                    form.error = Some(message.clone());
                    self.set_status(message, StatusKind::Error);
                }
            },
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }

        if keep_open {
            Ok(Mode::AddingBook(form))
        } else {
            Ok(Mode::Normal)
        }
    }

    fn handle_confirm_delete(&mut self, code: KeyCode, confirm: ConfirmBookDelete) -> Result<Mode> {
        match code {
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                self.set_status("Deletion cancelled.", StatusKind::Info);
                Ok(Mode::Normal)
            }
            KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => {
                match self.perform_delete(&confirm) {
                    Ok(_) => Ok(Mode::Normal),
                    Err(err) => {
                        // The book may already be gone; refresh so the list
                        // matches the store again.
                        self.refresh_books(None);
                        self.report_error(err);
                        Ok(Mode::Normal)
                    }
                }
            }
            _ => Ok(Mode::ConfirmDelete(confirm)),
        }
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let footer_height = FOOTER_HEIGHT.min(area.height);

        let (content_area, footer_area) = if area.height > footer_height {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(0), Constraint::Length(footer_height)])
                .split(area);
            (chunks[0], chunks[1])
        } else {
            (area, area)
        };

        self.draw_book_list(frame, content_area);

        if area.height >= footer_height {
            self.draw_footer(frame, footer_area);
        }

        match &self.mode {
            Mode::Searching(state) => self.draw_search_bar(frame, area, state),
            Mode::AddingAuthor(form) => self.draw_author_form(frame, area, form),
            Mode::AddingBook(form) => self.draw_book_form(frame, area, form),
            Mode::ConfirmDelete(confirm) => self.draw_confirm_delete(frame, area, confirm),
            Mode::Normal => {}
        }
    }

    fn draw_book_list(&self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(HEADER_HEIGHT), Constraint::Min(1)])
            .split(area);

        let header = Paragraph::new(Line::from(vec![
            Span::styled("Library", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(format!("  |  {}", self.books.describe_query())),
        ]))
        .alignment(Alignment::Left)
        .block(Block::default().borders(Borders::ALL).title("Books"));
        frame.render_widget(header, chunks[0]);

        if self.books.listings.is_empty() {
            let text = if self.books.query.search_term().is_some() {
                "No books match this search."
            } else {
                "No books yet. Press 'a' to add an author, then 'b' to add a book."
            };
            let message = Paragraph::new(text)
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL));
            frame.render_widget(message, chunks[1]);
            return;
        }

        let items: Vec<ListItem> = self
            .books
            .listings
            .iter()
            .map(|listing| {
                ListItem::new(Line::from(vec![
                    Span::raw(listing.display_line()),
                    Span::styled(
                        format!("  ISBN {}", listing.book.isbn),
                        Style::default().fg(Color::DarkGray),
                    ),
                ]))
            })
            .collect();

        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Yellow))
            .highlight_symbol("> ");

        let mut list_state = ListState::default();
        list_state.select(Some(self.books.selected));
        frame.render_stateful_widget(list, chunks[1], &mut list_state);
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let status_line = if let Some(status) = &self.status {
            Line::from(vec![Span::styled(status.text.clone(), status.kind.style())])
        } else {
            Line::from("")
        };

        let instructions = self.footer_instructions();

        let paragraph = Paragraph::new(vec![status_line, instructions]).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn draw_search_bar(&self, frame: &mut Frame, area: Rect, state: &SearchState) {
        let height = 3u16.min(area.height);
        let popup_area = Rect {
            x: area.x,
            y: area.y,
            width: area.width,
            height,
        };
        frame.render_widget(Clear, popup_area);

        let block = Block::default().borders(Borders::ALL).title("Search titles");
        let paragraph = Paragraph::new(Span::raw(format!("Search: {}", state.query)))
            .block(block.clone())
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, popup_area);

        let inner = block.inner(popup_area);
        frame.set_cursor_position(cursor_position(
            inner,
            "Search: ",
            state.query.chars().count(),
            0,
        ));
    }

    fn footer_instructions(&self) -> Line<'static> {
        let key_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        let keys: &[(&'static str, &'static str)] = match &self.mode {
            Mode::Searching(_) => &[
                ("[Type]", " Filter   "),
                ("[Enter]", " Keep   "),
                ("[Esc]", " Clear"),
            ],
            Mode::AddingAuthor(_) => &[
                ("[Tab]", " Next field   "),
                ("[Enter]", " Save   "),
                ("[Esc]", " Cancel"),
            ],
            Mode::AddingBook(_) => &[
                ("[Tab]", " Next field   "),
                ("[←→]", " Pick author   "),
                ("[Enter]", " Save   "),
                ("[Esc]", " Cancel"),
            ],
            Mode::ConfirmDelete(_) => &[("[y]", " Delete   "), ("[n]", " Keep")],
            Mode::Normal => &[
                ("[↑↓]", " Navigate   "),
                ("[/]", " Search   "),
                ("[s]", " Sort   "),
                ("[a]", " Add author   "),
                ("[b]", " Add book   "),
                ("[d]", " Delete   "),
                ("[q]", " Quit"),
            ],
        };

        let spans: Vec<Span<'static>> = keys
            .iter()
            .flat_map(|(key, action)| {
                [Span::styled(*key, key_style), Span::raw(*action)]
            })
            .collect();
        Line::from(spans)
    }

    fn draw_author_form(&self, frame: &mut Frame, area: Rect, form: &AuthorForm) {
        let popup_area = centered_rect(60, 40, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title("Add Author").borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let mut lines: Vec<Line> = AuthorField::ALL
            .iter()
            .map(|field| form.build_line(*field))
            .collect();
        lines.push(Line::from(""));
        lines.push(form_hint(form.error.as_deref()));

        let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);

        let row = AuthorField::ALL
            .iter()
            .position(|field| *field == form.active)
            .unwrap_or(0);
        let prefix = format!("{}: ", form.active.label());
        let len = form.value(form.active).chars().count();
        frame.set_cursor_position(cursor_position(inner, &prefix, len, row));
    }

    fn draw_book_form(&self, frame: &mut Frame, area: Rect, form: &BookForm) {
        let popup_area = centered_rect(70, 50, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title("Add Book").borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let mut lines: Vec<Line> = BookField::ALL
            .iter()
            .map(|field| form.build_line(*field))
            .collect();
        lines.push(Line::from(""));
        lines.push(form_hint(form.error.as_deref()));

        let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);

        if form.active != BookField::Author {
            let row = BookField::ALL
                .iter()
                .position(|field| *field == form.active)
                .unwrap_or(0);
            let prefix = format!("{}: ", form.active.label());
            let len = form.value_len(form.active);
            frame.set_cursor_position(cursor_position(inner, &prefix, len, row));
        }
    }

    fn draw_confirm_delete(&self, frame: &mut Frame, area: Rect, confirm: &ConfirmBookDelete) {
        let popup_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title("Delete Book").borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let consequence = if confirm.last_book {
            format!(
                "This is the last book by {}; the author will be removed too.",
                confirm.listing.author_name
            )
        } else {
            format!("{} keeps their other books.", confirm.listing.author_name)
        };

        let lines = vec![
            Line::from(format!("Delete '{}'?", confirm.listing.book.title)),
            Line::from(consequence),
            Line::from(""),
            Line::from(Span::styled(
                "Press Y to confirm or N / Esc to cancel.",
                Style::default().fg(Color::Gray),
            )),
        ];

        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Left)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn set_status<S: Into<String>>(&mut self, text: S, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    fn clear_status(&mut self) {
        self.status = None;
    }

    fn report_error(&mut self, err: anyhow::Error) {
        let rejected = err
            .downcast_ref::<CatalogError>()
            .is_some_and(CatalogError::is_rejected_input);
        if rejected {
            debug!(error = %err, "input rejected");
        } else {
            warn!(error = %err, "operation failed");
        }
        self.set_status(surface_error(&err), StatusKind::Error);
    }

    /// Reload the list, reporting failures in the footer instead of aborting.
    fn refresh_books(&mut self, focus_id: Option<i64>) {
        if let Err(err) = self.books.reload(&self.conn, focus_id) {
            self.report_error(err);
        }
    }

    fn save_new_author(&mut self, form: &AuthorForm) -> Result<()> {
        let (name, birth_date, date_of_death) = form.parse_inputs();
        let author = create_author(&self.conn, &name, &birth_date, &date_of_death)
            .context("failed to add author")?;
        self.set_status(
            format!("Author '{}' added successfully!", author.name),
            StatusKind::Info,
        );
        Ok(())
    }

    fn save_new_book(&mut self, form: &BookForm) -> Result<()> {
        let (title, isbn, publication_year, author_id) = form.parse_inputs()?;
        let book = create_book(&self.conn, &title, &isbn, &publication_year, author_id)
            .context("failed to add book")?;
        self.books.reload(&self.conn, Some(book.id))?;
        self.set_status(
            format!("Book '{}' added successfully!", book.title),
            StatusKind::Info,
        );
        Ok(())
    }

    /// Work out whether the selected book is its author's last one, so the
    /// confirmation can say what the delete will take with it.
    fn prepare_delete(&self, listing: BookListing) -> Result<ConfirmBookDelete> {
        let book = get_book(&self.conn, listing.book.id)?;
        let author = author_of(&self.conn, &book)?;
        let last_book = count_books_of(&self.conn, &author)? <= 1;
        Ok(ConfirmBookDelete { listing, last_book })
    }

    fn perform_delete(&mut self, confirm: &ConfirmBookDelete) -> Result<()> {
        let outcome = delete_book(&mut self.conn, confirm.listing.book.id)
            .context("failed to delete book")?;
        self.books.reload(&self.conn, None)?;
        self.set_status(outcome.summary(), StatusKind::Info);
        Ok(())
    }
}

/// Error line when the last save failed, otherwise the key hint.
fn form_hint(error: Option<&str>) -> Line<'static> {
    match error {
        Some(error) => Line::from(Span::styled(
            error.to_string(),
            Style::default().fg(Color::Red),
        )),
        None => Line::from(Span::styled(
            "Enter to save | Tab to switch | Esc to cancel",
            Style::default().fg(Color::Gray),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    use crate::db::{list_books, open_in_memory, BookQuery};

    /// Draw one frame into an in-memory buffer and flatten it to text.
    fn render(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(120, 30)).unwrap();
        terminal.draw(|frame| app.draw(frame)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    fn app_with_hobbit() -> App {
        let conn = open_in_memory().unwrap();
        let author = create_author(&conn, "Tolkien", "1892", "1973").unwrap();
        create_book(&conn, "The Hobbit", "0-000-0", "1937", author.id).unwrap();
        App::new(conn).unwrap()
    }

    fn type_text(app: &mut App, text: &str) {
        for ch in text.chars() {
            app.handle_key(KeyCode::Char(ch)).unwrap();
        }
    }

    fn status_text(app: &App) -> Option<&str> {
        app.status.as_ref().map(|status| status.text.as_str())
    }

    #[test]
    fn add_author_then_book_then_delete_cascades() {
        let mut app = App::new(open_in_memory().unwrap()).unwrap();

        app.handle_key(KeyCode::Char('a')).unwrap();
        type_text(&mut app, "J.R.R. Tolkien");
        app.handle_key(KeyCode::Tab).unwrap();
        type_text(&mut app, "1892");
        app.handle_key(KeyCode::Tab).unwrap();
        type_text(&mut app, "1973");
        app.handle_key(KeyCode::Enter).unwrap();
        assert!(matches!(app.mode, Mode::Normal));
        assert_eq!(
            status_text(&app),
            Some("Author 'J.R.R. Tolkien' added successfully!")
        );

        app.handle_key(KeyCode::Char('b')).unwrap();
        type_text(&mut app, "The Hobbit");
        app.handle_key(KeyCode::Tab).unwrap();
        type_text(&mut app, "0-000-0");
        app.handle_key(KeyCode::Tab).unwrap();
        type_text(&mut app, "1937");
        app.handle_key(KeyCode::Enter).unwrap();
        assert!(matches!(app.mode, Mode::Normal));
        assert_eq!(app.books.listings.len(), 1);
        assert_eq!(app.books.listings[0].author_name, "J.R.R. Tolkien");

        app.handle_key(KeyCode::Char('d')).unwrap();
        match &app.mode {
            Mode::ConfirmDelete(confirm) => assert!(confirm.last_book),
            _ => panic!("expected delete confirmation"),
        }
        app.handle_key(KeyCode::Char('y')).unwrap();

        assert_eq!(
            status_text(&app),
            Some("Book 'The Hobbit' and author 'J.R.R. Tolkien' deleted successfully.")
        );
        assert!(app.books.listings.is_empty());
        assert!(list_authors(&app.conn).unwrap().is_empty());
    }

    #[test]
    fn bad_year_keeps_form_open_with_error() {
        let conn = open_in_memory().unwrap();
        create_author(&conn, "Adams", "1952", "2001").unwrap();
        let mut app = App::new(conn).unwrap();

        app.handle_key(KeyCode::Char('b')).unwrap();
        type_text(&mut app, "Mostly Harmless");
        app.handle_key(KeyCode::Tab).unwrap();
        app.handle_key(KeyCode::Tab).unwrap();
        type_text(&mut app, "nineteen");
        app.handle_key(KeyCode::Enter).unwrap();

        match &app.mode {
            Mode::AddingBook(form) => assert!(form.error.is_some()),
            _ => panic!("form should stay open"),
        }
        assert!(list_books(&app.conn, &BookQuery::new()).unwrap().is_empty());
    }

    #[test]
    fn add_book_without_authors_is_refused() {
        let mut app = App::new(open_in_memory().unwrap()).unwrap();
        app.handle_key(KeyCode::Char('b')).unwrap();
        assert!(matches!(app.mode, Mode::Normal));
        assert_eq!(status_text(&app), Some("Add an author before adding books."));
    }

    #[test]
    fn search_filters_live_and_escape_clears() {
        let conn = open_in_memory().unwrap();
        let author = create_author(&conn, "Tolkien", "", "").unwrap();
        create_book(&conn, "The Hobbit", "1", "1937", author.id).unwrap();
        create_book(&conn, "Farmer Giles", "2", "1949", author.id).unwrap();
        let mut app = App::new(conn).unwrap();

        app.handle_key(KeyCode::Char('/')).unwrap();
        type_text(&mut app, "HOB");
        assert_eq!(app.books.listings.len(), 1);

        app.handle_key(KeyCode::Esc).unwrap();
        assert!(matches!(app.mode, Mode::Normal));
        assert_eq!(app.books.listings.len(), 2);
    }

    #[test]
    fn deleting_one_of_two_books_keeps_author() {
        let conn = open_in_memory().unwrap();
        let author = create_author(&conn, "Tolkien", "", "").unwrap();
        create_book(&conn, "The Hobbit", "1", "1937", author.id).unwrap();
        create_book(&conn, "Farmer Giles", "2", "1949", author.id).unwrap();
        let mut app = App::new(conn).unwrap();

        app.handle_key(KeyCode::Char('d')).unwrap();
        match &app.mode {
            Mode::ConfirmDelete(confirm) => assert!(!confirm.last_book),
            _ => panic!("expected delete confirmation"),
        }
        app.handle_key(KeyCode::Enter).unwrap();

        assert_eq!(
            status_text(&app),
            Some("Book 'The Hobbit' deleted successfully.")
        );
        assert_eq!(list_authors(&app.conn).unwrap(), vec![author]);
    }

    #[test]
    fn quit_only_from_normal_mode() {
        let mut app = App::new(open_in_memory().unwrap()).unwrap();
        app.handle_key(KeyCode::Char('a')).unwrap();
        assert!(!app.handle_key(KeyCode::Char('q')).unwrap());
        app.handle_key(KeyCode::Esc).unwrap();
        assert!(app.handle_key(KeyCode::Char('q')).unwrap());
    }

    #[test]
    fn normal_mode_renders_listing_header_and_key_hints() {
        let app = app_with_hobbit();
        let screen = render(&app);
        assert!(screen.contains("The Hobbit (1937) by Tolkien"));
        assert!(screen.contains("all titles  |  unsorted  |  1 books"));
        assert!(screen.contains("[a] Add author"));
    }

    #[test]
    fn empty_catalog_renders_hint() {
        let app = App::new(open_in_memory().unwrap()).unwrap();
        assert!(render(&app).contains("No books yet."));
    }

    #[test]
    fn search_mode_renders_search_bar() {
        let mut app = app_with_hobbit();
        app.handle_key(KeyCode::Char('/')).unwrap();
        type_text(&mut app, "hob");
        let screen = render(&app);
        assert!(screen.contains("Search: hob"));
        assert!(screen.contains("[Esc] Clear"));
    }

    #[test]
    fn author_form_renders_fields() {
        let mut app = app_with_hobbit();
        app.handle_key(KeyCode::Char('a')).unwrap();
        type_text(&mut app, "Le Guin");
        let screen = render(&app);
        assert!(screen.contains("Add Author"));
        assert!(screen.contains("Name: Le Guin"));
        assert!(screen.contains("Born: <any text>"));
    }

    #[test]
    fn book_form_renders_author_picker_and_error() {
        let mut app = app_with_hobbit();
        app.handle_key(KeyCode::Char('b')).unwrap();
        app.handle_key(KeyCode::Tab).unwrap();
        app.handle_key(KeyCode::Tab).unwrap();
        type_text(&mut app, "soon");
        app.handle_key(KeyCode::Enter).unwrap();
        let screen = render(&app);
        assert!(screen.contains("Add Book"));
        assert!(screen.contains("Author: < Tolkien >"));
        assert!(screen.contains("Publication year must be a whole number"));
    }

    #[test]
    fn delete_confirmation_warns_about_last_book() {
        let mut app = app_with_hobbit();
        app.handle_key(KeyCode::Char('d')).unwrap();
        let screen = render(&app);
        assert!(screen.contains("Delete 'The Hobbit'?"));
        assert!(screen.contains("the author will be removed too."));
    }

    #[test]
    fn long_search_query_does_not_break_rendering() {
        let mut app = app_with_hobbit();
        app.handle_key(KeyCode::Char('/')).unwrap();
        type_text(&mut app, &"x".repeat(500));
        assert!(render(&app).contains("Search titles"));
    }
}
