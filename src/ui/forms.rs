use anyhow::{anyhow, Result};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::models::{Author, BookListing};

/// Render a `Label: value` line, highlighting the focused field and ghosting
/// empty ones with `placeholder`.
fn field_line(
    field_name: &str,
    value: &str,
    placeholder: &str,
    is_active: bool,
) -> Line<'static> {
    let display = if value.is_empty() {
        placeholder.to_string()
    } else {
        value.to_string()
    };

    let style = if is_active {
        Style::default().fg(Color::Yellow)
    } else if value.is_empty() {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default()
    };

    Line::from(vec![
        Span::raw(format!("{field_name}: ")),
        Span::styled(display, style),
    ])
}

/// Input state for the "add author" form.
#[derive(Default, Clone)]
pub(crate) struct AuthorForm {
    pub(crate) name: String,
    pub(crate) birth_date: String,
    pub(crate) date_of_death: String,
    pub(crate) active: AuthorField,
    pub(crate) error: Option<String>,
}

#[derive(Copy, Clone, PartialEq, Eq, Default, Debug)]
pub(crate) enum AuthorField {
    #[default]
    Name,
    BirthDate,
    DateOfDeath,
}

impl AuthorField {
    pub(crate) const ALL: [AuthorField; 3] = [
        AuthorField::Name,
        AuthorField::BirthDate,
        AuthorField::DateOfDeath,
    ];

    pub(crate) fn label(self) -> &'static str {
        match self {
            AuthorField::Name => "Name",
            AuthorField::BirthDate => "Born",
            AuthorField::DateOfDeath => "Died",
        }
    }
}

impl AuthorForm {
    /// Cycle focus across the three author fields.
    pub(crate) fn toggle_field(&mut self) {
        self.active = match self.active {
            AuthorField::Name => AuthorField::BirthDate,
            AuthorField::BirthDate => AuthorField::DateOfDeath,
            AuthorField::DateOfDeath => AuthorField::Name,
        };
    }

    fn value_mut(&mut self, field: AuthorField) -> &mut String {
        match field {
            AuthorField::Name => &mut self.name,
            AuthorField::BirthDate => &mut self.birth_date,
            AuthorField::DateOfDeath => &mut self.date_of_death,
        }
    }

    pub(crate) fn value(&self, field: AuthorField) -> &str {
        match field {
            AuthorField::Name => &self.name,
            AuthorField::BirthDate => &self.birth_date,
            AuthorField::DateOfDeath => &self.date_of_death,
        }
    }

    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        self.value_mut(self.active).push(ch);
        true
    }

    pub(crate) fn backspace(&mut self) {
        self.value_mut(self.active).pop();
    }

    /// Author fields are free text; they are handed to the store as typed.
    pub(crate) fn parse_inputs(&self) -> (String, String, String) {
        (
            self.name.clone(),
            self.birth_date.clone(),
            self.date_of_death.clone(),
        )
    }

    pub(crate) fn build_line(&self, field: AuthorField) -> Line<'static> {
        let placeholder = match field {
            AuthorField::Name => "<name>",
            AuthorField::BirthDate | AuthorField::DateOfDeath => "<any text>",
        };
        field_line(
            field.label(),
            self.value(field),
            placeholder,
            self.active == field,
        )
    }
}

/// Input state for the "add book" form. The author is picked from the list
/// loaded when the form opens rather than typed as an id.
#[derive(Default, Clone)]
pub(crate) struct BookForm {
    pub(crate) title: String,
    pub(crate) isbn: String,
    pub(crate) publication_year: String,
    pub(crate) authors: Vec<Author>,
    pub(crate) author_index: usize,
    pub(crate) active: BookField,
    pub(crate) error: Option<String>,
}

#[derive(Copy, Clone, PartialEq, Eq, Default, Debug)]
pub(crate) enum BookField {
    #[default]
    Title,
    Isbn,
    Year,
    Author,
}

impl BookField {
    pub(crate) const ALL: [BookField; 4] = [
        BookField::Title,
        BookField::Isbn,
        BookField::Year,
        BookField::Author,
    ];

    pub(crate) fn label(self) -> &'static str {
        match self {
            BookField::Title => "Title",
            BookField::Isbn => "ISBN",
            BookField::Year => "Year",
            BookField::Author => "Author",
        }
    }
}

impl BookForm {
    pub(crate) fn new(authors: Vec<Author>) -> Self {
        Self {
            authors,
            ..Self::default()
        }
    }

    pub(crate) fn toggle_field(&mut self) {
        self.active = match self.active {
            BookField::Title => BookField::Isbn,
            BookField::Isbn => BookField::Year,
            BookField::Year => BookField::Author,
            BookField::Author => BookField::Title,
        };
    }

    /// Step through the author list, wrapping at both ends.
    pub(crate) fn cycle_author(&mut self, offset: isize) {
        if self.authors.is_empty() {
            return;
        }
        let len = self.authors.len() as isize;
        let next = (self.author_index as isize + offset).rem_euclid(len);
        self.author_index = next as usize;
    }

    pub(crate) fn selected_author(&self) -> Option<&Author> {
        self.authors.get(self.author_index)
    }

    fn text_mut(&mut self, field: BookField) -> Option<&mut String> {
        match field {
            BookField::Title => Some(&mut self.title),
            BookField::Isbn => Some(&mut self.isbn),
            BookField::Year => Some(&mut self.publication_year),
            BookField::Author => None,
        }
    }

    /// Character length of the active text field, used to place the cursor.
    pub(crate) fn value_len(&self, field: BookField) -> usize {
        match field {
            BookField::Title => self.title.chars().count(),
            BookField::Isbn => self.isbn.chars().count(),
            BookField::Year => self.publication_year.chars().count(),
            BookField::Author => 0,
        }
    }

    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        match self.text_mut(self.active) {
            Some(value) => {
                value.push(ch);
                true
            }
            None => false,
        }
    }

    pub(crate) fn backspace(&mut self) {
        if let Some(value) = self.text_mut(self.active) {
            value.pop();
        }
    }

    /// Collect the values for `create_book`. The year stays raw text so the
    /// store performs the integer coercion.
    pub(crate) fn parse_inputs(&self) -> Result<(String, String, String, i64)> {
        let author = self
            .selected_author()
            .ok_or_else(|| anyhow!("Add an author before adding books."))?;
        Ok((
            self.title.clone(),
            self.isbn.clone(),
            self.publication_year.clone(),
            author.id,
        ))
    }

    pub(crate) fn build_line(&self, field: BookField) -> Line<'static> {
        let is_active = self.active == field;
        match field {
            BookField::Title => field_line(field.label(), &self.title, "<title>", is_active),
            BookField::Isbn => field_line(field.label(), &self.isbn, "<isbn>", is_active),
            BookField::Year => {
                field_line(field.label(), &self.publication_year, "<year>", is_active)
            }
            BookField::Author => {
                let name = match self.selected_author() {
                    Some(author) => format!("< {} >", author.name),
                    None => String::new(),
                };
                field_line(field.label(), &name, "<no authors yet>", is_active)
            }
        }
    }
}

/// State for confirming a book deletion. `last_book` warns that the author
/// will be removed together with the book.
#[derive(Clone)]
pub(crate) struct ConfirmBookDelete {
    pub(crate) listing: BookListing,
    pub(crate) last_book: bool,
}
