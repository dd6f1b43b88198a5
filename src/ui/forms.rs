use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::error::Field;
use crate::models::BookDraft;

/// Fields of the book form, in focus order.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub(crate) enum BookField {
    #[default]
    Title,
    Author,
    Year,
    Finished,
}

impl BookField {
    pub(crate) fn label(self) -> &'static str {
        match self {
            BookField::Title => "Title",
            BookField::Author => "Author",
            BookField::Year => "Year",
            BookField::Finished => "Finished",
        }
    }

    /// Row of the field inside the form popup.
    pub(crate) fn row(self) -> u16 {
        match self {
            BookField::Title => 0,
            BookField::Author => 1,
            BookField::Year => 2,
            BookField::Finished => 3,
        }
    }
}

impl From<Field> for BookField {
    fn from(field: Field) -> Self {
        match field {
            Field::Title => BookField::Title,
            Field::Author => BookField::Author,
            Field::Year => BookField::Year,
        }
    }
}

/// Input state for the add/edit popup. Values stay raw until submitted.
#[derive(Default, Clone, Debug)]
pub(crate) struct BookForm {
    pub(crate) title: String,
    pub(crate) author: String,
    pub(crate) year: String,
    pub(crate) is_complete: bool,
    pub(crate) active: BookField,
    pub(crate) error: Option<String>,
}

impl BookForm {
    /// Prefill from an existing book when entering edit mode.
    pub(crate) fn from_draft(draft: BookDraft) -> Self {
        Self {
            title: draft.title,
            author: draft.author,
            year: draft.year,
            is_complete: draft.is_complete,
            active: BookField::Title,
            error: None,
        }
    }

    pub(crate) fn draft(&self) -> BookDraft {
        BookDraft::new(
            self.title.clone(),
            self.author.clone(),
            self.year.clone(),
            self.is_complete,
        )
    }

    pub(crate) fn focus(&mut self, field: BookField) {
        self.active = field;
    }

    pub(crate) fn next_field(&mut self) {
        self.active = match self.active {
            BookField::Title => BookField::Author,
            BookField::Author => BookField::Year,
            BookField::Year => BookField::Finished,
            BookField::Finished => BookField::Title,
        };
    }

    pub(crate) fn previous_field(&mut self) {
        self.active = match self.active {
            BookField::Title => BookField::Finished,
            BookField::Author => BookField::Title,
            BookField::Year => BookField::Author,
            BookField::Finished => BookField::Year,
        };
    }

    /// Type into the active field. Space flips the checkbox when it has
    /// focus; other characters are ignored there.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        match self.active {
            BookField::Title => self.title.push(ch),
            BookField::Author => self.author.push(ch),
            BookField::Year => {
                if !(ch.is_ascii_digit() || ch == '-') {
                    return false;
                }
                self.year.push(ch);
            }
            BookField::Finished => {
                if ch != ' ' {
                    return false;
                }
                self.is_complete = !self.is_complete;
            }
        }
        true
    }

    pub(crate) fn backspace(&mut self) {
        match self.active {
            BookField::Title => {
                self.title.pop();
            }
            BookField::Author => {
                self.author.pop();
            }
            BookField::Year => {
                self.year.pop();
            }
            BookField::Finished => {}
        }
    }

    pub(crate) fn build_line(&self, field: BookField) -> Line<'static> {
        let is_active = self.active == field;
        let display = match field {
            BookField::Finished => {
                if self.is_complete {
                    "[x]".to_string()
                } else {
                    "[ ]".to_string()
                }
            }
            _ => {
                let value = self.text(field);
                if value.is_empty() {
                    "<required>".to_string()
                } else {
                    value.to_string()
                }
            }
        };

        let style = if is_active {
            Style::default().fg(Color::Yellow)
        } else if field != BookField::Finished && self.text(field).is_empty() {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };

        Line::from(vec![
            Span::raw(format!("{}: ", field.label())),
            Span::styled(display, style),
        ])
    }

    /// Cursor column offset for the active text field.
    pub(crate) fn value_len(&self, field: BookField) -> usize {
        match field {
            BookField::Finished => 1,
            _ => self.text(field).chars().count(),
        }
    }

    fn text(&self, field: BookField) -> &str {
        match field {
            BookField::Title => &self.title,
            BookField::Author => &self.author,
            BookField::Year => &self.year,
            BookField::Finished => "",
        }
    }
}

/// State for the inline title search.
#[derive(Default, Clone, Debug)]
pub(crate) struct SearchState {
    pub(crate) query: String,
}
