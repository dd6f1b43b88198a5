//! Domain models passed between the store, the persistence bridge and the
//! TUI. These stay plain data holders; the rules about which values are
//! acceptable live in [`BookDraft::validate`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Field, Result, ShelfError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// A single book on the shelf. Serializes to the persisted JSON shape
/// (`id`, `title`, `author`, `year`, `isComplete`).
pub struct BookRecord {
    /// Assigned once by the store's id source and never changed afterwards.
    pub id: i64,
    pub title: String,
    pub author: String,
    /// Publication year. Kept signed so historical works can be catalogued.
    pub year: i32,
    /// Whether the book has been read to the end.
    pub is_complete: bool,
}

impl BookRecord {
    /// Overwrite every editable field while keeping the identity intact.
    pub(crate) fn apply(&mut self, fields: BookFields) {
        self.title = fields.title;
        self.author = fields.author;
        self.year = fields.year;
        self.is_complete = fields.is_complete;
    }
}

impl fmt::Display for BookRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}) by {}", self.title, self.year, self.author)
    }
}

/// Validated values for the editable fields of a book.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookFields {
    pub title: String,
    pub author: String,
    pub year: i32,
    pub is_complete: bool,
}

/// Raw form input as typed by the user. Nothing here has been trimmed or
/// parsed yet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookDraft {
    pub title: String,
    pub author: String,
    pub year: String,
    pub is_complete: bool,
}

impl BookDraft {
    pub fn new(
        title: impl Into<String>,
        author: impl Into<String>,
        year: impl Into<String>,
        is_complete: bool,
    ) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            year: year.into(),
            is_complete,
        }
    }

    /// Prefill a draft from an existing record, as the edit action does.
    pub fn from_record(book: &BookRecord) -> Self {
        Self {
            title: book.title.clone(),
            author: book.author.clone(),
            year: book.year.to_string(),
            is_complete: book.is_complete,
        }
    }

    /// Trim and parse the inputs. The first offending field wins.
    pub fn validate(&self) -> Result<BookFields> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(ShelfError::validation(Field::Title, "Title is required."));
        }
        let author = self.author.trim();
        if author.is_empty() {
            return Err(ShelfError::validation(Field::Author, "Author is required."));
        }
        let year_raw = self.year.trim();
        if year_raw.is_empty() {
            return Err(ShelfError::validation(Field::Year, "Year is required."));
        }
        let year = year_raw
            .parse::<i32>()
            .map_err(|_| ShelfError::validation(Field::Year, "Year must be a whole number."))?;

        Ok(BookFields {
            title: title.to_string(),
            author: author.to_string(),
            year,
            is_complete: self.is_complete,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_trims_text_fields() {
        let draft = BookDraft::new("  Dune ", "\tFrank Herbert", " 1965 ", true);
        let fields = draft.validate().unwrap();
        assert_eq!(fields.title, "Dune");
        assert_eq!(fields.author, "Frank Herbert");
        assert_eq!(fields.year, 1965);
        assert!(fields.is_complete);
    }

    #[test]
    fn validate_rejects_blank_title_first() {
        let draft = BookDraft::new("   ", "", "abc", false);
        match draft.validate() {
            Err(ShelfError::Validation { field, .. }) => assert_eq!(field, Field::Title),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn validate_rejects_non_numeric_year() {
        let draft = BookDraft::new("Dune", "Frank Herbert", "nineteen", false);
        match draft.validate() {
            Err(ShelfError::Validation { field, .. }) => assert_eq!(field, Field::Year),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn record_serializes_with_camel_case_flag() {
        let book = BookRecord {
            id: 1,
            title: "Dune".into(),
            author: "Frank Herbert".into(),
            year: 1965,
            is_complete: false,
        };
        let json = serde_json::to_value(&book).unwrap();
        assert_eq!(json["isComplete"], serde_json::Value::Bool(false));
        assert!(json.get("is_complete").is_none());
    }

    #[test]
    fn draft_round_trips_from_record() {
        let book = BookRecord {
            id: 9,
            title: "Emma".into(),
            author: "Jane Austen".into(),
            year: 1815,
            is_complete: true,
        };
        let fields = BookDraft::from_record(&book).validate().unwrap();
        assert_eq!(fields.year, 1815);
        assert!(fields.is_complete);
    }
}
