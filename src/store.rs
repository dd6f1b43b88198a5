//! In-memory record store: the authoritative, ordered list of books.
//!
//! The store only knows about its own vector. Write-through persistence and
//! re-rendering are driven by [`crate::shelf::Bookshelf`], which wraps every
//! mutation here and publishes the resulting change. Calling the methods on
//! a bare `RecordStore` notifies nobody: nothing is saved and no listener
//! hears about it, so outside code should go through `Bookshelf`.

use tracing::debug;

use crate::error::{Result, ShelfError};
use crate::models::{BookDraft, BookRecord};

/// Source of fresh book ids. Injected so tests and callers control how ids
/// are drawn.
pub trait IdSource {
    /// `None` once the source has nothing left to hand out.
    fn next_id(&mut self) -> Option<i64>;

    /// Make sure every id handed out from now on is greater than `floor`.
    fn reserve_above(&mut self, floor: i64);
}

/// Monotonic counter. Never repeats, no matter how quickly books are added.
/// After handing out `i64::MAX` it is exhausted.
#[derive(Debug, Clone)]
pub struct SequentialIds {
    next: Option<i64>,
}

impl SequentialIds {
    pub fn starting_at(next: i64) -> Self {
        Self { next: Some(next) }
    }
}

impl Default for SequentialIds {
    fn default() -> Self {
        Self::starting_at(1)
    }
}

impl IdSource for SequentialIds {
    fn next_id(&mut self) -> Option<i64> {
        let id = self.next?;
        self.next = id.checked_add(1);
        Some(id)
    }

    fn reserve_above(&mut self, floor: i64) {
        if matches!(self.next, Some(next) if next <= floor) {
            self.next = floor.checked_add(1);
        }
    }
}

pub struct RecordStore {
    books: Vec<BookRecord>,
    ids: Box<dyn IdSource>,
}

impl Default for RecordStore {
    fn default() -> Self {
        Self::new(Box::new(SequentialIds::default()))
    }
}

impl RecordStore {
    pub fn new(ids: Box<dyn IdSource>) -> Self {
        Self {
            books: Vec::new(),
            ids,
        }
    }

    /// Replace the contents with freshly loaded records. Ids already in use
    /// are reserved so new books never collide with stored ones.
    pub fn hydrate(&mut self, books: Vec<BookRecord>) {
        if let Some(max_id) = books.iter().map(|book| book.id).max() {
            self.ids.reserve_above(max_id);
        }
        self.books = books;
    }

    pub fn create(&mut self, draft: &BookDraft) -> Result<BookRecord> {
        let fields = draft.validate()?;
        // An injected source may not know about ids that were loaded.
        let id = loop {
            let id = self.ids.next_id().ok_or(ShelfError::IdsExhausted)?;
            if self.position(id).is_none() {
                break id;
            }
        };
        let book = BookRecord {
            id,
            title: fields.title,
            author: fields.author,
            year: fields.year,
            is_complete: fields.is_complete,
        };
        debug!(%book, id, "created book");
        self.books.push(book.clone());
        Ok(book)
    }

    /// Overwrite the editable fields in place. Position and id are kept.
    pub fn update(&mut self, id: i64, draft: &BookDraft) -> Result<BookRecord> {
        let fields = draft.validate()?;
        let book = self.get_mut(id)?;
        book.apply(fields);
        Ok(book.clone())
    }

    pub fn toggle_complete(&mut self, id: i64) -> Result<BookRecord> {
        let book = self.get_mut(id)?;
        book.is_complete = !book.is_complete;
        Ok(book.clone())
    }

    pub fn delete(&mut self, id: i64) -> Result<BookRecord> {
        let index = self.position(id).ok_or(ShelfError::NotFound { id })?;
        Ok(self.books.remove(index))
    }

    pub fn find_by_id(&self, id: i64) -> Option<&BookRecord> {
        self.books.iter().find(|book| book.id == id)
    }

    /// Every book in insertion order.
    pub fn all(&self) -> &[BookRecord] {
        &self.books
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    fn position(&self, id: i64) -> Option<usize> {
        self.books.iter().position(|book| book.id == id)
    }

    fn get_mut(&mut self, id: i64) -> Result<&mut BookRecord> {
        self.books
            .iter_mut()
            .find(|book| book.id == id)
            .ok_or(ShelfError::NotFound { id })
    }
}
