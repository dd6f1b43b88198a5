//! Title search over the shelf.

use crate::models::BookRecord;
use crate::view::Bucket;

/// Result of a title search, already split by completion status.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SearchOutcome {
    pub incomplete: Vec<BookRecord>,
    pub complete: Vec<BookRecord>,
    pub match_count: usize,
}

impl SearchOutcome {
    pub fn is_empty(&self) -> bool {
        self.match_count == 0
    }

    /// Which bucket should be brought to the front for this result. When
    /// both buckets have matches the incomplete one wins; with no matches at
    /// all the incomplete bucket shows the empty state.
    pub fn bucket_to_activate(&self) -> Bucket {
        match (self.incomplete.is_empty(), self.complete.is_empty()) {
            (true, false) => Bucket::Complete,
            _ => Bucket::Incomplete,
        }
    }
}

/// Case-insensitive substring match on titles. Matches keep collection
/// order within each bucket.
pub fn search(books: &[BookRecord], keyword: &str) -> SearchOutcome {
    let needle = keyword.to_lowercase();
    let mut outcome = SearchOutcome::default();

    for book in books
        .iter()
        .filter(|book| book.title.to_lowercase().contains(&needle))
    {
        if book.is_complete {
            outcome.complete.push(book.clone());
        } else {
            outcome.incomplete.push(book.clone());
        }
        outcome.match_count += 1;
    }

    outcome
}
