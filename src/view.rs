//! Projection of the shelf into the two view buckets the UI draws.
//!
//! The synchronizer never reads the store on its own: it is handed the
//! current records (full render) or a search outcome (filtered render) and
//! rebuilds both buckets from scratch each time, so rendering twice without a
//! mutation in between yields the same buckets.

use std::fmt;

use crate::models::BookRecord;
use crate::query::SearchOutcome;

/// Text shown in the incomplete bucket when a search finds nothing.
pub const NO_MATCH_MESSAGE: &str = "No books found.";

/// The two panels books are split across.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bucket {
    Incomplete,
    Complete,
}

impl Bucket {
    pub const ALL: [Bucket; 2] = [Bucket::Incomplete, Bucket::Complete];

    pub fn for_status(is_complete: bool) -> Self {
        if is_complete {
            Bucket::Complete
        } else {
            Bucket::Incomplete
        }
    }

    /// Panel identifier handed to the tab-activation capability.
    pub fn panel_id(self) -> &'static str {
        match self {
            Bucket::Incomplete => "incompleteSection",
            Bucket::Complete => "completeSection",
        }
    }

    pub fn other(self) -> Self {
        match self {
            Bucket::Incomplete => Bucket::Complete,
            Bucket::Complete => Bucket::Incomplete,
        }
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bucket::Incomplete => write!(f, "Still reading"),
            Bucket::Complete => write!(f, "Finished"),
        }
    }
}

/// Actions every card offers. Each maps to a store operation by id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardAction {
    Toggle,
    Delete,
    Edit,
}

/// One rendered book.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookCard {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub year: i32,
    pub is_complete: bool,
}

impl BookCard {
    pub fn from_record(book: &BookRecord) -> Self {
        Self {
            id: book.id,
            title: book.title.clone(),
            author: book.author.clone(),
            year: book.year,
            is_complete: book.is_complete,
        }
    }

    pub fn actions(&self) -> [CardAction; 3] {
        [CardAction::Toggle, CardAction::Delete, CardAction::Edit]
    }

    /// Label for the toggle action, which depends on where the book sits.
    pub fn toggle_label(&self) -> &'static str {
        if self.is_complete {
            "Not finished"
        } else {
            "Finished reading"
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewBucket {
    pub cards: Vec<BookCard>,
    /// Placeholder drawn instead of cards, set only by a search with no hits.
    pub empty_message: Option<String>,
}

impl ViewBucket {
    fn clear(&mut self) {
        self.cards.clear();
        self.empty_message = None;
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn ids(&self) -> Vec<i64> {
        self.cards.iter().map(|card| card.id).collect()
    }
}

/// What the buckets currently show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Projection {
    Full,
    Filtered { keyword: String, match_count: usize },
}

#[derive(Debug, Clone)]
pub struct ViewSynchronizer {
    incomplete: ViewBucket,
    complete: ViewBucket,
    active: Bucket,
    projection: Projection,
}

impl Default for ViewSynchronizer {
    fn default() -> Self {
        Self {
            incomplete: ViewBucket::default(),
            complete: ViewBucket::default(),
            active: Bucket::Incomplete,
            projection: Projection::Full,
        }
    }
}

impl ViewSynchronizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Canonical, filter-free projection. Leaves the active bucket alone.
    pub fn render_all(&mut self, books: &[BookRecord]) {
        self.clear();
        for book in books {
            self.bucket_mut(Bucket::for_status(book.is_complete))
                .cards
                .push(BookCard::from_record(book));
        }
        self.projection = Projection::Full;
    }

    /// Show a search result and bring the right bucket to the front. With no
    /// matches the incomplete bucket carries the empty-state message.
    pub fn render_search(&mut self, keyword: &str, outcome: &SearchOutcome) {
        self.clear();
        self.incomplete.cards = outcome.incomplete.iter().map(BookCard::from_record).collect();
        self.complete.cards = outcome.complete.iter().map(BookCard::from_record).collect();
        if outcome.is_empty() {
            self.incomplete.empty_message = Some(NO_MATCH_MESSAGE.to_string());
        }
        self.activate(outcome.bucket_to_activate());
        self.projection = Projection::Filtered {
            keyword: keyword.to_string(),
            match_count: outcome.match_count,
        };
    }

    /// Tab activation: exactly one bucket is active at a time.
    pub fn activate(&mut self, bucket: Bucket) {
        self.active = bucket;
    }

    pub fn active(&self) -> Bucket {
        self.active
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    pub fn is_filtered(&self) -> bool {
        matches!(self.projection, Projection::Filtered { .. })
    }

    pub fn bucket(&self, bucket: Bucket) -> &ViewBucket {
        match bucket {
            Bucket::Incomplete => &self.incomplete,
            Bucket::Complete => &self.complete,
        }
    }

    pub fn active_bucket(&self) -> &ViewBucket {
        self.bucket(self.active)
    }

    fn bucket_mut(&mut self, bucket: Bucket) -> &mut ViewBucket {
        match bucket {
            Bucket::Incomplete => &mut self.incomplete,
            Bucket::Complete => &mut self.complete,
        }
    }

    fn clear(&mut self) {
        self.incomplete.clear();
        self.complete.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::search;

    fn shelf() -> Vec<BookRecord> {
        [("Dune", false), ("Emma", true), ("Ulysses", false), ("Beloved", true)]
            .iter()
            .enumerate()
            .map(|(idx, (title, done))| BookRecord {
                id: idx as i64 + 1,
                title: title.to_string(),
                author: "Author".to_string(),
                year: 1900,
                is_complete: *done,
            })
            .collect()
    }

    #[test]
    fn full_render_partitions_in_order() {
        let books = shelf();
        let mut view = ViewSynchronizer::new();
        view.render_all(&books);

        assert_eq!(view.bucket(Bucket::Incomplete).ids(), vec![1, 3]);
        assert_eq!(view.bucket(Bucket::Complete).ids(), vec![2, 4]);

        let mut all: Vec<i64> = view.bucket(Bucket::Incomplete).ids();
        all.extend(view.bucket(Bucket::Complete).ids());
        all.sort_unstable();
        assert_eq!(all, vec![1, 2, 3, 4]);
    }

    #[test]
    fn full_render_is_idempotent() {
        let books = shelf();
        let mut view = ViewSynchronizer::new();
        view.render_all(&books);
        let first = (
            view.bucket(Bucket::Incomplete).clone(),
            view.bucket(Bucket::Complete).clone(),
        );
        view.render_all(&books);
        assert_eq!(view.bucket(Bucket::Incomplete), &first.0);
        assert_eq!(view.bucket(Bucket::Complete), &first.1);
    }

    #[test]
    fn full_render_keeps_active_bucket() {
        let mut view = ViewSynchronizer::new();
        view.activate(Bucket::Complete);
        view.render_all(&shelf());
        assert_eq!(view.active(), Bucket::Complete);
    }

    #[test]
    fn empty_search_shows_message_in_incomplete() {
        let books = shelf();
        let mut view = ViewSynchronizer::new();
        view.activate(Bucket::Complete);
        view.render_search("zzz", &search(&books, "zzz"));

        assert_eq!(view.active(), Bucket::Incomplete);
        assert!(view.bucket(Bucket::Incomplete).is_empty());
        assert!(view.bucket(Bucket::Complete).is_empty());
        assert_eq!(
            view.bucket(Bucket::Incomplete).empty_message.as_deref(),
            Some(NO_MATCH_MESSAGE)
        );
        assert!(view.is_filtered());
    }

    #[test]
    fn render_all_clears_empty_state() {
        let books = shelf();
        let mut view = ViewSynchronizer::new();
        view.render_search("zzz", &search(&books, "zzz"));
        view.render_all(&books);
        assert!(view.bucket(Bucket::Incomplete).empty_message.is_none());
        assert_eq!(view.projection(), &Projection::Full);
    }

    #[test]
    fn card_offers_three_actions() {
        let card = BookCard::from_record(&shelf()[1]);
        assert_eq!(
            card.actions(),
            [CardAction::Toggle, CardAction::Delete, CardAction::Edit]
        );
        assert_eq!(card.toggle_label(), "Not finished");
    }
}
