//! The bookshelf coordinator.
//!
//! [`Bookshelf`] owns the record store, the persistence bridge, the view and
//! the event bus, and is the only handle callers need. Every mutation runs
//! the same pipeline before returning: change the store, write the whole
//! shelf through to storage, re-render both buckets, then publish
//! [`ShelfEvent::StoreChanged`] to outside subscribers.
//!
//! Timers are plain due instants. The UI loop calls [`Bookshelf::tick`] and
//! anything past due fires. Nothing is ever cancelled, so two quick searches
//! with no hits schedule two reverts and both run.

use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::db::KeyValueStore;
use crate::error::{Result, ShelfError};
use crate::events::{EventBus, ShelfEvent, StoreChange, SubscriptionId};
use crate::models::{BookDraft, BookRecord};
use crate::persistence::PersistenceBridge;
use crate::query;
use crate::store::RecordStore;
use crate::view::{Bucket, CardAction, ViewSynchronizer};

/// Delay before a search with no hits falls back to the full shelf.
pub const DEFAULT_REVERT_DELAY: Duration = Duration::from_millis(1500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

/// A user-facing message. The UI decides how long to show it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
    pub severity: Severity,
}

/// What a card action ended up doing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatched {
    Toggled(BookRecord),
    Deleted(BookRecord),
    /// Form prefill for the book about to be edited.
    Editing(BookDraft),
    /// The id was not on the shelf. Nothing happened.
    Missing,
}

pub struct Bookshelf<S> {
    store: RecordStore,
    bridge: PersistenceBridge<S>,
    view: ViewSynchronizer,
    bus: EventBus,
    notices: Vec<Notice>,
    pending_reverts: Vec<Instant>,
    revert_delay: Duration,
    save_failure_reported: bool,
}

impl<S: KeyValueStore> Bookshelf<S> {
    pub fn new(store: RecordStore, bridge: PersistenceBridge<S>) -> Self {
        Self {
            store,
            bridge,
            view: ViewSynchronizer::new(),
            bus: EventBus::new(),
            notices: Vec::new(),
            pending_reverts: Vec::new(),
            revert_delay: DEFAULT_REVERT_DELAY,
            save_failure_reported: false,
        }
    }

    /// Build a shelf with the default id source and hydrate it from storage.
    pub fn open(bridge: PersistenceBridge<S>) -> Result<Self> {
        let mut shelf = Self::new(RecordStore::default(), bridge);
        shelf.hydrate()?;
        Ok(shelf)
    }

    pub fn with_revert_delay(mut self, delay: Duration) -> Self {
        self.revert_delay = delay;
        self
    }

    /// Load the stored shelf once at startup. A host without durable storage
    /// is announced here and never again.
    pub fn hydrate(&mut self) -> Result<usize> {
        if !self.bridge.is_durable() {
            warn!("durable storage unavailable, changes will only last this session");
            self.notify(
                "Storage is unavailable. Changes will be lost when you quit.",
                Severity::Warning,
            );
        }

        let books = self.bridge.load()?;
        let count = books.len();
        self.store.hydrate(books);
        self.view.render_all(self.store.all());
        self.bus
            .publish(&ShelfEvent::StoreChanged(StoreChange::Hydrated { count }));
        info!(count, "bookshelf ready");
        Ok(count)
    }

    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&ShelfEvent) + 'static,
    {
        self.bus.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.bus.unsubscribe(id)
    }

    pub fn add(&mut self, draft: &BookDraft) -> Result<BookRecord> {
        let book = match self.store.create(draft) {
            Ok(book) => book,
            Err(err) => {
                self.reject(&err);
                return Err(err);
            }
        };
        self.notify(format!("Added \"{}\".", book.title), Severity::Success);
        self.commit(StoreChange::Created { id: book.id });
        Ok(book)
    }

    /// In-place edit. `Ok(None)` means the id was gone; that is not an error
    /// the user needs to see.
    pub fn update(&mut self, id: i64, draft: &BookDraft) -> Result<Option<BookRecord>> {
        match self.store.update(id, draft) {
            Ok(book) => {
                self.notify(format!("Updated \"{}\".", book.title), Severity::Success);
                self.commit(StoreChange::Updated { id });
                Ok(Some(book))
            }
            Err(err) if err.is_silent() => {
                debug!(id, "update skipped, book no longer exists");
                Ok(None)
            }
            Err(err) => {
                self.reject(&err);
                Err(err)
            }
        }
    }

    pub fn toggle_complete(&mut self, id: i64) -> Option<BookRecord> {
        let book = self.store.toggle_complete(id).ok()?;
        let message = if book.is_complete {
            format!("Marked \"{}\" as finished.", book.title)
        } else {
            format!("Moved \"{}\" back to still reading.", book.title)
        };
        self.notify(message, Severity::Info);
        self.commit(StoreChange::Toggled {
            id,
            is_complete: book.is_complete,
        });
        Some(book)
    }

    pub fn delete(&mut self, id: i64) -> Option<BookRecord> {
        let book = self.store.delete(id).ok()?;
        self.notify(format!("Deleted \"{}\".", book.title), Severity::Error);
        self.commit(StoreChange::Deleted { id });
        Some(book)
    }

    /// Prefill for the edit form. Does not touch the shelf.
    pub fn begin_edit(&mut self, id: i64) -> Option<BookDraft> {
        let draft = BookDraft::from_record(self.store.find_by_id(id)?);
        self.notify(format!("Editing \"{}\".", draft.title), Severity::Warning);
        Some(draft)
    }

    /// Run one of a card's actions against the book it shows.
    pub fn dispatch(&mut self, id: i64, action: CardAction) -> Dispatched {
        let outcome = match action {
            CardAction::Toggle => self.toggle_complete(id).map(Dispatched::Toggled),
            CardAction::Delete => self.delete(id).map(Dispatched::Deleted),
            CardAction::Edit => self.begin_edit(id).map(Dispatched::Editing),
        };
        outcome.unwrap_or(Dispatched::Missing)
    }

    pub fn search(&mut self, keyword: &str) {
        self.search_at(keyword, Instant::now());
    }

    /// Search with an explicit clock reading. A blank keyword is just a full
    /// render.
    pub fn search_at(&mut self, keyword: &str, now: Instant) {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            self.show_all();
            return;
        }

        let outcome = query::search(self.store.all(), keyword);
        debug!(keyword, matches = outcome.match_count, "searched titles");
        self.view.render_search(keyword, &outcome);

        if outcome.is_empty() {
            self.notify(
                "No books found. Restoring the full shelf...",
                Severity::Error,
            );
            self.pending_reverts.push(now + self.revert_delay);
        } else {
            self.notify(
                format!("Found {} matching book(s).", outcome.match_count),
                Severity::Success,
            );
        }
    }

    /// Drop any filter and show every book.
    pub fn show_all(&mut self) {
        self.view.render_all(self.store.all());
    }

    pub fn tick(&mut self) -> usize {
        self.tick_at(Instant::now())
    }

    /// Fire every revert that is due at `now`. Returns how many fired.
    pub fn tick_at(&mut self, now: Instant) -> usize {
        let before = self.pending_reverts.len();
        self.pending_reverts.retain(|due| *due > now);
        let fired = before - self.pending_reverts.len();
        for _ in 0..fired {
            self.view.render_all(self.store.all());
            self.view.activate(Bucket::Incomplete);
        }
        if fired > 0 {
            debug!(fired, "reverted search to full shelf");
        }
        fired
    }

    pub fn pending_reverts(&self) -> usize {
        self.pending_reverts.len()
    }

    /// Tab activation capability.
    pub fn activate(&mut self, bucket: Bucket) {
        debug!(panel = bucket.panel_id(), "activating bucket");
        self.view.activate(bucket);
    }

    /// Hand queued notices to the UI.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    pub fn books(&self) -> &[BookRecord] {
        self.store.all()
    }

    pub fn find_by_id(&self, id: i64) -> Option<&BookRecord> {
        self.store.find_by_id(id)
    }

    pub fn view(&self) -> &ViewSynchronizer {
        &self.view
    }

    pub fn bridge(&self) -> &PersistenceBridge<S> {
        &self.bridge
    }

    pub fn is_durable(&self) -> bool {
        self.bridge.is_durable()
    }

    /// Write-through, re-render, announce.
    fn commit(&mut self, change: StoreChange) {
        match self.bridge.save(self.store.all()) {
            Ok(payload) => {
                debug!(%payload, "persisted bookshelf");
                self.bus.publish(&ShelfEvent::Persisted { payload });
            }
            Err(ShelfError::StorageUnavailable { .. }) => {
                debug!(?change, "change kept in memory only");
            }
            Err(err) => {
                warn!(error = %err, ?change, "failed to persist bookshelf");
                if !self.save_failure_reported {
                    self.save_failure_reported = true;
                    self.notify(format!("Could not save: {err}"), Severity::Error);
                }
            }
        }

        self.view.render_all(self.store.all());
        self.bus.publish(&ShelfEvent::StoreChanged(change));
    }

    fn reject(&mut self, err: &ShelfError) {
        debug!(error = %err, "rejected book input");
        self.notify(err.to_string(), Severity::Error);
    }

    fn notify(&mut self, message: impl Into<String>, severity: Severity) {
        self.notices.push(Notice {
            message: message.into(),
            severity,
        });
    }
}
