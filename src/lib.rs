//! Core library surface for the Bookshelf Manager TUI application.
//!
//! The shelf logic (store, persistence bridge, search, view projection) lives
//! in plain modules that know nothing about the terminal, so the `bin` target
//! and the tests drive the same [`Bookshelf`] handle.
pub mod config;
pub mod db;
pub mod error;
pub mod events;
pub mod models;
pub mod persistence;
pub mod query;
pub mod shelf;
pub mod store;
pub mod ui;
pub mod view;

pub use config::Config;
pub use db::{KeyValueStore, MemoryStore, SqliteStore};
pub use error::{Result, ShelfError};
pub use events::{EventBus, ShelfEvent, StoreChange};

/// The domain types other layers manipulate.
pub use models::{BookDraft, BookRecord};

pub use persistence::PersistenceBridge;
pub use shelf::{Bookshelf, Dispatched, Notice, Severity};
pub use store::{IdSource, RecordStore, SequentialIds};
pub use view::{Bucket, CardAction, ViewSynchronizer};

/// The interactive application entry point and state container.
pub use ui::{run_app, App, ShelfHandle};
