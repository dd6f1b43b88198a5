//! Persistence bridge between the record store and a [`KeyValueStore`].
//!
//! The whole shelf is stored as one JSON array under a fixed key:
//!
//! ```text
//! [{"id":1,"title":"Dune","author":"Frank Herbert","year":1965,"isComplete":false}, ...]
//! ```
//!
//! Older payloads spell the completion flag `isCompleted`, and some carry
//! the year as a string. Both are normalized on load; only the current shape
//! is ever written.

use std::collections::HashSet;

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::db::KeyValueStore;
use crate::error::{Result, ShelfError};
use crate::models::BookRecord;

/// Key the shelf is stored under unless configured otherwise.
pub const DEFAULT_STORAGE_KEY: &str = "BOOK_APPS";

/// A stored record before normalization. Every field is optional so one bad
/// entry does not sink the whole payload.
#[derive(Debug, Deserialize)]
struct RawBook {
    id: Option<Value>,
    title: Option<Value>,
    author: Option<Value>,
    year: Option<Value>,
    #[serde(rename = "isComplete")]
    is_complete: Option<Value>,
    #[serde(rename = "isCompleted")]
    legacy_is_completed: Option<Value>,
}

impl RawBook {
    fn normalize(self) -> std::result::Result<BookRecord, &'static str> {
        let id = self.id.as_ref().and_then(coerce_id).ok_or("missing or invalid id")?;
        let title = text_field(self.title).ok_or("missing title")?;
        let author = text_field(self.author).ok_or("missing author")?;
        let year = self.year.as_ref().and_then(coerce_year).ok_or("year is not a number")?;
        let is_complete = self
            .is_complete
            .as_ref()
            .and_then(Value::as_bool)
            .or_else(|| self.legacy_is_completed.as_ref().and_then(Value::as_bool))
            .unwrap_or(false);

        Ok(BookRecord {
            id,
            title,
            author,
            year,
            is_complete,
        })
    }
}

/// Whole-number ids only. Floats outside the `i64` range are rejected
/// rather than clamped, so they cannot collide at the range edge.
fn coerce_id(value: &Value) -> Option<i64> {
    // 2^63, the first float past `i64::MAX`.
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;
    match value {
        Value::Number(number) => number.as_i64().or_else(|| {
            number
                .as_f64()
                .filter(|float| float.fract() == 0.0 && (-LIMIT..LIMIT).contains(float))
                .map(|float| float as i64)
        }),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

/// Numeric coercion for the year: JSON numbers, numeric strings and an empty
/// string (zero) are accepted.
fn coerce_year(value: &Value) -> Option<i32> {
    match value {
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().map(|float| float.trunc() as i64))
            .and_then(|year| i32::try_from(year).ok()),
        Value::String(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                Some(0)
            } else {
                trimmed.parse().ok()
            }
        }
        Value::Bool(flag) => Some(i32::from(*flag)),
        _ => None,
    }
}

fn text_field(value: Option<Value>) -> Option<String> {
    match value? {
        Value::String(text) if !text.trim().is_empty() => Some(text),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

pub struct PersistenceBridge<S> {
    storage: S,
    key: String,
}

impl<S: KeyValueStore> PersistenceBridge<S> {
    pub fn new(storage: S) -> Self {
        Self::with_key(storage, DEFAULT_STORAGE_KEY)
    }

    pub fn with_key(storage: S, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn is_durable(&self) -> bool {
        self.storage.is_available()
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Serialize the full list and write it under the key. Returns the
    /// payload that was written so the caller can announce it.
    pub fn save(&mut self, books: &[BookRecord]) -> Result<String> {
        if !self.storage.is_available() {
            return Err(ShelfError::StorageUnavailable {
                reason: "no durable storage on this host".to_string(),
            });
        }
        let payload = serde_json::to_string(books)?;
        self.storage.set(&self.key, &payload)?;
        debug!(key = %self.key, books = books.len(), "saved bookshelf");
        Ok(payload)
    }

    /// Read and normalize the stored list. A missing key is an empty shelf.
    pub fn load(&self) -> Result<Vec<BookRecord>> {
        let Some(payload) = self.storage.get(&self.key)? else {
            debug!(key = %self.key, "no stored bookshelf");
            return Ok(Vec::new());
        };

        let raw: Vec<Value> = match serde_json::from_str::<Value>(&payload)? {
            Value::Array(items) => items,
            other => {
                return Err(ShelfError::Corrupted {
                    reason: format!("expected a JSON array, found {}", json_kind(&other)),
                })
            }
        };

        let mut seen = HashSet::new();
        let mut books = Vec::with_capacity(raw.len());
        for (index, item) in raw.into_iter().enumerate() {
            let book = match serde_json::from_value::<RawBook>(item) {
                Ok(raw_book) => raw_book.normalize(),
                Err(_) => Err("entry is not an object"),
            };
            match book {
                Ok(book) if seen.insert(book.id) => books.push(book),
                Ok(book) => warn!(index, id = book.id, "skipping stored book with duplicate id"),
                Err(reason) => warn!(index, reason, "skipping unreadable stored book"),
            }
        }

        info!(key = %self.key, books = books.len(), "loaded bookshelf");
        Ok(books)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
