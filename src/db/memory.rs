use std::collections::HashMap;

use crate::error::{Result, ShelfError};

use super::KeyValueStore;

/// Process-local storage. `unavailable()` stands in for a host without any
/// durable storage: reads find nothing and writes are refused.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
    available: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            available: true,
        }
    }

    pub fn unavailable() -> Self {
        Self {
            entries: HashMap::new(),
            available: false,
        }
    }

    /// Seed a raw value, e.g. a payload written by an older build.
    pub fn with_entry(mut self, key: &str, value: &str) -> Self {
        self.entries.insert(key.to_string(), value.to_string());
        self
    }
}

impl KeyValueStore for MemoryStore {
    fn is_available(&self) -> bool {
        self.available
    }

    fn get(&self, key: &str) -> Result<Option<String>> {
        if !self.available {
            return Ok(None);
        }
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        if !self.available {
            return Err(ShelfError::StorageUnavailable {
                reason: "no durable storage on this host".to_string(),
            });
        }
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
