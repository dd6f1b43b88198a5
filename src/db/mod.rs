//! Key-value persistence backends.

mod connection;
mod kv;
mod memory;

pub use connection::{ensure_schema, DATA_DIR_NAME};
pub use kv::SqliteStore;
pub use memory::MemoryStore;

use crate::error::Result;

/// Capability-checked string storage keyed by name.
pub trait KeyValueStore {
    /// False when the host cannot keep anything across sessions.
    fn is_available(&self) -> bool;

    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn is_available(&self) -> bool {
        (**self).is_available()
    }

    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }
}
