//! Tagged in-process memo for store loads
//!
//! Each store owns one `TagCache` holding the result of its last successful
//! load. Mutations invalidate by tag, which forces the next load to bypass
//! the memo and re-read durable storage.
//!
//! # Cache States
//!
//! | State | `get` | Description |
//! |-------|-------|-------------|
//! | Empty | `None` | Never populated, or invalidated |
//! | Valid | `Some` | Holds the last successfully loaded value |
//!
//! The entry never expires on its own: only `invalidate` (or `put` with a
//! newer value) replaces it. The cache is explicit state owned by its store,
//! not a process-global registry; the tag label travels with change
//! notifications so external consumers know which store moved.

use std::sync::Mutex;

/// Memoized load result labeled with an invalidation tag.
#[derive(Debug)]
pub struct TagCache<T> {
    tag: String,
    slot: Mutex<Option<T>>,
}

impl<T: Clone> TagCache<T> {
    /// Create an empty cache under the given tag
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            slot: Mutex::new(None),
        }
    }

    /// The invalidation tag this cache answers to
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Return the memoized value, if the entry is valid
    pub fn get(&self) -> Option<T> {
        self.slot.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Populate the entry after a successful load
    pub fn put(&self, value: T) {
        *self.slot.lock().unwrap_or_else(|e| e.into_inner()) = Some(value);
    }

    /// Drop the entry so the next load re-reads durable storage
    pub fn invalidate(&self) {
        *self.slot.lock().unwrap_or_else(|e| e.into_inner()) = None;
    }
}
