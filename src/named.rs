//! String-keyed facade over [`SoftStore`].
//!
//! Most callers key entries by name. `NamedStore` takes `&str` keys, owns
//! the `String` conversion, and rejects the empty key up front — before any
//! lock is taken — so a bad key never reaches the engine.

use crate::error::{Result, StoreError};
use crate::store::SoftStore;

/// [`SoftStore`] with string keys and key validation.
///
/// The empty string is not a key: every operation rejects it with
/// [`StoreError::InvalidKey`] without touching the underlying store. All
/// other semantics (tombstones, CAS, no resurrection) are the engine's.
#[derive(Debug)]
pub struct NamedStore<V> {
    store: SoftStore<String, V>,
}

impl<V: Clone + PartialEq> Default for NamedStore<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Clone + PartialEq> NamedStore<V> {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            store: SoftStore::new(),
        }
    }

    /// Create a store seeded from existing entries.
    ///
    /// Seeding skips validation only in the sense that it cannot fail the
    /// whole constructor; an empty key in the seed is rejected here too.
    pub fn with_entries(
        entries: impl IntoIterator<Item = (String, Option<V>)>,
    ) -> Result<Self, String> {
        let entries: Vec<_> = entries.into_iter().collect();
        if let Some((key, _)) = entries.iter().find(|(k, _)| k.is_empty()) {
            return Err(StoreError::InvalidKey(key.clone()));
        }
        Ok(Self {
            store: SoftStore::with_entries(entries),
        })
    }

    fn checked(key: &str) -> Result<(), String> {
        if key.is_empty() {
            return Err(StoreError::InvalidKey(String::new()));
        }
        Ok(())
    }

    /// Insert a new entry. See [`SoftStore::insert`].
    pub fn insert(&self, key: &str, value: Option<V>) -> Result<(), String> {
        Self::checked(key)?;
        self.store.insert(key.to_owned(), value)
    }

    /// Read the slot for a key. See [`SoftStore::get`].
    pub fn get(&self, key: &str) -> Result<Option<V>, String> {
        Self::checked(key)?;
        self.store.get(&key.to_owned())
    }

    /// Compare-and-update the slot for a key. See [`SoftStore::update`].
    pub fn update(&self, key: &str, expected: Option<&V>, new: Option<V>) -> Result<(), String> {
        Self::checked(key)?;
        self.store.update(&key.to_owned(), expected, new)
    }

    /// Soft-delete the value for a key. See [`SoftStore::delete`].
    pub fn delete(&self, key: &str) -> Result<(), String> {
        Self::checked(key)?;
        self.store.delete(&key.to_owned())
    }

    /// Snapshot of the keys that currently hold a live value.
    pub fn live_keys(&self) -> std::collections::HashSet<String> {
        self.store.live_keys()
    }

    /// Drop every entry, tombstones included.
    pub fn clear(&self) {
        self.store.clear()
    }

    /// Total number of entries, tombstones included.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Check whether the store has no entries at all.
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }
}
