//! Concurrent soft-delete store.
//!
//! `SoftStore` is a whole-container-locked map from `K` to a value slot.
//! A slot is `Option<V>`: `Some` is a live value, `None` is a tombstone.
//! Deleting a key never removes its entry; it rewrites the slot to `None`,
//! which keeps the key name taken until the store is cleared.
//!
//! ## Lock discipline
//!
//! One `parking_lot::RwLock` guards the map and the live-key index together:
//! - `get`, `live_keys`, `len` take shared access; readers never block each
//!   other.
//! - `insert`, `clear` take exclusive access directly.
//! - `update`, `delete` take an upgradable read and promote to exclusive only
//!   when a write is actually needed. parking_lot admits one upgradable
//!   holder at a time (concurrent with plain readers), which serializes the
//!   check-then-write sequences of racing updates: two CAS calls observing
//!   the same expected value cannot both win.
//!
//! No I/O happens under the lock; hold times are bounded by map operations.
//! Operations on different keys interleave arbitrarily — only single-key
//! operations are linearizable.

use std::collections::{HashMap, HashSet};
use std::fmt::{self, Debug};
use std::hash::Hash;

use parking_lot::{RwLock, RwLockUpgradableReadGuard};
use tracing::{debug, trace};

use crate::error::{Result, StoreError};

/// Map plus live-key index, mutated together under one lock.
///
/// Invariant: `live` is always exactly the set of keys whose slot is `Some`.
/// It is maintained incrementally on every mutation, never recomputed.
struct Inner<K, V> {
    slots: HashMap<K, Option<V>>,
    live: HashSet<K>,
}

/// Thread-safe key-value store with soft deletion and optimistic updates.
///
/// Each key holds a slot that is either a live value or a tombstone. The
/// per-key lifecycle is:
///
/// ```text
/// absent --insert--> live --update--> live --delete--> tombstone
///                                                          |
///                                 (terminal until clear) <-+
/// ```
///
/// Tombstoned keys stay in the map: `get` returns `None` for them rather
/// than failing, `len` still counts them, and `insert` on them fails with
/// [`StoreError::DuplicateKey`]. Only [`SoftStore::clear`] frees key names
/// for reuse.
///
/// # Thread safety
///
/// All operations take `&self` and are safe to call from any number of
/// threads. The lock is non-reentrant; no operation calls back into the
/// store while holding it.
///
/// # Example
///
/// ```
/// use softstore::SoftStore;
///
/// let store: SoftStore<&str, i64> = SoftStore::new();
/// store.insert("counter", Some(1)).unwrap();
/// store.update(&"counter", Some(&1), Some(2)).unwrap();
/// assert_eq!(store.get(&"counter").unwrap(), Some(2));
/// ```
pub struct SoftStore<K, V> {
    inner: RwLock<Inner<K, V>>,
}

impl<K, V> SoftStore<K, V>
where
    K: Eq + Hash + Clone + Debug,
    V: Clone + PartialEq,
{
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                slots: HashMap::new(),
                live: HashSet::new(),
            }),
        }
    }

    /// Create a store seeded from existing entries.
    ///
    /// A `Some` value seeds a live slot, a `None` value seeds a tombstone.
    /// When the iterator repeats a key, the last occurrence wins and the
    /// live-key index follows it.
    pub fn with_entries(entries: impl IntoIterator<Item = (K, Option<V>)>) -> Self {
        let mut slots = HashMap::new();
        let mut live = HashSet::new();
        for (key, value) in entries {
            if value.is_some() {
                live.insert(key.clone());
            } else {
                live.remove(&key);
            }
            slots.insert(key, value);
        }
        debug!(entries = slots.len(), live = live.len(), "seeded store");
        Self {
            inner: RwLock::new(Inner { slots, live }),
        }
    }

    /// Insert a new entry.
    ///
    /// `Some` inserts a live value; `None` inserts an empty slot that reads
    /// back as absent but still takes the key name.
    ///
    /// # Errors
    ///
    /// [`StoreError::DuplicateKey`] if the key already has an entry — live
    /// or tombstoned. A previously deleted key cannot be re-inserted until
    /// [`SoftStore::clear`].
    pub fn insert(&self, key: K, value: Option<V>) -> Result<(), K> {
        let mut inner = self.inner.write();
        if inner.slots.contains_key(&key) {
            return Err(StoreError::DuplicateKey(key));
        }
        trace!(key = ?key, live = value.is_some(), "insert");
        if value.is_some() {
            inner.live.insert(key.clone());
        }
        inner.slots.insert(key, value);
        Ok(())
    }

    /// Read the slot for a key.
    ///
    /// Returns `None` for a tombstoned or empty slot — a deleted key reads
    /// as "no value", not as an error.
    ///
    /// # Errors
    ///
    /// [`StoreError::KeyNotFound`] if the key has no entry at all.
    pub fn get(&self, key: &K) -> Result<Option<V>, K> {
        let inner = self.inner.read();
        match inner.slots.get(key) {
            Some(slot) => Ok(slot.clone()),
            None => Err(StoreError::KeyNotFound(key.clone())),
        }
    }

    /// Compare-and-update the slot for a key.
    ///
    /// The current slot must equal `expected` (value equality, with `None`
    /// matching a tombstoned or empty slot); otherwise the update is
    /// rejected and the caller should re-read and retry. On a match the
    /// slot is rewritten to `new`: `Some` makes the key live, `None`
    /// tombstones it. When `new` already equals the current value nothing
    /// is written and the lock is never taken exclusively — success, not an
    /// error.
    ///
    /// This is the only mutation that is atomic across a read-then-write;
    /// the upgradable guard is promoted without ever releasing it, so no
    /// writer can interleave between the check and the write.
    ///
    /// # Errors
    ///
    /// - [`StoreError::KeyNotFound`] if the key has no entry.
    /// - [`StoreError::Modified`] if the current value differs from
    ///   `expected`.
    pub fn update(&self, key: &K, expected: Option<&V>, new: Option<V>) -> Result<(), K> {
        let inner = self.inner.upgradable_read();
        let current = match inner.slots.get(key) {
            Some(slot) => slot,
            None => return Err(StoreError::KeyNotFound(key.clone())),
        };
        if current.as_ref() != expected {
            return Err(StoreError::Modified(key.clone()));
        }
        if current.as_ref() == new.as_ref() {
            // Caller handed back the value already stored; skip the write.
            return Ok(());
        }
        let mut inner = RwLockUpgradableReadGuard::upgrade(inner);
        trace!(key = ?key, live = new.is_some(), "update slot");
        if new.is_some() {
            inner.live.insert(key.clone());
        } else {
            inner.live.remove(key);
        }
        inner.slots.insert(key.clone(), new);
        Ok(())
    }

    /// Soft-delete the value for a key.
    ///
    /// The entry stays in the map with a tombstoned slot; subsequent `get`
    /// returns `None` and subsequent `insert` of the same key fails with
    /// [`StoreError::DuplicateKey`]. Deleting an already-tombstoned key is
    /// a no-op success and never takes the exclusive lock.
    ///
    /// # Errors
    ///
    /// [`StoreError::KeyNotFound`] if the key has no entry.
    pub fn delete(&self, key: &K) -> Result<(), K> {
        let inner = self.inner.upgradable_read();
        match inner.slots.get(key) {
            None => return Err(StoreError::KeyNotFound(key.clone())),
            Some(None) => return Ok(()),
            Some(Some(_)) => {}
        }
        let mut inner = RwLockUpgradableReadGuard::upgrade(inner);
        trace!(key = ?key, "tombstone");
        inner.slots.insert(key.clone(), None);
        inner.live.remove(key);
        Ok(())
    }

    /// Snapshot of the keys that currently hold a live value.
    ///
    /// Returns an owned copy taken under the shared lock, never a view into
    /// the locked state: the result does not track later mutations.
    pub fn live_keys(&self) -> HashSet<K> {
        self.inner.read().live.clone()
    }

    /// Drop every entry, tombstones included.
    ///
    /// This is the only way a deleted key becomes insertable again.
    pub fn clear(&self) {
        let mut inner = self.inner.write();
        debug!(entries = inner.slots.len(), "clear store");
        inner.slots.clear();
        inner.live.clear();
    }

    /// Total number of entries, tombstones included.
    ///
    /// Deliberately asymmetric with [`SoftStore::live_keys`]: a deleted key
    /// no longer appears among the live keys but still counts here until
    /// [`SoftStore::clear`].
    pub fn len(&self) -> usize {
        self.inner.read().slots.len()
    }

    /// Check whether the store has no entries at all.
    pub fn is_empty(&self) -> bool {
        self.inner.read().slots.is_empty()
    }
}

impl<K, V> Default for SoftStore<K, V>
where
    K: Eq + Hash + Clone + Debug,
    V: Clone + PartialEq,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> fmt::Debug for SoftStore<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.read();
        f.debug_struct("SoftStore")
            .field("entries", &inner.slots.len())
            .field("live", &inner.live.len())
            .finish()
    }
}
