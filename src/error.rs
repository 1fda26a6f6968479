//! Error types for store operations.
//!
//! Every failure carries the offending key so callers and logs can name the
//! entry a rejected operation was aimed at.

use std::fmt::Debug;

use thiserror::Error;

/// All failures a store operation can surface.
///
/// Failures are synchronous: the failing call returns the error directly,
/// nothing is retried internally, and the store is never left partially
/// mutated (each operation applies fully under the lock or not at all).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError<K: Debug> {
    /// Key rejected by validation before any lock was taken.
    #[error("invalid key: {0:?}")]
    InvalidKey(K),

    /// Insert on a key that already has an entry, live or tombstoned.
    ///
    /// A tombstoned key still counts as taken; deleting a key does not free
    /// its name for re-insertion.
    #[error("duplicate key: {0:?}")]
    DuplicateKey(K),

    /// Get/update/delete referenced a key with no entry at all.
    #[error("key not found: {0:?}")]
    KeyNotFound(K),

    /// Compare-and-update found a value other than the expected one.
    ///
    /// Another writer changed the slot since the caller last observed it.
    /// Retry with a fresh read if the update still applies.
    #[error("value for key {0:?} was modified concurrently")]
    Modified(K),
}

/// Result type for store operations.
pub type Result<T, K> = std::result::Result<T, StoreError<K>>;

impl<K: Debug> StoreError<K> {
    /// Check if this error may succeed on retry with fresh data.
    ///
    /// Only CAS conflicts are retryable; the classic loop is read, recompute,
    /// update, and go around again on [`StoreError::Modified`].
    pub fn is_retryable(&self) -> bool {
        matches!(self, StoreError::Modified(_))
    }

    /// Check if this is a missing-entry error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::KeyNotFound(_))
    }

    /// Check if this is a CAS conflict.
    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::Modified(_))
    }

    /// The key the failing operation was aimed at.
    pub fn key(&self) -> &K {
        match self {
            StoreError::InvalidKey(k)
            | StoreError::DuplicateKey(k)
            | StoreError::KeyNotFound(k)
            | StoreError::Modified(k) => k,
        }
    }
}
