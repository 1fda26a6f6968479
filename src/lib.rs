//! # softstore
//!
//! Thread-safe in-memory key-value store with soft deletion and optimistic
//! updates.
//!
//! A [`SoftStore`] maps keys to value slots under a single readers-writer
//! lock. Deleting a key tombstones its slot instead of removing the entry:
//! the key reads back as "no value" and stays permanently taken until the
//! whole store is cleared. Updates are compare-and-swap — the caller states
//! the value it last observed, and the store rejects the write if another
//! thread changed it in the meantime.
//!
//! ## Quick start
//!
//! ```
//! use softstore::{SoftStore, StoreError};
//!
//! let store: SoftStore<&str, i64> = SoftStore::new();
//!
//! store.insert("counter", Some(0))?;
//! store.update(&"counter", Some(&0), Some(1))?;
//! assert_eq!(store.get(&"counter")?, Some(1));
//!
//! store.delete(&"counter")?;
//! assert_eq!(store.get(&"counter")?, None);          // tombstoned, not gone
//! assert!(store.insert("counter", Some(2)).is_err()); // name stays taken
//! # Ok::<(), StoreError<&'static str>>(())
//! ```
//!
//! ## Retrying updates
//!
//! [`SoftStore::update`] fails with [`StoreError::Modified`] when it loses a
//! race. The store never retries internally; callers loop:
//!
//! ```
//! use softstore::SoftStore;
//!
//! let store: SoftStore<&str, i64> = SoftStore::new();
//! store.insert("n", Some(0)).unwrap();
//!
//! loop {
//!     let seen = store.get(&"n").unwrap();
//!     let next = seen.map(|v| v + 1);
//!     match store.update(&"n", seen.as_ref(), next) {
//!         Ok(()) => break,
//!         Err(e) if e.is_retryable() => continue,
//!         Err(e) => panic!("{e}"),
//!     }
//! }
//! ```
//!
//! For string-keyed use, [`NamedStore`] adds key validation on top of the
//! same engine.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod error;
mod named;
mod store;

pub use error::{Result, StoreError};
pub use named::NamedStore;
pub use store::SoftStore;
