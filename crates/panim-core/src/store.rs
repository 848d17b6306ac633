//! The `KvStore` trait and an in-memory implementation.
//!
//! The history is persisted as one value under a fixed key. Storage backends
//! (e.g. `panim-store-sqlite`) implement this trait; the history store
//! depends on the abstraction only.

use std::{
  collections::HashMap,
  convert::Infallible,
  future::Future,
  sync::{Arc, Mutex, PoisonError},
};

/// Key under which the whole history sequence is stored.
pub const HISTORY_KEY: &str = "70panim_history";

// ─── Trait ───────────────────────────────────────────────────────────────────

/// A byte-valued key-value store.
///
/// All methods return `Send` futures so stores can be shared across tasks
/// of a multi-threaded runtime.
pub trait KvStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Read the value stored under `key`. Returns `None` if nothing is stored.
  fn get<'a>(
    &'a self,
    key: &'a str,
  ) -> impl Future<Output = Result<Option<Vec<u8>>, Self::Error>> + Send + 'a;

  /// Store `value` under `key`, replacing any previous value.
  fn put<'a>(
    &'a self,
    key: &'a str,
    value: Vec<u8>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;
}

// ─── MemoryStore ─────────────────────────────────────────────────────────────

/// A process-local store; nothing survives the process.
///
/// Cloning is cheap and clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
  values: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl MemoryStore {
  pub fn new() -> Self { Self::default() }

  /// Pre-populate `key`, e.g. with data written by an earlier session.
  pub fn with_value(self, key: &str, value: impl Into<Vec<u8>>) -> Self {
    self
      .values
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
      .insert(key.to_owned(), value.into());
    self
  }

  /// Synchronous read, for inspection.
  pub fn snapshot(&self, key: &str) -> Option<Vec<u8>> {
    self
      .values
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
      .get(key)
      .cloned()
  }
}

impl KvStore for MemoryStore {
  type Error = Infallible;

  async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, Infallible> {
    Ok(self.snapshot(key))
  }

  async fn put(&self, key: &str, value: Vec<u8>) -> Result<(), Infallible> {
    self
      .values
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
      .insert(key.to_owned(), value);
    Ok(())
  }
}
