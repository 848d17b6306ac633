//! [`SqliteStore`]: the SQLite implementation of [`KvStore`].

use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::OptionalExtension as _;
use tracing::debug;

use panim_core::store::KvStore;

use crate::{
  Error, Result,
  schema::{SCHEMA, SCHEMA_VERSION},
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A key-value store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  pub(crate) async fn init_schema(&self) -> Result<()> {
    let version: i64 = self
      .conn
      .call(|conn| Ok(conn.query_row("PRAGMA user_version", [], |r| r.get(0))?))
      .await?;
    if version > SCHEMA_VERSION {
      return Err(Error::SchemaVersion(version));
    }

    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    debug!(from = version, to = SCHEMA_VERSION, "schema ready");
    Ok(())
  }

  /// When `key` was last written, if it exists.
  pub async fn updated_at(&self, key: &str) -> Result<Option<DateTime<Utc>>> {
    let key = key.to_owned();
    let raw: Option<String> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT updated_at FROM kv WHERE key = ?1",
            rusqlite::params![key],
            |r| r.get(0),
          )
          .optional()?)
      })
      .await?;

    raw.map(|s| decode_dt(&s)).transpose()
  }
}

fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339_opts(SecondsFormat::Millis, true) }

fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(format!("{s}: {e}")))
}

// ─── KvStore impl ────────────────────────────────────────────────────────────

impl KvStore for SqliteStore {
  type Error = Error;

  async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
    let key = key.to_owned();
    let value = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT value FROM kv WHERE key = ?1",
            rusqlite::params![key],
            |r| r.get(0),
          )
          .optional()?)
      })
      .await?;
    Ok(value)
  }

  async fn put(&self, key: &str, value: Vec<u8>) -> Result<()> {
    let key = key.to_owned();
    let at_str = encode_dt(Utc::now());
    let len = value.len();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)
           ON CONFLICT(key) DO UPDATE SET
             value      = excluded.value,
             updated_at = excluded.updated_at",
          rusqlite::params![key, value, at_str],
        )?;
        Ok(())
      })
      .await?;
    debug!(bytes = len, "value stored");
    Ok(())
  }
}
