//! Error type for `panim-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// The database was written by a newer schema than this build knows.
  #[error("unsupported schema version {0}")]
  SchemaVersion(i64),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
