//! Error types for the panim-letters engine.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unknown cipher scheme: {0:?}")]
  InvalidScheme(String),

  #[error("{0:?} is not one of the 22 canonical letters")]
  NotCanonical(char),

  #[error("letter {0:?} appears in more than one pair")]
  DuplicatePairing(char),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
