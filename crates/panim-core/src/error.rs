//! Error types for `panim-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// A blank query or an empty method selection.
  #[error("nothing to analyze: {0}")]
  EmptyInput(&'static str),

  /// The analysis service could not be reached or refused the request.
  #[error("collaborator error: {0}")]
  Collaborator(#[source] Box<dyn std::error::Error + Send + Sync>),

  /// The analysis service answered with something that is not the requested
  /// structure.
  #[error("malformed collaborator response: {0}")]
  MalformedResponse(String),

  #[error("history import rejected: {0}")]
  ImportFormat(String),

  #[error("history item not found: {0}")]
  NotFound(String),

  #[error("duplicate method id in catalog: {0}")]
  DuplicateMethod(String),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

impl Error {
  /// Failures that come from the analysis service rather than the caller.
  pub fn is_collaborator(&self) -> bool {
    matches!(self, Self::Collaborator(_) | Self::MalformedResponse(_))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
