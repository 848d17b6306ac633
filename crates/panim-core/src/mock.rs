//! Test doubles for the service and storage seams.

use std::{
  collections::VecDeque,
  sync::{Mutex, PoisonError},
};

use crate::{
  analysis::{Collaborator, CollaboratorRequest},
  store::KvStore,
};

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct MockError(pub String);

/// Replays queued responses in order and records every request.
#[derive(Debug, Default)]
pub struct MockCollaborator {
  responses: Mutex<VecDeque<Result<String, MockError>>>,
  calls:     Mutex<Vec<CollaboratorRequest>>,
}

impl MockCollaborator {
  pub fn new() -> Self { Self::default() }

  pub fn respond(self, text: impl Into<String>) -> Self {
    self.push(Ok(text.into()));
    self
  }

  pub fn fail(self, message: impl Into<String>) -> Self {
    self.push(Err(MockError(message.into())));
    self
  }

  pub fn calls(&self) -> Vec<CollaboratorRequest> {
    self.calls.lock().unwrap_or_else(PoisonError::into_inner).clone()
  }

  fn push(&self, response: Result<String, MockError>) {
    self
      .responses
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
      .push_back(response);
  }
}

impl Collaborator for MockCollaborator {
  type Error = MockError;

  async fn generate(&self, request: &CollaboratorRequest) -> Result<String, MockError> {
    self
      .calls
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
      .push(request.clone());
    self
      .responses
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
      .pop_front()
      .unwrap_or_else(|| Err(MockError("no response queued".into())))
  }
}

/// A backend whose reads and writes always fail.
#[derive(Debug, Default)]
pub struct BrokenStore;

impl KvStore for BrokenStore {
  type Error = MockError;

  async fn get(&self, _key: &str) -> Result<Option<Vec<u8>>, MockError> {
    Err(MockError("disk unavailable".into()))
  }

  async fn put(&self, _key: &str, _value: Vec<u8>) -> Result<(), MockError> {
    Err(MockError("disk unavailable".into()))
  }
}
