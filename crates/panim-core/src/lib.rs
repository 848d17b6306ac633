//! Core types and services for the 70 Panim text-analysis workbench.
//!
//! The crate holds the analysis record builder, the method catalog, and the
//! branching history store. It talks to the outside world only through two
//! traits: [`Collaborator`] for the analysis service and [`KvStore`] for
//! persistence. Letter-level tools live in `panim-letters`.

// Native `async fn` in traits; the trait definitions spell out `Send`
// futures explicitly.
#![allow(async_fn_in_trait)]

pub mod analysis;
pub mod catalog;
pub mod error;
pub mod forest;
pub mod history;
pub mod model;
pub mod store;

#[cfg(test)]
mod mock;

pub use analysis::{AnalysisBuilder, BuildOutcome, Collaborator, CollaboratorRequest};
pub use catalog::{Level, MethodCatalog, MethodDescriptor};
pub use error::{Error, Result};
pub use history::{HistoryStore, ImportPolicy};
pub use model::{AnalysisRecord, AnalysisSegment, EssenceCard, HistoryItem, NewHistoryItem};
pub use store::{HISTORY_KEY, KvStore, MemoryStore};
