//! Analysis results and history items.
//!
//! The serialised shapes are the ones found in exported history files:
//! camelCase keys, millisecond timestamps, optional `tags` kept absent when
//! absent.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ─── Segments and cards ──────────────────────────────────────────────────────

/// One titled block of analysis text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSegment {
  pub title:   String,
  /// Group the segment belongs to; 99 marks an integrating summary. Any
  /// JSON number is accepted.
  pub level:   f64,
  pub content: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub tags:    Option<Vec<String>>,
}

impl AnalysisSegment {
  pub fn new(title: impl Into<String>, level: impl Into<f64>, content: impl Into<String>) -> Self {
    Self {
      title: title.into(),
      level: level.into(),
      content: content.into(),
      tags: None,
    }
  }

  /// Segments are the same selection when title and content match.
  pub fn same_as(&self, other: &Self) -> bool {
    self.title == other.title && self.content == other.content
  }
}

/// A summary card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EssenceCard {
  pub title:     String,
  pub element:   String,
  pub energy:    String,
  pub score:     f64,
  pub sentences: Vec<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub tags:      Option<Vec<String>>,
}

// ─── AnalysisRecord ──────────────────────────────────────────────────────────

/// The validated result of one analysis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRecord {
  #[serde(rename = "analysis", default)]
  pub segments: Vec<AnalysisSegment>,
  #[serde(default)]
  pub cards:    Vec<EssenceCard>,
}

impl AnalysisRecord {
  pub const FALLBACK_TITLE: &'static str = "שגיאה";
  pub const FALLBACK_MESSAGE: &'static str = "אירעה שגיאה בעיבוד הנתונים.";

  /// A single-segment record shown in place of a failed analysis.
  pub fn fallback(diagnostic: &str) -> Self {
    Self {
      segments: vec![AnalysisSegment::new(
        Self::FALLBACK_TITLE,
        1,
        format!("{}\n\n{diagnostic}", Self::FALLBACK_MESSAGE),
      )],
      cards:    Vec::new(),
    }
  }
}

// ─── HistoryItem ─────────────────────────────────────────────────────────────

/// One completed analysis. Created once, never modified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryItem {
  pub id:               String,
  /// The item this one continued from. May name an item that is not in the
  /// store (imported from another session).
  #[serde(default)]
  pub parent_id:        Option<String>,
  #[serde(with = "chrono::serde::ts_milliseconds")]
  pub timestamp:        DateTime<Utc>,
  pub query:            String,
  pub selected_methods: Vec<String>,
  pub analysis:         Vec<AnalysisSegment>,
  pub cards:            Vec<EssenceCard>,
  /// Segments selected as context when this item was created.
  #[serde(default)]
  pub context_segments: Vec<AnalysisSegment>,
}

/// Input to [`crate::history::HistoryStore::append`]. The id, timestamp, and
/// parent are assigned by the store.
#[derive(Debug, Clone)]
pub struct NewHistoryItem {
  pub query:            String,
  pub selected_methods: Vec<String>,
  pub record:           AnalysisRecord,
}

impl NewHistoryItem {
  pub fn new(
    query: impl Into<String>,
    selected_methods: Vec<String>,
    record: AnalysisRecord,
  ) -> Self {
    Self {
      query: query.into(),
      selected_methods,
      record,
    }
  }
}
