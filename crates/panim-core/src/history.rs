//! [`HistoryStore`]: the branching log of completed analyses.
//!
//! Items are immutable once appended. Each may name the item it continued
//! from, so the whole store is a forest; import can bring in items whose
//! parents live elsewhere, and those are kept as dangling references.
//!
//! The store reads its backend once when opened and rewrites the full item
//! sequence after every mutation. Storage problems are logged and never
//! block the caller: unreadable stored data starts an empty history, and a
//! failed write leaves the in-memory history authoritative.

use chrono::{DateTime, SubsecRound as _, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
  Error, Result,
  forest::HistoryForest,
  model::{AnalysisSegment, HistoryItem, NewHistoryItem},
  store::{HISTORY_KEY, KvStore},
};

/// Version written into exported files.
pub const EXPORT_VERSION: u64 = 1;

// ─── Import policy ───────────────────────────────────────────────────────────

/// How [`HistoryStore::import`] treats incoming items whose id is already
/// present.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportPolicy {
  /// Keep every incoming item, duplicates included.
  #[default]
  Append,
  /// Drop incoming items whose id is already in the store.
  SkipExistingIds,
}

// ─── Export envelope ─────────────────────────────────────────────────────────

#[derive(Serialize)]
struct ExportDocument<'a> {
  version: u64,
  items:   Vec<&'a HistoryItem>,
}

/// Accepts `[item, ...]` or `{"version": n, "items": [item, ...]}`.
fn parse_document(bytes: &[u8]) -> Result<Vec<HistoryItem>> {
  let value: Value = serde_json::from_slice(bytes)
    .map_err(|e| Error::ImportFormat(format!("not valid JSON: {e}")))?;

  let items = match value {
    Value::Array(items) => Value::Array(items),
    Value::Object(mut doc) => {
      let version = doc
        .get("version")
        .and_then(Value::as_u64)
        .ok_or_else(|| Error::ImportFormat("envelope has no numeric version".into()))?;
      if version > EXPORT_VERSION {
        return Err(Error::ImportFormat(format!(
          "unsupported history version {version}"
        )));
      }
      doc
        .remove("items")
        .ok_or_else(|| Error::ImportFormat("envelope has no items".into()))?
    }
    _ => {
      return Err(Error::ImportFormat(
        "expected an array of history items".into(),
      ));
    }
  };

  serde_json::from_value(items)
    .map_err(|e| Error::ImportFormat(format!("invalid history item: {e}")))
}

fn now_millis() -> DateTime<Utc> { Utc::now().trunc_subsecs(3) }

// ─── Store ───────────────────────────────────────────────────────────────────

pub struct HistoryStore<B> {
  backend: B,
  forest:  HistoryForest,
  current: Option<String>,
  pending: Vec<AnalysisSegment>,
  policy:  ImportPolicy,
}

impl<B: KvStore> HistoryStore<B> {
  /// Load the history persisted in `backend`.
  pub async fn open(backend: B) -> Self {
    let forest = match backend.get(HISTORY_KEY).await {
      Ok(Some(bytes)) => match parse_document(&bytes) {
        Ok(items) => HistoryForest::from_items(items),
        Err(e) => {
          warn!(error = %e, "stored history is unreadable; starting empty");
          HistoryForest::default()
        }
      },
      Ok(None) => HistoryForest::default(),
      Err(e) => {
        warn!(error = %e, "could not read stored history; starting empty");
        HistoryForest::default()
      }
    };
    debug!(items = forest.len(), "history loaded");

    Self {
      backend,
      forest,
      current: None,
      pending: Vec::new(),
      policy: ImportPolicy::default(),
    }
  }

  pub fn with_import_policy(mut self, policy: ImportPolicy) -> Self {
    self.policy = policy;
    self
  }

  pub fn import_policy(&self) -> ImportPolicy { self.policy }

  pub fn backend(&self) -> &B { &self.backend }

  // ── Reads ─────────────────────────────────────────────────────────────────

  /// All items, newest first.
  pub fn items(&self) -> impl Iterator<Item = &HistoryItem> + '_ { self.forest.iter() }

  pub fn len(&self) -> usize { self.forest.len() }

  pub fn is_empty(&self) -> bool { self.forest.is_empty() }

  /// Look up an item without touching the current item or order.
  pub fn get(&self, id: &str) -> Result<&HistoryItem> {
    self
      .forest
      .get(id)
      .ok_or_else(|| Error::NotFound(id.to_owned()))
  }

  /// The item the next [`commit`](Self::commit) will branch from.
  pub fn current(&self) -> Option<&HistoryItem> {
    self.current.as_deref().and_then(|id| self.forest.get(id))
  }

  pub fn children(&self, id: &str) -> Vec<&HistoryItem> { self.forest.children(id).collect() }

  /// Parent chain of `id`, nearest first.
  pub fn ancestors(&self, id: &str) -> Result<Vec<&HistoryItem>> {
    self.get(id)?;
    Ok(self.forest.ancestors(id))
  }

  pub fn roots(&self) -> Vec<&HistoryItem> { self.forest.roots().collect() }

  // ── Navigation ────────────────────────────────────────────────────────────

  /// Make `id` the current item. Store order is unchanged.
  pub fn select(&mut self, id: &str) -> Result<&HistoryItem> {
    let item = self
      .forest
      .get(id)
      .ok_or_else(|| Error::NotFound(id.to_owned()))?;
    self.current = Some(item.id.clone());
    Ok(item)
  }

  /// Forget the current item; the next commit starts a new tree.
  pub fn clear_current(&mut self) { self.current = None; }

  // ── Context selection ─────────────────────────────────────────────────────

  /// Add `segment` to the pending context, or remove it if an equal segment
  /// (same title and content) is already there. Returns whether the segment
  /// is selected afterwards.
  pub fn toggle(&mut self, segment: AnalysisSegment) -> bool {
    match self.pending.iter().position(|s| s.same_as(&segment)) {
      Some(pos) => {
        self.pending.remove(pos);
        false
      }
      None => {
        self.pending.push(segment);
        true
      }
    }
  }

  /// Segments that will seed the next commit.
  pub fn pending(&self) -> &[AnalysisSegment] { &self.pending }

  // ── Writes ────────────────────────────────────────────────────────────────

  /// Record a completed analysis as a new item and make it current.
  ///
  /// A `parent_id` that is not in the store is dropped, so that every parent
  /// reference is valid when it is created.
  pub async fn append(
    &mut self,
    new: NewHistoryItem,
    parent_id: Option<String>,
    context_segments: Vec<AnalysisSegment>,
  ) -> HistoryItem {
    let parent_id = parent_id.filter(|id| {
      let known = self.forest.contains(id);
      if !known {
        warn!(parent_id = %id, "parent is not in history; recording a new root");
      }
      known
    });

    let item = HistoryItem {
      id: self.fresh_id(),
      parent_id,
      timestamp: now_millis(),
      query: new.query,
      selected_methods: new.selected_methods,
      analysis: new.record.segments,
      cards: new.record.cards,
      context_segments,
    };

    self.forest.push_front(item.clone());
    self.current = Some(item.id.clone());
    debug!(id = %item.id, parent = ?item.parent_id, "history item appended");
    self.persist().await;
    item
  }

  /// Append as a continuation of the current item, consuming the pending
  /// context selection.
  pub async fn commit(&mut self, new: NewHistoryItem) -> HistoryItem {
    let context = std::mem::take(&mut self.pending);
    let parent = self.current.clone();
    self.append(new, parent, context).await
  }

  /// Serialise the whole history, newest first.
  pub fn export(&self) -> Result<String> {
    let doc = ExportDocument {
      version: EXPORT_VERSION,
      items:   self.forest.iter().collect(),
    };
    Ok(serde_json::to_string_pretty(&doc)?)
  }

  /// Add the items in `document` after the existing ones, keeping their ids,
  /// parents, and timestamps. Returns how many were added. On error nothing
  /// changes.
  pub async fn import(&mut self, document: &str) -> Result<usize> {
    let incoming = parse_document(document.as_bytes())?;
    let offered = incoming.len();

    let mut added = 0;
    for item in incoming {
      if self.policy == ImportPolicy::SkipExistingIds && self.forest.contains(&item.id) {
        continue;
      }
      self.forest.push_back(item);
      added += 1;
    }

    info!(offered, added, policy = ?self.policy, "history imported");
    if added > 0 {
      self.persist().await;
    }
    Ok(added)
  }

  // ── Internals ─────────────────────────────────────────────────────────────

  fn fresh_id(&self) -> String {
    loop {
      let id = Uuid::new_v4().to_string();
      if !self.forest.contains(&id) {
        return id;
      }
    }
  }

  async fn persist(&self) {
    let items: Vec<&HistoryItem> = self.forest.iter().collect();
    let bytes = match serde_json::to_vec(&items) {
      Ok(bytes) => bytes,
      Err(e) => {
        warn!(error = %e, "could not serialise history");
        return;
      }
    };
    if let Err(e) = self.backend.put(HISTORY_KEY, bytes).await {
      warn!(error = %e, "could not persist history");
    }
  }
}
