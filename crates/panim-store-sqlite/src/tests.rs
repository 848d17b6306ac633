//! Integration tests for `SqliteStore` against an in-memory database.

use panim_core::{
  AnalysisRecord, AnalysisSegment, HISTORY_KEY, HistoryStore, NewHistoryItem,
  store::KvStore,
};

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn sample(query: &str) -> NewHistoryItem {
  let record = AnalysisRecord {
    segments: vec![AnalysisSegment::new("סוד", 4, query.to_owned())],
    cards:    Vec::new(),
  };
  NewHistoryItem::new(query, vec!["sod-letters".to_owned()], record)
}

// ─── Key-value ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn missing_key_returns_none() {
  let s = store().await;
  assert!(s.get("nothing").await.unwrap().is_none());
  assert!(s.updated_at("nothing").await.unwrap().is_none());
}

#[tokio::test]
async fn put_then_get() {
  let s = store().await;
  s.put("k", b"value".to_vec()).await.unwrap();

  assert_eq!(s.get("k").await.unwrap().as_deref(), Some(&b"value"[..]));
  assert!(s.updated_at("k").await.unwrap().is_some());
}

#[tokio::test]
async fn put_replaces_previous_value() {
  let s = store().await;
  s.put("k", b"first".to_vec()).await.unwrap();
  let first_at = s.updated_at("k").await.unwrap().unwrap();
  s.put("k", "שני".as_bytes().to_vec()).await.unwrap();

  let value = s.get("k").await.unwrap().unwrap();
  assert_eq!(String::from_utf8(value).unwrap(), "שני");
  assert!(s.updated_at("k").await.unwrap().unwrap() >= first_at);
}

#[tokio::test]
async fn keys_are_independent() {
  let s = store().await;
  s.put("a", vec![1]).await.unwrap();
  s.put("b", vec![2]).await.unwrap();

  assert_eq!(s.get("a").await.unwrap(), Some(vec![1]));
  assert_eq!(s.get("b").await.unwrap(), Some(vec![2]));
}

#[tokio::test]
async fn schema_init_is_idempotent() {
  let s = store().await;
  s.put("k", vec![7]).await.unwrap();
  s.init_schema().await.unwrap();
  assert_eq!(s.get("k").await.unwrap(), Some(vec![7]));
}

// ─── History over SQLite ─────────────────────────────────────────────────────

#[tokio::test]
async fn history_survives_reopen() {
  let s = store().await;

  let mut history = HistoryStore::open(s.clone()).await;
  let root = history.commit(sample("root")).await;
  let child = history.commit(sample("child")).await;
  drop(history);

  assert!(s.get(HISTORY_KEY).await.unwrap().is_some());

  let reopened = HistoryStore::open(s).await;
  assert_eq!(reopened.len(), 2);
  assert_eq!(reopened.get(&child.id).unwrap(), &child);
  assert_eq!(reopened.get(&root.id).unwrap(), &root);
  assert_eq!(child.parent_id.as_deref(), Some(root.id.as_str()));
}

#[tokio::test]
async fn corrupt_history_row_starts_empty() {
  let s = store().await;
  s.put(HISTORY_KEY, b"{broken".to_vec()).await.unwrap();

  let history = HistoryStore::open(s).await;
  assert!(history.is_empty());
}
