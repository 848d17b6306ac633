//! Plain-text rendering of records and history.

use std::{collections::HashSet, fmt::Write as _};

use chrono::Local;
use panim_core::{
  AnalysisRecord, AnalysisSegment, EssenceCard, HistoryItem, HistoryStore, KvStore,
};

fn tags(tags: Option<&[String]>) -> String {
  match tags {
    Some(t) if !t.is_empty() => format!("  #{}", t.join(" #")),
    _ => String::new(),
  }
}

/// Numbered segments, then cards.
fn body(out: &mut String, segments: &[AnalysisSegment], cards: &[EssenceCard]) {
  for (n, seg) in segments.iter().enumerate() {
    let _ = writeln!(
      out,
      "[{}] {} (level {}){}",
      n + 1,
      seg.title,
      seg.level,
      tags(seg.tags.as_deref())
    );
    let _ = writeln!(out, "{}\n", seg.content.trim_end());
  }

  for card in cards {
    let _ = writeln!(
      out,
      "◆ {} · {} · {} · {}{}",
      card.title,
      card.element,
      card.energy,
      card.score,
      tags(card.tags.as_deref())
    );
    for sentence in &card.sentences {
      let _ = writeln!(out, "    {sentence}");
    }
  }
}

pub fn analysis(r: &AnalysisRecord) -> String {
  let mut out = String::new();
  body(&mut out, &r.segments, &r.cards);
  out
}

/// One line per item: id, local time, query.
pub fn summary_line(item: &HistoryItem) -> String {
  format!(
    "{}  {}  {}",
    item.id,
    item.timestamp.with_timezone(&Local).format("%Y-%m-%d %H:%M"),
    item.query
  )
}

pub fn item(item: &HistoryItem) -> String {
  let mut out = String::new();
  let _ = writeln!(out, "{}", summary_line(item));
  if let Some(parent) = &item.parent_id {
    let _ = writeln!(out, "parent:  {parent}");
  }
  let _ = writeln!(out, "methods: {}", item.selected_methods.join(", "));
  if !item.context_segments.is_empty() {
    let titles: Vec<_> = item.context_segments.iter().map(|s| s.title.as_str()).collect();
    let _ = writeln!(out, "context: {}", titles.join(" | "));
  }
  out.push('\n');

  body(&mut out, &item.analysis, &item.cards);
  out
}

/// Indented forest, roots first in display order. Items reachable twice
/// (duplicate ids, cycles) are printed once. Items whose parent chain loops
/// back on itself have no root; each unprinted one starts its own branch.
pub fn tree<B: KvStore>(history: &HistoryStore<B>) -> String {
  let mut out = String::new();
  let mut seen = HashSet::new();
  for root in history.roots() {
    branch(history, root, 0, &mut seen, &mut out);
  }
  for item in history.items() {
    if !seen.contains(item.id.as_str()) {
      branch(history, item, 0, &mut seen, &mut out);
    }
  }
  out
}

fn branch<'a, B: KvStore>(
  history: &'a HistoryStore<B>,
  item: &'a HistoryItem,
  depth: usize,
  seen: &mut HashSet<&'a str>,
  out: &mut String,
) {
  if !seen.insert(item.id.as_str()) {
    return;
  }
  let _ = writeln!(out, "{}{}", "  ".repeat(depth), summary_line(item));
  for child in history.children(&item.id) {
    branch(history, child, depth + 1, seen, out);
  }
}

#[cfg(test)]
mod tests {
  use panim_core::{MemoryStore, NewHistoryItem};

  use super::*;

  fn sample(query: &str) -> NewHistoryItem {
    let record = AnalysisRecord {
      segments: vec![AnalysisSegment::new("פשט", 1, "text")],
      cards:    Vec::new(),
    };
    NewHistoryItem::new(query, vec!["peshat-plain".into()], record)
  }

  #[tokio::test]
  async fn tree_indents_children() {
    let mut history = HistoryStore::open(MemoryStore::new()).await;
    history.commit(sample("root")).await;
    history.commit(sample("child")).await;
    history.clear_current();
    history.commit(sample("other")).await;

    let text = tree(&history);
    let lines: Vec<_> = text.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].ends_with("other"));
    assert!(lines[1].ends_with("root"));
    assert!(lines[2].starts_with("  ") && lines[2].ends_with("child"));
  }

  #[tokio::test]
  async fn tree_includes_parent_cycles() {
    let item = |id: &str, parent: &str| {
      serde_json::json!({
        "id": id,
        "parentId": parent,
        "timestamp": 1_700_000_000_000_i64,
        "query": format!("q{id}"),
        "selectedMethods": [],
        "analysis": [],
        "cards": []
      })
    };
    let doc = serde_json::json!([item("a", "b"), item("b", "a")]).to_string();

    let mut history = HistoryStore::open(MemoryStore::new()).await;
    history.import(&doc).await.unwrap();
    assert!(history.roots().is_empty());

    let text = tree(&history);
    let lines: Vec<_> = text.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("a ") && lines[0].ends_with("qa"));
    assert!(lines[1].starts_with("  b ") && lines[1].ends_with("qb"));
  }

  #[test]
  fn segments_are_numbered_from_one() {
    let mut seg = AnalysisSegment::new("רמז", 2, "body");
    seg.tags = Some(vec!["a".into(), "b".into()]);
    let text = analysis(&AnalysisRecord { segments: vec![seg], cards: Vec::new() });
    assert!(text.starts_with("[1] רמז (level 2)  #a #b\nbody\n"));
  }
}
