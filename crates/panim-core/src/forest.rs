//! The history forest: items in display order, indexed by id and by parent.
//!
//! Items are kept in an append-only arena so that index entries never move.
//! Display order (newest first, imports after existing items) is a separate
//! deque of arena slots.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::model::HistoryItem;

#[derive(Debug, Clone, Default)]
pub struct HistoryForest {
  slots:    Vec<HistoryItem>,
  order:    VecDeque<usize>,
  /// First slot in display order for each id.
  by_id:    HashMap<String, usize>,
  /// Child slots per parent id, in display order.
  children: HashMap<String, Vec<usize>>,
}

impl HistoryForest {
  /// Build from items already in display order.
  pub fn from_items(items: impl IntoIterator<Item = HistoryItem>) -> Self {
    let mut forest = Self::default();
    for item in items {
      forest.push_back(item);
    }
    forest
  }

  pub fn len(&self) -> usize { self.order.len() }

  pub fn is_empty(&self) -> bool { self.order.is_empty() }

  pub fn contains(&self, id: &str) -> bool { self.by_id.contains_key(id) }

  pub fn get(&self, id: &str) -> Option<&HistoryItem> {
    self.by_id.get(id).map(|&slot| &self.slots[slot])
  }

  /// All items, newest first.
  pub fn iter(&self) -> impl Iterator<Item = &HistoryItem> + '_ {
    self.order.iter().map(|&slot| &self.slots[slot])
  }

  /// Insert at the front of display order (a newly created item).
  pub fn push_front(&mut self, item: HistoryItem) {
    let slot = self.slots.len();
    self.by_id.insert(item.id.clone(), slot);
    if let Some(parent) = &item.parent_id {
      self.children.entry(parent.clone()).or_default().insert(0, slot);
    }
    self.order.push_front(slot);
    self.slots.push(item);
  }

  /// Insert at the back of display order (an imported item). An id already
  /// present keeps resolving to the earlier item.
  pub fn push_back(&mut self, item: HistoryItem) {
    let slot = self.slots.len();
    self.by_id.entry(item.id.clone()).or_insert(slot);
    if let Some(parent) = &item.parent_id {
      self.children.entry(parent.clone()).or_default().push(slot);
    }
    self.order.push_back(slot);
    self.slots.push(item);
  }

  /// The item `item.parent_id` refers to, if it is present.
  pub fn parent(&self, item: &HistoryItem) -> Option<&HistoryItem> {
    item.parent_id.as_deref().and_then(|id| self.get(id))
  }

  /// Items whose `parent_id` is `id`, newest first.
  pub fn children(&self, id: &str) -> impl Iterator<Item = &HistoryItem> + '_ {
    self
      .children
      .get(id)
      .into_iter()
      .flatten()
      .map(|&slot| &self.slots[slot])
  }

  /// Parent, grandparent, … of `id`, nearest first. Stops at a root, at a
  /// parent that is not present, or where imported data loops back.
  pub fn ancestors(&self, id: &str) -> Vec<&HistoryItem> {
    let mut chain = Vec::new();
    let Some(&start) = self.by_id.get(id) else {
      return chain;
    };
    let mut visited = HashSet::from([start]);
    let mut cursor = &self.slots[start];

    while let Some(&slot) = cursor.parent_id.as_deref().and_then(|p| self.by_id.get(p)) {
      if !visited.insert(slot) {
        break;
      }
      cursor = &self.slots[slot];
      chain.push(cursor);
    }
    chain
  }

  /// Items with no parent or with a parent that is not present, newest
  /// first.
  pub fn roots(&self) -> impl Iterator<Item = &HistoryItem> + '_ {
    self.iter().filter(|item| self.parent(item).is_none())
  }
}
