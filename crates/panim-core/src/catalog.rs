//! The catalog of analysis methods, grouped by level.
//!
//! Loaded once at start-up (built in, or from a JSON file) and read-only
//! afterwards.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{Error, Result};

/// One selectable analysis method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodDescriptor {
  pub id:          String,
  pub name:        String,
  #[serde(default)]
  pub description: String,
  /// Filled in from the enclosing [`Level`] on load.
  #[serde(default)]
  pub level:       u32,
}

impl MethodDescriptor {
  /// The text the analysis prompt uses for this method.
  pub fn details(&self) -> &str {
    if self.description.is_empty() {
      &self.name
    } else {
      &self.description
    }
  }
}

/// A group of methods.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Level {
  pub level:       u32,
  pub title:       String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
  pub methods:     Vec<MethodDescriptor>,
}

#[derive(Debug, Clone)]
pub struct MethodCatalog {
  levels: Vec<Level>,
  index:  HashMap<String, (usize, usize)>,
}

impl MethodCatalog {
  /// Build a catalog, rejecting duplicate method ids.
  pub fn new(levels: Vec<Level>) -> Result<Self> {
    let mut seen = std::collections::HashSet::new();
    for m in levels.iter().flat_map(|l| &l.methods) {
      if !seen.insert(m.id.as_str()) {
        return Err(Error::DuplicateMethod(m.id.clone()));
      }
    }
    Ok(Self::assemble(levels))
  }

  /// Parse a JSON array of levels.
  pub fn from_json(json: &str) -> Result<Self> {
    Self::new(serde_json::from_str(json)?)
  }

  fn assemble(mut levels: Vec<Level>) -> Self {
    let mut index = HashMap::new();
    for (li, level) in levels.iter_mut().enumerate() {
      for (mi, method) in level.methods.iter_mut().enumerate() {
        method.level = level.level;
        index.entry(method.id.clone()).or_insert((li, mi));
      }
    }
    Self { levels, index }
  }

  pub fn levels(&self) -> &[Level] { &self.levels }

  pub fn methods(&self) -> impl Iterator<Item = &MethodDescriptor> {
    self.levels.iter().flat_map(|l| l.methods.iter())
  }

  pub fn get(&self, id: &str) -> Option<&MethodDescriptor> {
    self
      .index
      .get(id)
      .map(|&(li, mi)| &self.levels[li].methods[mi])
  }

  /// Descriptors for `ids`, in the given order. Unknown ids are skipped.
  pub fn resolve<'a>(&'a self, ids: &[String]) -> Vec<&'a MethodDescriptor> {
    ids
      .iter()
      .filter_map(|id| {
        let found = self.get(id);
        if found.is_none() {
          warn!(method = %id, "unknown analysis method ignored");
        }
        found
      })
      .collect()
  }

  /// The default catalog shipped with the binary.
  pub fn builtin() -> Self { Self::assemble(builtin_levels()) }
}

fn method(id: &str, name: &str, description: &str) -> MethodDescriptor {
  MethodDescriptor {
    id:          id.to_owned(),
    name:        name.to_owned(),
    description: description.to_owned(),
    level:       0,
  }
}

fn builtin_levels() -> Vec<Level> {
  vec![
    Level {
      level:       1,
      title:       "פשט".into(),
      description: Some("המשמעות הגלויה של הטקסט".into()),
      methods:     vec![
        method("peshat-plain", "קריאה פשוטה", "הסבר המשמעות המילולית של הטקסט"),
        method("peshat-context", "הקשר", "מיקום הטקסט בהקשרו הרחב"),
        method("peshat-grammar", "דקדוק", "ניתוח שורשים, בניינים וצורות"),
      ],
    },
    Level {
      level:       2,
      title:       "רמז".into(),
      description: Some("משמעויות הנרמזות באותיות ובמספרים".into()),
      methods:     vec![
        method("gematria", "גימטריה", "חישוב ערכים מספריים והשוואה למילים שוות ערך"),
        method("notarikon", "נוטריקון", "קריאת ראשי וסופי תיבות"),
        method("atbash", "אתב\"ש", "החלפת אותיות סימטרית א-ת, ב-ש"),
        method("albam", "אלב\"ם", "החלפת חצאי האלפבית א-ל, ב-מ"),
      ],
    },
    Level {
      level:       3,
      title:       "דרש".into(),
      description: Some("פרשנות, משל ולימוד".into()),
      methods:     vec![
        method("drash-parable", "משל ונמשל", "הצגת הטקסט כמשל והסקת הנמשל"),
        method("drash-analogy", "גזירה שווה", "השוואה למקומות אחרים שבהם מופיעה אותה מילה"),
      ],
    },
    Level {
      level:       4,
      title:       "סוד".into(),
      description: Some("הרובד הפנימי".into()),
      methods:     vec![
        method("sod-sefirot", "ספירות", "מיפוי הטקסט לעשר הספירות"),
        method("sod-letters", "צירופי אותיות", "צירופים ותמורות של אותיות הטקסט"),
      ],
    },
  ]
}
