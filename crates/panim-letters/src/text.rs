//! Small text transforms: acronym extraction, diacritic stripping, counts.

use serde::Serialize;

use crate::alphabet::is_mark;

/// Letters in the contiguous Hebrew letter block, finals included.
fn is_letter_block(c: char) -> bool { ('\u{05D0}'..='\u{05EA}').contains(&c) }

/// The first Hebrew letter of every whitespace-separated token, joined.
/// Tokens without a Hebrew letter contribute nothing.
pub fn acronym(text: &str) -> String {
  text
    .split_whitespace()
    .filter_map(|word| word.chars().find(|c| is_letter_block(*c)))
    .collect()
}

/// Remove vowel points and cantillation marks. Letters, spaces, and all
/// other characters are kept.
pub fn strip_diacritics(text: &str) -> String {
  text.chars().filter(|c| !is_mark(*c)).collect()
}

/// Counts shown by the statistics tool. Characters are Unicode scalar
/// values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TextStats {
  pub chars:           usize,
  pub chars_no_spaces: usize,
  pub words:           usize,
  pub lines:           usize,
  pub sentences:       usize,
}

impl TextStats {
  pub fn of(text: &str) -> Self {
    let blank = text.trim().is_empty();
    Self {
      chars:           text.chars().count(),
      chars_no_spaces: text.chars().filter(|c| !c.is_whitespace()).count(),
      words:           text.split_whitespace().count(),
      lines:           if blank { 0 } else { text.split('\n').count() },
      sentences:       text
        .split(['.', '?', '!'])
        .filter(|s| !s.trim().is_empty())
        .count(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn acronym_of_opening_words() {
    assert_eq!(acronym("בראשית ברא אלוהים"), "בבא");
  }

  #[test]
  fn acronym_skips_punctuation_and_foreign_tokens() {
    assert_eq!(acronym("  \"שמע ישראל\"\nhello ה'  ... אחד. "), "שיהא");
    assert_eq!(acronym(""), "");
  }

  #[test]
  fn acronym_keeps_final_forms() {
    assert_eq!(acronym("ךלי"), "ך");
  }

  #[test]
  fn strip_removes_points_only() {
    assert_eq!(strip_diacritics("בְּרֵאשִׁית בָּרָא"), "בראשית ברא");
    assert_eq!(strip_diacritics("abc אבג"), "abc אבג");
  }

  #[test]
  fn strip_is_idempotent() {
    let text = "וַיֹּ֥אמֶר אֱלֹהִ֖ים יְהִ֣י א֑וֹר";
    let once = strip_diacritics(text);
    assert_eq!(strip_diacritics(&once), once);
    assert_eq!(once, "ויאמר אלהים יהי אור");
  }

  #[test]
  fn stats_of_blank_text() {
    assert_eq!(TextStats::of("   "), TextStats {
      chars: 3,
      ..TextStats::default()
    });
  }

  #[test]
  fn stats_counts() {
    let stats = TextStats::of("שלום עולם. מה שלומך?\nטוב!");
    assert_eq!(stats.words, 5);
    assert_eq!(stats.lines, 2);
    assert_eq!(stats.sentences, 3);
    assert_eq!(stats.chars, 25);
    assert_eq!(stats.chars_no_spaces, 21);
  }
}
