//! Standard gematria: the sum of letter values.

use crate::alphabet::letter_value;

/// Sum the values of every Hebrew letter in `text`. Anything else counts
/// as zero.
pub fn score(text: &str) -> u64 {
  text.chars().filter_map(letter_value).map(u64::from).sum()
}
