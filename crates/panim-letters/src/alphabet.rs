//! The 22-letter alphabet, its final forms, and the letter-value table.
//!
//! Lookups are always made against the canonical (medial) letter; the five
//! final forms are aliases resolved by [`canonicalize`].

/// The canonical letters in alphabet order.
pub const LETTERS: [char; 22] = [
  'א', 'ב', 'ג', 'ד', 'ה', 'ו', 'ז', 'ח', 'ט', 'י', 'כ',
  'ל', 'מ', 'נ', 'ס', 'ע', 'פ', 'צ', 'ק', 'ר', 'ש', 'ת',
];

/// Standard value of each letter in [`LETTERS`], by position.
pub const VALUES: [u32; 22] = [
  1, 2, 3, 4, 5, 6, 7, 8, 9,
  10, 20, 30, 40, 50, 60, 70, 80, 90,
  100, 200, 300, 400,
];

/// `(final, canonical)` pairs.
pub const FINAL_FORMS: [(char, char); 5] = [
  ('ך', 'כ'),
  ('ם', 'מ'),
  ('ן', 'נ'),
  ('ף', 'פ'),
  ('ץ', 'צ'),
];

/// Map a final form to its canonical letter. Every other character is
/// returned unchanged.
pub fn canonicalize(c: char) -> char {
  FINAL_FORMS
    .iter()
    .find(|(fin, _)| *fin == c)
    .map_or(c, |(_, canonical)| *canonical)
}

/// Position (0–21) of `c` in the alphabet after canonicalization, or `None`
/// for anything that is not a Hebrew letter.
pub fn index_of(c: char) -> Option<usize> {
  let c = canonicalize(c);
  LETTERS.iter().position(|l| *l == c)
}

/// The final form of a canonical letter, if it has one.
pub fn final_form(c: char) -> Option<char> {
  FINAL_FORMS
    .iter()
    .find(|(_, canonical)| *canonical == c)
    .map(|(fin, _)| *fin)
}

pub fn is_final_form(c: char) -> bool {
  FINAL_FORMS.iter().any(|(fin, _)| *fin == c)
}

/// Whether `c` is one of the 27 letter glyphs (canonical or final).
pub fn is_letter(c: char) -> bool { index_of(c).is_some() }

/// Cantillation marks, vowel points, and the punctuation interleaved with
/// them (U+0591–U+05C7).
pub fn is_mark(c: char) -> bool { ('\u{0591}'..='\u{05C7}').contains(&c) }

/// Punctuation inside the mark block: maqaf, paseq, sof pasuq, nun hafukha.
pub const MARK_BLOCK_PUNCTUATION: [char; 4] = ['\u{05BE}', '\u{05C0}', '\u{05C3}', '\u{05C6}'];

/// A mark that attaches to the preceding letter. Punctuation in the mark
/// block is excluded.
pub fn is_combining(c: char) -> bool { is_mark(c) && !MARK_BLOCK_PUNCTUATION.contains(&c) }

/// Value of a single letter; final forms score as their canonical letter.
pub fn letter_value(c: char) -> Option<u32> { index_of(c).map(|i| VALUES[i]) }
