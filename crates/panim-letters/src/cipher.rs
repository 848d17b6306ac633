//! Letter-substitution ciphers.
//!
//! Every scheme is a table over the 22 canonical letters built from
//! unordered pairs, so each table is its own inverse. Input letters are
//! canonicalized before lookup; a substituted letter is written in its final
//! form exactly when it ends a word. Because word boundaries never move, a
//! second application restores text whose final letters sit exactly at word
//! ends. A medial letter ending a word (an abbreviation such as `ע"כ`) comes
//! back in final form.

use serde::{Deserialize, Serialize};
use strum::{EnumIter, IntoEnumIterator as _};

use crate::{
  Error, Result,
  alphabet::{LETTERS, final_form, index_of, is_combining, is_letter},
};

// ─── Schemes ─────────────────────────────────────────────────────────────────

/// The built-in schemes.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  EnumIter,
  strum::Display,
  strum::EnumString,
  Serialize,
  Deserialize,
)]
#[strum(ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum CipherScheme {
  /// Aleph–Tav, Bet–Shin: position `i` swaps with `21 - i`.
  #[strum(to_string = "atbash", serialize = "mirror-22")]
  #[serde(alias = "mirror-22")]
  Atbash,
  /// Aleph–Lamed, Bet–Mem: the two halves of the alphabet swap.
  #[strum(to_string = "albam", serialize = "split-half")]
  #[serde(alias = "split-half")]
  Albam,
  /// Aleph–Tet, Bet–Het: pairs within each decade summing to 10, 100, or 500.
  #[strum(to_string = "atbah", serialize = "decade-sum")]
  #[serde(alias = "decade-sum")]
  Atbah,
}

impl CipherScheme {
  /// Parse a scheme by name or alias (case-insensitive).
  pub fn parse(name: &str) -> Result<Self> {
    name
      .trim()
      .parse()
      .map_err(|_| Error::InvalidScheme(name.to_owned()))
  }

  pub fn all() -> impl Iterator<Item = Self> { Self::iter() }

  pub fn table(self) -> &'static CipherTable {
    match self {
      Self::Atbash => &ATBASH,
      Self::Albam => &ALBAM,
      Self::Atbah => &ATBAH,
    }
  }
}

// ─── Tables ──────────────────────────────────────────────────────────────────

static ATBASH: CipherTable = CipherTable::mirror();
static ALBAM: CipherTable = CipherTable::split_half();

// Letter values are not contiguous across decades, so the pairing is spelled
// out: units sum to 10, tens to 100, hundreds to 500. ה and נ are fixed.
static ATBAH: CipherTable = CipherTable::from_index_pairs(&[
  (0, 8),   // א ט
  (1, 7),   // ב ח
  (2, 6),   // ג ז
  (3, 5),   // ד ו
  (4, 4),   // ה
  (9, 17),  // י צ
  (10, 16), // כ פ
  (11, 15), // ל ע
  (12, 14), // מ ס
  (13, 13), // נ
  (18, 21), // ק ת
  (19, 20), // ר ש
]);

/// A substitution table over the canonical letters. Letters the table does
/// not pair map to themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CipherTable {
  map: [u8; 22],
}

impl CipherTable {
  const fn identity() -> [u8; 22] {
    let mut map = [0u8; 22];
    let mut i = 0;
    while i < 22 {
      map[i] = i as u8;
      i += 1;
    }
    map
  }

  const fn mirror() -> Self {
    let mut map = [0u8; 22];
    let mut i = 0;
    while i < 22 {
      map[i] = (21 - i) as u8;
      i += 1;
    }
    Self { map }
  }

  const fn split_half() -> Self {
    let mut map = [0u8; 22];
    let mut i = 0;
    while i < 11 {
      map[i] = (i + 11) as u8;
      map[i + 11] = i as u8;
      i += 1;
    }
    Self { map }
  }

  const fn from_index_pairs(pairs: &[(u8, u8)]) -> Self {
    let mut map = Self::identity();
    let mut i = 0;
    while i < pairs.len() {
      let (a, b) = pairs[i];
      map[a as usize] = b;
      map[b as usize] = a;
      i += 1;
    }
    Self { map }
  }

  /// Build a table from letter pairs. A letter paired with itself is a fixed
  /// point; letters that appear in no pair pass through.
  ///
  /// Fails if a letter is not canonical or appears in more than one pair,
  /// which is exactly what it takes for the table to be its own inverse.
  pub fn from_pairs(pairs: &[(char, char)]) -> Result<Self> {
    let mut map = Self::identity();
    let mut seen = [false; 22];

    for &(a, b) in pairs {
      let ia = canonical_index(a)?;
      let ib = canonical_index(b)?;
      if seen[ia] {
        return Err(Error::DuplicatePairing(a));
      }
      seen[ia] = true;
      if ib != ia {
        if seen[ib] {
          return Err(Error::DuplicatePairing(b));
        }
        seen[ib] = true;
      }
      map[ia] = ib as u8;
      map[ib] = ia as u8;
    }

    Ok(Self { map })
  }

  /// Canonical target for the letter at position `index`.
  pub fn target(&self, index: usize) -> char { LETTERS[self.map[index] as usize] }

  /// Whether applying the table twice is the identity.
  pub fn is_involution(&self) -> bool {
    self
      .map
      .iter()
      .enumerate()
      .all(|(i, &j)| self.map[j as usize] as usize == i)
  }

  /// Each pairing once, in alphabet order of its first letter. Fixed points
  /// appear as `(x, x)`.
  pub fn pairs(&self) -> Vec<(char, char)> {
    self
      .map
      .iter()
      .enumerate()
      .filter(|&(i, &j)| i <= j as usize)
      .map(|(i, &j)| (LETTERS[i], LETTERS[j as usize]))
      .collect()
  }
}

fn canonical_index(c: char) -> Result<usize> {
  LETTERS
    .iter()
    .position(|l| *l == c)
    .ok_or(Error::NotCanonical(c))
}

// ─── Application ─────────────────────────────────────────────────────────────

/// Apply a built-in scheme to `text`.
pub fn apply(scheme: CipherScheme, text: &str) -> String {
  apply_table(scheme.table(), text)
}

/// Apply an arbitrary table to `text`. Non-letters are copied unchanged.
pub fn apply_table(table: &CipherTable, text: &str) -> String {
  let chars: Vec<char> = text.chars().collect();
  let mut out = String::with_capacity(text.len());

  for (i, &c) in chars.iter().enumerate() {
    let Some(index) = index_of(c) else {
      out.push(c);
      continue;
    };
    let target = table.target(index);
    if ends_word(&chars, i) {
      out.push(final_form(target).unwrap_or(target));
    } else {
      out.push(target);
    }
  }

  out
}

/// True when the next base character after `i` (skipping combining marks)
/// is not a letter.
fn ends_word(chars: &[char], i: usize) -> bool {
  chars[i + 1..]
    .iter()
    .find(|c| !is_combining(**c))
    .is_none_or(|c| !is_letter(*c))
}

#[cfg(test)]
mod tests {
  use super::*;

  const SAMPLES: &[&str] = &[
    "",
    "אב",
    "שלום עולם",
    "בראשית ברא אלהים את השמים ואת הארץ",
    "מלך, ספר; כף — צדיק? לחם!",
    "בְּרֵאשִׁית בָּרָא",
    "mixed text עם אותיות sofit",
    "ך",
    "מן־הארץ",
    "עַל־פְּנֵי הַמָּיִם׃",
    "כִּי ׀ שָׁם",
  ];

  #[test]
  fn mirror_maps_ends_of_alphabet() {
    assert_eq!(apply(CipherScheme::Atbash, "אב"), "תש");
    assert_eq!(apply(CipherScheme::Atbash, "תש"), "אב");
  }

  #[test]
  fn split_half_swaps_halves() {
    assert_eq!(apply(CipherScheme::Albam, "אב"), "לם");
    assert_eq!(apply(CipherScheme::Albam, "כת"), "תך");
  }

  #[test]
  fn decade_sum_pairs() {
    assert_eq!(apply(CipherScheme::Atbah, "אבגד"), "טחזו");
    assert_eq!(apply(CipherScheme::Atbah, "הנ"), "הן");
    assert_eq!(apply(CipherScheme::Atbah, "קר"), "תש");
    assert_eq!(apply(CipherScheme::Atbah, "יכלמ"), "צפעס");
  }

  #[test]
  fn finals_use_canonical_mapping() {
    // final kaf pairs like kaf; lamed has no final form.
    assert_eq!(apply(CipherScheme::Atbash, "ך"), "ל");
    assert_eq!(apply(CipherScheme::Albam, "ם"), "ב");
    assert_eq!(apply(CipherScheme::Atbah, "ך"), "ף");
  }

  #[test]
  fn word_final_targets_take_final_form() {
    // ל → כ at the end of a word.
    assert_eq!(apply(CipherScheme::Atbash, "ל"), "ך");
    assert_eq!(apply(CipherScheme::Atbash, "לא"), "כת");
    assert_eq!(apply(CipherScheme::Atbash, "שלום"), "בכפי");
    assert_eq!(apply(CipherScheme::Atbash, "בכפי"), "שלום");
  }

  #[test]
  fn block_punctuation_ends_words() {
    // final nun before maqaf.
    assert_eq!(apply(CipherScheme::Atbash, "מן־הארץ"), "יט־צתגה");
    assert_eq!(apply(CipherScheme::Atbash, "יט־צתגה"), "מן־הארץ");
    assert_eq!(apply(CipherScheme::Atbash, "ל\u{05C3}"), "ך\u{05C3}");
    assert_eq!(apply(CipherScheme::Atbash, "ל\u{05C0}"), "ך\u{05C0}");
  }

  #[test]
  fn medial_letter_at_word_end_comes_back_final() {
    let once = apply(CipherScheme::Atbash, "ע\"כ");
    assert_eq!(once, "ז\"ל");
    assert_eq!(apply(CipherScheme::Atbash, &once), "ע\"ך");
  }

  #[test]
  fn marks_do_not_break_words() {
    // qamats after the lamed still leaves it word-final.
    assert_eq!(apply(CipherScheme::Atbash, "ל\u{05B8}"), "ך\u{05B8}");
    assert_eq!(apply(CipherScheme::Atbash, "ל\u{05B8}א"), "כ\u{05B8}ת");
  }

  #[test]
  fn every_builtin_is_an_involution() {
    for scheme in CipherScheme::all() {
      assert!(scheme.table().is_involution(), "{scheme}");
      for sample in SAMPLES {
        let once = apply(scheme, sample);
        assert_eq!(apply(scheme, &once), *sample, "{scheme} on {sample:?}");
      }
    }
  }

  #[test]
  fn non_letters_pass_through() {
    for scheme in CipherScheme::all() {
      assert_eq!(apply(scheme, "abc 123 .,!"), "abc 123 .,!");
    }
  }

  #[test]
  fn scheme_names_and_aliases() {
    assert_eq!(CipherScheme::parse("atbash").unwrap(), CipherScheme::Atbash);
    assert_eq!(CipherScheme::parse("mirror-22").unwrap(), CipherScheme::Atbash);
    assert_eq!(CipherScheme::parse("Split-Half").unwrap(), CipherScheme::Albam);
    assert_eq!(CipherScheme::parse("decade-sum").unwrap(), CipherScheme::Atbah);
    assert_eq!(CipherScheme::Albam.to_string(), "albam");
    assert!(matches!(
      CipherScheme::parse("rot13"),
      Err(Error::InvalidScheme(name)) if name == "rot13"
    ));
  }

  #[test]
  fn scheme_serde_accepts_aliases() {
    let s: CipherScheme = serde_json::from_str("\"decade-sum\"").unwrap();
    assert_eq!(s, CipherScheme::Atbah);
    assert_eq!(serde_json::to_string(&s).unwrap(), "\"atbah\"");
  }

  #[test]
  fn from_pairs_rejects_reused_letters() {
    let err = CipherTable::from_pairs(&[('א', 'ב'), ('ב', 'ג')]).unwrap_err();
    assert!(matches!(err, Error::DuplicatePairing('ב')));
  }

  #[test]
  fn from_pairs_rejects_repeated_fixed_point() {
    let err = CipherTable::from_pairs(&[('ה', 'ה'), ('ה', 'ה')]).unwrap_err();
    assert!(matches!(err, Error::DuplicatePairing('ה')));
  }

  #[test]
  fn from_pairs_rejects_finals_and_foreign() {
    assert!(matches!(
      CipherTable::from_pairs(&[('ך', 'א')]),
      Err(Error::NotCanonical('ך'))
    ));
    assert!(matches!(
      CipherTable::from_pairs(&[('a', 'א')]),
      Err(Error::NotCanonical('a'))
    ));
  }

  #[test]
  fn partial_table_leaves_unpaired_letters() {
    let table = CipherTable::from_pairs(&[('א', 'ב'), ('ה', 'ה')]).unwrap();
    assert!(table.is_involution());
    assert_eq!(apply_table(&table, "אבגה"), "באגה");
  }

  #[test]
  fn from_pairs_matches_builtin_atbah() {
    let pairs = CipherScheme::Atbah.table().pairs();
    let rebuilt = CipherTable::from_pairs(&pairs).unwrap();
    assert_eq!(&rebuilt, CipherScheme::Atbah.table());
    assert_eq!(pairs.len(), 12);
    assert!(pairs.contains(&('ה', 'ה')));
  }

  #[test]
  fn mirror_legend_has_eleven_pairs() {
    let pairs = CipherScheme::Atbash.table().pairs();
    assert_eq!(pairs.len(), 11);
    assert_eq!(pairs[0], ('א', 'ת'));
    assert_eq!(pairs[10], ('כ', 'ל'));
  }
}
