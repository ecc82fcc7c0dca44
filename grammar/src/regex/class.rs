//! Predefined character classes as sorted code-point ranges.

use once_cell::sync::Lazy;
use crate::Range;

/// One past the largest Unicode scalar value.
pub const MAX_CODE: u32 = 0x11_0000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassKind {
  Digit,
  NonDigit,
  Space,
  NonSpace,
  Word,
  NonWord,
}

impl ClassKind {
  pub const ALL: [ClassKind; 6] = [
    ClassKind::Digit,
    ClassKind::NonDigit,
    ClassKind::Space,
    ClassKind::NonSpace,
    ClassKind::Word,
    ClassKind::NonWord,
  ];

  pub fn from_escape(c: char) -> Option<Self> {
    match c {
      'd' => Some(ClassKind::Digit),
      'D' => Some(ClassKind::NonDigit),
      's' => Some(ClassKind::Space),
      'S' => Some(ClassKind::NonSpace),
      'w' => Some(ClassKind::Word),
      'W' => Some(ClassKind::NonWord),
      _ => None,
    }
  }

  pub fn ranges(self) -> &'static [Range] {
    &CLASSES[self as usize]
  }
}

static CLASSES: Lazy<[Vec<Range>; 6]> = Lazy::new(|| {
  let digit = collect(char::is_numeric);
  let space = collect(char::is_whitespace);
  let word = collect(|c| c.is_alphanumeric() || c == '_');
  let non_digit = negate(&digit);
  let non_space = negate(&space);
  let non_word = negate(&word);

  [digit, non_digit, space, non_space, word, non_word]
});

fn collect(pred: impl Fn(char) -> bool) -> Vec<Range> {
  let mut ranges = vec![];
  let mut open = None;

  for code in 0..MAX_CODE {
    let hit = std::char::from_u32(code).map_or(false, |c| pred(c));
    match (hit, open) {
      (true, None) => open = Some(code),
      (false, Some(from)) => {
        ranges.push(Range::new(from, code));
        open = None;
      }
      _ => {}
    }
  }

  if let Some(from) = open {
    ranges.push(Range::new(from, MAX_CODE));
  }

  ranges
}

/// Complement of sorted, disjoint `ranges` within `[0, MAX_CODE)`.
fn negate(ranges: &[Range]) -> Vec<Range> {
  let mut negated = vec![];
  let mut pos = 0;

  for range in ranges {
    if pos < range.from {
      negated.push(Range::new(pos, range.from));
    }
    pos = range.to;
  }

  if pos < MAX_CODE {
    negated.push(Range::new(pos, MAX_CODE));
  }

  negated
}
