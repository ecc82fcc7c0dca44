//! Regular expressions to automata.
//!
//! [`RegexCompiler`] owns a working automaton; every combinator adds states
//! to it and returns the [`Fragment`] it built. `convert` cuts a fragment out
//! of the working automaton as a minimal DFA.

use thiserror::Error;
use crate::automaton::{Fa, State, Mark, Marks, Range};
use crate::Map;

pub use class::{ClassKind, MAX_CODE};

mod class;
mod parse;

/// Name under which the "any character" pattern can be redefined.
pub const ANY: &str = ".";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fragment {
  pub start: State,
  pub end: State,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} at {}..{}", .span.0, .span.1)]
pub struct RegexError {
  pub kind: RegexErrorKind,
  pub span: (usize, usize),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegexErrorKind {
  #[error("regex syntax error: {0}")]
  Syntax(String),
  #[error("character range is out of order")]
  RangeOutOfOrder,
  #[error("invalid code point")]
  InvalidCodePoint,
  #[error("no expression '{0}' defined")]
  UndefinedReference(String),
  #[error("expression '{0}' is already defined")]
  AlreadyDefined(String),
  #[error("quantifier maximum is smaller than its minimum")]
  BadQuantifier,
  #[error("regex may accept empty string")]
  EmptyMatch,
}

/// An item of a bracketed character set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetItem {
  /// Inclusive range of code points.
  Range(u32, u32),
  Class(ClassKind),
}

#[derive(Debug, Clone)]
pub struct RegexCompiler {
  fa: Fa,
  defs: Map<String, Fa>,
  any: Fa,
  any_redefined: bool,
  classes: Vec<Fa>,
}

impl Default for RegexCompiler {
  fn default() -> Self {
    Self::new()
  }
}

impl RegexCompiler {
  pub fn new() -> Self {
    let classes = ClassKind::ALL.iter()
      .map(|kind| ranges_automaton(kind.ranges()))
      .collect::<Vec<_>>();

    let fallback = ranges_automaton(&[Range::new(0, MAX_CODE)]);
    let any = union_all(std::iter::once(&fallback).chain(&classes));

    Self {
      fa: Fa::new(),
      defs: Map::default(),
      any,
      any_redefined: false,
      classes,
    }
  }

  /// Parses `pattern` and returns the minimal DFA accepting it, with the
  /// accepting states marked `rule`.
  pub fn compile(&mut self, pattern: &str, rule: u32) -> Result<Fa, RegexError> {
    let fa = self.compile_fragment(pattern, rule)?;
    if fa.is_accepting(fa.start()) {
      return Err(RegexError {
        kind: RegexErrorKind::EmptyMatch,
        span: (0, pattern.len()),
      });
    }
    Ok(fa)
  }

  /// Registers a named sub-expression, spliced in by `{name}`.
  ///
  /// Defining [`ANY`] replaces the "any character" pattern and restricts the
  /// predefined classes to it; this can happen once.
  pub fn define(&mut self, name: &str, pattern: &str) -> Result<(), RegexError> {
    let already_defined = if name == ANY {
      self.any_redefined
    } else {
      self.defs.contains_key(name)
    };

    if already_defined {
      return Err(RegexError {
        kind: RegexErrorKind::AlreadyDefined(name.to_owned()),
        span: (0, pattern.len()),
      });
    }

    let fa = self.compile_fragment(pattern, 0)?;

    if name == ANY {
      self.classes = self.classes.iter()
        .map(|class| intersect(class, &fa))
        .collect();
      self.any = fa;
      self.any_redefined = true;
      log::debug!("redefined the any-character pattern as /{}/", pattern);
    } else {
      self.defs.insert(name.to_owned(), fa);
    }

    Ok(())
  }

  pub fn is_defined(&self, name: &str) -> bool {
    self.defs.contains_key(name)
  }

  fn compile_fragment(&mut self, pattern: &str, rule: u32) -> Result<Fa, RegexError> {
    self.fa = Fa::new();
    let fragment = parse::parse(self, pattern)?;
    let fa = self.convert(fragment, rule);
    self.fa = Fa::new();
    Ok(fa)
  }

  /// Cuts `fragment` out of the working automaton: its start becomes the
  /// start state, its end is marked `rule`, and the result is determinized
  /// and minimized.
  pub fn convert(&self, fragment: Fragment, rule: u32) -> Fa {
    let mut fa = self.fa.clone();
    fa.clear_marks();
    fa.set_start(fragment.start);
    fa.add_mark(fragment.end, Mark(rule));
    fa.determinize().minimize()
  }

  fn pair(&mut self) -> Fragment {
    Fragment {
      start: self.fa.add_state(),
      end: self.fa.add_state(),
    }
  }

  fn connect(&mut self, fragment: Fragment, range: Range) {
    let added = self.fa.add_transition(fragment.start, range, fragment.end);
    assert!(added, "fresh fragment already has a transition on {:?}", range);
  }

  fn splice(&mut self, fa: &Fa) -> Fragment {
    let (start, end) = self.fa.insert(fa, false);
    Fragment { start, end }
  }

  /// Matches the empty string.
  pub fn empty(&mut self) -> Fragment {
    let fragment = self.pair();
    self.fa.add_epsilon(fragment.start, fragment.end);
    fragment
  }

  /// Matches one code point in `from..=to`.
  pub fn range(&mut self, from: u32, to: u32) -> Result<Fragment, RegexErrorKind> {
    if to < from {
      return Err(RegexErrorKind::RangeOutOfOrder);
    }
    if to >= MAX_CODE {
      return Err(RegexErrorKind::InvalidCodePoint);
    }

    let fragment = self.pair();
    self.connect(fragment, Range::new(from, to + 1));
    Ok(fragment)
  }

  pub fn char(&mut self, c: char) -> Fragment {
    let fragment = self.pair();
    self.connect(fragment, Range::single(c as u32));
    fragment
  }

  pub fn string(&mut self, s: &str) -> Fragment {
    let mut chars = s.chars();
    let first = match chars.next() {
      Some(c) => self.char(c),
      None => return self.empty(),
    };

    chars.fold(first, |acc, c| {
      let next = self.char(c);
      self.concat(acc, next)
    })
  }

  /// Matches any code point covered by `items`.
  pub fn set(&mut self, items: &[SetItem]) -> Result<Fragment, RegexErrorKind> {
    let fragment = self.pair();

    for item in items {
      match *item {
        SetItem::Range(from, to) => {
          if to < from {
            return Err(RegexErrorKind::RangeOutOfOrder);
          }
          if to >= MAX_CODE {
            return Err(RegexErrorKind::InvalidCodePoint);
          }
          self.connect(fragment, Range::new(from, to + 1));
        }
        SetItem::Class(kind) => {
          let class = self.class(kind);
          self.fa.add_epsilon(fragment.start, class.start);
          self.fa.add_epsilon(class.end, fragment.end);
        }
      }
    }

    Ok(fragment)
  }

  pub fn union(&mut self, a: Fragment, b: Fragment) -> Fragment {
    let fragment = self.pair();
    self.fa.add_epsilon(fragment.start, a.start);
    self.fa.add_epsilon(fragment.start, b.start);
    self.fa.add_epsilon(a.end, fragment.end);
    self.fa.add_epsilon(b.end, fragment.end);
    fragment
  }

  pub fn concat(&mut self, a: Fragment, b: Fragment) -> Fragment {
    self.fa.add_epsilon(a.end, b.start);
    Fragment {
      start: a.start,
      end: b.end,
    }
  }

  /// Kleene closure, `p*`.
  pub fn closure(&mut self, p: Fragment) -> Fragment {
    let fragment = self.plus(p);
    self.fa.add_epsilon(fragment.start, fragment.end);
    fragment
  }

  /// One or more, `p+`.
  pub fn plus(&mut self, p: Fragment) -> Fragment {
    let fragment = self.pair();
    self.fa.add_epsilon(fragment.start, p.start);
    self.fa.add_epsilon(p.end, fragment.end);
    self.fa.add_epsilon(fragment.end, p.start);
    fragment
  }

  /// Zero or one, `p?`.
  pub fn optional(&mut self, p: Fragment) -> Fragment {
    let fragment = self.pair();
    self.fa.add_epsilon(fragment.start, p.start);
    self.fa.add_epsilon(fragment.start, fragment.end);
    self.fa.add_epsilon(p.end, fragment.end);
    fragment
  }

  /// `p{min,max}`; `max == None` means unbounded.
  ///
  /// Expands into `min` mandatory copies followed by `max - min` optional
  /// copies, or by one closure when unbounded.
  pub fn quantified(
    &mut self,
    p: Fragment,
    min: u32,
    max: Option<u32>,
  ) -> Result<Fragment, RegexErrorKind> {
    if let Some(max) = max {
      if max < min {
        return Err(RegexErrorKind::BadQuantifier);
      }
      if max == 0 {
        return Ok(self.empty());
      }
    }

    let dfa = self.extract(p);
    let mut result: Option<Fragment> = None;

    for _ in 0..min {
      let copy = self.splice(&dfa);
      result = Some(self.append(result, copy));
    }

    match max {
      Some(max) => {
        for _ in min..max {
          let copy = self.splice(&dfa);
          let copy = self.optional(copy);
          result = Some(self.append(result, copy));
        }
      }
      None => {
        let copy = self.splice(&dfa);
        let copy = self.closure(copy);
        result = Some(self.append(result, copy));
      }
    }

    Ok(match result {
      Some(fragment) => fragment,
      None => self.empty(),
    })
  }

  fn append(&mut self, acc: Option<Fragment>, next: Fragment) -> Fragment {
    match acc {
      Some(acc) => self.concat(acc, next),
      None => next,
    }
  }

  /// Deterministic copy of the language of `p`.
  fn extract(&self, p: Fragment) -> Fa {
    let mut fa = self.fa.clone();
    fa.clear_marks();
    fa.set_start(p.start);
    fa.add_mark(p.end, Mark(0));
    fa.determinize()
  }

  /// Splices a copy of the named definition.
  pub fn reference(&mut self, name: &str) -> Result<Fragment, RegexErrorKind> {
    if name == ANY {
      return Ok(self.any());
    }

    let fa = self.defs.get(name)
      .cloned()
      .ok_or_else(|| RegexErrorKind::UndefinedReference(name.to_owned()))?;
    Ok(self.splice(&fa))
  }

  pub fn class(&mut self, kind: ClassKind) -> Fragment {
    let (start, end) = self.fa.insert(&self.classes[kind as usize], false);
    Fragment { start, end }
  }

  pub fn any(&mut self) -> Fragment {
    let (start, end) = self.fa.insert(&self.any, false);
    Fragment { start, end }
  }

  /// Strings of `universe` that `excluded` does not match.
  ///
  /// Both branches hang off a common start, the end of `universe` is marked 1
  /// and the end of `excluded` 2. After determinization the states marked
  /// exactly `{1}` are the accepting states of the difference.
  pub fn complement(&mut self, universe: Fragment, excluded: Fragment) -> Fragment {
    let mut fa = self.fa.clone();
    fa.clear_marks();
    let start = fa.add_state();
    fa.set_start(start);
    fa.add_epsilon(start, universe.start);
    fa.add_epsilon(start, excluded.start);
    fa.add_mark(universe.end, Mark(1));
    fa.add_mark(excluded.end, Mark(2));

    let mut dfa = fa.determinize();
    let only_universe = Some(Mark(1)).into_iter().collect::<Marks>();
    let accepting = dfa.states()
      .filter(|&s| *dfa.marks(s) == only_universe)
      .collect::<Vec<_>>();

    let end = dfa.add_state();
    for state in accepting {
      dfa.add_epsilon(state, end);
    }
    dfa.clear_marks();
    dfa.add_mark(end, Mark(0));

    let dfa = dfa.determinize();
    self.splice(&dfa)
  }

  /// `[^...]`: any character not matched by `p`.
  pub fn negated(&mut self, p: Fragment) -> Fragment {
    let any = self.any();
    self.complement(any, p)
  }
}

/// Two-state automaton accepting one code point out of `ranges`.
fn ranges_automaton(ranges: &[Range]) -> Fa {
  let mut fa = Fa::new();
  let start = fa.add_state();
  let end = fa.add_state();
  for &range in ranges {
    let added = fa.add_transition(start, range, end);
    assert!(added, "class ranges overlap at {:?}", range);
  }
  fa.add_mark(end, Mark(0));
  fa
}

fn union_all<'a>(parts: impl IntoIterator<Item = &'a Fa>) -> Fa {
  let mut fa = Fa::new();
  let start = fa.add_state();
  let end = fa.add_state();

  for part in parts {
    let (s, e) = fa.insert(part, false);
    fa.add_epsilon(start, s);
    fa.add_epsilon(e, end);
  }

  fa.add_mark(end, Mark(0));
  fa.determinize().minimize()
}

/// Strings accepted by both `a` and `b`.
fn intersect(a: &Fa, b: &Fa) -> Fa {
  let mut fa = Fa::new();
  let start = fa.add_state();
  let (sa, ea) = fa.insert(a, false);
  let (sb, eb) = fa.insert(b, false);
  fa.add_epsilon(start, sa);
  fa.add_epsilon(start, sb);
  fa.add_mark(ea, Mark(1));
  fa.add_mark(eb, Mark(2));

  let mut dfa = fa.determinize();
  let both = vec![Mark(1), Mark(2)].into_iter().collect::<Marks>();
  let accepting = dfa.states()
    .filter(|&s| *dfa.marks(s) == both)
    .collect::<Vec<_>>();

  dfa.clear_marks();
  for state in accepting {
    dfa.add_mark(state, Mark(0));
  }
  dfa.minimize()
}
