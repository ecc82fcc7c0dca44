//! Dense arrays for the merged lexical DFA.
//!
//! Rather than indexing rows by code point, the transition array is indexed
//! by range class: the position of the code point's range in `classes`,
//! found by binary search. The width of a row is the number of distinct
//! ranges the patterns distinguish.

use crate::automaton::{Fa, Range};
use crate::regex::MAX_CODE;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexTables {
  /// Sorted, disjoint code-point ranges.
  pub classes: Vec<Range>,
  /// `state * classes.len() + class`; `-1` means no transition.
  pub transitions: Vec<i32>,
  /// Pattern id accepted by each state, or `-1`.
  pub marks: Vec<i32>,
  /// Entry state of each start condition, or `-1` if it matches nothing.
  pub entries: Vec<i32>,
  pub conditions: Vec<String>,
}

impl LexTables {
  pub(super) fn new(dfa: &Fa, conditions: Vec<String>) -> Self {
    let candidates = dfa.ranges()
      .filter(|range| range.from < MAX_CODE)
      .map(|range| Range::new(range.from, range.to.min(MAX_CODE)))
      .collect::<Vec<_>>();

    let columns = candidates.iter()
      .map(|range| {
        dfa.states()
          .map(|state| dfa.transition(state, range.from).map_or(-1, |to| to.0 as i32))
          .collect::<Vec<_>>()
      })
      .collect::<Vec<_>>();

    let (classes, columns): (Vec<_>, Vec<_>) = candidates.into_iter()
      .zip(columns)
      .filter(|(_, column)| column.iter().any(|&to| to >= 0))
      .unzip();

    let mut transitions = Vec::with_capacity(dfa.len() * classes.len());
    for state in dfa.states() {
      transitions.extend(columns.iter().map(|column| column[state.0]));
    }

    let marks = dfa.states()
      .map(|state| dfa.marks(state).iter().next().map_or(-1, |mark| mark.0 as i32))
      .collect();

    let entries = (0..conditions.len())
      .map(|condition| {
        dfa.transition(dfa.start(), MAX_CODE + condition as u32)
          .map_or(-1, |to| to.0 as i32)
      })
      .collect();

    Self {
      classes,
      transitions,
      marks,
      entries,
      conditions,
    }
  }

  pub fn condition(&self, name: &str) -> Option<usize> {
    self.conditions.iter().position(|c| c == name)
  }

  /// Range class of code point `c`.
  pub fn class(&self, c: char) -> Option<usize> {
    let code = c as u32;
    let ix = self.classes.partition_point(|range| range.to <= code);
    match self.classes.get(ix) {
      Some(range) if range.contains(code) => Some(ix),
      _ => None,
    }
  }

  pub fn next(&self, state: usize, c: char) -> Option<usize> {
    let class = self.class(c)?;
    let to = self.transitions[state * self.classes.len() + class];
    if to < 0 {
      None
    } else {
      Some(to as usize)
    }
  }

  pub fn mark(&self, state: usize) -> Option<usize> {
    let mark = self.marks[state];
    if mark < 0 {
      None
    } else {
      Some(mark as usize)
    }
  }

  pub fn entry(&self, condition: usize) -> Option<usize> {
    match self.entries.get(condition) {
      Some(&entry) if entry >= 0 => Some(entry as usize),
      _ => None,
    }
  }

  pub fn state_count(&self) -> usize {
    self.marks.len()
  }
}
