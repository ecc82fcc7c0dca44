//! Finite automata whose transitions are labelled with half-open ranges of
//! `u32` symbol codes.
//!
//! The same structure serves the lexer (code points) and the LR builder
//! (terminal and nonterminal indices). All ranges registered in one automaton
//! form a sorted, pairwise disjoint partition, which is the effective alphabet
//! of the automaton.

use std::collections::BTreeSet;
use std::fmt::{self, Debug};
use crate::Set;
use table::Table;

pub use table::Range;

mod table;
mod determinize;
mod minimize;

#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Default)]
pub struct State(pub usize);

/// Accept tag. Lexer automata use pattern ids, the LR builder uses item ids.
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy)]
pub struct Mark(pub u32);

pub type Marks = BTreeSet<Mark>;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Fa {
  marks: Vec<Marks>,
  table: Table,
  epsilon: Set<(State, State)>,
  start: State,
}

impl Fa {
  pub fn new() -> Self {
    Self::default()
  }

  /// The first state added is the start state unless `set_start` says
  /// otherwise.
  pub fn add_state(&mut self) -> State {
    let state = State(self.marks.len());
    self.marks.push(Marks::new());
    state
  }

  pub fn len(&self) -> usize {
    self.marks.len()
  }

  pub fn is_empty(&self) -> bool {
    self.marks.is_empty()
  }

  pub fn states(&self) -> impl Iterator<Item = State> {
    (0..self.marks.len()).map(State)
  }

  pub fn start(&self) -> State {
    self.start
  }

  pub fn set_start(&mut self, state: State) {
    assert!(state.0 < self.len(), "start {:?} out of bounds", state);
    self.start = state;
  }

  pub fn add_mark(&mut self, state: State, mark: Mark) {
    self.marks[state.0].insert(mark);
  }

  pub fn marks(&self, state: State) -> &Marks {
    &self.marks[state.0]
  }

  pub fn is_accepting(&self, state: State) -> bool {
    !self.marks[state.0].is_empty()
  }

  pub fn clear_marks(&mut self) {
    for marks in &mut self.marks {
      marks.clear();
    }
  }

  /// Adds `from --range--> to`, splitting registered ranges where they
  /// partially overlap `range`.
  ///
  /// Returns `false` and leaves the automaton untouched when `from` already
  /// leaves through some part of `range` to another state.
  #[must_use]
  pub fn add_transition(&mut self, from: State, range: Range, to: State) -> bool {
    assert!(from.0 < self.len() && to.0 < self.len(),
      "transition {:?} -> {:?} refers to unknown states", from, to);
    self.table.insert(from, range, to)
  }

  pub fn add_epsilon(&mut self, from: State, to: State) {
    assert!(from.0 < self.len() && to.0 < self.len(),
      "epsilon {:?} -> {:?} refers to unknown states", from, to);
    self.epsilon.insert((from, to));
  }

  pub fn is_deterministic(&self) -> bool {
    self.epsilon.is_empty()
  }

  pub fn epsilon_count(&self) -> usize {
    self.epsilon.len()
  }

  pub fn ranges(&self) -> impl Iterator<Item = Range> + '_ {
    self.table.iter().map(|(range, _)| *range)
  }

  pub fn range_count(&self) -> usize {
    self.table.len()
  }

  pub fn transition(&self, from: State, symbol: u32) -> Option<State> {
    let ix = self.table.find(symbol)?;
    self.table.targets(ix).get(&from).copied()
  }

  /// Outgoing transitions of `from`, in ascending range order.
  pub fn transitions_from(&self, from: State) -> impl Iterator<Item = (Range, State)> + '_ {
    self.table.iter().filter_map(move |(range, targets)| {
      targets.get(&from).map(|&to| (*range, to))
    })
  }

  /// Per state, the `(range index, destination)` pairs in ascending range
  /// order.
  pub(crate) fn outgoing(&self) -> Vec<Vec<(usize, State)>> {
    let mut outgoing = vec![vec![]; self.len()];
    for (ix, (_, targets)) in self.table.iter().enumerate() {
      for (&from, &to) in targets {
        outgoing[from.0].push((ix, to));
      }
    }
    outgoing
  }

  /// Copies a deterministic automaton into `self` as a floating fragment.
  ///
  /// A fresh start state reaches the copy's start through an epsilon edge, and
  /// every accepting state of the copy reaches a fresh end state the same way.
  /// The copied states carry no marks; the end state receives the union of the
  /// copy's marks if `keep_marks` is set.
  pub fn insert(&mut self, other: &Fa, keep_marks: bool) -> (State, State) {
    assert!(other.is_deterministic(), "only deterministic automata can be inserted");
    let start = self.add_state();
    let end = self.add_state();
    let offset = self.len();

    for _ in other.states() {
      self.add_state();
    }

    for (range, targets) in other.table.iter() {
      for (&from, &to) in targets {
        let added = self.table.insert(
          State(from.0 + offset), *range, State(to.0 + offset));
        assert!(added, "copy of a deterministic automaton conflicts with itself");
      }
    }

    if !other.is_empty() {
      self.add_epsilon(start, State(other.start.0 + offset));
    }

    for state in other.states() {
      if other.is_accepting(state) {
        self.add_epsilon(State(state.0 + offset), end);
        if keep_marks {
          let marks = other.marks(state).clone();
          self.marks[end.0].extend(marks);
        }
      }
    }

    (start, end)
  }

  /// Merges adjacent, contiguous ranges with identical transition maps.
  pub fn compress(&mut self) {
    self.table.compress();
  }

  /// Whole-sequence match on a deterministic automaton.
  pub fn is_match<I>(&self, symbols: I) -> bool
    where I: IntoIterator<Item = u32>
  {
    assert!(self.is_deterministic(), "matching requires a deterministic automaton");
    if self.is_empty() {
      return false;
    }

    let mut state = self.start;
    for symbol in symbols {
      match self.transition(state, symbol) {
        Some(next) => state = next,
        None => return false,
      }
    }

    self.is_accepting(state)
  }

  /// Convenience for code-point automata.
  pub fn is_match_str(&self, input: &str) -> bool {
    self.is_match(input.chars().map(|c| c as u32))
  }
}

impl Debug for State {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    write!(f, "State({})", self.0)
  }
}

impl Debug for Mark {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    write!(f, "Mark({})", self.0)
  }
}
