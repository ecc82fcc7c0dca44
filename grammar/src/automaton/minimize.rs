//! Partition refinement.

use std::collections::VecDeque;
use bitvec::prelude::*;
use super::{Fa, State, Marks};
use super::table::{Table, Targets};
use crate::Map;

impl Fa {
  /// Builds the minimal equivalent automaton.
  ///
  /// States that are unreachable or cannot reach an accepting state are
  /// dropped. The remaining states are grouped by mark set, then split by
  /// per-range destination class until the number of classes is stable. The
  /// result is numbered breadth-first from the start state, following ranges
  /// in ascending order, so minimizing twice gives the same automaton.
  pub fn minimize(&self) -> Fa {
    assert!(self.is_deterministic(), "minimize requires a deterministic automaton");

    if self.is_empty() {
      return Fa::new();
    }

    let outgoing = self.outgoing();
    let keep = self.live_states(&outgoing);

    if !keep[self.start.0] {
      let mut fa = Fa::new();
      fa.add_state();
      return fa;
    }

    let kept = self.states().filter(|s| keep[s.0]).collect::<Vec<_>>();
    let mut class = vec![usize::MAX; self.len()];

    let mut by_marks = Map::<&Marks, usize>::default();
    for &state in &kept {
      let next = by_marks.len();
      class[state.0] = *by_marks.entry(&self.marks[state.0]).or_insert(next);
    }
    let mut count = by_marks.len();

    loop {
      let mut by_signature = Map::<(usize, Vec<(usize, usize)>), usize>::default();
      let mut refined = vec![usize::MAX; self.len()];

      for &state in &kept {
        let signature = outgoing[state.0].iter()
          .filter(|(_, to)| keep[to.0])
          .map(|&(range, to)| (range, class[to.0]))
          .collect::<Vec<_>>();
        let next = by_signature.len();
        refined[state.0] = *by_signature
          .entry((class[state.0], signature))
          .or_insert(next);
      }

      class = refined;
      if by_signature.len() == count {
        break;
      }
      count = by_signature.len();
    }

    // class ids are handed out in order of first appearance
    let mut representative = Vec::with_capacity(count);
    for &state in &kept {
      if class[state.0] == representative.len() {
        representative.push(state);
      }
    }

    // breadth-first numbering of classes
    let mut number = vec![usize::MAX; count];
    let mut order = vec![];
    let mut queue = VecDeque::new();
    number[class[self.start.0]] = 0;
    order.push(class[self.start.0]);
    queue.push_back(class[self.start.0]);

    while let Some(c) = queue.pop_front() {
      for &(_, to) in &outgoing[representative[c].0] {
        if keep[to.0] && number[class[to.0]] == usize::MAX {
          number[class[to.0]] = order.len();
          order.push(class[to.0]);
          queue.push_back(class[to.0]);
        }
      }
    }

    let mut min = Fa::new();
    for &c in &order {
      let state = min.add_state();
      min.marks[state.0] = self.marks[representative[c].0].clone();
    }

    let mut entries = self.table.iter()
      .map(|(range, _)| (*range, Targets::default()))
      .collect::<Vec<_>>();
    for (ix, &c) in order.iter().enumerate() {
      for &(range, to) in &outgoing[representative[c].0] {
        if keep[to.0] {
          entries[range].1.insert(State(ix), State(number[class[to.0]]));
        }
      }
    }

    min.table = Table::from_entries(entries);
    min.compress();

    log::trace!("minimized {} states into {}", self.len(), min.len());

    min
  }

  /// States reachable from the start that can also reach an accepting state.
  fn live_states(&self, outgoing: &[Vec<(usize, State)>]) -> BitVec {
    let mut reachable = bitvec![0; self.len()];
    let mut stack = vec![self.start];
    reachable.set(self.start.0, true);
    while let Some(state) = stack.pop() {
      for &(_, to) in &outgoing[state.0] {
        if !reachable[to.0] {
          reachable.set(to.0, true);
          stack.push(to);
        }
      }
    }

    let mut incoming = vec![vec![]; self.len()];
    for (from, edges) in outgoing.iter().enumerate() {
      for &(_, to) in edges {
        incoming[to.0].push(State(from));
      }
    }

    let mut terminating = bitvec![0; self.len()];
    let mut stack = self.states()
      .filter(|&s| self.is_accepting(s))
      .collect::<Vec<_>>();
    for state in &stack {
      terminating.set(state.0, true);
    }
    while let Some(state) = stack.pop() {
      for &from in &incoming[state.0] {
        if !terminating[from.0] {
          terminating.set(from.0, true);
          stack.push(from);
        }
      }
    }

    for ix in 0..self.len() {
      if !terminating[ix] {
        reachable.set(ix, false);
      }
    }

    reachable
  }
}
