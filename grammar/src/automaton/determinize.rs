//! Subset construction.

use std::collections::VecDeque;
use bitvec::prelude::*;
use super::{Fa, State};
use super::table::{Table, Targets};
use crate::Map;

impl Fa {
  /// Builds an equivalent automaton without epsilon edges.
  ///
  /// Every state of the result stands for one epsilon-closed set of states of
  /// `self` and carries the union of their marks. The closure of the start
  /// state becomes state 0. The range partition is kept, then compressed.
  pub fn determinize(&self) -> Fa {
    let closures = self.epsilon_closures();
    let mut dfa = Fa::new();

    if self.is_empty() {
      return dfa;
    }

    let mut entries = self.table.iter()
      .map(|(range, _)| (*range, Targets::default()))
      .collect::<Vec<_>>();
    let mut sets = Map::<Vec<State>, State>::default();
    let mut queue = VecDeque::new();

    let start = closures[self.start.0].clone();
    sets.insert(start.clone(), dfa.add_state());
    queue.push_back(start);

    while let Some(set) = queue.pop_front() {
      let from = sets[&set];

      for &state in &set {
        let marks = &self.marks[state.0];
        dfa.marks[from.0].extend(marks.iter().copied());
      }

      for (ix, (_, targets)) in self.table.iter().enumerate() {
        let mut dest = set.iter()
          .filter_map(|state| targets.get(state))
          .flat_map(|to| closures[to.0].iter().copied())
          .collect::<Vec<_>>();

        if dest.is_empty() {
          continue;
        }

        dest.sort_unstable();
        dest.dedup();

        let to = match sets.get(&dest) {
          Some(&to) => to,
          None => {
            let to = dfa.add_state();
            sets.insert(dest.clone(), to);
            queue.push_back(dest);
            to
          }
        };

        entries[ix].1.insert(from, to);
      }
    }

    dfa.table = Table::from_entries(entries);
    dfa.compress();

    log::trace!("determinized {} states into {} states over {} ranges",
      self.len(), dfa.len(), dfa.range_count());

    dfa
  }

  /// Sorted epsilon closure of every state.
  fn epsilon_closures(&self) -> Vec<Vec<State>> {
    let mut adjacent = vec![vec![]; self.len()];
    for &(from, to) in &self.epsilon {
      adjacent[from.0].push(to);
    }

    self.states().map(|state| {
      let mut seen = bitvec![0; self.len()];
      let mut stack = vec![state];
      let mut closure = vec![];
      seen.set(state.0, true);

      while let Some(s) = stack.pop() {
        closure.push(s);
        for &next in &adjacent[s.0] {
          if !seen[next.0] {
            seen.set(next.0, true);
            stack.push(next);
          }
        }
      }

      closure.sort_unstable();
      closure
    }).collect()
  }
}
