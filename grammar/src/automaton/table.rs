use std::fmt::{self, Debug};
use super::State;
use crate::Map;

/// Half-open range `[from, to)` of symbol codes.
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy)]
pub struct Range {
  pub from: u32,
  pub to: u32,
}

impl Range {
  pub fn new(from: u32, to: u32) -> Self {
    assert!(from < to, "empty range [{}, {})", from, to);
    Self { from, to }
  }

  pub fn single(symbol: u32) -> Self {
    Self::new(symbol, symbol + 1)
  }

  pub fn contains(&self, symbol: u32) -> bool {
    self.from <= symbol && symbol < self.to
  }
}

impl Debug for Range {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    write!(f, "[{}, {})", self.from, self.to)
  }
}

pub(super) type Targets = Map<State, State>;

/// Sorted, disjoint ranges, each with its `source -> destination` map.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(super) struct Table {
  entries: Vec<(Range, Targets)>,
}

impl Table {
  pub fn from_entries(entries: Vec<(Range, Targets)>) -> Self {
    let table = Self { entries };
    table.check();
    table
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn iter(&self) -> impl Iterator<Item = &(Range, Targets)> {
    self.entries.iter()
  }

  pub fn targets(&self, ix: usize) -> &Targets {
    &self.entries[ix].1
  }

  /// Index of the range containing `symbol`.
  pub fn find(&self, symbol: u32) -> Option<usize> {
    let ix = self.entries.partition_point(|(range, _)| range.to <= symbol);
    match self.entries.get(ix) {
      Some((range, _)) if range.from <= symbol => Some(ix),
      _ => None,
    }
  }

  pub fn insert(&mut self, from: State, range: Range, to: State) -> bool {
    let first = self.entries.partition_point(|(r, _)| r.to <= range.from);

    for (r, targets) in &self.entries[first..] {
      if r.from >= range.to {
        break;
      }
      if let Some(&old) = targets.get(&from) {
        if old != to {
          return false;
        }
      }
    }

    let mut pos = range.from;
    let mut ix = first;

    while pos < range.to {
      let next = self.entries.get(ix).map(|(r, _)| *r);
      match next {
        Some(r) if r.from < range.to => {
          if pos < r.from {
            // gap before the next registered range
            self.entries.insert(ix, (Range::new(pos, r.from), single(from, to)));
            pos = r.from;
            ix += 1;
          } else if r.from < pos {
            let tail = self.entries[ix].1.clone();
            self.entries[ix].0.to = pos;
            self.entries.insert(ix + 1, (Range::new(pos, r.to), tail));
            ix += 1;
          } else {
            if range.to < r.to {
              let tail = self.entries[ix].1.clone();
              self.entries[ix].0.to = range.to;
              self.entries.insert(ix + 1, (Range::new(range.to, r.to), tail));
            }
            self.entries[ix].1.insert(from, to);
            pos = self.entries[ix].0.to;
            ix += 1;
          }
        }
        _ => {
          self.entries.insert(ix, (Range::new(pos, range.to), single(from, to)));
          pos = range.to;
        }
      }
    }

    self.check();
    true
  }

  pub fn compress(&mut self) {
    let mut merged: Vec<(Range, Targets)> = Vec::with_capacity(self.entries.len());

    for (range, targets) in self.entries.drain(..) {
      match merged.last_mut() {
        Some((last, last_targets))
          if last.to == range.from && *last_targets == targets =>
        {
          last.to = range.to;
        }
        _ => merged.push((range, targets)),
      }
    }

    self.entries = merged;
  }

  fn check(&self) {
    debug_assert!(
      self.entries.windows(2).all(|w| w[0].0.to <= w[1].0.from),
      "transition ranges overlap or are out of order: {:?}",
      self.entries.iter().map(|(r, _)| r).collect::<Vec<_>>());
  }
}

fn single(from: State, to: State) -> Targets {
  let mut targets = Targets::default();
  targets.insert(from, to);
  targets
}
