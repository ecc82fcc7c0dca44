//! Error recovery by insertion.
//!
//! A dead terminal cell (no action, no transition) is rewritten to insert
//! the terminal that lets the parser consume the offending symbol right
//! afterwards. Among the working insertions the one reaching the states
//! that accept the most terminals wins, ties going to the lower terminal.

use std::collections::{BTreeSet, VecDeque};
use crate::Parser;

/// What consuming one symbol in a state can lead to.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Follow {
  /// States reached after the symbol is shifted, following every reduction
  /// it triggers first.
  pub states: BTreeSet<usize>,
  /// The symbol completes the input.
  pub accepts: bool,
}

pub struct Recovery {
  /// `follow[state][symbol]` for terminals and end-of-input, `None` when
  /// the symbol is rejected on some path.
  follow: Vec<Vec<Option<Follow>>>,
  /// Number of terminals with a transition, per state.
  rank: Vec<usize>,
}

impl Recovery {
  pub fn new(parser: &Parser) -> Self {
    let t = parser.num_terminals;

    // every state a nonterminal can be pushed into, whatever the stack
    let targets = (0..parser.num_nonterminals)
      .map(|nt| {
        let column = t + 1 + nt;
        parser.goto.iter()
          .filter_map(|row| usize_of(row[column]))
          .collect::<BTreeSet<_>>()
      })
      .collect::<Vec<_>>();

    let follow = (0..parser.state_count())
      .map(|state| {
        (0..=t)
          .map(|symbol| follow(parser, &targets, state, symbol))
          .collect()
      })
      .collect();

    let rank = parser.goto.iter()
      .map(|row| row[..t].iter().filter(|&&to| to >= 0).count())
      .collect();

    Self {
      follow,
      rank,
    }
  }

  pub fn follow(&self, state: usize, symbol: usize) -> Option<&Follow> {
    self.follow[state][symbol].as_ref()
  }

  pub fn rank(&self, state: usize) -> usize {
    self.rank[state]
  }

  /// Terminal to insert in `state` when `symbol` cannot be consumed.
  ///
  /// Candidates are tried in ascending terminal order. One that cannot be
  /// shifted, or after which `symbol` is rejected on some path, is skipped
  /// and the search goes on. The highest total rank of the states reached
  /// wins; on a tie the lower terminal is kept.
  pub fn insertion(&self, state: usize, symbol: usize) -> Option<usize> {
    let num_terminals = self.follow[state].len() - 1;
    let mut best: Option<(usize, usize)> = None;

    for candidate in 0..num_terminals {
      let after = match self.follow(state, candidate) {
        Some(after) => after,
        None => continue,
      };

      let mut reached = BTreeSet::new();
      let mut valid = true;
      for &next in &after.states {
        match self.follow(next, symbol) {
          Some(follow) => reached.extend(follow.states.iter().copied()),
          None => {
            valid = false;
            break;
          }
        }
      }
      if !valid {
        continue;
      }

      let score = reached.iter().map(|&state| self.rank[state]).sum::<usize>();
      if best.map_or(true, |(_, best)| score > best) {
        best = Some((candidate, score));
      }
    }

    best.map(|(candidate, _)| candidate)
  }

  /// Writes an insertion into every dead terminal and end-of-input cell that
  /// has one, as `-(t + 2)` for terminal `t` chosen by
  /// [`insertion`](Self::insertion). Nonterminal columns and live cells are
  /// left alone.
  pub fn apply(&self, parser: &mut Parser) {
    let mut count = 0;

    for state in 0..parser.state_count() {
      for symbol in 0..=parser.num_terminals {
        let dead = parser.action[state][symbol] == 0 && parser.goto[state][symbol] < 0;
        if !dead {
          continue;
        }
        if let Some(terminal) = self.insertion(state, symbol) {
          parser.goto[state][symbol] = -(terminal as i32 + 2);
          count += 1;
        }
      }
    }

    log::debug!("{} recovery insertions", count);
  }
}

fn usize_of(value: i32) -> Option<usize> {
  if value >= 0 {
    Some(value as usize)
  } else {
    None
  }
}

fn follow(parser: &Parser, targets: &[BTreeSet<usize>], state: usize, symbol: usize) -> Option<Follow> {
  let mut result = Follow::default();
  let mut visited = BTreeSet::new();
  let mut queue = VecDeque::new();
  visited.insert(state);
  queue.push_back(state);

  while let Some(state) = queue.pop_front() {
    let action = parser.action[state][symbol];

    if action > 0 {
      let reduce = &parser.reduces[action as usize - 1];
      if reduce.accept {
        result.accepts = true;
        continue;
      }
      for &target in &targets[reduce.lhs.index()] {
        if visited.insert(target) {
          queue.push_back(target);
        }
      }
    } else if let Some(to) = usize_of(parser.goto[state][symbol]) {
      result.states.insert(to);
    } else {
      return None;
    }
  }

  if result.states.is_empty() && !result.accepts {
    None
  } else {
    Some(result)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use grammar::{Grammar, Action};
  use crate::{build, Options};

  fn pair() -> Parser {
    let mut g = Grammar::new();
    g.add_terminal("a", None, None).unwrap();
    g.add_terminal("b", None, None).unwrap();
    g.rule("S", &["a", "b"], Action::none()).unwrap();
    build(&g, &Options { error_recovery: false, ..Options::default() }).unwrap()
  }

  #[test]
  fn follow_sets() {
    let parser = pair();
    let recovery = Recovery::new(&parser);
    let (a, b, eof) = (0, 1, 2);
    let after_a = parser.goto[0][a] as usize;
    let after_ab = parser.goto[after_a][b] as usize;

    assert_eq!(recovery.follow(0, a).map(|f| f.states.iter().copied().collect::<Vec<_>>()),
      Some(vec![after_a]));
    assert_eq!(recovery.follow(0, b), None);
    assert_eq!(recovery.follow(after_ab, eof), Some(&Follow {
      states: BTreeSet::new(),
      accepts: true,
    }));
    assert_eq!(recovery.rank(0), 1);
    assert_eq!(recovery.rank(after_ab), 0);
  }

  #[test]
  fn insertions() {
    let mut parser = pair();
    let recovery = Recovery::new(&parser);
    let (a, b, eof) = (0, 1, 2);
    let after_a = parser.goto[0][a] as usize;

    assert_eq!(recovery.insertion(0, b), Some(a));
    assert_eq!(recovery.insertion(after_a, eof), Some(b));
    // `a b` would still leave the end of input unexplained
    assert_eq!(recovery.insertion(0, eof), None);

    recovery.apply(&mut parser);
    assert_eq!(parser.goto[0][b], -(a as i32 + 2));
    assert_eq!(parser.goto[after_a][eof], -(b as i32 + 2));
    assert_eq!(parser.goto[0][eof], -1);
  }

  #[test]
  fn lower_terminal_wins_ties() {
    let mut g = Grammar::new();
    for t in &["c", "a", "b", "x", "y"] {
      g.add_terminal(t, None, None).unwrap();
    }
    g.rule("S", &["c", "y"], Action::none()).unwrap();
    g.rule("S", &["a", "x"], Action::none()).unwrap();
    g.rule("S", &["b", "x"], Action::none()).unwrap();
    let parser = build(&g, &Options { error_recovery: false, ..Options::default() }).unwrap();
    let recovery = Recovery::new(&parser);
    let (c, a, b, x) = (0, 1, 2, 3);

    // `c` rejects `x` and is passed over; `a` and `b` score the same
    assert_eq!(recovery.follow(parser.goto[0][c] as usize, x), None);
    let score = |t: usize| {
      let after = parser.goto[0][t] as usize;
      recovery.follow(after, x).unwrap().states.iter().map(|&s| recovery.rank(s)).sum::<usize>()
    };
    assert_eq!(score(a), score(b));
    assert_eq!(recovery.insertion(0, x), Some(a));
  }
}
