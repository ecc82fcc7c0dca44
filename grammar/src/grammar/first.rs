//! FIRST sets and nullability.

use bit_set::BitSet;
use bitvec::prelude::*;
use super::{Grammar, Symbol, NonterminalId};

/// FIRST set and nullability of every nonterminal. FIRST sets hold terminal
/// indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeftMost {
  pub first: Vec<BitSet>,
  pub nullable: BitVec,
}

impl LeftMost {
  pub fn first(&self, nt: NonterminalId) -> &BitSet {
    &self.first[nt.index()]
  }

  pub fn is_nullable(&self, nt: NonterminalId) -> bool {
    self.nullable[nt.index()]
  }

  /// FIRST of a symbol sequence, and whether the whole sequence is nullable.
  pub fn sequence<'a, I>(&self, symbols: I) -> (BitSet, bool)
    where I: IntoIterator<Item = &'a Symbol>
  {
    let mut first = BitSet::new();

    for symbol in symbols {
      match *symbol {
        Symbol::Terminal(t) => {
          first.insert(t.index());
          return (first, false);
        }
        Symbol::Nonterminal(nt) => {
          first.union_with(self.first(nt));
          if !self.is_nullable(nt) {
            return (first, false);
          }
        }
      }
    }

    (first, true)
  }
}

pub(super) fn compute(grammar: &Grammar) -> LeftMost {
  let nullable = compute_nullable(grammar);
  let first = compute_first(grammar, &nullable);

  LeftMost {
    first,
    nullable,
  }
}

fn compute_nullable(grammar: &Grammar) -> BitVec {
  let mut nullable = bitvec![0; grammar.nonterminal_count()];

  loop {
    let mut changed = false;

    for prod in grammar.productions() {
      if nullable[prod.lhs.index()] {
        continue;
      }

      let all_nullable = prod.rhs.iter().all(|shift| match shift.symbol {
        Symbol::Terminal(_) => false,
        Symbol::Nonterminal(nt) => nullable[nt.index()],
      });

      if all_nullable {
        nullable.set(prod.lhs.index(), true);
        changed = true;
      }
    }

    if !changed {
      break;
    }
  }

  nullable
}

fn compute_first(grammar: &Grammar, nullable: &BitSlice) -> Vec<BitSet> {
  let mut first = vec![BitSet::new(); grammar.nonterminal_count()];

  loop {
    let mut changed = false;

    for prod in grammar.productions() {
      let mut prod_first = BitSet::new();

      for shift in &prod.rhs {
        match shift.symbol {
          Symbol::Terminal(t) => {
            prod_first.insert(t.index());
            break;
          }
          Symbol::Nonterminal(nt) => {
            prod_first.union_with(&first[nt.index()]);
            if !nullable[nt.index()] {
              break;
            }
          }
        }
      }

      let lhs = &mut first[prod.lhs.index()];
      if !prod_first.is_subset(lhs) {
        lhs.union_with(&prod_first);
        changed = true;
      }
    }

    if !changed {
      break;
    }
  }

  first
}

#[cfg(test)]
mod tests {
  use crate::{Grammar, Action};
  use pretty_assertions::assert_eq;

  fn names(grammar: &Grammar, set: &bit_set::BitSet) -> Vec<String> {
    set.iter()
      .map(|t| grammar.terminal_info(crate::TerminalId::from_index(t)).name.clone())
      .collect()
  }

  #[test]
  fn nullable_chain() {
    let mut g = Grammar::new();
    for t in &["a", "c", "d"] {
      g.add_terminal(t, None, None).unwrap();
    }
    g.rule("Z", &["d"], Action::none()).unwrap();
    g.rule("Z", &["X", "Y", "Z"], Action::none()).unwrap();
    g.rule("Y", &[], Action::none()).unwrap();
    g.rule("Y", &["c"], Action::none()).unwrap();
    g.rule("X", &["Y"], Action::none()).unwrap();
    g.rule("X", &["a"], Action::none()).unwrap();

    let lm = g.leftmost();
    let z = g.nonterminal_id("Z").unwrap();
    let y = g.nonterminal_id("Y").unwrap();
    let x = g.nonterminal_id("X").unwrap();

    assert!(!lm.is_nullable(z));
    assert!(lm.is_nullable(y));
    assert!(lm.is_nullable(x));
    assert_eq!(names(&g, lm.first(z)), vec!["a", "c", "d"]);
    assert_eq!(names(&g, lm.first(y)), vec!["c"]);
    assert_eq!(names(&g, lm.first(x)), vec!["a", "c"]);
  }

  #[test]
  fn left_recursion() {
    let mut g = Grammar::new();
    for t in &["+", "*", "(", ")", "num"] {
      g.add_terminal(t, None, None).unwrap();
    }
    g.rule("E", &["E", "+", "T"], Action::none()).unwrap();
    g.rule("E", &["T"], Action::none()).unwrap();
    g.rule("T", &["T", "*", "F"], Action::none()).unwrap();
    g.rule("T", &["F"], Action::none()).unwrap();
    g.rule("F", &["(", "E", ")"], Action::none()).unwrap();
    g.rule("F", &["num"], Action::none()).unwrap();

    let lm = g.leftmost();
    for nt in &["E", "T", "F"] {
      let nt = g.nonterminal_id(nt).unwrap();
      assert!(!lm.is_nullable(nt));
      assert_eq!(names(&g, lm.first(nt)), vec!["(", "num"]);
    }
  }

  #[test]
  fn sequence_falls_through_nullable_symbols() {
    let mut g = Grammar::new();
    g.add_terminal("a", None, None).unwrap();
    g.add_terminal("b", None, None).unwrap();
    g.rule("S", &["A", "B"], Action::none()).unwrap();
    g.rule("A", &[], Action::none()).unwrap();
    g.rule("A", &["a"], Action::none()).unwrap();
    g.rule("B", &[], Action::none()).unwrap();
    g.rule("B", &["b"], Action::none()).unwrap();

    let lm = g.leftmost();
    let s = g.production(crate::ProductionId::from_index(0));
    let (first, nullable) = lm.sequence(s.rhs.iter().map(|shift| &shift.symbol));
    assert_eq!(names(&g, &first), vec!["a", "b"]);
    assert!(nullable);

    let (first, nullable) = lm.sequence(s.rhs[1..].iter().map(|shift| &shift.symbol));
    assert_eq!(names(&g, &first), vec!["b"]);
    assert!(nullable);
  }
}
