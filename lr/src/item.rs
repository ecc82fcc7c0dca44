use bit_set::BitSet;
use itertools::Itertools;
use grammar::{LeftMost, NonterminalId, ProductionId, Symbol};
use crate::augment::Augmented;

/// `(production, dot, lookahead)`. Lookahead sets hold terminal indices plus
/// the end-of-input index, and always span `num_lookaheads` bits so equal
/// sets compare and hash equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Lr1Item {
  pub prod: ProductionId,
  pub dot: usize,
  pub lookahead: BitSet,
}

/// Lookahead handed to the productions of a predicted nonterminal.
pub struct Prediction {
  pub nonterminal: NonterminalId,
  pub lookahead: BitSet,
  /// The rest of the production is nullable, so the predicting item's own
  /// lookahead flows into the prediction.
  pub inherits: bool,
}

pub fn lookahead_set(augmented: &Augmented) -> BitSet {
  BitSet::with_capacity(augmented.num_lookaheads())
}

impl Lr1Item {
  pub fn seed(augmented: &Augmented) -> Self {
    let mut lookahead = lookahead_set(augmented);
    lookahead.insert(augmented.eof());
    Self {
      prod: augmented.accept_production(),
      dot: 0,
      lookahead,
    }
  }

  pub fn advance(&self) -> Self {
    Self {
      prod: self.prod,
      dot: self.dot + 1,
      lookahead: self.lookahead.clone(),
    }
  }

  pub fn next_symbol(&self, augmented: &Augmented) -> Option<Symbol> {
    augmented.production(self.prod).rhs
      .get(self.dot)
      .map(|shift| shift.symbol)
  }

  pub fn is_complete(&self, augmented: &Augmented) -> bool {
    self.dot >= augmented.production(self.prod).rhs.len()
  }

  /// FIRST of what follows the predicted nonterminal, falling back to this
  /// item's lookahead when the rest of the production is nullable.
  pub fn predict(&self, augmented: &Augmented, leftmost: &LeftMost) -> Option<Prediction> {
    let nonterminal = match self.next_symbol(augmented)? {
      Symbol::Nonterminal(nt) => nt,
      Symbol::Terminal(_) => return None,
    };

    let rest = &augmented.production(self.prod).rhs[self.dot + 1..];
    let (first, inherits) = leftmost.sequence(rest.iter().map(|shift| &shift.symbol));

    let mut lookahead = lookahead_set(augmented);
    lookahead.union_with(&first);
    if inherits {
      lookahead.union_with(&self.lookahead);
    }

    Some(Prediction {
      nonterminal,
      lookahead,
      inherits,
    })
  }

  pub fn to_string(&self, augmented: &Augmented) -> String {
    format!("{} [{}]",
      augmented.item_to_string(self.prod, self.dot),
      self.lookahead.iter().map(|la| augmented.column_name(la)).join(", "))
  }
}
