//! Per-production lookahead union, computed before the item sets.
//!
//! Every production receives the union of the lookaheads it is predicted
//! with anywhere in the grammar. Seeding predicted items from that union
//! merges states the way LALR does. `ancestors` records which productions
//! passed their own lookahead down to a production, so a conflict can be
//! traced back and its terminal stripped at every source.

use std::collections::VecDeque;
use bit_set::BitSet;
use grammar::{LeftMost, ProductionId};
use crate::augment::Augmented;
use crate::item::{Lr1Item, lookahead_set};
use crate::Set;

#[derive(Debug, Clone)]
pub struct Lookaheads {
  prod2la: Vec<BitSet>,
  /// Reflexive and transitive.
  ancestors: Vec<BitSet>,
}

impl Lookaheads {
  pub fn of(&self, prod: ProductionId) -> &BitSet {
    &self.prod2la[prod.index()]
  }

  pub fn ancestors(&self, prod: ProductionId) -> impl Iterator<Item = ProductionId> + '_ {
    self.ancestors[prod.index()].iter().map(ProductionId::from_index)
  }

  /// Removes `lookahead` from `prod` and from every production it
  /// inherited lookahead from.
  pub fn prune(&mut self, prod: ProductionId, lookahead: usize) {
    let ancestors = self.ancestors(prod).collect::<Vec<_>>();
    for ancestor in ancestors {
      self.prod2la[ancestor.index()].remove(lookahead);
    }
  }
}

pub fn compute(augmented: &Augmented, leftmost: &LeftMost) -> Lookaheads {
  let num_prods = augmented.production_count();
  let mut prod2la = vec![lookahead_set(augmented); num_prods];
  let mut ancestors = vec![BitSet::with_capacity(num_prods); num_prods];

  let seed = Lr1Item::seed(augmented);
  let mut visited = Set::default();
  let mut queue = VecDeque::new();
  visited.insert(seed.clone());
  queue.push_back(seed);

  while let Some(item) = queue.pop_front() {
    prod2la[item.prod.index()].union_with(&item.lookahead);

    if item.is_complete(augmented) {
      continue;
    }

    if let Some(prediction) = item.predict(augmented, leftmost) {
      for &dst in augmented.grammar.productions_of(prediction.nonterminal) {
        if prediction.inherits {
          ancestors[dst.index()].insert(item.prod.index());
        }

        let predicted = Lr1Item {
          prod: dst,
          dot: 0,
          lookahead: prediction.lookahead.clone(),
        };
        if visited.insert(predicted.clone()) {
          queue.push_back(predicted);
        }
      }
    }

    let next = item.advance();
    if visited.insert(next.clone()) {
      queue.push_back(next);
    }
  }

  close(&mut ancestors);

  log::debug!("lookahead pre-pass visited {} items", visited.len());

  Lookaheads {
    prod2la,
    ancestors,
  }
}

fn close(ancestors: &mut [BitSet]) {
  for (ix, set) in ancestors.iter_mut().enumerate() {
    set.insert(ix);
  }

  loop {
    let mut changed = false;

    for ix in 0..ancestors.len() {
      let mut merged = ancestors[ix].clone();
      for ancestor in ancestors[ix].iter() {
        merged.union_with(&ancestors[ancestor]);
      }
      if merged != ancestors[ix] {
        ancestors[ix] = merged;
        changed = true;
      }
    }

    if !changed {
      break;
    }
  }
}
