use crate::augment::Augmented;
use crate::{Error, Map, Parser, Reduce, ShiftAction};
use super::{Automaton, Candidate, Cell, ConflictError};

/// Flattens the automaton into dense `goto`/`action` rows.
///
/// Reductions and inline shift actions are numbered in order of first use,
/// scanning states and then columns in ascending order. Cells still holding
/// more than one candidate are reported per state, and no tables are
/// produced.
pub fn linearize(augmented: &Augmented, automaton: &Automaton) -> Result<Parser, Vec<Error>> {
  let errors = conflicts(augmented, automaton);
  if !errors.is_empty() {
    return Err(errors);
  }

  let num_states = automaton.state_count();
  let width = augmented.num_lookaheads() + augmented.num_nonterminals();

  let mut goto = vec![vec![-1i32; width]; num_states];
  for (state, row) in goto.iter_mut().enumerate() {
    for (column, cell) in row.iter_mut().enumerate() {
      if let Some(to) = automaton.goto(state, column) {
        *cell = to as i32;
      }
    }
  }

  let mut action = vec![vec![0i32; width]; num_states];
  let mut reduces = Numbering::default();
  let mut shifts = Numbering::default();

  for (state, cells) in automaton.cells.iter().enumerate() {
    for (&column, cell) in cells {
      let candidate = match cell.candidates.iter().next() {
        Some(&candidate) => candidate,
        None => continue,
      };

      action[state][column] = match candidate {
        Candidate::Shift => 0,
        Candidate::ShiftAction { prod, dot } => {
          -(shifts.number((prod, dot)) as i32 + 1)
        }
        Candidate::Reduce(prod) => {
          reduces.number(prod) as i32 + 1
        }
      };
    }
  }

  let reduces = reduces.0.keys()
    .map(|&prod| {
      let production = augmented.production(prod);
      Reduce {
        production: prod,
        lhs: production.lhs,
        len: production.rhs.len(),
        function: production.action.function.clone(),
        args: production.action.args.clone(),
        pivot: production.action.pivot,
        accept: augmented.is_accept(prod),
      }
    })
    .collect();

  let shifts = shifts.0.keys()
    .map(|&(prod, position)| {
      let action = &augmented.production(prod).rhs[position].action;
      ShiftAction {
        production: prod,
        position,
        function: action.function.clone(),
        args: action.args.clone(),
      }
    })
    .collect();

  Ok(Parser {
    goto,
    action,
    reduces,
    shifts,
    start: automaton.dfa.start().0,
    num_terminals: augmented.num_terminals(),
    num_nonterminals: augmented.num_nonterminals(),
  })
}

/// Keys numbered from 0 in insertion order.
struct Numbering<K>(Map<K, ()>);

impl<K> Default for Numbering<K> {
  fn default() -> Self {
    Self(Map::default())
  }
}

impl<K: std::hash::Hash + Eq> Numbering<K> {
  fn number(&mut self, key: K) -> usize {
    self.0.insert_full(key, ()).0
  }
}

fn conflicts(augmented: &Augmented, automaton: &Automaton) -> Vec<Error> {
  let mut errors = vec![];

  for (state, cells) in automaton.cells.iter().enumerate() {
    // competing items -> columns they compete on
    let mut groups = Map::<Vec<String>, Vec<String>>::default();

    for (&column, cell) in cells {
      if cell.candidates.len() < 2 {
        continue;
      }
      groups.entry(competing_items(augmented, cell))
        .or_default()
        .push(augmented.column_name(column));
    }

    for (items, symbols) in groups {
      log::debug!("conflict in state {} on {}", state, symbols.join(", "));
      errors.push(Error::Conflict(ConflictError {
        state,
        symbols,
        items,
      }));
    }
  }

  errors
}

fn competing_items(augmented: &Augmented, cell: &Cell) -> Vec<String> {
  let mut items = vec![];

  for candidate in &cell.candidates {
    match *candidate {
      Candidate::Shift => {
        for &(prod, dot) in &cell.shifts {
          items.push(augmented.item_to_string(prod, dot));
        }
      }
      Candidate::ShiftAction { prod, dot } => {
        items.push(augmented.item_to_string(prod, dot));
      }
      Candidate::Reduce(prod) => {
        let len = augmented.production(prod).rhs.len();
        items.push(augmented.item_to_string(prod, len));
      }
    }
  }

  items
}
