//! Item-set automaton.
//!
//! Every distinct LR(1) item is one state of a nondeterministic automaton:
//! predictions are epsilon edges, advancing the dot is an edge labelled with
//! the column of the shifted symbol. Subset construction yields the parser
//! states. The result is never minimized, since distinct item sets are
//! distinct parser configurations.

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::fmt::Write;
use grammar::{Fa, State, Mark, Range, LeftMost, ProductionId};
use crate::augment::Augmented;
use crate::item::Lr1Item;
use crate::lookahead::{self, Lookaheads};
use crate::{Map, Mode};

pub mod tables;
pub mod validate;

/// A possible action in one table cell. Plain shifts of the same symbol
/// coincide; shifts carrying an inline action and reductions do not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Candidate {
  Shift,
  ShiftAction {
    prod: ProductionId,
    dot: usize,
  },
  Reduce(ProductionId),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cell {
  pub candidates: BTreeSet<Candidate>,
  /// Items behind [`Candidate::Shift`], kept for conflict reports.
  pub shifts: BTreeSet<(ProductionId, usize)>,
}

/// Two or more candidates left in cells of one state. Columns with the same
/// candidates are reported together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictError {
  pub state: usize,
  pub symbols: Vec<String>,
  /// Competing items, `LHS : (a b * c)`.
  pub items: Vec<String>,
}

pub struct Automaton {
  pub dfa: Fa,
  /// Item of every item-automaton state, indexed by mark.
  pub items: Vec<Lr1Item>,
  /// Per parser state, the candidates by column.
  pub cells: Vec<BTreeMap<usize, Cell>>,
}

pub fn build(augmented: &Augmented, mode: Mode) -> Automaton {
  let leftmost = augmented.grammar.leftmost();
  let mut lookaheads = lookahead::compute(augmented, &leftmost);

  let automaton = pass(augmented, &leftmost, &lookaheads, mode);
  log::debug!("first pass: {} items, {} states", automaton.items.len(), automaton.dfa.len());

  if mode != Mode::Lalr {
    trace_states(augmented, &automaton);
    return automaton;
  }

  let conflicts = automaton.lookahead_conflicts(augmented.num_terminals());
  if conflicts.is_empty() {
    trace_states(augmented, &automaton);
    return automaton;
  }

  for &(prod, terminal) in &conflicts {
    if log::log_enabled!(log::Level::Trace) {
      log::trace!("pruning {} from the ancestors of {}",
        augmented.column_name(terminal),
        augmented.production_to_string(prod));
    }
    lookaheads.prune(prod, terminal);
  }

  let automaton = pass(augmented, &leftmost, &lookaheads, mode);
  log::debug!("second pass after {} prunings: {} items, {} states",
    conflicts.len(), automaton.items.len(), automaton.dfa.len());
  trace_states(augmented, &automaton);

  automaton
}

fn trace_states(augmented: &Augmented, automaton: &Automaton) {
  if log::log_enabled!(log::Level::Trace) {
    log::trace!("item sets:\n{}", automaton.dump(augmented));
  }
}

struct ItemStates {
  nfa: Fa,
  items: Vec<Lr1Item>,
  states: Map<Lr1Item, State>,
  queue: VecDeque<Lr1Item>,
}

impl ItemStates {
  /// State of `item`, queueing it if it is new. Every state is marked with
  /// its own index so parser states know their items.
  fn state(&mut self, item: Lr1Item) -> State {
    if let Some(&state) = self.states.get(&item) {
      return state;
    }
    let state = self.nfa.add_state();
    self.nfa.add_mark(state, Mark(state.0 as u32));
    self.states.insert(item.clone(), state);
    self.items.push(item.clone());
    self.queue.push_back(item);
    state
  }
}

fn pass(
  augmented: &Augmented,
  leftmost: &LeftMost,
  lookaheads: &Lookaheads,
  mode: Mode,
) -> Automaton {
  let mut states = ItemStates {
    nfa: Fa::new(),
    items: vec![],
    states: Map::default(),
    queue: VecDeque::new(),
  };
  states.state(Lr1Item::seed(augmented));

  while let Some(item) = states.queue.pop_front() {
    let symbol = match item.next_symbol(augmented) {
      Some(symbol) => symbol,
      None => continue,
    };
    let from = states.states[&item];

    if let Some(prediction) = item.predict(augmented, leftmost) {
      for &dst in augmented.grammar.productions_of(prediction.nonterminal) {
        let mut lookahead = prediction.lookahead.clone();
        if mode == Mode::Lalr {
          lookahead.union_with(lookaheads.of(dst));
        }

        let to = states.state(Lr1Item {
          prod: dst,
          dot: 0,
          lookahead,
        });
        states.nfa.add_epsilon(from, to);
      }
    }

    let to = states.state(item.advance());
    let code = augmented.column(symbol) as u32;
    let added = states.nfa.add_transition(from, Range::single(code), to);
    assert!(added, "item {} has two successors", item.to_string(augmented));
  }

  let ItemStates { nfa, items, .. } = states;
  let dfa = nfa.determinize();
  let cells = dfa.states()
    .map(|state| state_cells(augmented, &items, dfa.marks(state).iter().copied()))
    .collect();

  Automaton {
    dfa,
    items,
    cells,
  }
}

fn state_cells(
  augmented: &Augmented,
  items: &[Lr1Item],
  marks: impl Iterator<Item = Mark>,
) -> BTreeMap<usize, Cell> {
  let mut cells = BTreeMap::<usize, Cell>::new();

  for mark in marks {
    let item = &items[mark.0 as usize];
    let prod = augmented.production(item.prod);

    match prod.rhs.get(item.dot) {
      None => {
        for lookahead in item.lookahead.iter() {
          cells.entry(lookahead)
            .or_default()
            .candidates
            .insert(Candidate::Reduce(item.prod));
        }
      }
      Some(shift) => {
        let cell = cells.entry(augmented.column(shift.symbol)).or_default();
        if shift.action.is_present() {
          cell.candidates.insert(Candidate::ShiftAction {
            prod: item.prod,
            dot: item.dot,
          });
        } else {
          cell.candidates.insert(Candidate::Shift);
          cell.shifts.insert((item.prod, item.dot));
        }
      }
    }
  }

  cells
}

impl Automaton {
  pub fn state_count(&self) -> usize {
    self.dfa.len()
  }

  pub fn goto(&self, state: usize, column: usize) -> Option<usize> {
    self.dfa.transition(State(state), column as u32).map(|to| to.0)
  }

  /// Reducing productions competing on a terminal column, with the
  /// terminal. End-of-input and nonterminal columns are not pruned.
  fn lookahead_conflicts(&self, num_terminals: usize) -> Vec<(ProductionId, usize)> {
    let mut conflicts = vec![];

    for cells in &self.cells {
      for (&column, cell) in cells.range(..num_terminals) {
        if cell.candidates.len() < 2 {
          continue;
        }
        for candidate in &cell.candidates {
          if let Candidate::Reduce(prod) = *candidate {
            conflicts.push((prod, column));
          }
        }
      }
    }

    conflicts
  }

  pub fn dump(&self, augmented: &Augmented) -> String {
    let mut buf = String::new();

    for state in self.dfa.states() {
      writeln!(&mut buf, "state {}:", state.0).unwrap();
      for mark in self.dfa.marks(state) {
        writeln!(&mut buf, "  {}", self.items[mark.0 as usize].to_string(augmented)).unwrap();
      }
      for (range, to) in self.dfa.transitions_from(state) {
        for column in range.from..range.to {
          writeln!(&mut buf, "  {} => {}", augmented.column_name(column as usize), to.0).unwrap();
        }
      }
    }

    buf
  }
}
