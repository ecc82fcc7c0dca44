//! LR(1)/LALR parse tables for [`grammar::Grammar`].
//!
//! Both tables are dense, one row per parser state, with the column layout
//! terminal `t` → `t`, end-of-input → `T`, nonterminal `n` → `T + 1 + n`.

use thiserror::Error;
use grammar::{Grammar, GrammarError, ProductionId, NonterminalId, Arg, Symbol};

pub use builder::{Candidate, ConflictError};
pub use recovery::{Follow, Recovery};
pub use report::report;

mod augment;
mod lookahead;
mod item;
mod builder;
mod recovery;
mod report;

pub type Map<K, V> = grammar::Map<K, V>;
pub type Set<T> = grammar::Set<T>;

/// Displayed for the end-of-input column.
pub const EOF_NAME: &str = "<End Of Input>";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
  /// Per-production lookahead union, with one pruning pass on conflicts.
  Lalr,
  /// Canonical LR(1) item sets.
  Lr1,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
  pub mode: Mode,
  pub error_recovery: bool,
  /// Diagnostics beyond this count are dropped.
  pub max_errors: usize,
}

impl Default for Options {
  fn default() -> Self {
    Self {
      mode: Mode::Lalr,
      error_recovery: true,
      max_errors: 32,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parser {
  /// `>= 0`: destination state. `-1`: no transition. `<= -2`: insert
  /// terminal `-(v + 2)` and retry.
  pub goto: Vec<Vec<i32>>,
  /// `0`: consult `goto`. `> 0`: reduce by `reduces[v - 1]`. `< 0`: shift,
  /// then run `shifts[-v - 1]`.
  pub action: Vec<Vec<i32>>,
  pub reduces: Vec<Reduce>,
  pub shifts: Vec<ShiftAction>,
  pub start: usize,
  pub num_terminals: usize,
  pub num_nonterminals: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reduce {
  /// The accepting reduction refers to a production past the grammar's own.
  pub production: ProductionId,
  pub lhs: NonterminalId,
  pub len: usize,
  pub function: Option<String>,
  pub args: Vec<Arg>,
  pub pivot: Option<usize>,
  pub accept: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShiftAction {
  pub production: ProductionId,
  /// 0-based position of the shifted symbol.
  pub position: usize,
  pub function: Option<String>,
  pub args: Vec<Arg>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
  #[error(transparent)]
  Grammar(#[from] GrammarError),
  #[error("{0}")]
  Conflict(ConflictError),
  #[error("The type of the right hand side symbol at position {position} in the production {production} is void.")]
  VoidReference {
    production: String,
    position: usize,
  },
  #[error("pivot out of range in production: {0}")]
  PivotOutOfRange(String),
  #[error("Type of pivot does not match the type of the production: {0}")]
  PivotTypeMismatch(String),
}

impl Parser {
  pub fn width(&self) -> usize {
    self.num_terminals + 1 + self.num_nonterminals
  }

  pub fn eof_column(&self) -> usize {
    self.num_terminals
  }

  pub fn column(&self, symbol: Symbol) -> usize {
    column(self.num_terminals, symbol)
  }

  pub fn state_count(&self) -> usize {
    self.goto.len()
  }
}

pub(crate) fn column(num_terminals: usize, symbol: Symbol) -> usize {
  match symbol {
    Symbol::Terminal(t) => t.index(),
    Symbol::Nonterminal(nt) => num_terminals + 1 + nt.index(),
  }
}

/// Builds the parse tables, validates the semantic actions and, if
/// requested, fills dead `goto` cells with recovery insertions.
///
/// Errors are accumulated per stage, up to `options.max_errors`; the first
/// stage reporting any stops the build.
pub fn build(grammar: &Grammar, options: &Options) -> Result<Parser, Vec<Error>> {
  let mut errors = grammar.check()
    .into_iter()
    .map(Error::from)
    .collect::<Vec<_>>();
  if !errors.is_empty() {
    errors.truncate(options.max_errors);
    return Err(errors);
  }

  let augmented = augment::Augmented::new(grammar)
    .map_err(|err| vec![Error::from(err)])?;

  let automaton = builder::build(&augmented, options.mode);
  let mut parser = builder::tables::linearize(&augmented, &automaton)
    .map_err(|mut errors| {
      errors.truncate(options.max_errors);
      errors
    })?;

  let mut errors = builder::validate::validate(&augmented, &parser);
  if !errors.is_empty() {
    errors.truncate(options.max_errors);
    return Err(errors);
  }

  if options.error_recovery {
    let recovery = Recovery::new(&parser);
    recovery.apply(&mut parser);
  }

  Ok(parser)
}
