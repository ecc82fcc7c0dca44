//! Context-free grammar with semantic actions.

use std::fmt::Write;
use thiserror::Error;
use itertools::Itertools;
use crate::{BiMap, Set};

pub use action::{Action, Arg};
pub use first::LeftMost;

mod action;
mod first;

#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Debug)]
pub struct TerminalId(u32);

#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Debug)]
pub struct NonterminalId(u32);

#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Debug)]
pub struct ProductionId(u32);

macro_rules! impl_id {
  ($($ty:ident),*) => {$(
    impl $ty {
      pub fn id(&self) -> u32 {
        self.0
      }

      pub fn index(&self) -> usize {
        self.0 as usize
      }

      pub fn from_index(index: usize) -> Self {
        Self(index as u32)
      }
    }
  )*};
}

impl_id!(TerminalId, NonterminalId, ProductionId);

/// Nonterminals order before terminals.
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Debug)]
pub enum Symbol {
  Nonterminal(NonterminalId),
  Terminal(TerminalId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolInfo {
  pub name: String,
  pub ty: Option<String>,
  /// Default value of a terminal, used when the terminal is synthesized by
  /// error recovery.
  pub instance: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shift {
  pub symbol: Symbol,
  /// Runs right after `symbol` has been shifted.
  pub action: Action,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Production {
  pub lhs: NonterminalId,
  pub rhs: Vec<Shift>,
  pub action: Action,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrammarError {
  #[error("terminal '{0}' is already defined")]
  DuplicateTerminal(String),
  #[error("nonterminal '{0}' is already defined")]
  DuplicateNonterminal(String),
  #[error("'{0}' is a terminal, not a nonterminal")]
  NotANonterminal(String),
  #[error("unknown symbol '{0}'")]
  UnknownSymbol(String),
  #[error("reference {reference} out of range in production: {production}")]
  ReferenceOutOfRange {
    production: String,
    reference: usize,
  },
  #[error("no start symbol")]
  Empty,
  #[error("multiple start symbols: {}", .0.join(", "))]
  MultipleStartSymbols(Vec<String>),
  #[error("Anonymous pattern /{0}/ defined twice")]
  DuplicatePattern(String),
  #[error("nonterminal '{0}' has no productions")]
  MissingProductions(String),
}

#[derive(Debug, Clone, Default)]
pub struct Grammar {
  terminals: Vec<SymbolInfo>,
  nonterminals: Vec<SymbolInfo>,
  names: BiMap<String, Symbol>,
  prods: Vec<Production>,
  prods_by_lhs: Vec<Vec<ProductionId>>,
}

impl SymbolInfo {
  /// Absent, empty and `void` types carry no value.
  pub fn is_void(&self) -> bool {
    is_void(self.ty.as_deref())
  }
}

pub fn is_void(ty: Option<&str>) -> bool {
  match ty {
    None | Some("") | Some("void") => true,
    Some(_) => false,
  }
}

impl Shift {
  pub fn new(symbol: Symbol) -> Self {
    Self {
      symbol,
      action: Action::none(),
    }
  }

  pub fn with_action(symbol: Symbol, action: Action) -> Self {
    Self { symbol, action }
  }
}

impl Grammar {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn add_terminal(
    &mut self,
    name: &str,
    ty: Option<&str>,
    instance: Option<&str>,
  ) -> Result<TerminalId, GrammarError> {
    if self.names.contains_left(name) {
      return Err(GrammarError::DuplicateTerminal(name.to_owned()));
    }

    let id = TerminalId::from_index(self.terminals.len());
    self.terminals.push(SymbolInfo {
      name: name.to_owned(),
      ty: ty.map(str::to_owned),
      instance: instance.map(str::to_owned),
    });
    self.names.insert(name.to_owned(), Symbol::Terminal(id));
    Ok(id)
  }

  pub fn add_nonterminal(
    &mut self,
    name: &str,
    ty: Option<&str>,
  ) -> Result<NonterminalId, GrammarError> {
    if self.names.contains_left(name) {
      return Err(GrammarError::DuplicateNonterminal(name.to_owned()));
    }

    let id = NonterminalId::from_index(self.nonterminals.len());
    self.nonterminals.push(SymbolInfo {
      name: name.to_owned(),
      ty: ty.map(str::to_owned),
      instance: None,
    });
    self.prods_by_lhs.push(vec![]);
    self.names.insert(name.to_owned(), Symbol::Nonterminal(id));
    Ok(id)
  }

  /// Looks up a nonterminal, declaring it untyped on first use.
  pub fn nonterminal(&mut self, name: &str) -> Result<NonterminalId, GrammarError> {
    match self.find_symbol(name) {
      Some(Symbol::Nonterminal(nt)) => Ok(nt),
      Some(Symbol::Terminal(_)) => Err(GrammarError::NotANonterminal(name.to_owned())),
      None => self.add_nonterminal(name, None),
    }
  }

  pub fn find_symbol(&self, name: &str) -> Option<Symbol> {
    self.names.get_by_left(name).copied()
  }

  pub fn nonterminal_id(&self, name: &str) -> Option<NonterminalId> {
    match self.find_symbol(name)? {
      Symbol::Nonterminal(nt) => Some(nt),
      Symbol::Terminal(_) => None,
    }
  }

  pub fn terminal_id(&self, name: &str) -> Option<TerminalId> {
    match self.find_symbol(name)? {
      Symbol::Terminal(t) => Some(t),
      Symbol::Nonterminal(_) => None,
    }
  }

  /// Adds `lhs -> rhs` after checking that every reference of the inline
  /// actions and of the trailing action points into the part of the right
  /// hand side already shifted when it runs.
  pub fn add_production(
    &mut self,
    lhs: NonterminalId,
    rhs: Vec<Shift>,
    action: Action,
  ) -> Result<ProductionId, GrammarError> {
    let prod = Production { lhs, rhs, action };

    let inline = prod.rhs.iter()
      .enumerate()
      .flat_map(|(i, shift)| shift.action.references().map(move |r| (r, i + 1)));
    let trailing = prod.action.references().map(|r| (r, prod.rhs.len()));

    for (reference, limit) in inline.chain(trailing) {
      if reference == 0 || reference > limit {
        return Err(GrammarError::ReferenceOutOfRange {
          production: self.format_production(&prod),
          reference,
        });
      }
    }

    let id = ProductionId::from_index(self.prods.len());
    self.prods_by_lhs[lhs.index()].push(id);
    self.prods.push(prod);
    Ok(id)
  }

  /// Shorthand for a production given by symbol names, without inline
  /// actions. The left-hand side is declared on first use.
  pub fn rule(
    &mut self,
    lhs: &str,
    rhs: &[&str],
    action: Action,
  ) -> Result<ProductionId, GrammarError> {
    let lhs = self.nonterminal(lhs)?;
    let rhs = rhs.iter()
      .map(|&name| match self.find_symbol(name) {
        Some(symbol) => Ok(Shift::new(symbol)),
        None => self.nonterminal(name).map(|nt| Shift::new(Symbol::Nonterminal(nt))),
      })
      .collect::<Result<Vec<_>, _>>()?;
    self.add_production(lhs, rhs, action)
  }

  pub fn terminal_count(&self) -> usize {
    self.terminals.len()
  }

  pub fn nonterminal_count(&self) -> usize {
    self.nonterminals.len()
  }

  pub fn production_count(&self) -> usize {
    self.prods.len()
  }

  pub fn terminals(&self) -> impl Iterator<Item = TerminalId> {
    (0..self.terminals.len()).map(TerminalId::from_index)
  }

  pub fn nonterminals(&self) -> impl Iterator<Item = NonterminalId> {
    (0..self.nonterminals.len()).map(NonterminalId::from_index)
  }

  pub fn terminal_info(&self, t: TerminalId) -> &SymbolInfo {
    &self.terminals[t.index()]
  }

  pub fn nonterminal_info(&self, nt: NonterminalId) -> &SymbolInfo {
    &self.nonterminals[nt.index()]
  }

  pub fn symbol_info(&self, symbol: Symbol) -> &SymbolInfo {
    match symbol {
      Symbol::Terminal(t) => self.terminal_info(t),
      Symbol::Nonterminal(nt) => self.nonterminal_info(nt),
    }
  }

  pub fn symbol_name(&self, symbol: Symbol) -> &str {
    &self.symbol_info(symbol).name
  }

  pub fn production(&self, id: ProductionId) -> &Production {
    &self.prods[id.index()]
  }

  pub fn productions(&self) -> impl Iterator<Item = &Production> {
    self.prods.iter()
  }

  pub fn productions_of(&self, nt: NonterminalId) -> &[ProductionId] {
    &self.prods_by_lhs[nt.index()]
  }

  pub fn leftmost(&self) -> LeftMost {
    first::compute(self)
  }

  /// Nonterminals with productions that no right-hand side mentions.
  pub fn start_symbols(&self) -> Vec<NonterminalId> {
    let used = self.prods.iter()
      .flat_map(|prod| prod.rhs.iter())
      .filter_map(|shift| match shift.symbol {
        Symbol::Nonterminal(nt) => Some(nt),
        Symbol::Terminal(_) => None,
      })
      .collect::<Set<_>>();

    self.nonterminals()
      .filter(|nt| !self.prods_by_lhs[nt.index()].is_empty() && !used.contains(nt))
      .collect()
  }

  pub fn start_symbol(&self) -> Result<NonterminalId, GrammarError> {
    let starts = self.start_symbols();
    match starts.len() {
      0 => Err(GrammarError::Empty),
      1 => Ok(starts[0]),
      _ => Err(GrammarError::MultipleStartSymbols(
        starts.iter()
          .map(|&nt| self.nonterminal_info(nt).name.clone())
          .collect())),
    }
  }

  /// Structural problems that make the grammar unusable, in declaration
  /// order.
  pub fn check(&self) -> Vec<GrammarError> {
    let mut errors = vec![];

    let referenced = self.prods.iter()
      .flat_map(|prod| prod.rhs.iter())
      .filter_map(|shift| match shift.symbol {
        Symbol::Nonterminal(nt) => Some(nt),
        Symbol::Terminal(_) => None,
      })
      .collect::<Set<_>>();

    for nt in referenced.into_iter().sorted() {
      if self.prods_by_lhs[nt.index()].is_empty() {
        errors.push(GrammarError::MissingProductions(self.nonterminal_info(nt).name.clone()));
      }
    }

    if let Err(err) = self.start_symbol() {
      errors.push(err);
    }

    errors
  }

  /// `LHS:(a b:f(1) c):g(1, 3)`
  pub fn production_to_string(&self, id: ProductionId) -> String {
    self.format_production(self.production(id))
  }

  fn format_production(&self, prod: &Production) -> String {
    let mut buf = String::new();
    write!(&mut buf, "{}:(", self.nonterminal_info(prod.lhs).name).unwrap();
    for (i, shift) in prod.rhs.iter().enumerate() {
      if i != 0 {
        buf.push(' ');
      }
      write!(&mut buf, "{}{}", self.symbol_name(shift.symbol), shift.action).unwrap();
    }
    write!(&mut buf, "){}", prod.action).unwrap();
    buf
  }

  /// `LHS : (a b * c)`, with the dot drawn as `*`.
  pub fn item_to_string(&self, id: ProductionId, dot: usize) -> String {
    let prod = self.production(id);
    let mut parts = prod.rhs.iter()
      .map(|shift| self.symbol_name(shift.symbol))
      .collect::<Vec<_>>();
    parts.insert(dot.min(parts.len()), "*");
    format!("{} : ({})", self.nonterminal_info(prod.lhs).name, parts.join(" "))
  }
}
