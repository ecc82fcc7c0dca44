use grammar::{
  Grammar, GrammarError, Production, ProductionId, NonterminalId, Symbol, Shift, Action,
};

/// The grammar extended with `S' -> S`, whose trailing action `*` marks
/// acceptance. `S'` is the nonterminal past the grammar's own and never
/// appears on a right-hand side, so it has no table column.
pub struct Augmented<'a> {
  pub grammar: &'a Grammar,
  accept: Production,
  start: NonterminalId,
}

impl<'a> Augmented<'a> {
  pub fn new(grammar: &'a Grammar) -> Result<Self, GrammarError> {
    let start = grammar.start_symbol()?;
    let accept = Production {
      lhs: NonterminalId::from_index(grammar.nonterminal_count()),
      rhs: vec![Shift::new(Symbol::Nonterminal(start))],
      action: Action::call("*", vec![]),
    };

    Ok(Self {
      grammar,
      accept,
      start,
    })
  }

  pub fn accept_production(&self) -> ProductionId {
    ProductionId::from_index(self.grammar.production_count())
  }

  pub fn is_accept(&self, id: ProductionId) -> bool {
    id == self.accept_production()
  }

  /// Productions of the grammar followed by the accepting one.
  pub fn production_count(&self) -> usize {
    self.grammar.production_count() + 1
  }

  pub fn production(&self, id: ProductionId) -> &Production {
    if self.is_accept(id) {
      &self.accept
    } else {
      self.grammar.production(id)
    }
  }

  pub fn num_terminals(&self) -> usize {
    self.grammar.terminal_count()
  }

  pub fn num_nonterminals(&self) -> usize {
    self.grammar.nonterminal_count()
  }

  /// Terminals plus end-of-input.
  pub fn num_lookaheads(&self) -> usize {
    self.num_terminals() + 1
  }

  pub fn eof(&self) -> usize {
    self.num_terminals()
  }

  fn lhs_name(&self, nt: NonterminalId) -> String {
    if nt.index() == self.grammar.nonterminal_count() {
      format!("{}'", self.grammar.nonterminal_info(self.start).name)
    } else {
      self.grammar.nonterminal_info(nt).name.clone()
    }
  }

  /// `LHS : (a b * c)`
  pub fn item_to_string(&self, id: ProductionId, dot: usize) -> String {
    if self.is_accept(id) {
      let start = self.grammar.nonterminal_info(self.start).name.as_str();
      let rhs = if dot == 0 { ["*", start] } else { [start, "*"] };
      format!("{} : ({})", self.lhs_name(self.accept.lhs), rhs.join(" "))
    } else {
      self.grammar.item_to_string(id, dot)
    }
  }

  pub fn production_to_string(&self, id: ProductionId) -> String {
    if self.is_accept(id) {
      format!("{}:({}):*()",
        self.lhs_name(self.accept.lhs),
        self.grammar.nonterminal_info(self.start).name)
    } else {
      self.grammar.production_to_string(id)
    }
  }

  /// Column of `symbol` in the dense tables, which is also its code in the
  /// item automaton.
  pub fn column(&self, symbol: Symbol) -> usize {
    crate::column(self.num_terminals(), symbol)
  }

  pub fn column_name(&self, column: usize) -> String {
    let t = self.num_terminals();
    if column < t {
      self.grammar.terminal_info(grammar::TerminalId::from_index(column)).name.clone()
    } else if column == t {
      crate::EOF_NAME.to_owned()
    } else {
      self.grammar.nonterminal_info(NonterminalId::from_index(column - t - 1)).name.clone()
    }
  }
}
