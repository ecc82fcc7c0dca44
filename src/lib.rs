//! Parser generator core.
//!
//! [`Compiler`] collects what a grammar file declares (terminals,
//! nonterminals, named regular expressions, lexical patterns and
//! productions) and compiles it into a lexical DFA and LR parse tables.

use thiserror::Error;
use grammar::{
  Grammar, GrammarError, RegexCompiler, RegexError, Lexer, LexTables, Pattern, Set,
  TerminalId, NonterminalId, ProductionId, Shift,
};

pub use grammar::{Action, Arg};
pub use lr::{Mode, Options, Parser};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
  #[error(transparent)]
  Grammar(#[from] GrammarError),
  #[error(transparent)]
  Regex(#[from] RegexError),
}

#[derive(Default)]
pub struct Compiler {
  regex: RegexCompiler,
  grammar: Grammar,
  patterns: Vec<Pattern>,
  /// Terminal produced by each anonymous pattern.
  tokens: Vec<Option<TerminalId>>,
  anonymous: Set<String>,
}

#[derive(Debug, Clone)]
pub struct Output {
  pub lexer: LexTables,
  /// Function run when a pattern matches, per pattern.
  pub rules: Vec<Option<String>>,
  /// Terminal an anonymous pattern stands for, per pattern.
  pub tokens: Vec<Option<TerminalId>>,
  pub parser: Parser,
  pub terminals: Vec<String>,
  pub nonterminals: Vec<String>,
  /// Default value of each terminal, used for terminals inserted by error
  /// recovery.
  pub instances: Vec<Option<String>>,
}

impl Compiler {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn grammar(&self) -> &Grammar {
    &self.grammar
  }

  pub fn define_terminal(
    &mut self,
    name: &str,
    ty: Option<&str>,
    instance: Option<&str>,
  ) -> Result<TerminalId, Error> {
    Ok(self.grammar.add_terminal(name, ty, instance)?)
  }

  pub fn define_nonterminal(&mut self, name: &str, ty: Option<&str>) -> Result<NonterminalId, Error> {
    Ok(self.grammar.add_nonterminal(name, ty)?)
  }

  /// Names a regular expression for use as `{name}` in later patterns.
  pub fn define_regex(&mut self, name: &str, pattern: &str) -> Result<(), Error> {
    Ok(self.regex.define(name, pattern)?)
  }

  /// A pattern whose matches are handed to `rule`. An empty `conditions`
  /// list means the INITIAL start condition.
  pub fn add_pattern(&mut self, conditions: &[&str], regex: &str, rule: Option<&str>) {
    self.patterns.push(Pattern::new(regex, rule).with_conditions(conditions.iter().copied()));
    self.tokens.push(None);
  }

  /// A pattern that produces a terminal of the same name as its regex
  /// text, so productions can spell the terminal as the pattern itself.
  pub fn add_anon_pattern(
    &mut self,
    conditions: &[&str],
    regex: &str,
    instance: Option<&str>,
  ) -> Result<TerminalId, Error> {
    if !self.anonymous.insert(regex.to_owned()) {
      return Err(GrammarError::DuplicatePattern(regex.to_owned()).into());
    }

    let terminal = self.grammar.add_terminal(regex, None, instance)?;
    self.patterns.push(Pattern::new(regex, None).with_conditions(conditions.iter().copied()));
    self.tokens.push(Some(terminal));
    Ok(terminal)
  }

  /// `lhs -> rhs` where every right-hand side symbol comes with its inline
  /// action. The left-hand side is declared on first use; right-hand side
  /// symbols must already be known.
  pub fn add_production(
    &mut self,
    lhs: &str,
    rhs: &[(&str, Action)],
    action: Action,
  ) -> Result<ProductionId, Error> {
    let lhs = self.grammar.nonterminal(lhs)?;
    let rhs = rhs.iter()
      .map(|(name, action)| {
        let symbol = self.grammar.find_symbol(name)
          .ok_or_else(|| GrammarError::UnknownSymbol((*name).to_owned()))?;
        Ok(Shift::with_action(symbol, action.clone()))
      })
      .collect::<Result<Vec<_>, GrammarError>>()?;
    Ok(self.grammar.add_production(lhs, rhs, action)?)
  }

  /// Runs every stage in order. A stage that reports errors stops the
  /// pipeline; at most `options.max_errors` messages are returned.
  pub fn compile(&mut self, options: &Options) -> Result<Output, Vec<String>> {
    let cap = |errors: Vec<String>| -> Vec<String> {
      errors.into_iter().take(options.max_errors).collect()
    };

    let lexer = Lexer::new(&mut self.regex, &self.patterns)
      .map_err(|errors| cap(errors.iter().map(ToString::to_string).collect()))?;
    log::debug!("lexer: {} patterns, {} states, {} classes",
      self.patterns.len(),
      lexer.tables.state_count(),
      lexer.tables.classes.len());

    let parser = lr::build(&self.grammar, options)
      .map_err(|errors| {
        log::debug!("parser construction failed:\n{}", lr::report(&errors));
        cap(errors.iter().map(ToString::to_string).collect())
      })?;
    log::debug!("parser: {} states, {} reductions, {} shift actions",
      parser.state_count(),
      parser.reduces.len(),
      parser.shifts.len());

    Ok(Output {
      lexer: lexer.tables,
      rules: self.patterns.iter().map(|pattern| pattern.rule.clone()).collect(),
      tokens: self.tokens.clone(),
      parser,
      terminals: self.grammar.terminals()
        .map(|t| self.grammar.terminal_info(t).name.clone())
        .collect(),
      nonterminals: self.grammar.nonterminals()
        .map(|nt| self.grammar.nonterminal_info(nt).name.clone())
        .collect(),
      instances: self.grammar.terminals()
        .map(|t| self.grammar.terminal_info(t).instance.clone())
        .collect(),
    })
  }
}
