use thiserror::Error;
use crate::regex::{RegexCompiler, RegexError};

pub use tables::LexTables;
pub use tokens::{Tokens, Token, Error as ScanError};

mod build;
mod tables;
pub mod tokens;

/// Name of the start condition every pattern belongs to unless it names
/// others.
pub const INITIAL: &str = "INITIAL";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
  pub regex: String,
  /// Function invoked on a match. Anonymous patterns have none; their regex
  /// text names the terminal they produce.
  pub rule: Option<String>,
  pub conditions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexerError {
  #[error("Failed to parse regular expression '{pattern}': {error}")]
  Pattern {
    pattern: String,
    #[source]
    error: RegexError,
  },
  #[error("no patterns defined")]
  NoPatterns,
}

#[derive(Debug, Clone)]
pub struct Lexer {
  pub tables: LexTables,
  pub patterns: Vec<Pattern>,
}

impl Pattern {
  pub fn new(regex: &str, rule: Option<&str>) -> Self {
    Self {
      regex: regex.to_owned(),
      rule: rule.map(|rule| rule.to_owned()),
      conditions: vec![],
    }
  }

  pub fn with_conditions<I, S>(mut self, conditions: I) -> Self
    where I: IntoIterator<Item = S>,
          S: Into<String>,
  {
    self.conditions = conditions.into_iter().map(Into::into).collect();
    self
  }
}

impl Lexer {
  /// Compiles every pattern with `compiler` and merges them into one
  /// minimal DFA. Earlier patterns win when several match the same text.
  pub fn new(
    compiler: &mut RegexCompiler,
    patterns: &[Pattern],
  ) -> Result<Self, Vec<LexerError>> {
    let tables = build::build(compiler, patterns)?;
    Ok(Self {
      tables,
      patterns: patterns.to_vec(),
    })
  }

  /// Scans `input` starting in the INITIAL condition.
  pub fn lex<'lexer, 'input>(
    &'lexer self,
    input: &'input str
  ) -> Tokens<'lexer, 'input> {
    Tokens::new(&self.tables, input, 0)
  }

  /// Scans `input` in the named start condition.
  pub fn lex_in<'lexer, 'input>(
    &'lexer self,
    input: &'input str,
    condition: &str,
  ) -> Option<Tokens<'lexer, 'input>> {
    let condition = self.tables.condition(condition)?;
    Some(Tokens::new(&self.tables, input, condition))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use insta::assert_snapshot;
  use pretty_assertions::assert_eq;

  fn lexer(patterns: &[Pattern]) -> Lexer {
    Lexer::new(&mut RegexCompiler::new(), patterns).unwrap()
  }

  fn scan(lexer: &Lexer, tokens: Tokens) -> Vec<(String, String)> {
    tokens
      .map(|token| {
        let token = token.unwrap();
        let name = match &lexer.patterns[token.pattern].rule {
          Some(rule) => rule.clone(),
          None => lexer.patterns[token.pattern].regex.clone(),
        };
        (name, token.text.to_owned())
      })
      .filter(|(name, _)| name != "skip")
      .collect()
  }

  fn pairs(expected: &[(&str, &str)]) -> Vec<(String, String)> {
    expected.iter().map(|(a, b)| (a.to_string(), b.to_string())).collect()
  }

  #[test]
  fn earlier_pattern_wins() {
    let lexer = lexer(&[
      Pattern::new(r#""if""#, None),
      Pattern::new(r"[a-z]+", Some("ident")),
      Pattern::new(r"\s+", Some("skip")),
    ]);

    assert_eq!(scan(&lexer, lexer.lex("if iffy fi")), pairs(&[
      (r#""if""#, "if"),
      ("ident", "iffy"),
      ("ident", "fi"),
    ]));
  }

  #[test]
  fn later_pattern_is_shadowed() {
    let lexer = lexer(&[
      Pattern::new(r"[a-z]+", Some("ident")),
      Pattern::new(r#""if""#, None),
    ]);

    assert_eq!(scan(&lexer, lexer.lex("if")), pairs(&[("ident", "if")]));
  }

  #[test]
  fn longest_match() {
    let lexer = lexer(&[
      Pattern::new(r#""in""#, Some("in")),
      Pattern::new(r#""integer""#, Some("integer")),
      Pattern::new(r#""tege""#, Some("tege")),
    ]);

    let tokens = lexer.lex("integeintegerin").collect::<Vec<_>>();
    let kinds = tokens.iter()
      .map(|t| t.as_ref().map(|t| (t.pattern, t.start, t.end)).map_err(|e| e.start))
      .collect::<Vec<_>>();

    assert_eq!(kinds, vec![
      Ok((0, 0, 2)),
      Ok((2, 2, 6)),
      Ok((1, 6, 13)),
      Ok((0, 13, 15)),
    ]);
  }

  #[test]
  fn start_conditions_select_patterns() {
    let lexer = lexer(&[
      Pattern::new(r#"\""#, Some("open")),
      Pattern::new(r#"[^"]+"#, Some("text")).with_conditions(vec!["STRING"]),
      Pattern::new(r#"\""#, Some("close")).with_conditions(vec!["STRING"]),
      Pattern::new(r"[a-z]+", Some("ident")),
    ]);

    assert_eq!(lexer.tables.conditions, vec!["INITIAL".to_owned(), "STRING".to_owned()]);
    assert_eq!(scan(&lexer, lexer.lex(r#"abc""#)), pairs(&[
      ("ident", "abc"),
      ("open", "\""),
    ]));

    let tokens = lexer.lex_in(r#"a b"c"#, "STRING").unwrap();
    assert_eq!(scan(&lexer, tokens), pairs(&[
      ("text", "a b"),
      ("close", "\""),
      ("text", "c"),
    ]));

    assert!(lexer.lex_in("", "COMMENT").is_none());
  }

  #[test]
  fn pattern_in_several_conditions() {
    let lexer = lexer(&[
      Pattern::new(r"\d+", Some("int")).with_conditions(vec!["INITIAL", "A"]),
      Pattern::new(r"[a-z]+", Some("word")).with_conditions(vec!["A"]),
    ]);

    assert_eq!(scan(&lexer, lexer.lex("42")), pairs(&[("int", "42")]));
    assert!(lexer.lex("abc").next().unwrap().is_err());

    let tokens = lexer.lex_in("42abc", "A").unwrap();
    assert_eq!(scan(&lexer, tokens), pairs(&[("int", "42"), ("word", "abc")]));
  }

  #[test]
  fn errors_are_collected() {
    let errors = Lexer::new(&mut RegexCompiler::new(), &[
      Pattern::new("a*", Some("x")),
      Pattern::new("b", Some("y")),
      Pattern::new("(c", Some("z")),
    ]).unwrap_err();

    let messages = errors.iter().map(ToString::to_string).collect::<Vec<_>>();
    assert_snapshot!(messages.join("\n"), @r###"
    Failed to parse regular expression 'a*': regex may accept empty string at 0..2
    Failed to parse regular expression '(c': regex syntax error: expected ')', found end of pattern at 2..2
    "###);

    let errors = Lexer::new(&mut RegexCompiler::new(), &[]).unwrap_err();
    assert_eq!(errors, vec![LexerError::NoPatterns]);
  }
}
