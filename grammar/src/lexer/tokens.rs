use super::LexTables;

/// Longest-match scanner over [`LexTables`].
pub struct Tokens<'lexer, 'input> {
  tables: &'lexer LexTables,
  input: &'input str,
  condition: usize,
  pos: usize,
}

#[derive(Debug, PartialEq, Eq)]
pub struct Token<'input> {
  pub pattern: usize,
  pub text: &'input str,
  pub start: usize,
  pub end: usize,
}

#[derive(Debug, PartialEq, Eq)]
pub struct Error {
  pub char: char,
  pub start: usize,
  pub end: usize,
}

impl<'lexer, 'input> Tokens<'lexer, 'input> {
  pub fn new(tables: &'lexer LexTables, input: &'input str, condition: usize) -> Self {
    Self {
      tables,
      input,
      condition,
      pos: 0,
    }
  }

  pub fn set_condition(&mut self, condition: usize) {
    self.condition = condition;
  }

  fn error(&mut self) -> Error {
    let start = self.pos;
    let mut chars = self.input[start..].chars();
    let char = chars.next().unwrap_or('\0');
    self.pos = self.input.len() - chars.as_str().len();
    Error {
      char,
      start,
      end: self.pos,
    }
  }
}

impl<'lexer, 'input> Iterator for Tokens<'lexer, 'input> {
  type Item = Result<Token<'input>, Error>;

  fn next(&mut self) -> Option<Self::Item> {
    if self.pos == self.input.len() {
      return None;
    }

    let mut state = match self.tables.entry(self.condition) {
      Some(state) => state,
      None => return Some(Err(self.error())),
    };
    let start = self.pos;
    let mut accepted: Option<(usize, usize)> = None;

    for (offset, c) in self.input[start..].char_indices() {
      match self.tables.next(state, c) {
        Some(next) => state = next,
        None => break,
      }

      if let Some(pattern) = self.tables.mark(state) {
        accepted = Some((pattern, start + offset + c.len_utf8()));
      }
    }

    match accepted {
      Some((pattern, end)) => {
        self.pos = end;
        Some(Ok(Token {
          pattern,
          text: &self.input[start..end],
          start,
          end,
        }))
      }
      None => Some(Err(self.error())),
    }
  }
}
