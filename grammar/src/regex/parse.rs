//! Recursive descent over the pattern syntax.
//!
//! ```text
//! alt    := concat ('|' concat)*
//! concat := repeat*
//! repeat := atom ('*' | '+' | '?' | '{' m '}' | '{' m ',' '}' | '{' m ',' n '}')*
//! atom   := '(' alt ')' | '.' | '{' name '}' | '"' chars '"' | '[' '^'? items ']'
//!         | '\' escape | char
//! ```

use super::{RegexCompiler, RegexError, RegexErrorKind, Fragment, SetItem, ClassKind};

pub(super) fn parse(compiler: &mut RegexCompiler, pattern: &str) -> Result<Fragment> {
  let mut parser = Parser {
    compiler,
    input: pattern.char_indices().collect(),
    end: pattern.len(),
    pos: 0,
  };

  let fragment = parser.alt()?;
  match parser.peek() {
    None => Ok(fragment),
    Some(c) => Err(parser.error_here(RegexErrorKind::Syntax(format!("unexpected '{}'", c)))),
  }
}

type Result<T> = std::result::Result<T, RegexError>;

struct Parser<'a> {
  compiler: &'a mut RegexCompiler,
  input: Vec<(usize, char)>,
  end: usize,
  pos: usize,
}

/// An element of a bracketed set before range resolution.
enum SetAtom {
  Char(u32),
  Class(ClassKind),
}

impl<'a> Parser<'a> {
  fn peek(&self) -> Option<char> {
    self.input.get(self.pos).map(|&(_, c)| c)
  }

  fn peek_at(&self, n: usize) -> Option<char> {
    self.input.get(self.pos + n).map(|&(_, c)| c)
  }

  fn offset(&self) -> usize {
    self.input.get(self.pos).map_or(self.end, |&(ix, _)| ix)
  }

  fn bump(&mut self) -> Option<char> {
    let c = self.peek()?;
    self.pos += 1;
    Some(c)
  }

  fn eat(&mut self, c: char) -> bool {
    if self.peek() == Some(c) {
      self.pos += 1;
      true
    } else {
      false
    }
  }

  fn expect(&mut self, c: char) -> Result<()> {
    if self.eat(c) {
      Ok(())
    } else {
      let found = match self.peek() {
        Some(found) => format!("'{}'", found),
        None => "end of pattern".to_owned(),
      };
      Err(self.error_here(RegexErrorKind::Syntax(format!("expected '{}', found {}", c, found))))
    }
  }

  fn error_here(&self, kind: RegexErrorKind) -> RegexError {
    let start = self.offset();
    let end = self.input.get(self.pos + 1).map_or(self.end, |&(ix, _)| ix);
    RegexError { kind, span: (start, end) }
  }

  fn error_from(&self, start: usize, kind: RegexErrorKind) -> RegexError {
    RegexError { kind, span: (start, self.offset()) }
  }

  fn alt(&mut self) -> Result<Fragment> {
    let mut fragment = self.concat()?;
    while self.eat('|') {
      let rhs = self.concat()?;
      fragment = self.compiler.union(fragment, rhs);
    }
    Ok(fragment)
  }

  fn concat(&mut self) -> Result<Fragment> {
    let mut fragment: Option<Fragment> = None;

    while let Some(c) = self.peek() {
      if c == '|' || c == ')' {
        break;
      }
      let next = self.repeat()?;
      fragment = Some(match fragment {
        Some(acc) => self.compiler.concat(acc, next),
        None => next,
      });
    }

    Ok(match fragment {
      Some(fragment) => fragment,
      None => self.compiler.empty(),
    })
  }

  fn repeat(&mut self) -> Result<Fragment> {
    let mut fragment = self.atom()?;

    loop {
      let start = self.offset();
      match self.peek() {
        Some('*') => {
          self.bump();
          fragment = self.compiler.closure(fragment);
        }
        Some('+') => {
          self.bump();
          fragment = self.compiler.plus(fragment);
        }
        Some('?') => {
          self.bump();
          fragment = self.compiler.optional(fragment);
        }
        Some('{') if self.peek_at(1).map_or(false, |c| c.is_ascii_digit()) => {
          self.bump();
          let min = self.number()?;
          let max = if self.eat(',') {
            if self.peek().map_or(false, |c| c.is_ascii_digit()) {
              Some(self.number()?)
            } else {
              None
            }
          } else {
            Some(min)
          };
          self.expect('}')?;

          fragment = self.compiler.quantified(fragment, min, max)
            .map_err(|kind| self.error_from(start, kind))?;
        }
        _ => return Ok(fragment),
      }
    }
  }

  fn number(&mut self) -> Result<u32> {
    let start = self.offset();
    let mut value: u32 = 0;

    while let Some(digit) = self.peek().and_then(|c| c.to_digit(10)) {
      self.bump();
      value = value.checked_mul(10)
        .and_then(|v| v.checked_add(digit))
        .ok_or_else(|| self.error_from(start,
          RegexErrorKind::Syntax("repetition count is too large".to_owned())))?;
    }

    Ok(value)
  }

  fn atom(&mut self) -> Result<Fragment> {
    let start = self.offset();

    let c = match self.bump() {
      Some(c) => c,
      None => return Err(self.error_here(RegexErrorKind::Syntax("unexpected end of pattern".to_owned()))),
    };

    match c {
      '(' => {
        let fragment = self.alt()?;
        self.expect(')')?;
        Ok(fragment)
      }
      '.' => Ok(self.compiler.any()),
      '{' => {
        let mut name = String::new();
        while let Some(c) = self.peek() {
          if c == '}' {
            break;
          }
          name.push(c);
          self.bump();
        }
        self.expect('}')?;

        if name.is_empty() {
          return Err(self.error_from(start, RegexErrorKind::Syntax("empty reference".to_owned())));
        }

        self.compiler.reference(&name)
          .map_err(|kind| self.error_from(start, kind))
      }
      '"' => {
        let mut text = String::new();
        loop {
          match self.bump() {
            Some('"') => break,
            Some('\\') => {
              let c = self.escaped_char(start)?;
              text.push(c);
            }
            Some(c) => text.push(c),
            None => {
              return Err(self.error_from(start,
                RegexErrorKind::Syntax("unterminated string".to_owned())));
            }
          }
        }
        Ok(self.compiler.string(&text))
      }
      '[' => self.set(start),
      '\\' => {
        if let Some(kind) = self.peek().and_then(ClassKind::from_escape) {
          self.bump();
          return Ok(self.compiler.class(kind));
        }
        let c = self.escaped_char(start)?;
        Ok(self.compiler.char(c))
      }
      '|' | ')' | '*' | '+' | '?' | '}' | ']' => {
        Err(self.error_from(start, RegexErrorKind::Syntax(format!("unexpected '{}'", c))))
      }
      c => Ok(self.compiler.char(c)),
    }
  }

  fn set(&mut self, start: usize) -> Result<Fragment> {
    let negated = self.eat('^');
    let mut items = vec![];

    loop {
      let from = match self.peek() {
        Some(']') => {
          self.bump();
          break;
        }
        Some(_) => self.set_atom(start)?,
        None => {
          return Err(self.error_from(start,
            RegexErrorKind::Syntax("unterminated character set".to_owned())));
        }
      };

      let ranged = self.peek() == Some('-')
        && self.peek_at(1).map_or(false, |c| c != ']');

      match from {
        SetAtom::Char(from) if ranged => {
          self.bump();
          match self.set_atom(start)? {
            SetAtom::Char(to) => items.push(SetItem::Range(from, to)),
            SetAtom::Class(_) => {
              return Err(self.error_from(start,
                RegexErrorKind::Syntax("character class used as range bound".to_owned())));
            }
          }
        }
        SetAtom::Char(c) => items.push(SetItem::Range(c, c)),
        SetAtom::Class(kind) => items.push(SetItem::Class(kind)),
      }
    }

    let fragment = self.compiler.set(&items)
      .map_err(|kind| self.error_from(start, kind))?;

    if negated {
      Ok(self.compiler.negated(fragment))
    } else {
      Ok(fragment)
    }
  }

  fn set_atom(&mut self, start: usize) -> Result<SetAtom> {
    match self.bump() {
      Some('\\') => {
        if let Some(kind) = self.peek().and_then(ClassKind::from_escape) {
          self.bump();
          return Ok(SetAtom::Class(kind));
        }
        Ok(SetAtom::Char(self.escaped_char(start)? as u32))
      }
      Some(c) => Ok(SetAtom::Char(c as u32)),
      None => Err(self.error_from(start,
        RegexErrorKind::Syntax("unterminated character set".to_owned()))),
    }
  }

  /// The character after a backslash, which has already been consumed.
  fn escaped_char(&mut self, start: usize) -> Result<char> {
    let c = match self.bump() {
      Some(c) => c,
      None => {
        return Err(self.error_from(start,
          RegexErrorKind::Syntax("dangling backslash".to_owned())));
      }
    };

    let code = match c {
      'n' => '\n' as u32,
      't' => '\t' as u32,
      'r' => '\r' as u32,
      'f' => 0x0c,
      'v' => 0x0b,
      '0' => 0,
      'x' => {
        let mut code = 0;
        for _ in 0..2 {
          let digit = self.bump().and_then(|c| c.to_digit(16))
            .ok_or_else(|| self.error_from(start,
              RegexErrorKind::Syntax("expected two hex digits after \\x".to_owned())))?;
          code = code * 16 + digit;
        }
        code
      }
      'u' => {
        self.expect('{')?;
        let mut code: u32 = 0;
        let mut digits = 0;
        while let Some(digit) = self.peek().and_then(|c| c.to_digit(16)) {
          self.bump();
          digits += 1;
          if digits > 6 {
            return Err(self.error_from(start, RegexErrorKind::InvalidCodePoint));
          }
          code = code * 16 + digit;
        }
        self.expect('}')?;
        if digits == 0 {
          return Err(self.error_from(start,
            RegexErrorKind::Syntax("expected hex digits in \\u{...}".to_owned())));
        }
        code
      }
      c => c as u32,
    };

    std::char::from_u32(code)
      .ok_or_else(|| self.error_from(start, RegexErrorKind::InvalidCodePoint))
  }
}
