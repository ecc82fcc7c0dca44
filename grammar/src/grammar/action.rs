use std::fmt::{self, Display};

/// Argument passed to a semantic action.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Arg {
  Literal(String),
  /// 1-based reference to the value of a right-hand side symbol.
  Value(usize),
  /// 1-based reference to the metadata (position, text) of a right-hand
  /// side symbol. Meta references never need a typed value.
  Meta(usize),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Action {
  pub function: Option<String>,
  pub args: Vec<Arg>,
  /// 1-based index of the right-hand side symbol whose value becomes the
  /// value of the production.
  pub pivot: Option<usize>,
}

impl Arg {
  pub fn reference(&self) -> Option<usize> {
    match *self {
      Arg::Value(n) | Arg::Meta(n) => Some(n),
      Arg::Literal(_) => None,
    }
  }
}

impl Action {
  pub fn none() -> Self {
    Self::default()
  }

  pub fn call(function: &str, args: Vec<Arg>) -> Self {
    Self {
      function: Some(function.to_owned()),
      args,
      pivot: None,
    }
  }

  pub fn pivot(pivot: usize) -> Self {
    Self {
      function: None,
      args: vec![],
      pivot: Some(pivot),
    }
  }

  pub fn with_pivot(mut self, pivot: usize) -> Self {
    self.pivot = Some(pivot);
    self
  }

  pub fn is_present(&self) -> bool {
    self.function.is_some() || self.pivot.is_some() || !self.args.is_empty()
  }

  /// Every symbol reference made by the action, pivot included.
  pub fn references(&self) -> impl Iterator<Item = usize> + '_ {
    self.args.iter()
      .filter_map(Arg::reference)
      .chain(self.pivot)
  }
}

impl Display for Action {
  /// `:pivot function(args)`, or nothing when absent.
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    if !self.is_present() {
      return Ok(());
    }

    write!(f, ":")?;
    if let Some(pivot) = self.pivot {
      write!(f, "{} ", pivot)?;
    }
    if let Some(function) = &self.function {
      write!(f, "{}", function)?;
    }

    write!(f, "(")?;
    for (i, arg) in self.args.iter().enumerate() {
      if i != 0 {
        write!(f, ", ")?;
      }
      match arg {
        Arg::Literal(text) => write!(f, "{}", text)?,
        Arg::Value(n) => write!(f, "{}", n)?,
        Arg::Meta(n) => write!(f, "@{}", n)?,
      }
    }
    write!(f, ")")
  }
}
