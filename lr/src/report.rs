use std::fmt::{self, Display, Write};
use crate::{ConflictError, Error};

impl Display for ConflictError {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    write!(f, "Decision-conflict on symbol(s):\n\t{}\nbetween:", self.symbols.join(", "))?;
    for item in &self.items {
      write!(f, "\n\t{}", item)?;
    }
    Ok(())
  }
}

/// All errors of a failed build, one paragraph each. Conflicts also name the
/// parser state they were found in.
pub fn report(errors: &[Error]) -> String {
  let mut buf = String::new();

  for (i, err) in errors.iter().enumerate() {
    if i != 0 {
      buf.push('\n');
    }
    if let Error::Conflict(conflict) = err {
      writeln!(&mut buf, "state {}:", conflict.state).unwrap();
    }
    writeln!(&mut buf, "{}", err).unwrap();
  }

  buf
}
