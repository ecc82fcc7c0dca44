use grammar::{Arg, Production, ProductionId, Symbol};
use crate::augment::Augmented;
use crate::{Error, Parser};

/// Type checks the semantic actions the tables will run.
///
/// Value references must name a symbol that carries a value, a pivot must be
/// in range and have the type of the left-hand side. Arguments without a
/// function or pivot on a void left-hand side only draw a warning. Meta
/// references are always allowed. The accepting production is not checked.
pub fn validate(augmented: &Augmented, parser: &Parser) -> Vec<Error> {
  let grammar = augmented.grammar;
  let mut errors = vec![];

  let mut reduces = parser.reduces.iter()
    .filter(|reduce| !reduce.accept)
    .collect::<Vec<_>>();
  reduces.sort_by_key(|reduce| reduce.production);

  for reduce in reduces {
    let prod = grammar.production(reduce.production);
    let name = || grammar.production_to_string(reduce.production);

    value_references(augmented, prod, reduce.production, &reduce.args, &mut errors);

    let lhs_ty = normalize(grammar.nonterminal_info(prod.lhs).ty.as_deref());

    match reduce.pivot {
      Some(pivot) if pivot == 0 || pivot > prod.rhs.len() => {
        errors.push(Error::PivotOutOfRange(name()));
      }
      Some(pivot) => {
        let ty = normalize(grammar.symbol_info(prod.rhs[pivot - 1].symbol).ty.as_deref());
        if ty != lhs_ty {
          errors.push(Error::PivotTypeMismatch(name()));
        }
      }
      None => {
        if reduce.function.is_none() && !reduce.args.is_empty() && lhs_ty.is_none() {
          log::warn!(
            "arguments without a function or pivot construct nothing in the production {}",
            name());
        }
      }
    }
  }

  let mut shifts = parser.shifts.iter().collect::<Vec<_>>();
  shifts.sort_by_key(|shift| (shift.production, shift.position));

  for shift in shifts {
    let prod = grammar.production(shift.production);
    value_references(augmented, prod, shift.production, &shift.args, &mut errors);
  }

  errors
}

fn value_references(
  augmented: &Augmented,
  prod: &Production,
  id: ProductionId,
  args: &[Arg],
  errors: &mut Vec<Error>,
) {
  for arg in args {
    if let Arg::Value(position) = *arg {
      let symbol = match prod.rhs.get(position.wrapping_sub(1)) {
        Some(shift) => shift.symbol,
        None => continue,
      };
      if is_void(augmented, symbol) {
        errors.push(Error::VoidReference {
          production: augmented.grammar.production_to_string(id),
          position,
        });
      }
    }
  }
}

fn is_void(augmented: &Augmented, symbol: Symbol) -> bool {
  augmented.grammar.symbol_info(symbol).is_void()
}

/// `None` for every spelling of void.
fn normalize(ty: Option<&str>) -> Option<&str> {
  if grammar::is_void(ty) {
    None
  } else {
    ty
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use grammar::{Grammar, Action};
  use crate::{build, Options};
  use pretty_assertions::assert_eq;

  fn errors(g: &Grammar) -> Vec<String> {
    match build(g, &Options::default()) {
      Ok(_) => vec![],
      Err(errors) => errors.iter().map(ToString::to_string).collect(),
    }
  }

  fn base() -> Grammar {
    let mut g = Grammar::new();
    g.add_terminal("+", None, None).unwrap();
    g.add_terminal("num", Some("int"), Some("0")).unwrap();
    g.add_nonterminal("S", Some("int")).unwrap();
    g.add_nonterminal("E", Some("int")).unwrap();
    g
  }

  #[test]
  fn well_typed() {
    let mut g = base();
    g.rule("S", &["E"], Action::pivot(1)).unwrap();
    g.rule("E", &["E", "+", "num"], Action::call("add", vec![Arg::Value(1), Arg::Value(3)])).unwrap();
    g.rule("E", &["num"], Action::pivot(1)).unwrap();
    assert_eq!(errors(&g), Vec::<String>::new());
  }

  #[test]
  fn void_value_reference() {
    let mut g = base();
    g.rule("S", &["E"], Action::pivot(1)).unwrap();
    g.rule("E", &["E", "+", "num"], Action::call("add", vec![Arg::Value(2), Arg::Meta(2)])).unwrap();
    g.rule("E", &["num"], Action::pivot(1)).unwrap();
    assert_eq!(errors(&g), vec![
      "The type of the right hand side symbol at position 2 in the production E:(E + num):add(2, @2) is void.",
    ]);
  }

  #[test]
  fn pivot_type_mismatch() {
    let mut g = base();
    g.rule("S", &["E"], Action::pivot(1)).unwrap();
    g.rule("E", &["E", "+", "num"], Action::pivot(2)).unwrap();
    g.rule("E", &["num"], Action::pivot(1)).unwrap();
    assert_eq!(errors(&g), vec![
      "Type of pivot does not match the type of the production: E:(E + num):2 ()",
    ]);
  }

  #[test]
  fn arguments_without_constructor() {
    let _ = env_logger::builder().is_test(true).try_init();

    let mut g = base();
    g.add_nonterminal("L", None).unwrap();
    g.rule("S", &["L"], Action::call("make", vec![])).unwrap();
    g.rule("L", &["num"], Action {
      function: None,
      args: vec![Arg::Value(1)],
      pivot: None,
    }).unwrap();
    assert_eq!(errors(&g), Vec::<String>::new());

    let parser = build(&g, &Options::default()).unwrap();
    let reduce = parser.reduces.iter().find(|r| r.function.is_none() && r.pivot.is_none()).unwrap();
    assert_eq!(reduce.args, vec![Arg::Value(1)]);
  }
}
