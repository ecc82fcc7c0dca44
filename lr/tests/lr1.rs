use pretty_assertions::assert_eq;
use grammar::{Grammar, Action};
use lr::{Mode, Options};

mod parse;

fn options() -> Options {
  Options {
    mode: Mode::Lr1,
    error_recovery: false,
    ..Options::default()
  }
}

#[test]
fn same_language_as_lalr() {
  let g = parse::expr();
  let lr1 = lr::build(&g, &options()).unwrap();
  let lalr = lr::build(&g, &Options { mode: Mode::Lalr, ..options() }).unwrap();

  assert!(lr1.state_count() > lalr.state_count());

  let inputs = [
    "num", "num * ( num + num )", "( num ) + num * num", "num +", ") num", "num + * num",
  ];
  for input in &inputs {
    assert_eq!(
      parse::parse(&g, &lr1, input),
      parse::parse(&g, &lalr, input),
      "{}", input);
  }
}

#[test]
fn rejects_missing_operand() {
  let g = parse::expr();
  let parser = lr::build(&g, &options()).unwrap();

  assert_eq!(parse::parse(&g, &parser, "num + * num"), vec![
    "shift num",
    "reduce F -> num",
    "reduce T -> F",
    "reduce E -> T",
    "shift +",
    "error token * at 2",
  ]);
}

#[test]
fn canonical_lookaheads() {
  let mut g = Grammar::new();
  for t in &["a", "b", "c", "d", "e"] {
    g.add_terminal(t, None, None).unwrap();
  }
  g.rule("S", &["a", "A", "d"], Action::none()).unwrap();
  g.rule("S", &["b", "B", "d"], Action::none()).unwrap();
  g.rule("S", &["a", "B", "e"], Action::none()).unwrap();
  g.rule("S", &["b", "A", "e"], Action::none()).unwrap();
  g.rule("A", &["c"], Action::none()).unwrap();
  g.rule("B", &["c"], Action::none()).unwrap();

  let parser = lr::build(&g, &options()).unwrap();
  assert_eq!(parse::parse(&g, &parser, "a c e"), vec![
    "shift a",
    "shift c",
    "reduce B -> c",
    "shift e",
    "reduce S -> a B e",
    "accept",
  ]);
  assert_eq!(parse::parse(&g, &parser, "a c c"), vec![
    "shift a",
    "shift c",
    "error token c at 2",
  ]);
}

#[test]
fn ambiguity_is_still_reported() {
  let mut g = Grammar::new();
  g.add_terminal("if", None, None).unwrap();
  g.add_terminal("else", None, None).unwrap();
  g.add_terminal("x", None, None).unwrap();
  g.rule("P", &["St"], Action::none()).unwrap();
  g.rule("St", &["if", "St"], Action::none()).unwrap();
  g.rule("St", &["if", "St", "else", "St"], Action::none()).unwrap();
  g.rule("St", &["x"], Action::none()).unwrap();

  let errors = lr::build(&g, &options()).unwrap_err();
  assert!(!errors.is_empty());
  assert_eq!(errors[0].to_string(),
    "Decision-conflict on symbol(s):\n\telse\nbetween:\n\tSt : (if St * else St)\n\tSt : (if St *)");
}
