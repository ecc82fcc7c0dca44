use insta::assert_snapshot;
use pretty_assertions::assert_eq;
use grammar::{Grammar, Action, Arg, Shift, Symbol};
use lr::{Mode, Options};

mod parse;

fn options() -> Options {
  Options {
    mode: Mode::Lalr,
    error_recovery: false,
    ..Options::default()
  }
}

#[test]
fn precedence_by_layering() {
  let _ = env_logger::builder().is_test(true).try_init();

  let g = parse::expr();
  let parser = lr::build(&g, &options()).unwrap();

  assert_snapshot!(parse::parse(&g, &parser, "num + num * num").join("\n"), @r###"
  shift num
  reduce F -> num
  reduce T -> F
  reduce E -> T
  shift +
  shift num
  reduce F -> num
  reduce T -> F
  shift *
  shift num
  reduce F -> num
  reduce T -> T * F
  reduce E -> E + T
  reduce S -> E
  accept
  "###);
}

#[test]
fn nested_parentheses() {
  let g = parse::expr();
  let parser = lr::build(&g, &options()).unwrap();

  let events = parse::parse(&g, &parser, "( ( num ) )");
  assert_eq!(events.last().map(String::as_str), Some("accept"));
  assert_eq!(events.iter().filter(|e| e.starts_with("reduce F -> ( E )")).count(), 2);
}

#[test]
fn syntax_error() {
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
fn ambiguous_sum() {
  let mut g = Grammar::new();
  g.add_terminal("+", None, None).unwrap();
  g.add_terminal("num", None, None).unwrap();
  g.rule("S", &["E"], Action::none()).unwrap();
  g.rule("E", &["E", "+", "E"], Action::none()).unwrap();
  g.rule("E", &["num"], Action::none()).unwrap();

  let errors = lr::build(&g, &options()).unwrap_err();
  let messages = errors.iter().map(ToString::to_string).collect::<Vec<_>>();
  assert_eq!(messages, vec![
    "Decision-conflict on symbol(s):\n\t+\nbetween:\n\tE : (E * + E)\n\tE : (E + E *)",
  ]);
}

#[test]
fn ambiguous_operators() {
  let mut g = Grammar::new();
  for t in &["+", "*", "(", ")", "num"] {
    g.add_terminal(t, None, None).unwrap();
  }
  g.rule("E", &["E", "+", "E"], Action::none()).unwrap();
  g.rule("E", &["E", "*", "E"], Action::none()).unwrap();
  g.rule("E", &["(", "E", ")"], Action::none()).unwrap();
  g.rule("E", &["num"], Action::none()).unwrap();

  let errors = lr::build(&g, &options()).unwrap_err();
  let report = lr::report(&errors);
  assert_eq!(report.matches("state ").count(), errors.len());

  // both operators conflict in the states after `E + E` and `E * E`
  let mut messages = errors.iter().map(ToString::to_string).collect::<Vec<_>>();
  messages.sort();
  messages.dedup();
  for message in &messages {
    assert!(report.contains(message.as_str()), "{}", message);
  }
  assert_snapshot!(messages.join("\n\n"), @r###"
  Decision-conflict on symbol(s):
  	*
  between:
  	E : (E * * E)
  	E : (E * E *)

  Decision-conflict on symbol(s):
  	*
  between:
  	E : (E * * E)
  	E : (E + E *)

  Decision-conflict on symbol(s):
  	+
  between:
  	E : (E * + E)
  	E : (E * E *)

  Decision-conflict on symbol(s):
  	+
  between:
  	E : (E * + E)
  	E : (E + E *)
  "###);
}

#[test]
fn split_by_pruning() {
  // not LALR(1): merging the states after `a c` and `b c` mixes the
  // lookaheads of A and B
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
  assert_eq!(parse::parse(&g, &parser, "b c e"), vec![
    "shift b",
    "shift c",
    "reduce A -> c",
    "shift e",
    "reduce S -> b A e",
    "accept",
  ]);
}

#[test]
fn inline_action() {
  let mut g = Grammar::new();
  let x = g.add_terminal("x", None, None).unwrap();
  let y = g.add_terminal("y", None, None).unwrap();
  let s = g.add_nonterminal("S", None).unwrap();
  g.add_production(s, vec![
    Shift::with_action(Symbol::Terminal(x), Action::call("mark", vec![Arg::Meta(1)])),
    Shift::new(Symbol::Terminal(y)),
  ], Action::none()).unwrap();

  let parser = lr::build(&g, &options()).unwrap();
  assert_eq!(parser.shifts.len(), 1);
  assert_eq!(parse::parse(&g, &parser, "x y"), vec![
    "shift x",
    "run mark",
    "shift y",
    "reduce S -> x y",
    "accept",
  ]);
}

#[test]
fn inline_action_competes_with_shift() {
  let mut g = Grammar::new();
  let x = g.add_terminal("x", None, None).unwrap();
  let y = g.add_terminal("y", None, None).unwrap();
  let z = g.add_terminal("z", None, None).unwrap();
  let s = g.add_nonterminal("S", None).unwrap();
  g.add_production(s, vec![
    Shift::with_action(Symbol::Terminal(x), Action::call("mark", vec![])),
    Shift::new(Symbol::Terminal(y)),
  ], Action::none()).unwrap();
  g.add_production(s, vec![
    Shift::new(Symbol::Terminal(x)),
    Shift::new(Symbol::Terminal(y)),
    Shift::new(Symbol::Terminal(z)),
  ], Action::none()).unwrap();

  let errors = lr::build(&g, &options()).unwrap_err();
  assert_eq!(errors.len(), 1);
  assert_eq!(errors[0].to_string(),
    "Decision-conflict on symbol(s):\n\tx\nbetween:\n\tS : (* x y z)\n\tS : (* x y)");
}
