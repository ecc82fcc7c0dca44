use grammar::{Grammar, Action};
use lr::{Mode, Options};

/// Statements, expressions with five precedence levels and calls.
fn language() -> Grammar {
  let mut g = Grammar::new();
  for t in &[
    "id", "num", "str", "(", ")", "{", "}", ",", ";", "=", "==", "<", "+", "-", "*", "/",
    "!", "if", "else", "while", "return", "let",
  ] {
    g.add_terminal(t, None, None).unwrap();
  }

  let rules: &[(&str, &[&str])] = &[
    ("Program", &["Stmts"]),
    ("Stmts", &[]),
    ("Stmts", &["Stmts", "Stmt"]),
    ("Stmt", &["let", "id", "=", "Expr", ";"]),
    ("Stmt", &["Expr", ";"]),
    ("Stmt", &["return", "Expr", ";"]),
    ("Stmt", &["{", "Stmts", "}"]),
    ("Stmt", &["if", "(", "Expr", ")", "Block", "Else"]),
    ("Stmt", &["while", "(", "Expr", ")", "Block"]),
    ("Block", &["{", "Stmts", "}"]),
    ("Else", &[]),
    ("Else", &["else", "Block"]),
    ("Expr", &["Cmp"]),
    ("Expr", &["id", "=", "Expr"]),
    ("Cmp", &["Sum"]),
    ("Cmp", &["Sum", "==", "Sum"]),
    ("Cmp", &["Sum", "<", "Sum"]),
    ("Sum", &["Sum", "+", "Product"]),
    ("Sum", &["Sum", "-", "Product"]),
    ("Sum", &["Product"]),
    ("Product", &["Product", "*", "Unary"]),
    ("Product", &["Product", "/", "Unary"]),
    ("Product", &["Unary"]),
    ("Unary", &["-", "Unary"]),
    ("Unary", &["!", "Unary"]),
    ("Unary", &["Call"]),
    ("Call", &["Atom"]),
    ("Call", &["Call", "(", "Args", ")"]),
    ("Args", &[]),
    ("Args", &["ArgList"]),
    ("ArgList", &["Expr"]),
    ("ArgList", &["ArgList", ",", "Expr"]),
    ("Atom", &["id"]),
    ("Atom", &["num"]),
    ("Atom", &["str"]),
    ("Atom", &["(", "Expr", ")"]),
  ];
  for (lhs, rhs) in rules {
    g.rule(lhs, rhs, Action::none()).unwrap();
  }
  g
}

use criterion::{criterion_group, criterion_main, Criterion};

fn build_benchmark(c: &mut Criterion) {
  let g = language();
  c.bench_function("lalr", |b| b.iter(|| lr::build(&g, &Options::default()).unwrap()));
  c.bench_function("lr1", |b| b.iter(|| {
    lr::build(&g, &Options { mode: Mode::Lr1, ..Options::default() }).unwrap()
  }));
}

criterion_group!{
  name = benches;
  config = Criterion::default().significance_level(0.1).sample_size(10);
  targets = build_benchmark
}
criterion_main!(benches);
