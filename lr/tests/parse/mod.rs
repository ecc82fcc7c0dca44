#![allow(dead_code)]

use grammar::{Grammar, Action};
use lr::Parser;

/// `E + T`, `T * F`, parenthesized `E` and `num`, layered by precedence.
pub fn expr() -> Grammar {
  let mut g = Grammar::new();
  for t in &["+", "*", "(", ")", "num"] {
    g.add_terminal(t, None, None).unwrap();
  }
  g.rule("S", &["E"], Action::none()).unwrap();
  g.rule("E", &["E", "+", "T"], Action::none()).unwrap();
  g.rule("E", &["T"], Action::none()).unwrap();
  g.rule("T", &["T", "*", "F"], Action::none()).unwrap();
  g.rule("T", &["F"], Action::none()).unwrap();
  g.rule("F", &["(", "E", ")"], Action::none()).unwrap();
  g.rule("F", &["num"], Action::none()).unwrap();
  g
}

/// Runs the tables over whitespace separated terminal names and records
/// what the parser does.
pub fn parse(grammar: &Grammar, parser: &Parser, input: &str) -> Vec<String> {
  let tokens = input.split_whitespace()
    .map(|name| {
      let id = grammar.terminal_id(name)
        .unwrap_or_else(|| panic!("unknown terminal {}", name));
      (id.index(), name.to_owned())
    })
    .collect::<Vec<_>>();

  let eof = (parser.eof_column(), "EOF".to_owned());
  let mut events = vec![];
  let mut state = parser.start;
  let mut stack: Vec<(usize, String)> = vec![];
  let mut pos = 0;
  let mut inserted: Option<(usize, String)> = None;
  let mut insertions = 0;

  loop {
    let (column, text) = inserted.clone()
      .unwrap_or_else(|| tokens.get(pos).cloned().unwrap_or_else(|| eof.clone()));

    let action = parser.action[state][column];

    if action > 0 {
      let reduce = &parser.reduces[action as usize - 1];
      if reduce.accept {
        events.push("accept".to_owned());
        break;
      }

      let name = &grammar.nonterminal_info(reduce.lhs).name;
      let state0 = if reduce.len == 0 {
        state
      } else {
        stack[stack.len() - reduce.len].0
      };

      let mut event = format!("reduce {} ->", name);
      for (_, text) in stack.drain(stack.len() - reduce.len..) {
        event.push(' ');
        event.push_str(&text);
      }
      events.push(event);

      let column = parser.num_terminals + 1 + reduce.lhs.index();
      state = parser.goto[state0][column] as usize;
      stack.push((state0, name.clone()));
      run_shift_action(parser, state0, column, &mut events);
      continue;
    }

    let to = parser.goto[state][column];
    if to >= 0 {
      events.push(format!("shift {}", text));
      run_shift_action(parser, state, column, &mut events);
      stack.push((state, text));
      state = to as usize;
      if inserted.take().is_none() {
        pos += 1;
        insertions = 0;
      }
    } else if to <= -2 && inserted.is_none() && insertions < 8 {
      let terminal = (-to - 2) as usize;
      let name = grammar.terminal_info(grammar::TerminalId::from_index(terminal)).name.clone();
      events.push(format!("insert {}", name));
      inserted = Some((terminal, name));
      insertions += 1;
    } else {
      events.push(format!("error token {} at {}", text, pos));
      break;
    }
  }

  events
}

fn run_shift_action(parser: &Parser, state: usize, column: usize, events: &mut Vec<String>) {
  let action = parser.action[state][column];
  if action < 0 {
    let shift = &parser.shifts[(-action - 1) as usize];
    if let Some(function) = &shift.function {
      events.push(format!("run {}", function));
    }
  }
}
