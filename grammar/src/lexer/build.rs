use crate::automaton::{Fa, Mark, Marks, Range};
use crate::regex::{RegexCompiler, MAX_CODE};
use crate::Set;
use super::{Pattern, LexerError, LexTables, INITIAL};

/// Merges the patterns into one lexical DFA.
///
/// Every start condition gets a gate state, reached from the common start on
/// the symbol `MAX_CODE + condition`; each pattern hangs off the gates of the
/// conditions it belongs to. After determinization only the smallest pattern
/// id is kept on every state, so earlier patterns win.
pub fn build(
  compiler: &mut RegexCompiler,
  patterns: &[Pattern],
) -> Result<LexTables, Vec<LexerError>> {
  if patterns.is_empty() {
    return Err(vec![LexerError::NoPatterns]);
  }

  let conditions = conditions(patterns);

  let mut errors = vec![];
  let mut dfas = vec![];
  for (id, pattern) in patterns.iter().enumerate() {
    match compiler.compile(&pattern.regex, id as u32) {
      Ok(fa) => dfas.push(fa),
      Err(error) => errors.push(LexerError::Pattern {
        pattern: pattern.regex.clone(),
        error,
      }),
    }
  }

  if !errors.is_empty() {
    return Err(errors);
  }

  let mut fa = Fa::new();
  let start = fa.add_state();
  let gates = (0..conditions.len())
    .map(|condition| {
      let gate = fa.add_state();
      let added = fa.add_transition(start, Range::single(MAX_CODE + condition as u32), gate);
      assert!(added, "start condition symbols collide");
      gate
    })
    .collect::<Vec<_>>();

  for (pattern, dfa) in patterns.iter().zip(&dfas) {
    let (entry, _) = fa.insert(dfa, true);

    if pattern.conditions.is_empty() {
      fa.add_epsilon(gates[0], entry);
    }
    for name in &pattern.conditions {
      if let Some(condition) = conditions.get_index_of(name.as_str()) {
        fa.add_epsilon(gates[condition], entry);
      }
    }
  }

  let mut dfa = fa.determinize();
  let earliest = dfa.states()
    .map(|state| smallest(dfa.marks(state)))
    .collect::<Vec<_>>();
  dfa.clear_marks();
  for (state, mark) in dfa.states().zip(earliest) {
    if let Some(mark) = mark {
      dfa.add_mark(state, mark);
    }
  }

  let dfa = dfa.minimize();
  log::debug!("lexer: {} patterns, {} start conditions, {} states",
    patterns.len(), conditions.len(), dfa.len());

  Ok(LexTables::new(&dfa, conditions.into_iter().map(str::to_owned).collect()))
}

/// INITIAL first, then every other condition by first appearance.
fn conditions(patterns: &[Pattern]) -> Set<&str> {
  let mut conditions = Set::default();
  conditions.insert(INITIAL);
  for pattern in patterns {
    for name in &pattern.conditions {
      conditions.insert(name.as_str());
    }
  }
  conditions
}

fn smallest(marks: &Marks) -> Option<Mark> {
  marks.iter().next().copied()
}
