pub mod automaton;
pub mod regex;
pub mod lexer;
pub mod grammar;

pub use self::automaton::{Fa, State, Mark, Marks, Range};
pub use self::regex::{RegexCompiler, RegexError, RegexErrorKind, Fragment, ClassKind};
pub use self::lexer::{Lexer, LexerError, LexTables, Pattern};
pub use self::grammar::*;

pub type Map<K, V> = indexmap::IndexMap<K, V, fnv::FnvBuildHasher>;
pub type Set<T> = indexmap::IndexSet<T, fnv::FnvBuildHasher>;
pub type BiMap<L, R> = bimap::BiMap<L, R>;
