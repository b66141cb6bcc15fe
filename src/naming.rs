use crate::lexer::is_symbol_char;
use crate::sentence::{FxIndexSet, Sentence};
use std::fmt;
use std::sync::Arc;

const KEYWORDS: [&str; 5] = ["not", "and", "or", "implies", "iif"];

/// Symbol interner shared by all sentences of one submission
///
/// Repeated names resolve to the same `Arc<str>`; names are kept in first-seen order.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Names {
    names: FxIndexSet<Arc<str>>,
}

impl Names {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the symbol for `name`, reusing the interned name if it was seen before.
    pub fn intern(&mut self, name: &str) -> Sentence {
        if let Some(name) = self.names.get(name) {
            return Sentence::Symbol(name.clone());
        }
        let name: Arc<str> = name.into();
        self.names.insert(name.clone());
        Sentence::Symbol(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(|name| name.as_ref())
    }
}

fn needs_quotes(name: &str) -> bool {
    name.is_empty() || !name.chars().all(is_symbol_char) || KEYWORDS.contains(&name)
}

fn write_symbol(f: &mut fmt::Formatter<'_>, name: &str) -> fmt::Result {
    if !needs_quotes(name) {
        return write!(f, "{name}");
    }
    write!(f, "\"")?;
    for c in name.chars() {
        if c == '"' || c == '\\' {
            write!(f, "\\")?;
        }
        write!(f, "{c}")?;
    }
    write!(f, "\"")
}

/// Wraps everything but symbols and negations in parentheses.
struct Grouped<'a>(&'a Sentence);

impl fmt::Display for Grouped<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Sentence::Symbol(_) | Sentence::Not(_) => write!(f, "{}", self.0),
            p => write!(f, "({p})"),
        }
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, l: &[Sentence], sep: &str) -> fmt::Result {
    for (i, p) in l.iter().enumerate() {
        if i > 0 {
            write!(f, " {sep} ")?;
        }
        write!(f, "{}", Grouped(p))?;
    }
    Ok(())
}

/// Formats the sentence in surface syntax that parses back to the same sentence
/// (except for `xor`, which the parser does not accept).
impl fmt::Display for Sentence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Sentence::*;
        match self {
            Symbol(name) => write_symbol(f, name),
            Not(p) => write!(f, "not {}", Grouped(p)),
            And(l) => write_joined(f, l, "and"),
            Or(l) => write_joined(f, l, "or"),
            Xor(l) => write_joined(f, l, "xor"),
            Implies(p, q) => write!(f, "{} -> {}", Grouped(p), Grouped(q)),
            Iff(p, q) => write!(f, "{} <-> {}", Grouped(p), Grouped(q)),
        }
    }
}
