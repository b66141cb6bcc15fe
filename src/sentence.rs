use indexmap::IndexSet;
use rustc_hash::FxHasher;
use std::hash::BuildHasherDefault;
use std::sync::Arc;

pub type FxIndexSet<T> = IndexSet<T, BuildHasherDefault<FxHasher>>;

/// Sentence of propositional logic
///
/// Equality is structural: two `Symbol`s with the same name are interchangeable,
/// no matter whether they were interned by the same parse.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Sentence {
    Symbol(Arc<str>),
    Not(Box<Sentence>),
    And(Vec<Sentence>),
    Or(Vec<Sentence>),
    /// Exclusive or. Never produced by the parser and not decomposable.
    Xor(Vec<Sentence>),
    Implies(Box<Sentence>, Box<Sentence>),
    Iff(Box<Sentence>, Box<Sentence>),
}

impl Sentence {
    pub fn symbol(name: &str) -> Self {
        Self::Symbol(name.into())
    }

    pub fn not(p: Self) -> Self {
        Self::Not(Box::new(p))
    }

    pub fn and(p: Self, q: Self) -> Self {
        Self::And(vec![p, q])
    }

    pub fn or(p: Self, q: Self) -> Self {
        Self::Or(vec![p, q])
    }

    pub fn xor(p: Self, q: Self) -> Self {
        Self::Xor(vec![p, q])
    }

    pub fn implies(p: Self, q: Self) -> Self {
        Self::Implies(Box::new(p), Box::new(q))
    }

    pub fn iff(p: Self, q: Self) -> Self {
        Self::Iff(Box::new(p), Box::new(q))
    }

    /// Applies a function to the sentence and its subsentences recursively.
    pub fn apply<'a, F>(&'a self, f: &mut F)
    where
        F: FnMut(&'a Self),
    {
        f(self);
        use Sentence::*;
        match self {
            Symbol(_) => {}
            Not(p) => p.apply(f),
            And(l) | Or(l) | Xor(l) => {
                for p in l {
                    p.apply(f);
                }
            }
            Implies(p, q) | Iff(p, q) => {
                p.apply(f);
                q.apply(f);
            }
        }
    }

    /// Collects the names of all symbols in first-seen order.
    pub fn collect_symbols<'a>(&'a self, names: &mut FxIndexSet<&'a str>) {
        self.apply(&mut |p| {
            if let Self::Symbol(name) = p {
                names.insert(name.as_ref());
            }
        });
    }

    /// Returns true for a symbol or a directly negated symbol.
    pub fn is_primitive(&self) -> bool {
        match self {
            Self::Symbol(_) => true,
            Self::Not(p) => matches!(**p, Self::Symbol(_)),
            _ => false,
        }
    }

    /// Strips doubled negations until the sentence is no longer of the form `not not p`.
    pub fn deep_simplified(&self) -> &Self {
        let mut current = self;
        while let Self::Not(p) = current {
            let Self::Not(q) = &**p else {
                break;
            };
            current = &**q;
        }
        current
    }

    /// Returns the symbol name and its polarity if the sentence is primitive.
    pub fn literal(&self) -> Option<(&str, bool)> {
        match self {
            Self::Symbol(name) => Some((name.as_ref(), true)),
            Self::Not(p) => match &**p {
                Self::Symbol(name) => Some((name.as_ref(), false)),
                _ => None,
            },
            _ => None,
        }
    }

    /// Returns the first subsentence built with a connective that has no tableau rule.
    pub fn find_unsupported(&self) -> Option<&Self> {
        use Sentence::*;
        match self {
            Xor(_) => Some(self),
            Symbol(_) => None,
            Not(p) => p.find_unsupported(),
            And(l) | Or(l) => l.iter().find_map(|p| p.find_unsupported()),
            Implies(p, q) | Iff(p, q) => p.find_unsupported().or_else(|| q.find_unsupported()),
        }
    }
}
