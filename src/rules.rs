//! Tableau decomposition rules.
//!
//! Alpha rules extend a branch with a chain of sentences, beta rules split it.

use crate::error::DecompositionError;
use crate::sentence::{Sentence, Sentence::*};

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Rule {
    Conjunction,
    Disjunction,
    Implication,
    Biconditional,
    NegatedConjunction,
    NegatedDisjunction,
    NegatedImplication,
    NegatedBiconditional,
}

/// Cheap rules come first.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Cost {
    Alpha,
    Beta,
}

/// New branches to grow below every open leaf, each a chain of sentences.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Expansion {
    pub rule: Rule,
    pub branches: Vec<Vec<Sentence>>,
}

impl Rule {
    pub fn of(fml: &Sentence) -> Result<Self, DecompositionError> {
        use Rule::*;
        match fml {
            And(_) => Ok(Conjunction),
            Or(_) => Ok(Disjunction),
            Implies(..) => Ok(Implication),
            Iff(..) => Ok(Biconditional),
            Not(p) => match &**p {
                And(_) => Ok(NegatedConjunction),
                Or(_) => Ok(NegatedDisjunction),
                Implies(..) => Ok(NegatedImplication),
                Iff(..) => Ok(NegatedBiconditional),
                Xor(_) => Err(DecompositionError::Unsupported(fml.clone())),
                Symbol(_) | Not(_) => Err(DecompositionError::NoRuleApplicable(fml.clone())),
            },
            Xor(_) => Err(DecompositionError::Unsupported(fml.clone())),
            Symbol(_) => Err(DecompositionError::NoRuleApplicable(fml.clone())),
        }
    }

    pub fn cost(self) -> Cost {
        use Rule::*;
        match self {
            Conjunction | NegatedDisjunction | NegatedImplication => Cost::Alpha,
            Disjunction | Implication | Biconditional | NegatedConjunction
            | NegatedBiconditional => Cost::Beta,
        }
    }
}

/// Cost of decomposing `fml`; sentences without a rule count as beta.
pub fn cost(fml: &Sentence) -> Cost {
    Rule::of(fml).map_or(Cost::Beta, Rule::cost)
}

fn not(p: &Sentence) -> Sentence {
    Sentence::not(p.clone())
}

pub fn expand(fml: &Sentence) -> Result<Expansion, DecompositionError> {
    let rule = Rule::of(fml)?;
    let branches = match fml {
        // p ∧ q: p, q
        And(l) => vec![l.clone()],
        // p ∨ q: p | q
        Or(l) => l.iter().map(|p| vec![p.clone()]).collect(),
        // p → q: ¬p | q
        Implies(p, q) => vec![vec![not(p)], vec![(**q).clone()]],
        // p ↔ q: p, q | ¬p, ¬q
        Iff(p, q) => vec![
            vec![(**p).clone(), (**q).clone()],
            vec![not(p), not(q)],
        ],
        Not(fml) => match &**fml {
            // ¬(p ∧ q): ¬p | ¬q
            And(l) => l.iter().map(|p| vec![not(p)]).collect(),
            // ¬(p ∨ q): ¬p, ¬q
            Or(l) => vec![l.iter().map(not).collect()],
            // ¬(p → q): p, ¬q
            Implies(p, q) => vec![vec![(**p).clone(), not(q)]],
            // ¬(p ↔ q): p, ¬q | ¬p, q
            Iff(p, q) => vec![
                vec![(**p).clone(), not(q)],
                vec![not(p), (**q).clone()],
            ],
            Symbol(_) | Not(_) | Xor(_) => unreachable!(),
        },
        Symbol(_) | Xor(_) => unreachable!(),
    };
    Ok(Expansion { rule, branches })
}
