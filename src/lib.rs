//! Propositional truth trees.
//!
//! Arguments are written one sentence per line (or separated by `;`), the last one being the
//! conclusion. [`prove_argument`] parses such a text and decides whether the premises entail the
//! conclusion by growing a truth tree from the premises and the negated conclusion.

pub mod error;
pub mod lexer;
pub mod naming;
pub mod parser;
pub mod prover;
pub mod rules;
pub mod sentence;
pub mod session;
pub mod tree;

pub use error::{Error, Result};
pub use parser::{parse, parse_argument, Argument};
pub use prover::{prove, prove_with_cancel, ProverConfig, Strategy, TruthTreeResult};
pub use sentence::Sentence;
pub use session::{CancelToken, Job, Session};
pub use tree::{NodeId, Tree};

/// Parses `text` and proves it on the current thread.
pub fn prove_argument(text: &str, config: ProverConfig) -> Result<TruthTreeResult> {
    let Argument {
        premises,
        conclusion,
    } = parse_argument(text)?;
    Ok(prove(&premises, &conclusion, config)?)
}
