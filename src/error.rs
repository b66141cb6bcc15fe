use crate::lexer::Token;
use crate::sentence::Sentence;
use thiserror::Error;

/// Result type for the whole pipeline from text to truth tree
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum LexError {
    #[error("quoted symbol starting at {start} is missing its closing {quote}")]
    UnterminatedString { quote: char, start: usize },
    #[error("unknown operator '{operator}' at {position}")]
    UnknownOperator { operator: String, position: usize },
    #[error("invalid character '{character}' at {position}")]
    InvalidCharacter { character: char, position: usize },
}

#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum ParseError {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error("unexpected token {found}, expected {expected}")]
    UnexpectedToken { found: Token, expected: &'static str },
    #[error("unbalanced parentheses")]
    UnbalancedParentheses,
    #[error("unexpected {found} after a complete sentence")]
    TrailingInput { found: Token },
    #[error("malformed expression")]
    MalformedExpression,
}

#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum ValidationError {
    #[error("at least 2 sentences are needed (premises and a conclusion), found {found}")]
    TooFewSentences { found: usize },
}

/// Decomposition of a sentence that has no tableau rule
///
/// Reaching `NoRuleApplicable` means a primitive was handed to the rules.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum DecompositionError {
    #[error("no tableau rule applies to {0}")]
    NoRuleApplicable(Sentence),
    #[error("{0} uses a connective without a tableau rule")]
    Unsupported(Sentence),
}

#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum ProveError {
    #[error(transparent)]
    Decomposition(#[from] DecompositionError),
    #[error("computation was cancelled")]
    Cancelled,
}

#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum Error {
    #[error("sentence {index} could not be parsed: {source}")]
    Parse {
        index: usize,
        #[source]
        source: ParseError,
    },
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Prove(#[from] ProveError),
}

impl From<DecompositionError> for Error {
    fn from(e: DecompositionError) -> Self {
        Self::Prove(e.into())
    }
}
