use crate::error::{Error, ParseError, ValidationError};
use crate::lexer::{Lexer, OperatorKind, Token};
use crate::naming::Names;
use crate::sentence::{FxIndexSet, Sentence};

use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

static SEPARATOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"[;\n]+").unwrap());

/// Premises and the conclusion they are claimed to entail
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Argument {
    pub premises: Vec<Sentence>,
    pub conclusion: Sentence,
}

impl Argument {
    /// Collects the symbol names of all premises and the conclusion in first-seen order.
    pub fn symbols(&self) -> FxIndexSet<&str> {
        let mut names = FxIndexSet::default();
        for p in self.premises.iter().chain([&self.conclusion]) {
            p.collect_symbols(&mut names);
        }
        names
    }
}

/// Shunting-yard parser state.
///
/// `None` on the operator stack marks the start of a parenthesis group.
struct Parser<'a, 'n> {
    tokens: Lexer<'a>,
    current: Token,
    names: &'n mut Names,
    operators: Vec<Option<OperatorKind>>,
    operands: Vec<Sentence>,
}

impl<'a, 'n> Parser<'a, 'n> {
    fn new(s: &'a str, names: &'n mut Names) -> Result<Self, ParseError> {
        let mut parser = Self {
            tokens: Lexer::new(s),
            current: Token::EndOfInput,
            names,
            operators: vec![],
            operands: vec![],
        };
        parser.consume()?;
        Ok(parser)
    }

    fn consume(&mut self) -> Result<(), ParseError> {
        if let Some(token) = self.tokens.next() {
            self.current = token?;
        }
        Ok(())
    }

    fn parse_sentence(mut self) -> Result<Sentence, ParseError> {
        self.operators.push(None);
        self.parse_expr()?;
        match &self.current {
            Token::EndOfInput => {}
            Token::CloseParen => return Err(ParseError::UnbalancedParentheses),
            found => {
                return Err(ParseError::TrailingInput {
                    found: found.clone(),
                })
            }
        }
        if self.operators != [None] || self.operands.len() != 1 {
            return Err(ParseError::MalformedExpression);
        }
        self.operands.pop().ok_or(ParseError::MalformedExpression)
    }

    /// expr := atom (binop atom)*
    fn parse_expr(&mut self) -> Result<(), ParseError> {
        self.parse_atom()?;
        while let Token::Operator(op) = self.current {
            if !op.is_binary() {
                break;
            }
            self.push_operator(op)?;
            self.consume()?;
            self.parse_atom()?;
        }
        while let Some(Some(_)) = self.operators.last() {
            self.pop_operator()?;
        }
        Ok(())
    }

    /// atom := symbol | '(' expr ')' | 'not' atom
    fn parse_atom(&mut self) -> Result<(), ParseError> {
        match &self.current {
            Token::Identifier(name) => {
                let p = self.names.intern(name);
                self.operands.push(p);
                self.consume()
            }
            Token::OpenParen => {
                self.consume()?;
                self.operators.push(None);
                self.parse_expr()?;
                match &self.current {
                    Token::CloseParen => {}
                    Token::EndOfInput => return Err(ParseError::UnbalancedParentheses),
                    found => {
                        return Err(ParseError::UnexpectedToken {
                            found: found.clone(),
                            expected: "')'",
                        })
                    }
                }
                self.consume()?;
                self.operators.pop();
                Ok(())
            }
            Token::Operator(OperatorKind::Not) => {
                // `not` never reduces what is below it, so `not not p` nests
                self.operators.push(Some(OperatorKind::Not));
                self.consume()?;
                self.parse_atom()
            }
            found => Err(ParseError::UnexpectedToken {
                found: found.clone(),
                expected: "a symbol, '(' or 'not'",
            }),
        }
    }

    /// Reduces pending operators of lower or equal precedence level, then pushes `op`.
    fn push_operator(&mut self, op: OperatorKind) -> Result<(), ParseError> {
        while let Some(&Some(top)) = self.operators.last() {
            if top > op {
                break;
            }
            self.pop_operator()?;
        }
        self.operators.push(Some(op));
        Ok(())
    }

    fn pop_operand(&mut self) -> Result<Sentence, ParseError> {
        self.operands.pop().ok_or(ParseError::MalformedExpression)
    }

    fn pop_operator(&mut self) -> Result<(), ParseError> {
        let op = self
            .operators
            .pop()
            .flatten()
            .ok_or(ParseError::MalformedExpression)?;
        if !op.is_binary() {
            let p = self.pop_operand()?;
            self.operands.push(Sentence::not(p));
            return Ok(());
        }
        let q = self.pop_operand()?;
        let p = self.pop_operand()?;
        use OperatorKind::*;
        let fml = match op {
            And => Sentence::and(p, q),
            Or => Sentence::or(p, q),
            Implies => Sentence::implies(p, q),
            Iff => Sentence::iff(p, q),
            Not => unreachable!(),
        };
        self.operands.push(fml);
        Ok(())
    }
}

/// Parses a single sentence with its own symbol table.
pub fn parse(s: &str) -> Result<Sentence, ParseError> {
    parse_with(s, &mut Names::new())
}

/// Parses a single sentence, interning symbols into `names`.
pub fn parse_with(s: &str, names: &mut Names) -> Result<Sentence, ParseError> {
    let s: String = s.nfkc().collect();
    Parser::new(&s, names)?.parse_sentence()
}

/// Parses a submission of sentences separated by `;` or newlines.
///
/// The last sentence is the conclusion, all others are premises. The text is split before it is
/// lexed, so a quoted symbol cannot contain `;` or a newline.
pub fn parse_argument(s: &str) -> Result<Argument, Error> {
    let pieces = SEPARATOR
        .split(s.trim())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>();
    let Some((conclusion, premises)) = pieces.split_last().filter(|(_, l)| !l.is_empty()) else {
        return Err(ValidationError::TooFewSentences {
            found: pieces.len(),
        }
        .into());
    };
    let mut names = Names::new();
    let mut parse_nth = |index: usize, s: &str| {
        parse_with(s, &mut names).map_err(|source| Error::Parse { index, source })
    };
    let premises = premises
        .iter()
        .enumerate()
        .map(|(i, &s)| parse_nth(i, s))
        .collect::<Result<Vec<_>, _>>()?;
    let conclusion = parse_nth(premises.len(), *conclusion)?;
    Ok(Argument {
        premises,
        conclusion,
    })
}
