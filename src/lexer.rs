//! Tokenizer for the formula surface syntax.
//!
//! Symbols are either bare (`[A-Za-z_$]+`) or quoted with `"` or `'`, in which case a backslash
//! escapes the next character. Operators are the keywords `not`, `and`, `or`, `implies`, `iif`
//! and the symbolic `->` and `<->`.

use crate::error::LexError;
use std::fmt;
use std::iter::Peekable;
use std::str::Chars;

/// Connectives in order of increasing precedence level (lower binds tighter).
///
/// `Implies` and `Iff` have no generally accepted order, so declaration order decides.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum OperatorKind {
    Not,
    And,
    Or,
    Implies,
    Iff,
}

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Token {
    OpenParen,
    CloseParen,
    Identifier(String),
    Operator(OperatorKind),
    EndOfInput,
}

impl OperatorKind {
    #[inline(always)]
    pub fn is_binary(self) -> bool {
        self != Self::Not
    }

    fn from_keyword(s: &str) -> Option<Self> {
        use OperatorKind::*;
        match s {
            "implies" => Some(Implies),
            "iif" => Some(Iff),
            "and" => Some(And),
            "or" => Some(Or),
            "not" => Some(Not),
            _ => None,
        }
    }
}

impl fmt::Display for OperatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use OperatorKind::*;
        let s = match self {
            Not => "not",
            And => "and",
            Or => "or",
            Implies => "implies",
            Iff => "iif",
        };
        write!(f, "{s}")
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::OpenParen => write!(f, "'('"),
            Token::CloseParen => write!(f, "')'"),
            Token::Identifier(s) => write!(f, "symbol '{s}'"),
            Token::Operator(op) => write!(f, "operator '{op}'"),
            Token::EndOfInput => write!(f, "end of input"),
        }
    }
}

#[inline(always)]
pub(crate) fn is_symbol_char(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '$'
}

#[inline(always)]
fn is_operator_char(c: char) -> bool {
    matches!(c, '<' | '-' | '>')
}

/// Lazy, single-pass token stream ending with `Token::EndOfInput`.
///
/// The stream is fused: after `EndOfInput` or the first error it yields nothing.
pub struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
    position: usize,
    finished: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars().peekable(),
            position: 0,
            finished: false,
        }
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        self.position += 1;
        Some(c)
    }

    fn quoted(&mut self, quote: char) -> Result<Token, LexError> {
        let start = self.position - 1;
        let mut s = String::new();
        loop {
            match self.bump() {
                None => return Err(LexError::UnterminatedString { quote, start }),
                Some('\\') => match self.bump() {
                    Some(c) => s.push(c),
                    None => return Err(LexError::UnterminatedString { quote, start }),
                },
                Some(c) if c == quote => return Ok(Token::Identifier(s)),
                Some(c) => s.push(c),
            }
        }
    }

    fn word(&mut self, first: char) -> Token {
        let mut s = String::from(first);
        while let Some(&c) = self.chars.peek() {
            if !is_symbol_char(c) {
                break;
            }
            s.push(c);
            self.bump();
        }
        match OperatorKind::from_keyword(&s) {
            Some(op) => Token::Operator(op),
            None => Token::Identifier(s),
        }
    }

    fn symbolic_operator(&mut self, first: char) -> Result<Token, LexError> {
        let position = self.position - 1;
        let mut operator = String::from(first);
        while let Some(&c) = self.chars.peek() {
            if !is_operator_char(c) {
                break;
            }
            operator.push(c);
            self.bump();
        }
        match operator.as_str() {
            "->" => Ok(Token::Operator(OperatorKind::Implies)),
            "<->" => Ok(Token::Operator(OperatorKind::Iff)),
            _ => Err(LexError::UnknownOperator { operator, position }),
        }
    }

    fn next_token(&mut self) -> Result<Token, LexError> {
        loop {
            let Some(c) = self.bump() else {
                return Ok(Token::EndOfInput);
            };
            return match c {
                ' ' | '\t' | '\r' | '\n' => continue,
                '(' => Ok(Token::OpenParen),
                ')' => Ok(Token::CloseParen),
                '"' | '\'' => self.quoted(c),
                c if is_symbol_char(c) => Ok(self.word(c)),
                c if is_operator_char(c) => self.symbolic_operator(c),
                character => Err(LexError::InvalidCharacter {
                    character,
                    position: self.position - 1,
                }),
            };
        }
    }
}

impl Iterator for Lexer<'_> {
    type Item = Result<Token, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let token = self.next_token();
        if matches!(token, Ok(Token::EndOfInput) | Err(_)) {
            self.finished = true;
        }
        Some(token)
    }
}

impl std::iter::FusedIterator for Lexer<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use OperatorKind::*;
    use Token::*;

    fn lex(s: &str) -> Result<Vec<Token>, LexError> {
        Lexer::new(s).collect()
    }

    fn ident(s: &str) -> Token {
        Identifier(s.into())
    }

    #[test]
    fn test_lex_keywords() {
        assert_eq!(
            lex("not A and B or C implies D iif E").unwrap(),
            vec![
                Operator(Not),
                ident("A"),
                Operator(And),
                ident("B"),
                Operator(Or),
                ident("C"),
                Operator(Implies),
                ident("D"),
                Operator(Iff),
                ident("E"),
                EndOfInput
            ]
        );
    }

    #[test]
    fn test_lex_keyword_is_whole_word() {
        assert_eq!(
            lex("impliesX notA Or").unwrap(),
            vec![ident("impliesX"), ident("notA"), ident("Or"), EndOfInput]
        );
    }

    #[test]
    fn test_lex_symbolic_operators() {
        assert_eq!(
            lex("(A->B)<->C").unwrap(),
            vec![
                OpenParen,
                ident("A"),
                Operator(Implies),
                ident("B"),
                CloseParen,
                Operator(Iff),
                ident("C"),
                EndOfInput
            ]
        );
        assert_eq!(
            lex("A <- B"),
            Err(LexError::UnknownOperator {
                operator: "<-".into(),
                position: 2
            })
        );
        assert!(matches!(
            lex("A --> B"),
            Err(LexError::UnknownOperator { .. })
        ));
    }

    #[test]
    fn test_lex_quoted() {
        assert_eq!(
            lex(r#""The students study" and 'it\'s $5'"#).unwrap(),
            vec![
                ident("The students study"),
                Operator(And),
                ident("it's $5"),
                EndOfInput
            ]
        );
        assert_eq!(
            lex(r#"A and "B"#),
            Err(LexError::UnterminatedString {
                quote: '"',
                start: 6
            })
        );
    }

    #[test]
    fn test_lex_invalid_character() {
        assert_eq!(
            lex("A & B"),
            Err(LexError::InvalidCharacter {
                character: '&',
                position: 2
            })
        );
        assert!(matches!(
            lex("P1"),
            Err(LexError::InvalidCharacter { character: '1', .. })
        ));
    }

    #[test]
    fn test_lex_is_fused() {
        let mut lexer = Lexer::new("A");
        assert_eq!(lexer.next(), Some(Ok(ident("A"))));
        assert_eq!(lexer.next(), Some(Ok(EndOfInput)));
        assert_eq!(lexer.next(), None);
        assert_eq!(lexer.next(), None);

        let mut lexer = Lexer::new("# A");
        assert!(matches!(lexer.next(), Some(Err(_))));
        assert_eq!(lexer.next(), None);
    }
}
