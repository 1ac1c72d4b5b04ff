use crate::token::{Span, TokenKind};
use compact_str::CompactString;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParserErrorKind {
    #[error("Expected token type {expected}. Got {actual} instead")]
    UnexpectedToken {
        expected: TokenKind,
        actual: TokenKind,
    },
    #[error("no prefix parse function for token {0}")]
    NoPrefixParseFunction(TokenKind),
    #[error("expected an operator but got token {0}")]
    NonOperator(TokenKind),
    #[error("could not parse {0} as integer")]
    InvalidInteger(CompactString),
}

#[derive(Debug, Error, Clone, PartialEq)]
#[error("{kind}")]
pub struct ParserError {
    #[source]
    pub kind: ParserErrorKind,
    pub span: Span,
}

impl ParserError {
    pub fn code(&self) -> &'static str {
        match self.kind {
            ParserErrorKind::UnexpectedToken { .. } => "PE001",
            ParserErrorKind::NoPrefixParseFunction(_) => "PE002",
            ParserErrorKind::NonOperator(_) => "PE003",
            ParserErrorKind::InvalidInteger(_) => "PE004",
        }
    }
}
