use crate::ast::{InfixOperator, PrefixOperator};
use compact_str::CompactString;
use thiserror::Error;

/// Type names are the ones reported by [`super::Object::type_name`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    #[error("unknown operator: {operator}{operand}")]
    UnknownPrefixOperator {
        operator: PrefixOperator,
        operand: &'static str,
    },
    #[error("unknown operator: {lhs} {operator} {rhs}")]
    UnknownInfixOperator {
        lhs: &'static str,
        operator: InfixOperator,
        rhs: &'static str,
    },
    #[error("type mismatch: {lhs} {operator} {rhs}")]
    TypeMismatch {
        lhs: &'static str,
        operator: InfixOperator,
        rhs: &'static str,
    },
    #[error("Undefined variable: {0}")]
    UndefinedVariable(CompactString),
    #[error("not a function: {0}")]
    NotAFunction(&'static str),
    #[error("wrong number of arguments. got={actual}, want={expected}")]
    InvalidArgumentCount { actual: usize, expected: usize },
    #[error("No string in arguments")]
    NonStringArgument,
    #[error("No right substring found in left string")]
    SubstringNotFound,
    #[error("Array or Object with name {0} not found")]
    CollectionNotFound(CompactString),
    #[error("Index operation requires array or object!")]
    NonIndexable,
    #[error("Index is not an integer")]
    NonIntegerIndex,
    #[error("Index out of bound")]
    IndexOutOfBounds,
    #[error("division by zero")]
    DivisionByZero,
}

impl RuntimeError {
    pub fn code(&self) -> &'static str {
        match self {
            RuntimeError::UnknownPrefixOperator { .. } => "RT001",
            RuntimeError::UnknownInfixOperator { .. } => "RT002",
            RuntimeError::TypeMismatch { .. } => "RT003",
            RuntimeError::UndefinedVariable(_) => "RT004",
            RuntimeError::NotAFunction(_) => "RT005",
            RuntimeError::InvalidArgumentCount { .. } => "RT006",
            RuntimeError::NonStringArgument => "RT007",
            RuntimeError::SubstringNotFound => "RT008",
            RuntimeError::CollectionNotFound(_) => "RT009",
            RuntimeError::NonIndexable => "RT010",
            RuntimeError::NonIntegerIndex => "RT011",
            RuntimeError::IndexOutOfBounds => "RT012",
            RuntimeError::DivisionByZero => "RT013",
        }
    }
}
