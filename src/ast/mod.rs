//! Syntax tree produced by the parser.
//!
//! Every node implements [`std::fmt::Display`] with a canonical rendering: infix
//! and prefix expressions are always parenthesised, so `5 * 5 + 1` renders as
//! `((5 * 5) + 1)`. The rendering is stable but not guaranteed to re-parse.

mod expression;
mod operator;
mod statement;

pub use expression::{Expression, FunctionLiteral};
pub use operator::{InfixOperator, PrefixOperator};
pub use statement::{BlockStatement, Statement};

use std::fmt::Display;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    statements: Vec<Statement>,
}

impl Program {
    pub fn new(statements: Vec<Statement>) -> Self {
        Self { statements }
    }

    pub fn get_statement(&self, index: usize) -> Option<&Statement> {
        self.statements.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Statement> {
        self.statements.iter()
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }
}

impl<'a> IntoIterator for &'a Program {
    type Item = &'a Statement;
    type IntoIter = std::slice::Iter<'a, Statement>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl Display for Program {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for statement in self.statements.iter() {
            write!(f, "{statement}")?;
        }
        Ok(())
    }
}
