use super::{
    operator::{InfixOperator, PrefixOperator},
    statement::BlockStatement,
};
use compact_str::CompactString;
use std::{fmt::Display, rc::Rc};

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionLiteral {
    pub parameters: Vec<CompactString>,
    pub body: BlockStatement,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Identifier(CompactString),
    IntegerLiteral(i64),
    StringLiteral(CompactString),
    Boolean(bool),
    ArrayLiteral(Vec<Expression>),
    /// Entries in source order; keys are evaluated by their rendering, not their value.
    ObjectLiteral(Vec<(Expression, Expression)>),
    Prefix {
        operator: PrefixOperator,
        operand: Box<Expression>,
    },
    Infix {
        operator: InfixOperator,
        lhs: Box<Expression>,
        rhs: Box<Expression>,
    },
    If {
        condition: Box<Expression>,
        consequence: BlockStatement,
        alternative: Option<BlockStatement>,
    },
    For {
        condition: Box<Expression>,
        body: BlockStatement,
    },
    /// Shared so that every closure built from this literal reuses the same body.
    FunctionLiteral(Rc<FunctionLiteral>),
    Call {
        callee: Box<Expression>,
        arguments: Vec<Expression>,
    },
    Index {
        collection: Box<Expression>,
        index: Box<Expression>,
    },
}

fn write_separated<T: Display>(
    f: &mut std::fmt::Formatter<'_>,
    items: impl IntoIterator<Item = T>,
) -> std::fmt::Result {
    for (index, item) in items.into_iter().enumerate() {
        if index > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

impl Display for FunctionLiteral {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "fn(")?;
        write_separated(f, &self.parameters)?;
        write!(f, ") {}", self.body)
    }
}

impl Display for Expression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Expression::Identifier(name) => write!(f, "{name}"),
            Expression::IntegerLiteral(value) => write!(f, "{value}"),
            Expression::StringLiteral(value) => write!(f, "{value}"),
            Expression::Boolean(value) => write!(f, "{value}"),
            Expression::ArrayLiteral(elements) => {
                write!(f, "[")?;
                write_separated(f, elements)?;
                write!(f, "]")
            }
            Expression::ObjectLiteral(entries) => {
                write!(f, "{{")?;
                write_separated(
                    f,
                    entries.iter().map(|(key, value)| format!("{key}: {value}")),
                )?;
                write!(f, "}}")
            }
            Expression::Prefix { operator, operand } => write!(f, "({operator}{operand})"),
            Expression::Infix { operator, lhs, rhs } => write!(f, "({lhs} {operator} {rhs})"),
            Expression::If {
                condition,
                consequence,
                alternative,
            } => {
                write!(f, "if {condition} {consequence}")?;
                if let Some(alternative) = alternative {
                    write!(f, " else {alternative}")?;
                }
                Ok(())
            }
            Expression::For { condition, body } => write!(f, "for {condition} {body}"),
            Expression::FunctionLiteral(function) => write!(f, "{function}"),
            Expression::Call { callee, arguments } => {
                write!(f, "{callee}(")?;
                write_separated(f, arguments)?;
                write!(f, ")")
            }
            Expression::Index { collection, index } => write!(f, "({collection}[{index}])"),
        }
    }
}
