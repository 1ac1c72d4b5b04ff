pub mod error;
pub mod formatter;

use crate::{
    ast::{BlockStatement, FunctionLiteral, InfixOperator, PrefixOperator},
    environment::Environment,
    evaluator::SystemContext,
};
use compact_str::{format_compact, CompactString};
use error::RuntimeError;
use indexmap::IndexMap;
use std::{fmt::Display, rc::Rc};

pub const TRUE: Object = Object::Boolean(true);
pub const FALSE: Object = Object::Boolean(false);
pub const NULL: Object = Object::Null;

pub type BuiltinFn = fn(&[Object], &mut dyn SystemContext) -> Result<Object, RuntimeError>;

/// A native function resolved by name when no binding shadows it.
#[derive(Clone, Copy)]
pub struct Builtin {
    pub name: &'static str,
    pub function: BuiltinFn,
}

impl std::fmt::Debug for Builtin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Builtin").field("name", &self.name).finish()
    }
}

/// A closure: the literal it was built from plus the scope it was defined in.
#[derive(Debug)]
pub struct Function {
    pub literal: Rc<FunctionLiteral>,
    pub closure: Environment,
}

impl Function {
    pub fn parameters(&self) -> &[CompactString] {
        &self.literal.parameters
    }

    pub fn body(&self) -> &BlockStatement {
        &self.literal.body
    }
}

/// Runtime values.
///
/// Collections and functions are reference counted, so cloning an object
/// aliases it rather than copying it. `Return` and `Error` are control signals
/// and never escape a program evaluation as anything but its final result.
#[derive(Debug, Clone)]
pub enum Object {
    Integer(i64),
    String(CompactString),
    Boolean(bool),
    Null,
    Array(Rc<Vec<Object>>),
    Map(Rc<IndexMap<CompactString, Object>>),
    Function(Rc<Function>),
    Builtin(Builtin),
    Return(Box<Object>),
    Error(RuntimeError),
}

impl Object {
    pub fn from_bool(value: bool) -> Object {
        if value {
            TRUE
        } else {
            FALSE
        }
    }

    pub fn is_truthy(&self) -> bool {
        !matches!(self, Object::Boolean(false) | Object::Null)
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Object::Integer(_) => "Integer",
            Object::String(_) => "String",
            Object::Boolean(_) => "Bool",
            Object::Null => "Null",
            Object::Array(_) => "Array",
            Object::Map(_) => "Map",
            Object::Function(_) => "Function",
            Object::Builtin(_) => "Builtin",
            Object::Return(_) => "Return",
            Object::Error(_) => "Error",
        }
    }

    /// Reference identity. Booleans and null are shared constants, so they
    /// compare by value; everything else only matches itself.
    pub fn is_identical(&self, other: &Object) -> bool {
        match (self, other) {
            (Object::Boolean(lhs), Object::Boolean(rhs)) => lhs == rhs,
            (Object::Null, Object::Null) => true,
            (Object::Array(lhs), Object::Array(rhs)) => Rc::ptr_eq(lhs, rhs),
            (Object::Map(lhs), Object::Map(rhs)) => Rc::ptr_eq(lhs, rhs),
            (Object::Function(lhs), Object::Function(rhs)) => Rc::ptr_eq(lhs, rhs),
            (Object::Builtin(lhs), Object::Builtin(rhs)) => lhs.name == rhs.name,
            _ => false,
        }
    }
}

// Operators
impl Object {
    pub fn apply_prefix(&self, operator: PrefixOperator) -> Result<Object, RuntimeError> {
        match (operator, self) {
            (PrefixOperator::Bang, operand) => Ok(Object::from_bool(!operand.is_truthy())),
            (PrefixOperator::Minus, Object::Integer(value)) => {
                Ok(Object::Integer(value.wrapping_neg()))
            }
            (PrefixOperator::Minus, operand) => Err(RuntimeError::UnknownPrefixOperator {
                operator,
                operand: operand.type_name(),
            }),
        }
    }

    pub fn apply_infix(
        &self,
        operator: InfixOperator,
        rhs: &Object,
    ) -> Result<Object, RuntimeError> {
        match (self, rhs) {
            (Object::Integer(lhs), Object::Integer(rhs)) => integer_infix(*lhs, operator, *rhs),
            (Object::String(lhs), Object::String(rhs)) => string_infix(lhs, operator, rhs),
            (lhs, rhs) => match operator {
                InfixOperator::EqualEqual => Ok(Object::from_bool(lhs.is_identical(rhs))),
                InfixOperator::BangEqual => Ok(Object::from_bool(!lhs.is_identical(rhs))),
                _ if lhs.type_name() != rhs.type_name() => Err(RuntimeError::TypeMismatch {
                    lhs: lhs.type_name(),
                    operator,
                    rhs: rhs.type_name(),
                }),
                _ => Err(RuntimeError::UnknownInfixOperator {
                    lhs: lhs.type_name(),
                    operator,
                    rhs: rhs.type_name(),
                }),
            },
        }
    }
}

fn integer_infix(lhs: i64, operator: InfixOperator, rhs: i64) -> Result<Object, RuntimeError> {
    let result = match operator {
        InfixOperator::Add => Object::Integer(lhs.wrapping_add(rhs)),
        InfixOperator::Subtract => Object::Integer(lhs.wrapping_sub(rhs)),
        InfixOperator::Multiply => Object::Integer(lhs.wrapping_mul(rhs)),
        InfixOperator::Divide => {
            if rhs == 0 {
                return Err(RuntimeError::DivisionByZero);
            }
            Object::Integer(lhs.wrapping_div(rhs))
        }
        InfixOperator::LessThan => Object::from_bool(lhs < rhs),
        InfixOperator::GreaterThan => Object::from_bool(lhs > rhs),
        InfixOperator::EqualEqual => Object::from_bool(lhs == rhs),
        InfixOperator::BangEqual => Object::from_bool(lhs != rhs),
    };
    Ok(result)
}

fn string_infix(lhs: &str, operator: InfixOperator, rhs: &str) -> Result<Object, RuntimeError> {
    match operator {
        InfixOperator::Add => Ok(Object::String(format_compact!("{lhs}{rhs}"))),
        // Removes the first occurrence of `rhs`.
        InfixOperator::Subtract => match lhs.find(rhs) {
            Some(start) => {
                let end = start + rhs.len();
                Ok(Object::String(format_compact!(
                    "{}{}",
                    &lhs[..start],
                    &lhs[end..]
                )))
            }
            None => Err(RuntimeError::SubstringNotFound),
        },
        _ => Err(RuntimeError::UnknownInfixOperator {
            lhs: "String",
            operator,
            rhs: "String",
        }),
    }
}

/// Structural equality, used by tests and tooling. Functions still compare by reference.
impl PartialEq for Object {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Object::Integer(lhs), Object::Integer(rhs)) => lhs == rhs,
            (Object::String(lhs), Object::String(rhs)) => lhs == rhs,
            (Object::Boolean(lhs), Object::Boolean(rhs)) => lhs == rhs,
            (Object::Null, Object::Null) => true,
            (Object::Array(lhs), Object::Array(rhs)) => lhs == rhs,
            (Object::Map(lhs), Object::Map(rhs)) => lhs == rhs,
            (Object::Function(lhs), Object::Function(rhs)) => Rc::ptr_eq(lhs, rhs),
            (Object::Builtin(lhs), Object::Builtin(rhs)) => lhs.name == rhs.name,
            (Object::Return(lhs), Object::Return(rhs)) => lhs == rhs,
            (Object::Error(lhs), Object::Error(rhs)) => lhs == rhs,
            _ => false,
        }
    }
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

impl Display for Object {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Object::Integer(v) => write!(f, "{v}"),
            Object::String(v) => write!(f, "{v}"),
            Object::Boolean(v) => write!(f, "{v}"),
            Object::Null => write!(f, "null"),
            Object::Array(elements) => {
                write!(f, "[")?;
                write_separated(f, elements.iter())?;
                write!(f, "]")
            }
            Object::Map(entries) => {
                write!(f, "{{")?;
                write_separated(f, entries.iter().map(|(k, v)| format!("{k}: {v}")))?;
                write!(f, "}}")
            }
            Object::Function(function) => {
                write!(f, "fn(")?;
                write_separated(f, function.parameters())?;
                write!(f, ") {{\n{}\n}}", function.body())
            }
            Object::Builtin(builtin) => write!(f, "builtin function {}", builtin.name),
            Object::Return(inner) => write!(f, "{inner}"),
            Object::Error(error) => write!(f, "ERROR: {error}"),
        }
    }
}
