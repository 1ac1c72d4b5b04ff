pub mod builtin;
pub mod context;

use crate::{
    ast::{BlockStatement, Expression, FunctionLiteral, Program, Statement},
    environment::Environment,
    object::{error::RuntimeError, Function, Object, NULL},
};
use compact_str::ToCompactString;
pub use context::{BufferedContext, StdioContext};
use indexmap::IndexMap;
use std::rc::Rc;

/// Hands a `return` signal met mid-expression straight back to the caller,
/// the way `?` does for errors.
macro_rules! propagate_return {
    ($value:expr) => {
        match $value {
            signal @ Object::Return(_) => return Ok(signal),
            value => value,
        }
    };
}

/// Where `print` sends its output.
pub trait SystemContext {
    fn writeln(&mut self, text: &str);
}

/// Evaluates `program` in `environment`, printing to stdout.
///
/// Runtime errors come back as [`Object::Error`]; a top-level `return` is
/// unwrapped to its value.
pub fn evaluate(program: &Program, environment: &Environment) -> Object {
    evaluate_with_context(program, environment, &mut StdioContext)
}

pub fn evaluate_with_context(
    program: &Program,
    environment: &Environment,
    context: &mut dyn SystemContext,
) -> Object {
    let mut walker = TreeWalker { context };
    match walker.evaluate_program(program, environment) {
        Ok(value) => value,
        Err(error) => {
            tracing::debug!(%error, code = error.code(), "evaluation failed");
            Object::Error(error)
        }
    }
}

/// A session: one root environment reused across every program it evaluates.
pub struct Evaluator<C: SystemContext> {
    environment: Environment,
    context: C,
}

impl<C> Evaluator<C>
where
    C: SystemContext,
{
    pub fn new(context: C) -> Self {
        Self::with_environment(Environment::new(), context)
    }

    pub fn with_environment(environment: Environment, context: C) -> Self {
        Self {
            environment,
            context,
        }
    }

    pub fn evaluate(&mut self, program: &Program) -> Object {
        evaluate_with_context(program, &self.environment, &mut self.context)
    }

    pub fn into_context(self) -> C {
        self.context
    }
}

struct TreeWalker<'ctx> {
    context: &'ctx mut dyn SystemContext,
}

// Statements
impl<'ctx> TreeWalker<'ctx> {
    fn evaluate_program(
        &mut self,
        program: &Program,
        environment: &Environment,
    ) -> Result<Object, RuntimeError> {
        let mut result = NULL;
        for statement in program {
            result = self.evaluate_statement(statement, environment)?;
            if let Object::Return(value) = result {
                return Ok(*value);
            }
        }
        Ok(result)
    }

    /// Stops at the first `return`, handing the signal itself back to the caller.
    fn evaluate_block(
        &mut self,
        block: &BlockStatement,
        environment: &Environment,
    ) -> Result<Object, RuntimeError> {
        let mut result = NULL;
        for statement in block.statements.iter() {
            result = self.evaluate_statement(statement, environment)?;
            if matches!(result, Object::Return(_)) {
                break;
            }
        }
        Ok(result)
    }

    fn evaluate_statement(
        &mut self,
        statement: &Statement,
        environment: &Environment,
    ) -> Result<Object, RuntimeError> {
        match statement {
            Statement::Let { name, value } => {
                let value = propagate_return!(self.evaluate_expression(value, environment)?);
                environment.declare(name, value);
                Ok(NULL)
            }
            Statement::Return { value } => {
                let value = propagate_return!(self.evaluate_expression(value, environment)?);
                Ok(Object::Return(Box::new(value)))
            }
            Statement::Expression(expr) => self.evaluate_expression(expr, environment),
            Statement::Block(block) => self.evaluate_block(block, environment),
        }
    }
}

// Expressions
impl<'ctx> TreeWalker<'ctx> {
    fn evaluate_expression(
        &mut self,
        expr: &Expression,
        environment: &Environment,
    ) -> Result<Object, RuntimeError> {
        match expr {
            Expression::Identifier(name) => Self::evaluate_identifier(name, environment),
            Expression::IntegerLiteral(value) => Ok(Object::Integer(*value)),
            Expression::StringLiteral(value) => Ok(Object::String(value.clone())),
            Expression::Boolean(value) => Ok(Object::from_bool(*value)),
            Expression::ArrayLiteral(elements) => {
                let elements = match self.evaluate_expressions(elements, environment)? {
                    Ok(elements) => elements,
                    Err(signal) => return Ok(signal),
                };
                Ok(Object::Array(Rc::new(elements)))
            }
            Expression::ObjectLiteral(entries) => self.evaluate_object_literal(entries, environment),
            Expression::Prefix { operator, operand } => {
                let operand = propagate_return!(self.evaluate_expression(operand, environment)?);
                operand.apply_prefix(*operator)
            }
            Expression::Infix { operator, lhs, rhs } => {
                let lhs = propagate_return!(self.evaluate_expression(lhs, environment)?);
                let rhs = propagate_return!(self.evaluate_expression(rhs, environment)?);
                lhs.apply_infix(*operator, &rhs)
            }
            Expression::If {
                condition,
                consequence,
                alternative,
            } => {
                let condition = propagate_return!(self.evaluate_expression(condition, environment)?);
                if condition.is_truthy() {
                    self.evaluate_block(consequence, environment)
                } else if let Some(alternative) = alternative {
                    self.evaluate_block(alternative, environment)
                } else {
                    Ok(NULL)
                }
            }
            Expression::For { condition, body } => self.evaluate_for(condition, body, environment),
            Expression::FunctionLiteral(literal) => {
                Ok(Self::create_closure(literal, environment))
            }
            Expression::Call { callee, arguments } => {
                let callee = propagate_return!(self.evaluate_expression(callee, environment)?);
                let arguments = match self.evaluate_expressions(arguments, environment)? {
                    Ok(arguments) => arguments,
                    Err(signal) => return Ok(signal),
                };
                self.apply_function(callee, &arguments)
            }
            Expression::Index { collection, index } => {
                Self::evaluate_index(collection, index, environment)
            }
        }
    }

    /// Left to right, stopping at the first error or `return`. A `return`
    /// comes back as the inner `Err` so the caller can hand it on.
    fn evaluate_expressions(
        &mut self,
        exprs: &[Expression],
        environment: &Environment,
    ) -> Result<Result<Vec<Object>, Object>, RuntimeError> {
        let mut values = Vec::with_capacity(exprs.len());
        for expr in exprs.iter() {
            match self.evaluate_expression(expr, environment)? {
                signal @ Object::Return(_) => return Ok(Err(signal)),
                value => values.push(value),
            }
        }
        Ok(Ok(values))
    }

    fn evaluate_identifier(name: &str, environment: &Environment) -> Result<Object, RuntimeError> {
        environment
            .access(name)
            .or_else(|| builtin::lookup(name).map(Object::Builtin))
            .ok_or_else(|| RuntimeError::UndefinedVariable(name.to_compact_string()))
    }

    fn evaluate_object_literal(
        &mut self,
        entries: &[(Expression, Expression)],
        environment: &Environment,
    ) -> Result<Object, RuntimeError> {
        let mut map = IndexMap::with_capacity(entries.len());
        for (key, value) in entries.iter() {
            let value = propagate_return!(self.evaluate_expression(value, environment)?);
            map.insert(key.to_compact_string(), value);
        }
        Ok(Object::Map(Rc::new(map)))
    }

    fn evaluate_for(
        &mut self,
        condition: &Expression,
        body: &BlockStatement,
        environment: &Environment,
    ) -> Result<Object, RuntimeError> {
        let mut result = NULL;
        loop {
            let value = propagate_return!(self.evaluate_expression(condition, environment)?);
            if !value.is_truthy() {
                break;
            }
            result = self.evaluate_block(body, environment)?;
            if matches!(result, Object::Return(_)) {
                break;
            }
        }
        Ok(result)
    }

    fn create_closure(literal: &Rc<FunctionLiteral>, environment: &Environment) -> Object {
        Object::Function(Rc::new(Function {
            literal: Rc::clone(literal),
            closure: environment.clone(),
        }))
    }

    fn apply_function(
        &mut self,
        callee: Object,
        arguments: &[Object],
    ) -> Result<Object, RuntimeError> {
        match callee {
            Object::Function(function) => {
                let parameters = function.parameters();
                if parameters.len() != arguments.len() {
                    return Err(RuntimeError::InvalidArgumentCount {
                        actual: arguments.len(),
                        expected: parameters.len(),
                    });
                }
                tracing::trace!(arity = parameters.len(), "calling function");

                let scope = function.closure.new_scope();
                for (parameter, argument) in parameters.iter().zip(arguments) {
                    scope.declare(parameter, argument.clone());
                }
                match self.evaluate_block(function.body(), &scope)? {
                    Object::Return(value) => Ok(*value),
                    value => Ok(value),
                }
            }
            Object::Builtin(builtin) => {
                tracing::trace!(name = builtin.name, "calling builtin");
                (builtin.function)(arguments, &mut *self.context)
            }
            other => Err(RuntimeError::NotAFunction(other.type_name())),
        }
    }

    /// The collection is looked up by its rendered name and the index is never
    /// evaluated: arrays take its text as an integer, maps as a key.
    fn evaluate_index(
        collection: &Expression,
        index: &Expression,
        environment: &Environment,
    ) -> Result<Object, RuntimeError> {
        let name = collection.to_compact_string();
        let Some(value) = environment.access(&name) else {
            return Err(RuntimeError::CollectionNotFound(name));
        };
        let key = index.to_compact_string();

        match value {
            Object::Array(elements) => {
                let position: i64 = key.parse().map_err(|_| RuntimeError::NonIntegerIndex)?;
                usize::try_from(position)
                    .ok()
                    .and_then(|position| elements.get(position))
                    .cloned()
                    .ok_or(RuntimeError::IndexOutOfBounds)
            }
            Object::Map(entries) => Ok(entries.get(key.as_str()).cloned().unwrap_or(NULL)),
            _ => Err(RuntimeError::NonIndexable),
        }
    }
}
