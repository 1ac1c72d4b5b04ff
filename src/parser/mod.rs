mod error;
pub mod formatter;
mod precedence;

use crate::{
    ast::{
        BlockStatement, Expression, FunctionLiteral, InfixOperator, PrefixOperator, Program,
        Statement,
    },
    lexer::Lexer,
    token::{Token, TokenKind},
};
use compact_str::CompactString;
pub use error::{ParserError, ParserErrorKind};
pub use precedence::{Precedence, PRECEDENCES};
use std::{collections::HashMap, rc::Rc};

pub type PrefixParseFn<'src> = fn(&mut Parser<'src>) -> Result<Expression, ParserError>;
pub type InfixParseFn<'src> = fn(&mut Parser<'src>, Expression) -> Result<Expression, ParserError>;

/// Recursive descent for statements, Pratt parsing for expressions.
///
/// The parser keeps the current token and one token of lookahead. Errors do not
/// abort the parse: they are collected and the parser skips ahead to the next
/// `;` before carrying on, so callers must check the errors returned by
/// [`Parser::parse`] before trusting the resulting [`Program`].
pub struct Parser<'src> {
    lexer: Lexer<'src>,
    current: Token,
    peek: Token,
    errors: Vec<ParserError>,
    prefix_parse_fns: HashMap<TokenKind, PrefixParseFn<'src>>,
    infix_parse_fns: HashMap<TokenKind, InfixParseFn<'src>>,
}

impl<'src> Parser<'src> {
    pub fn new(source: &'src str) -> Self {
        Self::from_lexer(Lexer::new(source))
    }

    pub fn from_lexer(lexer: Lexer<'src>) -> Self {
        let mut parser = Self {
            lexer,
            current: Token::eof(0),
            peek: Token::eof(0),
            errors: Vec::new(),
            prefix_parse_fns: HashMap::new(),
            infix_parse_fns: HashMap::new(),
        };

        parser.register_prefix(TokenKind::Ident, Self::parse_identifier);
        parser.register_prefix(TokenKind::IntegerLiteral, Self::parse_integer_literal);
        parser.register_prefix(TokenKind::StringLiteral, Self::parse_string_literal);
        parser.register_prefix(TokenKind::KeywordTrue, Self::parse_boolean);
        parser.register_prefix(TokenKind::KeywordFalse, Self::parse_boolean);
        parser.register_prefix(TokenKind::Bang, Self::parse_prefix_expression);
        parser.register_prefix(TokenKind::Minus, Self::parse_prefix_expression);
        parser.register_prefix(TokenKind::LeftParenthesis, Self::parse_grouped_expression);
        parser.register_prefix(TokenKind::KeywordIf, Self::parse_if_expression);
        parser.register_prefix(TokenKind::KeywordFor, Self::parse_for_expression);
        parser.register_prefix(TokenKind::KeywordFn, Self::parse_function_literal);
        parser.register_prefix(TokenKind::LeftBracket, Self::parse_array_literal);
        parser.register_prefix(TokenKind::LeftBrace, Self::parse_object_literal);

        for kind in [
            TokenKind::Plus,
            TokenKind::Minus,
            TokenKind::Star,
            TokenKind::Slash,
            TokenKind::LessThan,
            TokenKind::GreaterThan,
            TokenKind::EqualEqual,
            TokenKind::BangEqual,
        ] {
            parser.register_infix(kind, Self::parse_infix_expression);
        }
        parser.register_infix(TokenKind::LeftParenthesis, Self::parse_call_expression);
        parser.register_infix(TokenKind::LeftBracket, Self::parse_index_expression);

        // Fill both `current` and `peek`.
        parser.next_token();
        parser.next_token();
        parser
    }

    pub fn register_prefix(&mut self, kind: TokenKind, function: PrefixParseFn<'src>) {
        self.prefix_parse_fns.insert(kind, function);
    }

    pub fn register_infix(&mut self, kind: TokenKind, function: InfixParseFn<'src>) {
        self.infix_parse_fns.insert(kind, function);
    }

    /// Parses the whole input, returning the program alongside every error hit on the way.
    pub fn parse(mut self) -> (Program, Vec<ParserError>) {
        let program = self.parse_program();
        (program, self.errors)
    }
}

// Token cursor
impl<'src> Parser<'src> {
    fn next_token(&mut self) {
        let next = self.lexer.next_token();
        self.current = std::mem::replace(&mut self.peek, next);
    }

    fn current_is(&self, kind: TokenKind) -> bool {
        self.current.kind == kind
    }

    fn peek_is(&self, kind: TokenKind) -> bool {
        self.peek.kind == kind
    }

    fn expect_peek(&mut self, expected: TokenKind) -> Result<(), ParserError> {
        if self.peek_is(expected) {
            self.next_token();
            Ok(())
        } else {
            Err(ParserError {
                kind: ParserErrorKind::UnexpectedToken {
                    expected,
                    actual: self.peek.kind,
                },
                span: self.peek.span,
            })
        }
    }

    fn eat_peek(&mut self, kind: TokenKind) -> bool {
        if self.peek_is(kind) {
            self.next_token();
            true
        } else {
            false
        }
    }

    fn peek_precedence(&self) -> Precedence {
        Precedence::of(self.peek.kind)
    }

    fn current_precedence(&self) -> Precedence {
        Precedence::of(self.current.kind)
    }

    fn error_at_current(&self, kind: ParserErrorKind) -> ParserError {
        ParserError {
            kind,
            span: self.current.span,
        }
    }

    /// Skips tokens until the end of the malformed statement.
    fn synchronize(&mut self) {
        while !self.current_is(TokenKind::Semicolon) && !self.current_is(TokenKind::Eof) {
            self.next_token();
        }
    }
}

// Parse program/statements
impl<'src> Parser<'src> {
    pub fn parse_program(&mut self) -> Program {
        let mut statements = Vec::new();

        while !self.current_is(TokenKind::Eof) {
            match self.parse_statement() {
                Ok(statement) => statements.push(statement),
                Err(error) => {
                    tracing::debug!(%error, code = error.code(), "skipping malformed statement");
                    self.errors.push(error);
                    self.synchronize();
                }
            }
            self.next_token();
        }

        tracing::debug!(
            statements = statements.len(),
            errors = self.errors.len(),
            "parsed program"
        );
        Program::new(statements)
    }

    fn parse_statement(&mut self) -> Result<Statement, ParserError> {
        match self.current.kind {
            TokenKind::KeywordLet => self.parse_let_statement(),
            TokenKind::KeywordReturn => self.parse_return_statement(),
            _ => self.parse_expression_statement(),
        }
    }

    fn parse_let_statement(&mut self) -> Result<Statement, ParserError> {
        self.expect_peek(TokenKind::Ident)?;
        let name = self.current.literal.clone();
        self.expect_peek(TokenKind::Assign)?;
        self.next_token();

        let value = self.parse_expression(Precedence::Lowest)?;
        self.eat_peek(TokenKind::Semicolon);
        Ok(Statement::Let { name, value })
    }

    fn parse_return_statement(&mut self) -> Result<Statement, ParserError> {
        self.next_token();

        let value = self.parse_expression(Precedence::Lowest)?;
        self.eat_peek(TokenKind::Semicolon);
        Ok(Statement::Return { value })
    }

    fn parse_expression_statement(&mut self) -> Result<Statement, ParserError> {
        let expr = self.parse_expression(Precedence::Lowest)?;
        self.eat_peek(TokenKind::Semicolon);
        Ok(Statement::Expression(expr))
    }

    /// Expects the current token to be `{` and leaves the parser on the matching `}`.
    fn parse_block_statement(&mut self) -> Result<BlockStatement, ParserError> {
        let mut statements = Vec::new();
        self.next_token();

        while !self.current_is(TokenKind::RightBrace) {
            if self.current_is(TokenKind::Eof) {
                return Err(self.error_at_current(ParserErrorKind::UnexpectedToken {
                    expected: TokenKind::RightBrace,
                    actual: TokenKind::Eof,
                }));
            }
            statements.push(self.parse_statement()?);
            self.next_token();
        }

        Ok(BlockStatement { statements })
    }
}

// Pratt parser for expressions
impl<'src> Parser<'src> {
    pub fn parse_expression(&mut self, precedence: Precedence) -> Result<Expression, ParserError> {
        let Some(prefix) = self.prefix_parse_fns.get(&self.current.kind).copied() else {
            return Err(
                self.error_at_current(ParserErrorKind::NoPrefixParseFunction(self.current.kind))
            );
        };
        let mut lhs = prefix(self)?;

        while !self.peek_is(TokenKind::Semicolon) && precedence < self.peek_precedence() {
            let Some(infix) = self.infix_parse_fns.get(&self.peek.kind).copied() else {
                return Ok(lhs);
            };
            self.next_token();
            lhs = infix(self, lhs)?;
        }

        Ok(lhs)
    }

    fn parse_identifier(&mut self) -> Result<Expression, ParserError> {
        Ok(Expression::Identifier(self.current.literal.clone()))
    }

    fn parse_integer_literal(&mut self) -> Result<Expression, ParserError> {
        self.current
            .literal
            .parse()
            .map(Expression::IntegerLiteral)
            .map_err(|_| {
                self.error_at_current(ParserErrorKind::InvalidInteger(
                    self.current.literal.clone(),
                ))
            })
    }

    fn parse_string_literal(&mut self) -> Result<Expression, ParserError> {
        Ok(Expression::StringLiteral(self.current.literal.clone()))
    }

    fn parse_boolean(&mut self) -> Result<Expression, ParserError> {
        Ok(Expression::Boolean(self.current_is(TokenKind::KeywordTrue)))
    }

    fn parse_prefix_expression(&mut self) -> Result<Expression, ParserError> {
        let operator = match self.current.kind {
            TokenKind::Bang => PrefixOperator::Bang,
            TokenKind::Minus => PrefixOperator::Minus,
            kind => return Err(self.error_at_current(ParserErrorKind::NonOperator(kind))),
        };
        self.next_token();

        let operand = self.parse_expression(Precedence::Prefix)?;
        Ok(Expression::Prefix {
            operator,
            operand: Box::new(operand),
        })
    }

    fn parse_infix_expression(&mut self, lhs: Expression) -> Result<Expression, ParserError> {
        let operator = match self.current.kind {
            TokenKind::Plus => InfixOperator::Add,
            TokenKind::Minus => InfixOperator::Subtract,
            TokenKind::Star => InfixOperator::Multiply,
            TokenKind::Slash => InfixOperator::Divide,
            TokenKind::LessThan => InfixOperator::LessThan,
            TokenKind::GreaterThan => InfixOperator::GreaterThan,
            TokenKind::EqualEqual => InfixOperator::EqualEqual,
            TokenKind::BangEqual => InfixOperator::BangEqual,
            kind => return Err(self.error_at_current(ParserErrorKind::NonOperator(kind))),
        };
        let precedence = self.current_precedence();
        self.next_token();

        let rhs = self.parse_expression(precedence)?;
        Ok(Expression::Infix {
            operator,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        })
    }

    fn parse_grouped_expression(&mut self) -> Result<Expression, ParserError> {
        self.next_token();

        let inner = self.parse_expression(Precedence::Lowest)?;
        self.expect_peek(TokenKind::RightParenthesis)?;
        Ok(inner)
    }

    fn parse_if_expression(&mut self) -> Result<Expression, ParserError> {
        self.expect_peek(TokenKind::LeftParenthesis)?;
        self.next_token();
        let condition = self.parse_expression(Precedence::Lowest)?;
        self.expect_peek(TokenKind::RightParenthesis)?;

        self.expect_peek(TokenKind::LeftBrace)?;
        let consequence = self.parse_block_statement()?;

        let alternative = if self.eat_peek(TokenKind::KeywordElse) {
            self.expect_peek(TokenKind::LeftBrace)?;
            Some(self.parse_block_statement()?)
        } else {
            None
        };

        Ok(Expression::If {
            condition: Box::new(condition),
            consequence,
            alternative,
        })
    }

    fn parse_for_expression(&mut self) -> Result<Expression, ParserError> {
        self.expect_peek(TokenKind::LeftParenthesis)?;
        self.next_token();
        let condition = self.parse_expression(Precedence::Lowest)?;
        self.expect_peek(TokenKind::RightParenthesis)?;

        self.expect_peek(TokenKind::LeftBrace)?;
        let body = self.parse_block_statement()?;

        Ok(Expression::For {
            condition: Box::new(condition),
            body,
        })
    }

    fn parse_function_literal(&mut self) -> Result<Expression, ParserError> {
        self.expect_peek(TokenKind::LeftParenthesis)?;
        let parameters = self.parse_function_parameters()?;

        self.expect_peek(TokenKind::LeftBrace)?;
        let body = self.parse_block_statement()?;

        Ok(Expression::FunctionLiteral(Rc::new(FunctionLiteral {
            parameters,
            body,
        })))
    }

    fn parse_function_parameters(&mut self) -> Result<Vec<CompactString>, ParserError> {
        let mut parameters = Vec::new();

        while !self.peek_is(TokenKind::RightParenthesis) {
            self.expect_peek(TokenKind::Ident)?;
            parameters.push(self.current.literal.clone());
            if !self.peek_is(TokenKind::RightParenthesis) {
                self.expect_peek(TokenKind::Comma)?;
            }
        }

        self.expect_peek(TokenKind::RightParenthesis)?;
        Ok(parameters)
    }

    fn parse_array_literal(&mut self) -> Result<Expression, ParserError> {
        let elements = self.parse_expression_list(TokenKind::RightBracket)?;
        Ok(Expression::ArrayLiteral(elements))
    }

    fn parse_object_literal(&mut self) -> Result<Expression, ParserError> {
        let mut entries = Vec::new();

        while !self.peek_is(TokenKind::RightBrace) {
            self.next_token();
            let key = self.parse_expression(Precedence::Lowest)?;
            self.expect_peek(TokenKind::Colon)?;
            self.next_token();
            let value = self.parse_expression(Precedence::Lowest)?;
            entries.push((key, value));

            if !self.peek_is(TokenKind::RightBrace) {
                self.expect_peek(TokenKind::Comma)?;
            }
        }

        self.expect_peek(TokenKind::RightBrace)?;
        Ok(Expression::ObjectLiteral(entries))
    }

    fn parse_call_expression(&mut self, callee: Expression) -> Result<Expression, ParserError> {
        let arguments = self.parse_expression_list(TokenKind::RightParenthesis)?;
        Ok(Expression::Call {
            callee: Box::new(callee),
            arguments,
        })
    }

    fn parse_index_expression(&mut self, collection: Expression) -> Result<Expression, ParserError> {
        self.next_token();

        let index = self.parse_expression(Precedence::Lowest)?;
        self.expect_peek(TokenKind::RightBracket)?;
        Ok(Expression::Index {
            collection: Box::new(collection),
            index: Box::new(index),
        })
    }

    /// Comma separated expressions up to `end`. A trailing comma is allowed.
    fn parse_expression_list(&mut self, end: TokenKind) -> Result<Vec<Expression>, ParserError> {
        let mut list = Vec::new();

        while !self.peek_is(end) {
            self.next_token();
            list.push(self.parse_expression(Precedence::Lowest)?);
            if !self.peek_is(end) {
                self.expect_peek(TokenKind::Comma)?;
            }
        }

        self.expect_peek(end)?;
        Ok(list)
    }
}
