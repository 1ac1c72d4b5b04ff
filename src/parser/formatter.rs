use super::{ParserError, ParserErrorKind};
use crate::{ast::Program, lexer::LineBreaks};
use ariadne::{Color, Label, Report, ReportKind, Source};
use std::io::Cursor;

pub trait ParserFormatter {
    fn format(&self, program: &Program) -> String;
    fn format_error(&self, error: &ParserError) -> String;
}

pub struct DebugParserFormatter;

impl ParserFormatter for DebugParserFormatter {
    fn format(&self, program: &Program) -> String {
        format!("{program:#?}")
    }

    fn format_error(&self, error: &ParserError) -> String {
        format!("{error:?}")
    }
}

/// Canonical rendering, one top-level statement per line.
pub struct BasicParserFormatter {
    line_breaks: LineBreaks,
}

impl BasicParserFormatter {
    pub fn new(text: &str) -> Self {
        Self {
            line_breaks: LineBreaks::new(text),
        }
    }
}

impl ParserFormatter for BasicParserFormatter {
    fn format(&self, program: &Program) -> String {
        program
            .iter()
            .map(|statement| statement.to_string())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn format_error(&self, error: &ParserError) -> String {
        let line = self.line_breaks.get_line_from_span(error.span);
        format!("[line {line}] {error}")
    }
}

/// Source-annotated error reports.
pub struct PrettyParserFormatter<'src> {
    path: &'src str,
    text: &'src str,
}

impl<'src> PrettyParserFormatter<'src> {
    pub fn new(path: &'src str, text: &'src str) -> Self {
        Self { path, text }
    }
}

impl<'src> ParserFormatter for PrettyParserFormatter<'src> {
    fn format(&self, program: &Program) -> String {
        BasicParserFormatter::new(self.text).format(program)
    }

    fn format_error(&self, error: &ParserError) -> String {
        let path = self.path;
        let span = error.span.range();
        let (message, label) = match &error.kind {
            ParserErrorKind::UnexpectedToken { expected, actual } => (
                "Expected a different token",
                format!("Expected {expected} but got {actual}"),
            ),
            ParserErrorKind::NoPrefixParseFunction(kind) => (
                "Expected the start of an expression",
                format!("{kind} cannot begin an expression"),
            ),
            ParserErrorKind::NonOperator(kind) => {
                ("Expected an operator", format!("{kind} is not an operator"))
            }
            ParserErrorKind::InvalidInteger(literal) => (
                "Integer literal out of range",
                format!("{literal} does not fit in a 64-bit integer"),
            ),
        };

        let mut output = Cursor::new(Vec::new());
        let written = Report::build(ReportKind::Error, (path, span.clone()))
            .with_code(error.code())
            .with_message(message)
            .with_label(
                Label::new((path, span))
                    .with_message(label)
                    .with_color(Color::BrightRed),
            )
            .finish()
            .write((path, Source::from(self.text)), &mut output);

        match written {
            Ok(()) => String::from_utf8_lossy(&output.into_inner()).into_owned(),
            Err(_) => error.to_string(),
        }
    }
}
