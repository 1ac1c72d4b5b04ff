use color_eyre::eyre::{Context, Result};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use std::{
    fs::{read_dir, read_to_string},
    path::Path,
};

use monkey::{
    ast::{Expression, InfixOperator, Statement},
    parser::{
        formatter::{BasicParserFormatter, ParserFormatter, PrettyParserFormatter},
        Parser, ParserErrorKind,
    },
    token::{Span, TokenKind},
};

fn render(input: &str) -> String {
    let formatter = BasicParserFormatter::new(input);
    let (program, errors) = Parser::new(input).parse();
    if errors.is_empty() {
        formatter.format(&program)
    } else {
        errors
            .iter()
            .map(|error| formatter.format_error(error))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn check(input: &str, expected: &str, test_name: &str) {
    assert_eq!(
        render(input).trim_end(),
        expected.trim_end(),
        "Failed the test {test_name}"
    );
}

#[test]
fn smoke_test() {
    check("", "", "smoke");
}

#[test]
fn test_let_statement_renders_canonically() {
    let (program, errors) = Parser::new("let a = 5 * 5; a;").parse();
    assert!(errors.is_empty());
    assert_eq!(program.len(), 2);
    assert_eq!(
        program.get_statement(0).map(|s| s.to_string()),
        Some("let a = (5 * 5);".to_string())
    );
}

#[test]
fn test_semicolons_are_optional() {
    check("let x = 1\nreturn x\nx", "let x = 1;\nreturn x;\nx", "semicolons");
}

#[test]
fn test_builds_expected_tree() {
    let (program, errors) = Parser::new("add(1, x)[0] + 2").parse();
    assert!(errors.is_empty());

    let Some(Statement::Expression(Expression::Infix { operator, lhs, rhs })) =
        program.get_statement(0)
    else {
        panic!("expected an infix expression statement");
    };
    assert_eq!(*operator, InfixOperator::Add);
    assert!(matches!(**lhs, Expression::Index { .. }));
    assert_eq!(**rhs, Expression::IntegerLiteral(2));
}

#[test]
fn test_object_literal() {
    let (program, errors) = Parser::new(r#"{"a": 1, b: [2], 3: fn(x) { x }}"#).parse();
    assert!(errors.is_empty(), "{errors:?}");

    let Some(Statement::Expression(Expression::ObjectLiteral(entries))) = program.get_statement(0)
    else {
        panic!("expected an object literal");
    };
    let keys: Vec<String> = entries.iter().map(|(key, _)| key.to_string()).collect();
    assert_eq!(keys, vec!["a", "b", "3"]);
    assert_eq!(program.to_string(), "{a: 1, b: [2], 3: fn(x) x}");
}

#[test]
fn test_empty_collections_and_trailing_commas() {
    check("[]; {}; f(); f(1,); [1, 2,];", "[]\n{}\nf()\nf(1)\n[1, 2]", "collections");
}

#[test]
fn test_unexpected_token_reports_peek_span() {
    let (_, errors) = Parser::new("let 5 = 1;").parse();
    assert_eq!(errors.len(), 1);
    assert_eq!(
        errors[0].kind,
        ParserErrorKind::UnexpectedToken {
            expected: TokenKind::Ident,
            actual: TokenKind::IntegerLiteral,
        }
    );
    assert_eq!(errors[0].span, Span::new(4, 1));
    assert_eq!(errors[0].to_string(), "Expected token type IDENT. Got INT instead");
    assert_eq!(errors[0].code(), "PE001");
}

#[test]
fn test_no_prefix_parse_function() {
    let (_, errors) = Parser::new("*5;").parse();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].to_string(), "no prefix parse function for token *");
}

#[test]
fn test_integer_out_of_range() {
    let (_, errors) = Parser::new("99999999999999999999;").parse();
    assert_eq!(errors.len(), 1);
    assert_eq!(
        errors[0].to_string(),
        "could not parse 99999999999999999999 as integer"
    );
}

#[test]
fn test_unclosed_block_reports_eof() {
    let (_, errors) = Parser::new("if (x) { 1").parse();
    assert_eq!(errors.len(), 1);
    assert_eq!(
        errors[0].to_string(),
        "Expected token type }. Got EOF instead"
    );
}

#[test]
fn test_recovery_keeps_later_statements() {
    let (program, errors) = Parser::new("let = 1; let y = 2; y").parse();
    assert_eq!(errors.len(), 1);
    assert_eq!(program.to_string(), "let y = 2;y");
}

#[test]
fn test_pretty_error_mentions_code_and_path() {
    let source = "let x 5;";
    let (_, errors) = Parser::new(source).parse();
    let formatter = PrettyParserFormatter::new("script.mk", source);
    let report = formatter.format_error(&errors[0]);

    assert!(report.contains("PE001"), "{report}");
    assert!(report.contains("script.mk"), "{report}");
}

#[test]
fn test_all() -> Result<()> {
    let input_dir = Path::new("./test_data/parser/in");
    let output_dir = Path::new("./test_data/parser/out");

    let mut succeeded = true;
    for entry in read_dir(input_dir).context("Failed to open input test data folder")? {
        let entry = entry?;
        let path = entry.path();

        let Some(extension) = path.extension() else {
            continue;
        };

        if extension != "mk" {
            continue;
        }

        let Some(test_name) = path.file_name().map(Path::new) else {
            continue;
        };

        let input = read_to_string(&path).context("Failed to open input test data file")?;

        let expected = {
            let output_path = output_dir.join(test_name.with_extension("txt"));
            read_to_string(output_path).context("Failed to open output test data file")?
        };

        let res = std::panic::catch_unwind(|| {
            check(&input, &expected, &test_name.to_string_lossy());
        });
        if res.is_err() {
            succeeded = false;
        }
    }

    assert!(succeeded, "At least one parser test case failed");
    Ok(())
}

// Property-based tests

#[derive(Debug, Clone)]
enum Arithmetic {
    Literal(u32),
    Binary(Box<Arithmetic>, &'static str, Box<Arithmetic>),
}

impl Arithmetic {
    /// Fully parenthesised, which is exactly the canonical rendering.
    fn render(&self) -> String {
        match self {
            Arithmetic::Literal(value) => value.to_string(),
            Arithmetic::Binary(lhs, op, rhs) => format!("({} {op} {})", lhs.render(), rhs.render()),
        }
    }

    /// Minimal parentheses, relying on precedence and left associativity.
    fn render_minimal(&self) -> String {
        fn binding(op: &str) -> u8 {
            match op {
                "*" | "/" => 2,
                _ => 1,
            }
        }
        match self {
            Arithmetic::Literal(value) => value.to_string(),
            Arithmetic::Binary(lhs, op, rhs) => {
                let lhs = match lhs.as_ref() {
                    Arithmetic::Binary(_, inner, _) if binding(inner) < binding(op) => {
                        format!("({})", lhs.render_minimal())
                    }
                    _ => lhs.render_minimal(),
                };
                let rhs = match rhs.as_ref() {
                    Arithmetic::Binary(_, inner, _) if binding(inner) <= binding(op) => {
                        format!("({})", rhs.render_minimal())
                    }
                    _ => rhs.render_minimal(),
                };
                format!("{lhs} {op} {rhs}")
            }
        }
    }
}

fn arithmetic_strategy() -> impl Strategy<Value = Arithmetic> {
    let leaf = (0u32..1000).prop_map(Arithmetic::Literal);
    leaf.prop_recursive(4, 32, 2, |inner| {
        (
            inner.clone(),
            prop_oneof![Just("+"), Just("-"), Just("*"), Just("/")],
            inner,
        )
            .prop_map(|(lhs, op, rhs)| Arithmetic::Binary(Box::new(lhs), op, Box::new(rhs)))
    })
}

proptest! {
    #[test]
    fn canonical_rendering_round_trips(expr in arithmetic_strategy()) {
        let source = expr.render();
        let (program, errors) = Parser::new(&source).parse();
        prop_assert!(errors.is_empty());
        prop_assert_eq!(program.to_string(), source);
    }

    #[test]
    fn precedence_restores_parentheses(expr in arithmetic_strategy()) {
        let (program, errors) = Parser::new(&expr.render_minimal()).parse();
        prop_assert!(errors.is_empty());
        prop_assert_eq!(program.to_string(), expr.render());
    }
}
