use color_eyre::eyre::{Context, Result};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use std::{
    fs::{read_dir, read_to_string},
    path::Path,
};

use monkey::{
    lexer::{
        formatter::{BasicFormatter, LineFormatter, ToFormatter, TokenFormatter},
        Lexer,
    },
    token::{lookup_identifier, Span, Token, TokenKind},
};

fn format_all<F: TokenFormatter>(lexer: &mut Lexer, formatter: &F) -> String {
    let mut buffer = String::new();
    loop {
        let token = lexer.next_token();
        buffer.push_str(&formatter.format(&token));
        buffer.push('\n');
        if matches!(token.kind, TokenKind::Eof) {
            break;
        }
    }
    buffer
}

fn check(input: &str, expected: &str, test_name: &str) {
    let mut lexer = Lexer::new(input);
    let formatter: BasicFormatter = lexer.create_formatter();
    let actual = format_all(&mut lexer, &formatter);

    assert_eq!(
        actual.trim_end(),
        expected.trim_end(),
        "Failed the test {test_name}"
    );
}

#[test]
fn smoke_test() {
    check("", "EOF", "smoke");
}

#[test]
fn test_two_character_operators() {
    check("= == ! != =!", "= =\n== ==\n! !\n!= !=\n= =\n! !\nEOF", "operators");
}

#[test]
fn test_keywords_and_identifiers() {
    check(
        "let fn if else for return true false letter",
        "LET let\nFUNCTION fn\nIF if\nELSE else\nFOR for\nRETURN return\nTRUE true\nFALSE false\nIDENT letter\nEOF",
        "keywords",
    );
}

#[test]
fn test_string_literal_span_covers_quotes() {
    let mut lexer = Lexer::new(r#"  "hi there" "#);
    assert_eq!(
        lexer.next_token(),
        Token::new(TokenKind::StringLiteral, "hi there", Span::new(2, 10))
    );
    assert_eq!(lexer.next_token().kind, TokenKind::Eof);
}

#[test]
fn test_numbers_have_no_sign_or_fraction() {
    check("-12.5", "- -\nINT 12\nILLEGAL .\nINT 5\nEOF", "numbers");
}

#[test]
fn test_line_formatter() {
    let input = "let a = 1;\n\na";
    let mut lexer = Lexer::new(input);
    let formatter: LineFormatter = lexer.create_formatter();
    let actual = format_all(&mut lexer, &formatter);

    assert_eq!(
        actual,
        "(1) LET let\n(1) IDENT a\n(1) = =\n(1) INT 1\n(1) ; ;\n(3) IDENT a\n(3) EOF\n"
    );
}

#[test]
fn test_all() -> Result<()> {
    let input_dir = Path::new("./test_data/lexer/in");
    let output_dir = Path::new("./test_data/lexer/out");

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

    assert!(succeeded, "At least one lexer test case failed");
    Ok(())
}

// Property-based tests

proptest! {
    #[test]
    fn lexer_keeps_returning_eof(input in "\\PC{0,64}") {
        let mut lexer = Lexer::new(&input);
        let mut remaining = input.chars().count() + 1;
        loop {
            prop_assert!(remaining > 0, "lexer did not reach EOF");
            remaining -= 1;
            if lexer.next_token().kind == TokenKind::Eof {
                break;
            }
        }
        for _ in 0..3 {
            prop_assert_eq!(lexer.next_token().kind, TokenKind::Eof);
        }
    }

    #[test]
    fn lexer_reads_whole_digit_runs(digits in "[0-9]{1,18}") {
        let mut lexer = Lexer::new(&digits);
        let token = lexer.next_token();
        prop_assert_eq!(token.kind, TokenKind::IntegerLiteral);
        prop_assert_eq!(token.literal.as_str(), digits.as_str());
        prop_assert_eq!(lexer.next_token().kind, TokenKind::Eof);
    }

    #[test]
    fn lexer_reads_whole_letter_runs(word in "[a-zA-Z]{1,12}") {
        let input = format!(" {word}\t");
        let mut lexer = Lexer::new(&input);
        let token = lexer.next_token();
        prop_assert_eq!(token.kind, lookup_identifier(&word));
        prop_assert_eq!(token.literal.as_str(), word.as_str());
        prop_assert_eq!(token.span, Span::new(1, word.len()));
    }
}
