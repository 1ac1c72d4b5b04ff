mod cursor;
pub mod formatter;

use crate::token::{lookup_identifier, Span, Token, TokenKind};
use cursor::SourceChar;
use std::{iter::Peekable, ops::Range, rc::Rc, str::CharIndices};

#[derive(Debug, Clone)]
pub struct LineBreaks {
    line_breaks: Rc<[Range<usize>]>,
}

impl LineBreaks {
    pub fn new(text: &str) -> Self {
        let line_breaks = if !text.is_empty() {
            let mut line_breaks = Vec::new();
            let mut cursor = 0;
            for (offset, byte) in text.bytes().enumerate() {
                let offset = offset + 1;
                if byte == b'\n' {
                    line_breaks.push(cursor..offset);
                    cursor = offset;
                }
            }
            if !text.ends_with('\n') {
                line_breaks.push(cursor..text.len() + 1);
            }
            line_breaks
        } else {
            vec![0..1]
        };
        Self {
            line_breaks: line_breaks.into(),
        }
    }

    pub fn get_max_line(&self) -> u32 {
        (self.line_breaks.len() + 1) as u32
    }

    pub fn get_line(&self, offset: usize) -> u32 {
        self.line_breaks
            .binary_search_by(|r| {
                if offset < r.start {
                    std::cmp::Ordering::Greater
                } else if offset >= r.end {
                    std::cmp::Ordering::Less
                } else {
                    std::cmp::Ordering::Equal
                }
            })
            .map(|v| (v + 1) as u32)
            .unwrap_or(self.get_max_line())
    }

    pub fn get_line_from_span(&self, span: Span) -> u32 {
        self.get_line(span.start as usize)
    }
}

/// On-demand scanner. Every call to [`Lexer::next_token`] consumes exactly one
/// token's worth of input; once the input is exhausted it keeps returning `EOF`.
#[derive(Debug)]
pub struct Lexer<'src> {
    source: &'src str,
    chars: Peekable<CharIndices<'src>>,
    line_breaks: LineBreaks,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            chars: source.char_indices().peekable(),
            line_breaks: LineBreaks::new(source),
        }
    }

    pub fn get_line_breaks(&self) -> LineBreaks {
        self.line_breaks.clone()
    }
}

impl<'src> Lexer<'src> {
    fn next_char(&mut self) -> Option<SourceChar> {
        self.chars
            .next()
            .map(|(offset, value)| SourceChar { value, offset })
    }

    fn peek_char(&mut self) -> Option<char> {
        self.chars.peek().map(|(_, c)| *c)
    }

    fn eat_if(&mut self, expected: char) -> Option<SourceChar> {
        if self.peek_char() == Some(expected) {
            self.next_char()
        } else {
            None
        }
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek_char(), Some(' ' | '\t' | '\r' | '\n')) {
            let _ = self.next_char();
        }
    }

    fn emit(&self, kind: TokenKind, start: usize, end: usize) -> Token {
        Token::new(kind, &self.source[start..end], Span::new(start, end - start))
    }

    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace();

        let Some(current) = self.next_char() else {
            return Token::eof(self.source.len());
        };

        let start = current.offset;
        let end = current.next_offset();
        match current.value {
            '=' => match self.eat_if('=') {
                Some(second) => self.emit(TokenKind::EqualEqual, start, second.next_offset()),
                None => self.emit(TokenKind::Assign, start, end),
            },
            '!' => match self.eat_if('=') {
                Some(second) => self.emit(TokenKind::BangEqual, start, second.next_offset()),
                None => self.emit(TokenKind::Bang, start, end),
            },
            '+' => self.emit(TokenKind::Plus, start, end),
            '-' => self.emit(TokenKind::Minus, start, end),
            '*' => self.emit(TokenKind::Star, start, end),
            '/' => self.emit(TokenKind::Slash, start, end),
            '<' => self.emit(TokenKind::LessThan, start, end),
            '>' => self.emit(TokenKind::GreaterThan, start, end),
            ',' => self.emit(TokenKind::Comma, start, end),
            ';' => self.emit(TokenKind::Semicolon, start, end),
            ':' => self.emit(TokenKind::Colon, start, end),
            '(' => self.emit(TokenKind::LeftParenthesis, start, end),
            ')' => self.emit(TokenKind::RightParenthesis, start, end),
            '{' => self.emit(TokenKind::LeftBrace, start, end),
            '}' => self.emit(TokenKind::RightBrace, start, end),
            '[' => self.emit(TokenKind::LeftBracket, start, end),
            ']' => self.emit(TokenKind::RightBracket, start, end),
            '"' => self.lex_string(current),
            c if c.is_ascii_alphabetic() => {
                let end = self.consume_while(end, |c| c.is_ascii_alphabetic());
                let kind = lookup_identifier(&self.source[start..end]);
                self.emit(kind, start, end)
            }
            c if c.is_ascii_digit() => {
                let end = self.consume_while(end, |c| c.is_ascii_digit());
                self.emit(TokenKind::IntegerLiteral, start, end)
            }
            _ => self.emit(TokenKind::Illegal, start, end),
        }
    }

    /// Consumes the maximal run of characters matching `predicate` and returns
    /// the offset one past the last consumed character.
    fn consume_while(&mut self, mut end: usize, predicate: impl Fn(char) -> bool) -> usize {
        while let Some(c) = self.peek_char() {
            if !predicate(c) {
                break;
            }
            if let Some(consumed) = self.next_char() {
                end = consumed.next_offset();
            }
        }
        end
    }

    fn lex_string(&mut self, opening: SourceChar) -> Token {
        let start = opening.offset;
        let contents_start = opening.next_offset();
        while let Some(c) = self.next_char() {
            if c.value == '"' {
                let end = c.next_offset();
                return Token::new(
                    TokenKind::StringLiteral,
                    &self.source[contents_start..c.offset],
                    Span::new(start, end - start),
                );
            }
        }
        // Unterminated: everything up to the end of input is the literal.
        let end = self.source.len();
        Token::new(
            TokenKind::Illegal,
            &self.source[start..end],
            Span::new(start, end - start),
        )
    }
}
