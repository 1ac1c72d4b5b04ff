use crate::token::TokenKind;
use std::collections::HashMap;
use std::sync::LazyLock;

/// Binding power of an operator, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
    Lowest,
    /// `==` and `!=`
    Equals,
    /// `<` and `>`
    LessGreater,
    /// `+` and `-`
    Sum,
    /// `*` and `/`
    Product,
    /// `!x` and `-x`
    Prefix,
    /// `f(x)` and `a[i]`
    Call,
}

pub static PRECEDENCES: LazyLock<HashMap<TokenKind, Precedence>> = LazyLock::new(|| {
    let mut map = HashMap::new();
    map.insert(TokenKind::EqualEqual, Precedence::Equals);
    map.insert(TokenKind::BangEqual, Precedence::Equals);
    map.insert(TokenKind::LessThan, Precedence::LessGreater);
    map.insert(TokenKind::GreaterThan, Precedence::LessGreater);
    map.insert(TokenKind::Plus, Precedence::Sum);
    map.insert(TokenKind::Minus, Precedence::Sum);
    map.insert(TokenKind::Star, Precedence::Product);
    map.insert(TokenKind::Slash, Precedence::Product);
    map.insert(TokenKind::LeftParenthesis, Precedence::Call);
    map.insert(TokenKind::LeftBracket, Precedence::Call);
    map
});

impl Precedence {
    /// Tokens that never continue an expression bind at [`Precedence::Lowest`].
    pub fn of(kind: TokenKind) -> Precedence {
        PRECEDENCES
            .get(&kind)
            .copied()
            .unwrap_or(Precedence::Lowest)
    }
}
