//! Token definitions for the Vie template language.
//!
//! A token is a `(kind, start, end)` triple over the original input buffer.
//! Tokens never own their text; use [`Token::text`] to slice it back out of
//! the source they were produced from.
//!
//! # Token Categories
//!
//! - **Delimiters**: tag openers and closers (`{{`, `}}`, `{%`, `%}`, `{#`, `#}`)
//! - **Punctuation**: `(`, `)`, `,`
//! - **Operators**: `!`, `!=`, `==`, `|`, `~`
//! - **Keywords**: `and`, `or`, `if`, `elseif`, `else`, `end`, `true`, `false`,
//!   and the reserved `switch` / `case`
//! - **Terminals**: identifiers, string literals, raw text, comment bodies,
//!   end-of-file and lexical errors
//!
//! # Examples
//!
//! ```rust
//! use vie_syntax::{Token, TokenKind};
//!
//! let src = b"{{ name }}";
//! let ident = Token { kind: TokenKind::Identifier, start: 3, end: 7 };
//! assert_eq!(ident.text(src), b"name");
//! ```

use std::fmt;

/// Token types that can be produced by the Vie lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // === Delimiters ===
    /// `{{`
    LDoubleBrace,
    /// `}}`
    RDoubleBrace,
    /// `{%`
    LBracePercent,
    /// `%}`
    RBracePercent,
    /// `{#`
    LBracePound,
    /// `#}`
    RBracePound,

    // === Punctuation ===
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `,` separating call arguments and case patterns
    Comma,

    // === Operators ===
    /// Logical NOT `!`
    Bang,
    /// Inequality `!=`
    NotEq,
    /// Equality `==`
    EqEq,
    /// Pipe `|`
    Pipe,
    /// String concatenation `~`
    Tilde,

    // === Keywords ===
    And,
    Or,
    If,
    ElseIf,
    Else,
    End,
    True,
    False,
    /// Reserved: parsed but never evaluated.
    Switch,
    /// Reserved: parsed but never evaluated.
    Case,

    // === Terminals ===
    /// `[A-Za-z_][A-Za-z_0-9]*` that is not a keyword
    Identifier,
    /// Double-quoted literal, quotes included in the span
    StringLiteral,
    /// Verbatim bytes outside of any tag
    Text,
    /// Body of a `{# ... #}` comment
    Comment,
    /// End of input; `start == end == input.len()`
    Eof,
    /// A byte sequence the lexer could not make sense of
    Error,
}

impl TokenKind {
    /// Looks up an identifier in the keyword table.
    pub fn keyword(ident: &[u8]) -> Option<TokenKind> {
        let kind = match ident {
            b"and" => TokenKind::And,
            b"or" => TokenKind::Or,
            b"if" => TokenKind::If,
            b"elseif" => TokenKind::ElseIf,
            b"else" => TokenKind::Else,
            b"end" => TokenKind::End,
            b"true" => TokenKind::True,
            b"false" => TokenKind::False,
            b"switch" => TokenKind::Switch,
            b"case" => TokenKind::Case,
            _ => return None,
        };
        Some(kind)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TokenKind::LDoubleBrace => "'{{'",
            TokenKind::RDoubleBrace => "'}}'",
            TokenKind::LBracePercent => "'{%'",
            TokenKind::RBracePercent => "'%}'",
            TokenKind::LBracePound => "'{#'",
            TokenKind::RBracePound => "'#}'",
            TokenKind::LParen => "'('",
            TokenKind::RParen => "')'",
            TokenKind::Comma => "','",
            TokenKind::Bang => "'!'",
            TokenKind::NotEq => "'!='",
            TokenKind::EqEq => "'=='",
            TokenKind::Pipe => "'|'",
            TokenKind::Tilde => "'~'",
            TokenKind::And => "'and'",
            TokenKind::Or => "'or'",
            TokenKind::If => "'if'",
            TokenKind::ElseIf => "'elseif'",
            TokenKind::Else => "'else'",
            TokenKind::End => "'end'",
            TokenKind::True => "'true'",
            TokenKind::False => "'false'",
            TokenKind::Switch => "'switch'",
            TokenKind::Case => "'case'",
            TokenKind::Identifier => "identifier",
            TokenKind::StringLiteral => "string literal",
            TokenKind::Text => "text",
            TokenKind::Comment => "comment",
            TokenKind::Eof => "end of input",
            TokenKind::Error => "invalid input",
        };
        f.write_str(s)
    }
}

/// A token and the half-open byte range `[start, end)` it covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    /// The type of this token
    pub kind: TokenKind,

    /// Offset of the first byte (inclusive)
    pub start: usize,

    /// Offset one past the last byte (exclusive)
    pub end: usize,
}

impl Token {
    /// Slices this token's bytes out of the buffer it was lexed from.
    ///
    /// Returns an empty slice if the span does not fit `src`, so a token
    /// applied to the wrong buffer cannot panic.
    pub fn text<'a>(&self, src: &'a [u8]) -> &'a [u8] {
        src.get(self.start..self.end).unwrap_or(&[])
    }

    /// Number of bytes covered.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// True for zero-width tokens such as `Eof`.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}
