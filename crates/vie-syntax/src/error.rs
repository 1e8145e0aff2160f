//! Parse errors for the Vie template language.
//!
//! Parsing is non-recovering: the first problem found aborts the parse and is
//! reported as a single [`ParseError`] carrying the position of the offending
//! token. Lexical errors surface the same way, because the lexer hands its
//! `ERROR` tokens to the parser as ordinary (unexpected) tokens.
//!
//! # Examples
//!
//! ```rust
//! use vie_syntax::error::{ParseError, Result, error_at};
//! use vie_syntax::Position;
//!
//! fn expect_name(name: &str, pos: Position) -> Result<()> {
//!     if name.is_empty() {
//!         error_at(pos, "expected identifier")
//!     } else {
//!         Ok(())
//!     }
//! }
//!
//! let err = expect_name("", Position::new(2, 4)).unwrap_err();
//! assert_eq!(err.to_string(), "expected identifier at 3:5");
//! ```

use thiserror::Error;

use crate::pos::Position;

/// The first unrecoverable problem found while parsing a template.
///
/// `Display` renders `"<msg> at <line>:<char>"` with one-based numbers; the
/// stored [`Position`] stays zero-based.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{msg} at {pos}")]
pub struct ParseError {
    /// Human-readable error message
    pub msg: String,

    /// Zero-based location of the offending token
    pub pos: Position,
}

impl ParseError {
    pub fn new(pos: Position, msg: impl Into<String>) -> Self {
        Self {
            msg: msg.into(),
            pos,
        }
    }
}

/// A specialized `Result` type for parsing.
pub type Result<T> = std::result::Result<T, ParseError>;

/// Shorthand for `Err(ParseError::new(pos, msg))`.
pub fn error_at<T>(pos: Position, msg: impl Into<String>) -> Result<T> {
    Err(ParseError::new(pos, msg))
}
