//! Non-fatal semantic complaints produced by the analyzer.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;
use vie_syntax::pos::Position;
use vie_syntax::types::Type;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiagnosticKind {
    /// A usage disagrees with the identifier's inferred type, or an
    /// expression's type does not fit where it is used.
    #[error("cannot use {got} as {want}")]
    WrongUsage { want: Type, got: Type },

    #[error("invalid operation: mismatched types {x} and {y}")]
    InvalidOperation { x: Type, y: Type },

    #[error("type of {x} depends on type of {y} (cross-var typing is not supported yet)")]
    CrossVarTyping { x: String, y: String },

    #[error("function {func} expects {want} arguments, got {got}")]
    IncorrectArgCount { func: String, want: usize, got: usize },

    #[error("builtin {name} not found: {detail}")]
    BuiltinNotFound { name: String, detail: String },
}

/// A diagnostic and where it was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub path: PathBuf,
    pub pos: Position,
    pub kind: DiagnosticKind,
}

impl fmt::Display for Diagnostic {
    /// `path:line:char: message`, one-based.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}: {}", self.path.display(), self.pos, self.kind)
    }
}
