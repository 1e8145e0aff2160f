//! Fatal evaluation errors. Rendering stops at the failing expression.

use std::io;

use thiserror::Error;
use vie_syntax::pos::Position;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("{msg} at {pos}")]
    TypeError { msg: String, pos: Position },

    #[error("undefined variable '{name}' at {pos}")]
    UnboundName { name: String, pos: Position },

    #[error("undefined function '{name}' at {pos}")]
    UnknownFunction { name: String, pos: Position },

    #[error("function {name} expects {want} arguments, got {got} at {pos}")]
    ArgCountError {
        name: String,
        want: usize,
        got: usize,
        pos: Position,
    },

    /// Reserved syntax that parses but has no evaluation rules.
    #[error("'{what}' statements are not supported at {pos}")]
    Unsupported { what: &'static str, pos: Position },

    #[error("failed to write output: {0}")]
    Io(#[from] io::Error),
}

impl RenderError {
    pub fn pos(&self) -> Option<Position> {
        match self {
            RenderError::TypeError { pos, .. }
            | RenderError::UnboundName { pos, .. }
            | RenderError::UnknownFunction { pos, .. }
            | RenderError::ArgCountError { pos, .. }
            | RenderError::Unsupported { pos, .. } => Some(*pos),
            RenderError::Io(_) => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, RenderError>;
