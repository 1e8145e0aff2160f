pub mod ast;
pub mod error;
pub mod pos;
pub mod token;
pub mod types;

pub use ast::*;
pub use error::*;
pub use pos::*;
pub use token::*;
pub use types::*;
