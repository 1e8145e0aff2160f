//! Runtime values for the Vie evaluator.

use std::fmt;

use vie_syntax::types::Type;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Raw bytes; not required to be UTF-8
    String(Vec<u8>),
    Bool(bool),
}

impl Value {
    pub fn ty(&self) -> Type {
        match self {
            Value::String(_) => Type::String,
            Value::Bool(_) => Type::Bool,
        }
    }

    /// The zero value substituted for a missing context entry of type `ty`.
    pub fn zero(ty: Type) -> Option<Value> {
        match ty {
            Type::String => Some(Value::String(Vec::new())),
            Type::Bool => Some(Value::Bool(false)),
            Type::Function => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.as_bytes().to_vec())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s.into_bytes())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "{}", String::from_utf8_lossy(s)),
            Value::Bool(b) => write!(f, "{}", b),
        }
    }
}
