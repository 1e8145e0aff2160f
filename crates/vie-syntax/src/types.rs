//! Value types shared by the analyzer, the evaluator and the builtin registry.

use std::collections::BTreeMap;
use std::fmt;

/// Static type tags.
///
/// The declaration order is significant: the analyzer breaks ties in favour
/// of the earlier variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Type {
    String,
    Bool,
    /// Only used to describe builtin signatures uniformly; never a context entry.
    Function,
}

impl Type {
    /// All types in tie-break order.
    pub const ALL: [Type; 3] = [Type::String, Type::Bool, Type::Function];

    pub fn name(self) -> &'static str {
        match self {
            Type::String => "string",
            Type::Bool => "bool",
            Type::Function => "function",
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Inferred type of every free identifier in a template set.
pub type TypeMap = BTreeMap<String, Type>;
