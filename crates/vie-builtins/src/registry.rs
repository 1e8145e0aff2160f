//! Builtin function registry.

use std::collections::BTreeMap;
use std::fmt;

use vie_syntax::types::Type;

use crate::functions;
use crate::value::Value;

/// Implementation of a builtin. Callers check arity and argument types
/// against the signature before invoking it.
pub type BuiltinFn = fn(&[Value]) -> Value;

/// A named function with a fixed signature.
#[derive(Clone)]
pub struct Builtin {
    pub name: &'static str,
    pub args: Vec<Type>,
    pub ret: Type,
    pub func: BuiltinFn,
}

impl fmt::Debug for Builtin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        for (i, t) in self.args.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", t)?;
        }
        write!(f, ") -> {}", self.ret)
    }
}

/// Name-to-builtin mapping. Read-only once analysis or evaluation starts.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    entries: BTreeMap<&'static str, Builtin>,
}

impl Registry {
    pub fn empty() -> Self {
        Self::default()
    }

    /// The functions every template can call.
    pub fn standard() -> Self {
        let mut registry = Self::empty();
        let string_to_string: [(&'static str, BuiltinFn); 4] = [
            ("upper", functions::upper),
            ("lower", functions::lower),
            ("trim", functions::trim),
            ("title", functions::title),
        ];
        for (name, func) in string_to_string {
            registry.register(Builtin {
                name,
                args: vec![Type::String],
                ret: Type::String,
                func,
            });
        }
        registry.register(Builtin {
            name: "empty",
            args: vec![Type::String],
            ret: Type::Bool,
            func: functions::empty,
        });
        registry
    }

    /// Adds or replaces a builtin.
    pub fn register(&mut self, builtin: Builtin) {
        self.entries.insert(builtin.name, builtin);
    }

    pub fn lookup(&self, name: &str) -> Option<&Builtin> {
        self.entries.get(name)
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
