//! Vie builtins: runtime values and the read-only function registry shared
//! by the analyzer and the evaluator.

pub mod functions;
pub mod registry;
pub mod value;

pub use registry::{Builtin, Registry};
pub use value::Value;

#[cfg(test)]
mod tests {
    use super::*;
    use vie_syntax::types::Type;

    fn call(name: &str, args: &[Value]) -> Value {
        let registry = Registry::standard();
        let builtin = registry.lookup(name).unwrap_or_else(|| panic!("missing builtin {}", name));
        (builtin.func)(args)
    }

    #[test]
    fn test_standard_signatures() {
        let registry = Registry::standard();
        for name in ["upper", "lower", "trim", "title"] {
            let b = registry.lookup(name).unwrap();
            assert_eq!(b.args, vec![Type::String]);
            assert_eq!(b.ret, Type::String);
        }
        assert_eq!(registry.lookup("empty").unwrap().ret, Type::Bool);
        assert!(registry.lookup("nope").is_none());
    }

    #[test]
    fn test_case_conversion_is_ascii_only() {
        assert_eq!(call("upper", &["hi there".into()]), "HI THERE".into());
        assert_eq!(call("lower", &["MiXeD_1".into()]), "mixed_1".into());
        // non-ASCII bytes pass through untouched
        assert_eq!(call("upper", &["\u{e9}a".into()]), "\u{e9}A".into());
        assert_eq!(call("upper", &[Value::String(vec![0xff, b'a'])]), Value::String(vec![0xff, b'A']));
    }

    #[test]
    fn test_trim_title_empty() {
        assert_eq!(call("trim", &["  x y\t\n".into()]), "x y".into());
        assert_eq!(call("title", &["hello big_world".into()]), "Hello Big_world".into());
        assert_eq!(call("empty", &["".into()]), Value::Bool(true));
        assert_eq!(call("empty", &["a".into()]), Value::Bool(false));
    }

    #[test]
    fn test_title_lowercases_rest_of_word() {
        assert_eq!(call("title", &["hELLO wORLD".into()]), "Hello World".into());
        assert_eq!(call("title", &["big_WORLD".into()]), "Big_world".into());
        assert_eq!(call("title", &["a\tb\nc".into()]), "A\tB\nC".into());
    }

    #[test]
    fn test_custom_registration() {
        let mut registry = Registry::empty();
        assert!(registry.is_empty());
        registry.register(Builtin {
            name: "twice",
            args: vec![Type::String],
            ret: Type::String,
            func: |args| match &args[0] {
                Value::String(s) => Value::String(s.repeat(2)),
                other => other.clone(),
            },
        });
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["twice"]);
        assert_eq!((registry.lookup("twice").unwrap().func)(&["ab".into()]), "abab".into());
    }

    #[test]
    fn test_zero_values() {
        assert_eq!(Value::zero(Type::String), Some(Value::String(Vec::new())));
        assert_eq!(Value::zero(Type::Bool), Some(Value::Bool(false)));
        assert_eq!(Value::zero(Type::Function), None);
    }
}
