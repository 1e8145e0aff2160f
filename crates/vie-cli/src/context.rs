//! Building the render context from `--context` and `--set`.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{bail, Context as _, Result};
use serde::Deserialize;
use vie_builtins::Value;
use vie_render::Context;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ContextValue {
    String(String),
    Bool(bool),
}

impl From<ContextValue> for Value {
    fn from(v: ContextValue) -> Self {
        match v {
            ContextValue::String(s) => Value::from(s),
            ContextValue::Bool(b) => Value::Bool(b),
        }
    }
}

/// Parses a JSON object whose values are strings or booleans.
pub fn parse_json(text: &str) -> Result<Context> {
    let raw: BTreeMap<String, ContextValue> =
        serde_json::from_str(text).context("expected a JSON object of string and boolean values")?;
    for name in raw.keys() {
        if !is_identifier(name) {
            bail!("'{}' is not a valid identifier", name);
        }
    }
    Ok(raw.into_iter().map(|(k, v)| (k, v.into())).collect())
}

/// Splits `name=value`. The value may itself contain `=`.
pub fn parse_assignment(s: &str) -> Result<(&str, &str)> {
    let Some((name, value)) = s.split_once('=') else {
        bail!("invalid assignment '{}', expected NAME=VALUE", s);
    };
    if !is_identifier(name) {
        bail!("'{}' is not a valid identifier", name);
    }
    Ok((name, value))
}

/// The context file, if any, with every `--set` applied on top.
pub fn load(file: Option<&Path>, sets: &[String]) -> Result<Context> {
    let mut ctx = match file {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read context file {}", path.display()))?;
            parse_json(&text).with_context(|| format!("invalid context file {}", path.display()))?
        }
        None => Context::new(),
    };
    for set in sets {
        let (name, value) = parse_assignment(set)?;
        ctx.insert(name, value);
    }
    log::debug!("context has {} bindings", ctx.len());
    Ok(ctx)
}

fn is_identifier(s: &str) -> bool {
    let mut bytes = s.bytes();
    matches!(bytes.next(), Some(b) if b.is_ascii_alphabetic() || b == b'_')
        && bytes.all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_strings_and_bools() {
        let ctx = parse_json(r#"{"name": "vie", "lib": true}"#).unwrap();
        assert_eq!(ctx.get("name"), Some(&Value::from("vie")));
        assert_eq!(ctx.get("lib"), Some(&Value::Bool(true)));
    }

    #[test]
    fn test_json_rejects_other_values() {
        assert!(parse_json(r#"{"n": 3}"#).is_err());
        assert!(parse_json(r#"{"n": null}"#).is_err());
        assert!(parse_json(r#"["a"]"#).is_err());
        assert!(parse_json(r#"{"not-an-ident": "x"}"#).is_err());
    }

    #[test]
    fn test_assignment() {
        assert_eq!(parse_assignment("a=b").unwrap(), ("a", "b"));
        assert_eq!(parse_assignment("url=x=y").unwrap(), ("url", "x=y"));
        assert_eq!(parse_assignment("empty=").unwrap(), ("empty", ""));
        assert!(parse_assignment("novalue").is_err());
        assert!(parse_assignment("1x=y").is_err());
    }

    #[test]
    fn test_set_overrides_file_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ctx.json");
        fs::write(&path, r#"{"name": "old", "flag": false}"#).unwrap();
        let ctx = load(Some(&path), &["name=new".to_string()]).unwrap();
        assert_eq!(ctx.get("name"), Some(&Value::from("new")));
        assert_eq!(ctx.get("flag"), Some(&Value::Bool(false)));
    }
}
