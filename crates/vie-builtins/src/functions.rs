//! Standard builtin implementations. All string handling is ASCII-only:
//! bytes outside the ASCII range pass through unchanged.

use crate::value::Value;

fn string_arg(args: &[Value]) -> &[u8] {
    match args.first() {
        Some(Value::String(s)) => s,
        _ => &[],
    }
}

pub fn upper(args: &[Value]) -> Value {
    Value::String(string_arg(args).to_ascii_uppercase())
}

pub fn lower(args: &[Value]) -> Value {
    Value::String(string_arg(args).to_ascii_lowercase())
}

pub fn trim(args: &[Value]) -> Value {
    let s = string_arg(args);
    let start = s.iter().position(|b| !b.is_ascii_whitespace()).unwrap_or(s.len());
    let end = s.iter().rposition(|b| !b.is_ascii_whitespace()).map_or(start, |i| i + 1);
    Value::String(s[start..end].to_vec())
}

/// Uppercases the first letter of every whitespace-separated word and
/// lowercases the rest, so `"big_WORLD"` becomes `"Big_world"`.
pub fn title(args: &[Value]) -> Value {
    let mut out = Vec::with_capacity(string_arg(args).len());
    let mut word_start = true;
    for &b in string_arg(args) {
        if word_start {
            out.push(b.to_ascii_uppercase());
        } else {
            out.push(b.to_ascii_lowercase());
        }
        word_start = b.is_ascii_whitespace();
    }
    Value::String(out)
}

pub fn empty(args: &[Value]) -> Value {
    Value::Bool(string_arg(args).is_empty())
}
