//! Canonical printer for Vie templates.
//!
//! Text, comment bodies and string literals are emitted byte for byte; only
//! the whitespace inside tags is normalized. Formatting is idempotent and
//! re-parsing the output yields the same tree up to positions.

use std::io::{self, Write};

use vie_syntax::ast::*;
use vie_syntax::error::Result;

/// Write the canonical form of `file` to `out`.
pub fn format<W: Write + ?Sized>(file: &File, out: &mut W) -> io::Result<()> {
    out.write_all(&format_to_vec(file))
}

pub fn format_to_vec(file: &File) -> Vec<u8> {
    let mut out = Vec::new();
    format_blocks(&mut out, &file.blocks);
    out
}

/// Parse `src` and return its canonical form.
pub fn format_source(src: &[u8]) -> Result<Vec<u8>> {
    let file = vie_parser::parse(src)?;
    Ok(format_to_vec(&file))
}

fn format_blocks(out: &mut Vec<u8>, blocks: &[Block]) {
    for block in blocks {
        format_block(out, block);
    }
}

fn format_block(out: &mut Vec<u8>, block: &Block) {
    match block {
        Block::Text { content, .. } => out.extend_from_slice(content),
        Block::Comment { content, .. } => {
            out.extend_from_slice(b"{#");
            out.extend_from_slice(content);
            out.extend_from_slice(b"#}");
        }
        Block::Render(expr) => {
            out.extend_from_slice(b"{{ ");
            format_expr(out, expr);
            out.extend_from_slice(b" }}");
        }
        Block::If(stmt) => {
            for (i, branch) in stmt.branches.iter().enumerate() {
                let open: &[u8] = if i == 0 { b"{% if " } else { b"{% elseif " };
                out.extend_from_slice(open);
                format_expr(out, &branch.cond);
                out.extend_from_slice(b" %}");
                format_blocks(out, &branch.body);
            }
            if let Some(body) = &stmt.else_body {
                out.extend_from_slice(b"{% else %}");
                format_blocks(out, body);
            }
            out.extend_from_slice(b"{% end %}");
        }
        Block::Switch(stmt) => {
            out.extend_from_slice(b"{% switch ");
            format_expr(out, &stmt.value);
            out.extend_from_slice(b" %}");
            for case in &stmt.cases {
                out.extend_from_slice(b"{% case ");
                format_list(out, &case.patterns);
                out.extend_from_slice(b" %}");
                format_blocks(out, &case.body);
            }
            out.extend_from_slice(b"{% end %}");
        }
    }
}

fn format_expr(out: &mut Vec<u8>, expr: &Expr) {
    match expr {
        Expr::BasicLit { value, .. } => out.extend_from_slice(value),
        Expr::Ident(ident) => out.extend_from_slice(ident.name.as_bytes()),
        Expr::Unary { op, operand, .. } => {
            out.extend_from_slice(op.symbol().as_bytes());
            format_expr(out, operand);
        }
        Expr::Binary { op, left, right } => {
            format_expr(out, left);
            out.push(b' ');
            out.extend_from_slice(op.symbol().as_bytes());
            out.push(b' ');
            format_expr(out, right);
        }
        Expr::Paren { inner, .. } => {
            out.push(b'(');
            format_expr(out, inner);
            out.push(b')');
        }
        Expr::Call { func, args } => {
            out.extend_from_slice(func.name.as_bytes());
            out.push(b'(');
            format_list(out, args);
            out.push(b')');
        }
        Expr::Pipe { arg, func } => {
            format_expr(out, arg);
            out.extend_from_slice(b" | ");
            out.extend_from_slice(func.name.as_bytes());
        }
    }
}

fn format_list(out: &mut Vec<u8>, exprs: &[Expr]) {
    for (i, e) in exprs.iter().enumerate() {
        if i > 0 {
            out.extend_from_slice(b", ");
        }
        format_expr(out, e);
    }
}
