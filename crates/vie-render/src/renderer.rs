//! Tree-walking evaluator for template ASTs.

use std::io::Write;

use vie_builtins::{Registry, Value};
use vie_syntax::ast::*;
use vie_syntax::pos::Position;
use vie_syntax::types::TypeMap;

use crate::context::Context;
use crate::error::{RenderError, Result};

/// Renders templates with a fixed builtin registry.
///
/// When a type map from the analyzer is attached, identifiers missing from
/// the context evaluate to the zero value of their inferred type instead of
/// failing.
#[derive(Debug, Clone, Copy)]
pub struct Renderer<'a> {
    registry: &'a Registry,
    types: Option<&'a TypeMap>,
}

impl<'a> Renderer<'a> {
    pub fn new(registry: &'a Registry) -> Self {
        Self { registry, types: None }
    }

    pub fn with_types(mut self, types: &'a TypeMap) -> Self {
        self.types = Some(types);
        self
    }

    /// Render `file` into `out`. Output written before an error is left in
    /// the sink.
    pub fn render<W: Write + ?Sized>(&self, file: &File, ctx: &Context, out: &mut W) -> Result<()> {
        log::debug!("rendering {} blocks against {} bindings", file.blocks.len(), ctx.len());
        self.exec_blocks(file.blocks.as_slice(), ctx, out)
    }

    pub fn render_to_vec(&self, file: &File, ctx: &Context) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        self.render(file, ctx, &mut out)?;
        Ok(out)
    }

    fn exec_blocks<W: Write + ?Sized>(&self, blocks: &[Block], ctx: &Context, out: &mut W) -> Result<()> {
        for block in blocks {
            self.exec_block(block, ctx, out)?;
        }
        Ok(())
    }

    fn exec_block<W: Write + ?Sized>(&self, block: &Block, ctx: &Context, out: &mut W) -> Result<()> {
        match block {
            Block::Text { content, .. } => out.write_all(content)?,
            Block::Comment { .. } => {}
            Block::Render(expr) => match self.eval_expr(expr, ctx)? {
                Value::String(s) => out.write_all(&s)?,
                other => {
                    return Err(type_error(expr.pos(), format!("cannot render {}, expected string", other.ty())));
                }
            },
            Block::If(stmt) => {
                for branch in &stmt.branches {
                    if self.eval_cond(&branch.cond, ctx)? {
                        return self.exec_blocks(&branch.body, ctx, out);
                    }
                }
                if let Some(body) = &stmt.else_body {
                    self.exec_blocks(body, ctx, out)?;
                }
            }
            Block::Switch(stmt) => {
                return Err(RenderError::Unsupported { what: "switch", pos: stmt.pos });
            }
        }
        Ok(())
    }

    fn eval_cond(&self, cond: &Expr, ctx: &Context) -> Result<bool> {
        match self.eval_expr(cond, ctx)? {
            Value::Bool(b) => Ok(b),
            other => Err(type_error(cond.pos(), format!("if condition must be bool, got {}", other.ty()))),
        }
    }

    fn eval_expr(&self, expr: &Expr, ctx: &Context) -> Result<Value> {
        match expr {
            Expr::BasicLit { kind: LitKind::String, value, .. } => Ok(Value::String(unquote(value).to_vec())),
            Expr::BasicLit { kind: LitKind::Bool, value, .. } => Ok(Value::Bool(value.as_slice() == b"true")),
            Expr::Ident(ident) => self.lookup(ident, ctx),
            Expr::Unary { op: UnaryOp::Not, operand, pos } => match self.eval_expr(operand, ctx)? {
                Value::Bool(b) => Ok(Value::Bool(!b)),
                other => Err(type_error(*pos, format!("operator '!' requires bool, got {}", other.ty()))),
            },
            Expr::Binary { op, left, right } => {
                let l = self.eval_expr(left, ctx)?;
                let r = self.eval_expr(right, ctx)?;
                eval_binary(*op, l, r, expr.pos())
            }
            Expr::Paren { inner, .. } => self.eval_expr(inner, ctx),
            Expr::Call { func, args } => self.call(func, args, ctx),
            Expr::Pipe { arg, func } => self.call(func, std::slice::from_ref(arg.as_ref()), ctx),
        }
    }

    fn lookup(&self, ident: &Ident, ctx: &Context) -> Result<Value> {
        if let Some(v) = ctx.get(&ident.name) {
            return Ok(v.clone());
        }
        self.types
            .and_then(|types| types.get(&ident.name))
            .and_then(|ty| Value::zero(*ty))
            .ok_or_else(|| RenderError::UnboundName {
                name: ident.name.clone(),
                pos: ident.pos,
            })
    }

    fn call(&self, func: &Ident, args: &[Expr], ctx: &Context) -> Result<Value> {
        let builtin = self.registry.lookup(&func.name).ok_or_else(|| RenderError::UnknownFunction {
            name: func.name.clone(),
            pos: func.pos,
        })?;
        if builtin.args.len() != args.len() {
            return Err(RenderError::ArgCountError {
                name: func.name.clone(),
                want: builtin.args.len(),
                got: args.len(),
                pos: func.pos,
            });
        }
        let mut values = Vec::with_capacity(args.len());
        for (i, (arg, want)) in args.iter().zip(&builtin.args).enumerate() {
            let v = self.eval_expr(arg, ctx)?;
            if v.ty() != *want {
                return Err(type_error(
                    arg.pos(),
                    format!("argument {} of {} must be {}, got {}", i + 1, func.name, want, v.ty()),
                ));
            }
            values.push(v);
        }
        Ok((builtin.func)(&values))
    }
}

fn eval_binary(op: BinaryOp, l: Value, r: Value, pos: Position) -> Result<Value> {
    match (op, l, r) {
        (BinaryOp::Concat, Value::String(mut a), Value::String(b)) => {
            a.extend_from_slice(&b);
            Ok(Value::String(a))
        }
        (BinaryOp::And, Value::Bool(a), Value::Bool(b)) => Ok(Value::Bool(a && b)),
        (BinaryOp::Or, Value::Bool(a), Value::Bool(b)) => Ok(Value::Bool(a || b)),
        (BinaryOp::Eq | BinaryOp::Neq, a, b) if a.ty() == b.ty() => {
            Ok(Value::Bool((a == b) == (op == BinaryOp::Eq)))
        }
        (op, a, b) => Err(type_error(
            pos,
            format!("invalid operation: {} {} {}", a.ty(), op.symbol(), b.ty()),
        )),
    }
}

/// Strips the surrounding quotes of a raw string literal. Escapes are kept
/// as written.
fn unquote(raw: &[u8]) -> &[u8] {
    match raw {
        [b'"', inner @ .., b'"'] => inner,
        _ => raw,
    }
}

fn type_error(pos: Position, msg: String) -> RenderError {
    RenderError::TypeError { msg, pos }
}
