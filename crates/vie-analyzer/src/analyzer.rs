//! Single-pass usage collection and majority-vote type resolution.

use std::collections::BTreeMap;
use std::path::Path;
use std::slice;
use std::sync::{Arc, Mutex, PoisonError};

use vie_builtins::Registry;
use vie_syntax::ast::*;
use vie_syntax::pos::Position;
use vie_syntax::types::{Type, TypeMap};

use crate::diagnostic::{Diagnostic, DiagnosticKind};

/// The construct an identifier was used in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsageKind {
    Render,
    If,
    Binary,
    Unary,
    Call,
}

/// One occurrence of an identifier in a typed context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Usage {
    /// Type the surrounding construct expects
    pub ty: Type,
    pub kind: UsageKind,
    pub pos: Position,
    pub path: Arc<Path>,
}

#[derive(Default)]
struct State {
    usages: BTreeMap<String, Vec<Usage>>,
    diagnostics: Vec<Diagnostic>,
}

/// Collects usages and diagnostics across a set of templates.
///
/// `analyze_file` takes `&self`, so several templates can be analyzed from
/// different threads into one result set; the shared tables sit behind a
/// mutex.
pub struct Analyzer<'r> {
    registry: &'r Registry,
    state: Mutex<State>,
}

impl<'r> Analyzer<'r> {
    pub fn new(registry: &'r Registry) -> Self {
        Self {
            registry,
            state: Mutex::new(State::default()),
        }
    }

    fn state(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn add_usage(&self, name: &str, usage: Usage) {
        log::trace!("usage of {} as {} at {}", name, usage.ty, usage.pos);
        self.state()
            .usages
            .entry(name.to_string())
            .or_default()
            .push(usage);
    }

    pub fn add_diagnostic(&self, diagnostic: Diagnostic) {
        self.state().diagnostics.push(diagnostic);
    }

    /// Record every usage and local diagnostic in `file`.
    pub fn analyze_file(&self, path: &Path, file: &File) {
        log::debug!("analyzing {}", path.display());
        let walker = Walker {
            analyzer: self,
            path: Arc::from(path),
        };
        walker.visit_blocks(&file.blocks);
    }

    /// Resolve every identifier and return the type map with all diagnostics,
    /// sorted by path and position.
    pub fn results(self) -> (TypeMap, Vec<Diagnostic>) {
        let state = self
            .state
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner);
        let mut types = TypeMap::new();
        let mut diagnostics = state.diagnostics;
        for (name, usages) in state.usages {
            let ty = resolve(&usages);
            diagnostics.extend(usages.iter().filter(|u| u.ty != ty).map(|u| Diagnostic {
                path: u.path.to_path_buf(),
                pos: u.pos,
                kind: DiagnosticKind::WrongUsage { want: ty, got: u.ty },
            }));
            types.insert(name, ty);
        }
        diagnostics.sort_by(|a, b| a.path.cmp(&b.path).then(a.pos.cmp(&b.pos)));
        log::debug!(
            "resolved {} identifiers with {} diagnostics",
            types.len(),
            diagnostics.len()
        );
        (types, diagnostics)
    }
}

/// The type most usages expect; ties go to the earlier [`Type`] variant.
///
/// Returns `Type::String` for an empty slice.
pub fn resolve(usages: &[Usage]) -> Type {
    let count = |t: Type| usages.iter().filter(|u| u.ty == t).count();
    let mut best = Type::String;
    let mut best_count = count(best);
    for t in Type::ALL {
        let c = count(t);
        if c > best_count {
            best = t;
            best_count = c;
        }
    }
    best
}

struct Walker<'a, 'r> {
    analyzer: &'a Analyzer<'r>,
    path: Arc<Path>,
}

impl Walker<'_, '_> {
    fn diagnose(&self, pos: Position, kind: DiagnosticKind) {
        self.analyzer.add_diagnostic(Diagnostic {
            path: self.path.to_path_buf(),
            pos,
            kind,
        });
    }

    fn visit_blocks(&self, blocks: &[Block]) {
        for block in blocks {
            match block {
                Block::Text { .. } | Block::Comment { .. } => {}
                Block::Render(expr) => self.visit_expr(expr, Some(Type::String), UsageKind::Render),
                Block::If(stmt) => {
                    for branch in &stmt.branches {
                        self.visit_expr(&branch.cond, Some(Type::Bool), UsageKind::If);
                        self.visit_blocks(&branch.body);
                    }
                    if let Some(body) = &stmt.else_body {
                        self.visit_blocks(body);
                    }
                }
                // switch has no typing rules yet; only its bodies are checked
                Block::Switch(stmt) => {
                    for case in &stmt.cases {
                        self.visit_blocks(&case.body);
                    }
                }
            }
        }
    }

    /// `want` is the type the surrounding construct requires, if known.
    fn visit_expr(&self, expr: &Expr, want: Option<Type>, kind: UsageKind) {
        match expr {
            Expr::Ident(ident) => {
                if let Some(ty) = want {
                    self.analyzer.add_usage(
                        &ident.name,
                        Usage {
                            ty,
                            kind,
                            pos: ident.pos,
                            path: Arc::clone(&self.path),
                        },
                    );
                }
            }
            Expr::BasicLit { kind: lit, pos, .. } => self.check(lit.ty(), want, *pos),
            Expr::Unary { operand, pos, .. } => {
                self.visit_expr(operand, Some(Type::Bool), UsageKind::Unary);
                self.check(Type::Bool, want, *pos);
            }
            Expr::Binary { op, left, right } => {
                let result = match op {
                    BinaryOp::Concat => {
                        self.visit_expr(left, Some(Type::String), UsageKind::Binary);
                        self.visit_expr(right, Some(Type::String), UsageKind::Binary);
                        Type::String
                    }
                    BinaryOp::And | BinaryOp::Or => {
                        self.visit_expr(left, Some(Type::Bool), UsageKind::Binary);
                        self.visit_expr(right, Some(Type::Bool), UsageKind::Binary);
                        Type::Bool
                    }
                    BinaryOp::Eq | BinaryOp::Neq => {
                        self.visit_comparison(left, right);
                        Type::Bool
                    }
                };
                self.check(result, want, expr.pos());
            }
            Expr::Paren { inner, .. } => self.visit_expr(inner, want, kind),
            Expr::Call { func, args } => self.visit_call(func, args, want),
            Expr::Pipe { arg, func } => self.visit_call(func, slice::from_ref(arg.as_ref()), want),
        }
    }

    fn visit_comparison(&self, left: &Expr, right: &Expr) {
        let kind = UsageKind::Binary;
        match (self.static_type(left), self.static_type(right)) {
            (Some(x), Some(y)) if x != y => {
                self.diagnose(left.pos(), DiagnosticKind::InvalidOperation { x, y });
                self.visit_expr(left, Some(x), kind);
                self.visit_expr(right, Some(y), kind);
            }
            (Some(t), _) | (None, Some(t)) => {
                self.visit_expr(left, Some(t), kind);
                self.visit_expr(right, Some(t), kind);
            }
            (None, None) => {
                if let (Expr::Ident(x), Expr::Ident(y)) = (left.unparen(), right.unparen()) {
                    self.diagnose(
                        x.pos,
                        DiagnosticKind::CrossVarTyping {
                            x: x.name.clone(),
                            y: y.name.clone(),
                        },
                    );
                } else {
                    self.visit_expr(left, Some(Type::Bool), kind);
                    self.visit_expr(right, Some(Type::Bool), kind);
                }
            }
        }
    }

    fn visit_call(&self, func: &Ident, args: &[Expr], want: Option<Type>) {
        let Some(builtin) = self.analyzer.registry.lookup(&func.name) else {
            let names: Vec<_> = self.analyzer.registry.names().collect();
            let detail = if names.is_empty() {
                "no builtins are registered".to_string()
            } else {
                format!("available builtins are {}", names.join(", "))
            };
            self.diagnose(
                func.pos,
                DiagnosticKind::BuiltinNotFound {
                    name: func.name.clone(),
                    detail,
                },
            );
            for arg in args {
                self.visit_expr(arg, None, UsageKind::Call);
            }
            return;
        };
        if builtin.args.len() != args.len() {
            self.diagnose(
                func.pos,
                DiagnosticKind::IncorrectArgCount {
                    func: func.name.clone(),
                    want: builtin.args.len(),
                    got: args.len(),
                },
            );
        }
        for (i, arg) in args.iter().enumerate() {
            self.visit_expr(arg, builtin.args.get(i).copied(), UsageKind::Call);
        }
        self.check(builtin.ret, want, func.pos);
    }

    /// Type of `expr` when it does not depend on any identifier.
    fn static_type(&self, expr: &Expr) -> Option<Type> {
        match expr {
            Expr::BasicLit { kind, .. } => Some(kind.ty()),
            Expr::Ident(_) => None,
            Expr::Paren { inner, .. } => self.static_type(inner),
            Expr::Unary { .. } => Some(Type::Bool),
            Expr::Binary { op: BinaryOp::Concat, .. } => Some(Type::String),
            Expr::Binary { .. } => Some(Type::Bool),
            Expr::Call { func, .. } | Expr::Pipe { func, .. } => {
                self.analyzer.registry.lookup(&func.name).map(|b| b.ret)
            }
        }
    }

    fn check(&self, got: Type, want: Option<Type>, pos: Position) {
        if let Some(want) = want {
            if want != got {
                self.diagnose(pos, DiagnosticKind::WrongUsage { want, got });
            }
        }
    }
}
