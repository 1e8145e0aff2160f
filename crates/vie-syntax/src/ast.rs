//! AST (abstract syntax tree) types for the Vie template language.
//!
//! A [`File`] is a sequence of [`Block`]s. Blocks hold raw text, comments,
//! rendered expressions and control flow. Nodes are immutable once the parser
//! has produced them.

use crate::pos::Position;
use crate::types::Type;

/// Root of a parsed template.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct File {
    pub blocks: Vec<Block>,
}

impl File {
    /// Returns a copy with every position reset, for structural comparison.
    pub fn without_positions(&self) -> File {
        let mut file = self.clone();
        erase_blocks(&mut file.blocks);
        file
    }
}

/// Top-level constructs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    /// Verbatim source between tags.
    Text { content: Vec<u8>, pos: Position },
    /// Inert; contributes no output.
    Comment { content: Vec<u8>, pos: Position },
    /// `{{ expr }}`
    Render(Expr),
    If(IfBlock),
    /// Reserved syntax; parsed and printed but not evaluated.
    Switch(SwitchBlock),
}

/// `{% if %}` with any number of `elseif` branches and an optional `else`.
///
/// Invariant: `branches` is never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IfBlock {
    pub branches: Vec<Branch>,
    pub else_body: Option<Vec<Block>>,
    pub pos: Position,
}

/// A condition and the body rendered when it holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Branch {
    pub cond: Expr,
    pub body: Vec<Block>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwitchBlock {
    pub value: Expr,
    pub cases: Vec<Case>,
    pub pos: Position,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Case {
    pub patterns: Vec<Expr>,
    pub body: Vec<Block>,
}

/// Literal kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LitKind {
    Bool,
    String,
}

impl LitKind {
    pub fn ty(self) -> Type {
        match self {
            LitKind::Bool => Type::Bool,
            LitKind::String => Type::String,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
}

impl UnaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Not => "!",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Eq,
    Neq,
    And,
    Or,
    Concat,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Eq => "==",
            BinaryOp::Neq => "!=",
            BinaryOp::And => "and",
            BinaryOp::Or => "or",
            BinaryOp::Concat => "~",
        }
    }

    /// Binding power; higher binds tighter. Pipe sits above all of these at 7.
    pub fn precedence(self) -> u8 {
        match self {
            BinaryOp::Or => 1,
            BinaryOp::And => 2,
            BinaryOp::Eq | BinaryOp::Neq => 3,
            BinaryOp::Concat => 4,
        }
    }
}

/// An identifier and where it appears.
///
/// Invariant: `name` matches `[A-Za-z_][A-Za-z_0-9]*`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    pub name: String,
    pub pos: Position,
}

/// Expressions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// A literal. `value` is the raw source: `true`/`false`, or the string
    /// with its surrounding quotes.
    BasicLit {
        kind: LitKind,
        value: Vec<u8>,
        pos: Position,
    },
    Ident(Ident),
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
        pos: Position,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// Kept so the printer reproduces the user's parentheses.
    Paren { inner: Box<Expr>, pos: Position },
    Call { func: Ident, args: Vec<Expr> },
    /// `arg | func`; behaves like `func(arg)`.
    Pipe { arg: Box<Expr>, func: Ident },
}

impl Expr {
    /// Start position of the expression.
    pub fn pos(&self) -> Position {
        match self {
            Expr::BasicLit { pos, .. } | Expr::Unary { pos, .. } | Expr::Paren { pos, .. } => *pos,
            Expr::Ident(ident) => ident.pos,
            Expr::Binary { left, .. } => left.pos(),
            Expr::Call { func, .. } => func.pos,
            Expr::Pipe { arg, .. } => arg.pos(),
        }
    }

    /// Strips any number of enclosing parentheses.
    pub fn unparen(&self) -> &Expr {
        let mut e = self;
        while let Expr::Paren { inner, .. } = e {
            e = inner;
        }
        e
    }
}

fn erase_blocks(blocks: &mut [Block]) {
    for block in blocks {
        match block {
            Block::Text { pos, .. } | Block::Comment { pos, .. } => *pos = Position::default(),
            Block::Render(e) => erase_expr(e),
            Block::If(stmt) => {
                stmt.pos = Position::default();
                for branch in &mut stmt.branches {
                    erase_expr(&mut branch.cond);
                    erase_blocks(&mut branch.body);
                }
                if let Some(body) = &mut stmt.else_body {
                    erase_blocks(body);
                }
            }
            Block::Switch(stmt) => {
                stmt.pos = Position::default();
                erase_expr(&mut stmt.value);
                for case in &mut stmt.cases {
                    for p in &mut case.patterns {
                        erase_expr(p);
                    }
                    erase_blocks(&mut case.body);
                }
            }
        }
    }
}

fn erase_expr(expr: &mut Expr) {
    match expr {
        Expr::BasicLit { pos, .. } => *pos = Position::default(),
        Expr::Ident(ident) => ident.pos = Position::default(),
        Expr::Unary { operand, pos, .. } => {
            *pos = Position::default();
            erase_expr(operand);
        }
        Expr::Binary { left, right, .. } => {
            erase_expr(left);
            erase_expr(right);
        }
        Expr::Paren { inner, pos } => {
            *pos = Position::default();
            erase_expr(inner);
        }
        Expr::Call { func, args } => {
            func.pos = Position::default();
            for a in args {
                erase_expr(a);
            }
        }
        Expr::Pipe { arg, func } => {
            func.pos = Position::default();
            erase_expr(arg);
        }
    }
}
