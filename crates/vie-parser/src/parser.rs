//! Recursive-descent block parser with Pratt-style expression parsing.

use vie_lexer::Lexer;
use vie_syntax::ast::*;
use vie_syntax::error::{error_at, ParseError, Result};
use vie_syntax::pos::{LineIndex, Position};
use vie_syntax::token::{Token, TokenKind};

/// Binding power of `|`; tighter than every binary operator.
const PIPE_PRECEDENCE: u8 = 7;

/// Maximum nesting of parentheses, `!`, calls and statements.
pub const MAX_DEPTH: usize = 128;

/// Parses one template buffer. Non-recovering: the first error is returned.
pub struct Parser<'a> {
    src: &'a [u8],
    tokens: Vec<Token>,
    pos: usize,
    lines: LineIndex,
    depth: usize,
}

impl<'a> Parser<'a> {
    pub fn new(src: &'a [u8]) -> Self {
        Self {
            src,
            tokens: Lexer::new(src).tokenize(),
            pos: 0,
            lines: LineIndex::new(src),
            depth: 0,
        }
    }

    fn peek(&self) -> Token {
        self.peek_at(0)
    }

    fn peek_at(&self, ahead: usize) -> Token {
        let last = self.tokens.len() - 1;
        self.tokens[(self.pos + ahead).min(last)]
    }

    fn advance(&mut self) -> Token {
        let tk = self.peek();
        if tk.kind != TokenKind::Eof {
            self.pos += 1;
        }
        tk
    }

    fn position(&self, offset: usize) -> Position {
        self.lines.position(offset)
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token> {
        let tk = self.peek();
        if tk.kind == kind {
            Ok(self.advance())
        } else {
            Err(self.unexpected(tk, &kind.to_string()))
        }
    }

    fn expect_ident(&mut self, what: &str) -> Result<Ident> {
        let tk = self.peek();
        if tk.kind != TokenKind::Identifier {
            return Err(self.unexpected(tk, what));
        }
        self.advance();
        Ok(self.ident(tk))
    }

    fn ident(&self, tk: Token) -> Ident {
        Ident {
            name: String::from_utf8_lossy(tk.text(self.src)).into_owned(),
            pos: self.position(tk.start),
        }
    }

    fn unexpected(&self, tk: Token, expected: &str) -> ParseError {
        let msg = if tk.kind == TokenKind::Error {
            let text = tk.text(self.src);
            match text.first() {
                Some(b'\n') => "unexpected newline inside tag".to_string(),
                Some(b'"') => "unterminated string literal".to_string(),
                _ => format!("unexpected character '{}'", text.escape_ascii()),
            }
        } else {
            format!("expected {}, found {}", expected, tk.kind)
        };
        ParseError::new(self.position(tk.start), msg)
    }

    fn enter(&mut self, pos: Position) -> Result<()> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return error_at(pos, "template nested too deeply");
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    /// Parse the whole buffer.
    pub fn parse_file(&mut self) -> Result<File> {
        let blocks = self.parse_blocks()?;
        let tk = self.peek();
        if tk.kind != TokenKind::Eof {
            // parse_blocks only stops early at `{% elseif|else|end|case`
            let kw = self.peek_at(1);
            return error_at(
                self.position(kw.start),
                format!("unexpected {} outside of a block", kw.kind),
            );
        }
        Ok(File { blocks })
    }

    fn at_block_end(&self) -> bool {
        match self.peek().kind {
            TokenKind::Eof => true,
            TokenKind::LBracePercent => matches!(
                self.peek_at(1).kind,
                TokenKind::ElseIf | TokenKind::Else | TokenKind::End | TokenKind::Case
            ),
            _ => false,
        }
    }

    fn parse_blocks(&mut self) -> Result<Vec<Block>> {
        let mut blocks = Vec::new();
        while !self.at_block_end() {
            blocks.push(self.parse_block()?);
        }
        Ok(blocks)
    }

    fn parse_block(&mut self) -> Result<Block> {
        let tk = self.peek();
        let pos = self.position(tk.start);
        match tk.kind {
            TokenKind::Text => {
                self.advance();
                Ok(Block::Text {
                    content: tk.text(self.src).to_vec(),
                    pos,
                })
            }
            TokenKind::LDoubleBrace => {
                self.advance();
                let expr = self.parse_expr()?;
                self.expect(TokenKind::RDoubleBrace)?;
                Ok(Block::Render(expr))
            }
            TokenKind::LBracePercent => self.parse_statement(),
            TokenKind::LBracePound => self.parse_comment(),
            _ => Err(self.unexpected(tk, "text or tag")),
        }
    }

    fn parse_comment(&mut self) -> Result<Block> {
        let open = self.advance();
        let content = if self.peek().kind == TokenKind::Comment {
            self.advance().text(self.src).to_vec()
        } else {
            Vec::new()
        };
        self.expect(TokenKind::RBracePound)?;
        Ok(Block::Comment {
            content,
            pos: self.position(open.start),
        })
    }

    fn parse_statement(&mut self) -> Result<Block> {
        let open = self.advance();
        let pos = self.position(open.start);
        let kw = self.peek();
        self.enter(pos)?;
        let block = match kw.kind {
            TokenKind::If => self.parse_if(pos)?,
            TokenKind::Switch => self.parse_switch(pos)?,
            _ => return Err(self.unexpected(kw, "'if' or 'switch'")),
        };
        self.leave();
        Ok(block)
    }

    fn parse_if(&mut self, pos: Position) -> Result<Block> {
        self.advance();
        let cond = self.parse_expr()?;
        self.expect(TokenKind::RBracePercent)?;
        let body = self.parse_blocks()?;
        let mut branches = vec![Branch { cond, body }];
        let mut else_body: Option<Vec<Block>> = None;
        loop {
            let tk = self.peek();
            if tk.kind == TokenKind::Eof {
                return error_at(
                    self.position(tk.start),
                    "unexpected end of input, expected '{% end %}' to close 'if'",
                );
            }
            self.advance();
            let kw = self.advance();
            let kw_pos = self.position(kw.start);
            match kw.kind {
                TokenKind::ElseIf => {
                    if else_body.is_some() {
                        return error_at(kw_pos, "'elseif' after 'else'");
                    }
                    let cond = self.parse_expr()?;
                    self.expect(TokenKind::RBracePercent)?;
                    let body = self.parse_blocks()?;
                    branches.push(Branch { cond, body });
                }
                TokenKind::Else => {
                    if else_body.is_some() {
                        return error_at(kw_pos, "duplicate 'else'");
                    }
                    self.expect(TokenKind::RBracePercent)?;
                    else_body = Some(self.parse_blocks()?);
                }
                TokenKind::End => {
                    self.expect(TokenKind::RBracePercent)?;
                    break;
                }
                _ => return error_at(kw_pos, format!("unexpected {} inside 'if'", kw.kind)),
            }
        }
        Ok(Block::If(IfBlock {
            branches,
            else_body,
            pos,
        }))
    }

    fn parse_switch(&mut self, pos: Position) -> Result<Block> {
        self.advance();
        let value = self.parse_expr()?;
        self.expect(TokenKind::RBracePercent)?;
        while self.peek().kind == TokenKind::Text
            && self.peek().text(self.src).iter().all(u8::is_ascii_whitespace)
        {
            self.advance();
        }
        let mut cases = Vec::new();
        loop {
            let tk = self.peek();
            if tk.kind != TokenKind::LBracePercent {
                if tk.kind == TokenKind::Eof {
                    return error_at(
                        self.position(tk.start),
                        "unexpected end of input, expected '{% end %}' to close 'switch'",
                    );
                }
                return Err(self.unexpected(tk, "'{% case %}'"));
            }
            let kw = self.peek_at(1);
            match kw.kind {
                TokenKind::Case => {
                    self.advance();
                    self.advance();
                    let mut patterns = vec![self.parse_expr()?];
                    while self.peek().kind == TokenKind::Comma {
                        self.advance();
                        patterns.push(self.parse_expr()?);
                    }
                    self.expect(TokenKind::RBracePercent)?;
                    let body = self.parse_blocks()?;
                    cases.push(Case { patterns, body });
                }
                TokenKind::End => {
                    self.advance();
                    self.advance();
                    self.expect(TokenKind::RBracePercent)?;
                    break;
                }
                _ => return Err(self.unexpected(kw, "'case' or 'end'")),
            }
        }
        Ok(Block::Switch(SwitchBlock { value, cases, pos }))
    }

    /// Parse one expression, stopping before the first token that cannot
    /// continue it (typically the closing delimiter).
    pub fn parse_expr(&mut self) -> Result<Expr> {
        self.parse_binary(0)
    }

    fn parse_binary(&mut self, min_prec: u8) -> Result<Expr> {
        let mut left = self.parse_unary()?;
        loop {
            let kind = self.peek().kind;
            if kind == TokenKind::Pipe {
                if PIPE_PRECEDENCE <= min_prec {
                    break;
                }
                self.advance();
                let func = self.expect_ident("function name after '|'")?;
                left = Expr::Pipe {
                    arg: Box::new(left),
                    func,
                };
                continue;
            }
            let Some(op) = binary_op(kind) else { break };
            if op.precedence() <= min_prec {
                break;
            }
            self.advance();
            let right = self.parse_binary(op.precedence())?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr> {
        let tk = self.peek();
        if tk.kind != TokenKind::Bang {
            return self.parse_primary();
        }
        self.advance();
        let pos = self.position(tk.start);
        self.enter(pos)?;
        let operand = self.parse_unary()?;
        self.leave();
        Ok(Expr::Unary {
            op: UnaryOp::Not,
            operand: Box::new(operand),
            pos,
        })
    }

    fn parse_primary(&mut self) -> Result<Expr> {
        let tk = self.peek();
        let pos = self.position(tk.start);
        match tk.kind {
            TokenKind::Identifier => {
                self.advance();
                let func = self.ident(tk);
                if self.peek().kind == TokenKind::LParen {
                    self.parse_call(func)
                } else {
                    Ok(Expr::Ident(func))
                }
            }
            TokenKind::StringLiteral | TokenKind::True | TokenKind::False => {
                self.advance();
                let kind = if tk.kind == TokenKind::StringLiteral {
                    LitKind::String
                } else {
                    LitKind::Bool
                };
                Ok(Expr::BasicLit {
                    kind,
                    value: tk.text(self.src).to_vec(),
                    pos,
                })
            }
            TokenKind::LParen => {
                self.advance();
                self.enter(pos)?;
                let inner = self.parse_expr()?;
                self.expect(TokenKind::RParen)?;
                self.leave();
                Ok(Expr::Paren {
                    inner: Box::new(inner),
                    pos,
                })
            }
            _ => Err(self.unexpected(tk, "expression")),
        }
    }

    fn parse_call(&mut self, func: Ident) -> Result<Expr> {
        self.advance();
        self.enter(func.pos)?;
        let mut args = Vec::new();
        if self.peek().kind != TokenKind::RParen {
            loop {
                args.push(self.parse_expr()?);
                if self.peek().kind != TokenKind::Comma {
                    break;
                }
                self.advance();
            }
        }
        self.expect(TokenKind::RParen)?;
        self.leave();
        Ok(Expr::Call { func, args })
    }
}

fn binary_op(kind: TokenKind) -> Option<BinaryOp> {
    match kind {
        TokenKind::Or => Some(BinaryOp::Or),
        TokenKind::And => Some(BinaryOp::And),
        TokenKind::EqEq => Some(BinaryOp::Eq),
        TokenKind::NotEq => Some(BinaryOp::Neq),
        TokenKind::Tilde => Some(BinaryOp::Concat),
        _ => None,
    }
}
