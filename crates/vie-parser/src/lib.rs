pub mod parser;

pub use parser::Parser;

use vie_syntax::ast::File;
use vie_syntax::error::Result;

/// Parse a template buffer into a [`File`].
pub fn parse(src: &[u8]) -> Result<File> {
    let result = Parser::new(src).parse_file();
    match &result {
        Ok(file) => log::debug!("parsed {} blocks from {} bytes", file.blocks.len(), src.len()),
        Err(e) => log::debug!("parse failed: {}", e),
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use vie_syntax::ast::*;
    use vie_syntax::pos::Position;

    fn parse_str(input: &str) -> File {
        parse(input.as_bytes()).expect("Parsing should succeed")
    }

    fn parse_expr_str(input: &str) -> Expr {
        let file = parse_str(&format!("{{{{ {} }}}}", input));
        match file.blocks.into_iter().next() {
            Some(Block::Render(e)) => e,
            other => panic!("Expected render block, got {:?}", other),
        }
    }

    fn parse_err(input: &str) -> vie_syntax::ParseError {
        match parse(input.as_bytes()) {
            Ok(file) => panic!("Expected error for {:?}, got {:?}", input, file),
            Err(e) => e,
        }
    }

    fn name(e: &Expr) -> &str {
        match e {
            Expr::Ident(i) => &i.name,
            other => panic!("Expected Ident, got {:?}", other),
        }
    }

    #[test]
    fn test_literal_expressions() {
        assert!(matches!(parse_expr_str("true"), Expr::BasicLit { kind: LitKind::Bool, value, .. } if value == b"true"));
        assert!(matches!(parse_expr_str("false"), Expr::BasicLit { kind: LitKind::Bool, value, .. } if value == b"false"));
        assert!(matches!(parse_expr_str("\"hi\""), Expr::BasicLit { kind: LitKind::String, value, .. } if value == b"\"hi\""));
    }

    #[test]
    fn test_identifier_expressions() {
        assert_eq!(name(&parse_expr_str("variable")), "variable");
        assert_eq!(name(&parse_expr_str("_my_var2")), "_my_var2");
    }

    #[test]
    fn test_text_and_comment_blocks() {
        let file = parse_str("a\nb{# note #}{##}");
        assert_eq!(file.blocks.len(), 4);
        assert!(matches!(&file.blocks[0], Block::Text { content, .. } if content == b"a"));
        assert!(matches!(&file.blocks[1], Block::Text { content, .. } if content == b"\nb"));
        assert!(matches!(&file.blocks[2], Block::Comment { content, .. } if content == b" note "));
        assert!(matches!(&file.blocks[3], Block::Comment { content, .. } if content.is_empty()));
    }

    #[test]
    fn test_binary_operators() {
        let ops = [("==", BinaryOp::Eq), ("!=", BinaryOp::Neq), ("and", BinaryOp::And), ("or", BinaryOp::Or), ("~", BinaryOp::Concat)];
        for (sym, op) in ops {
            let e = parse_expr_str(&format!("a {} b", sym));
            assert!(matches!(e, Expr::Binary { op: o, .. } if o == op), "operator {}", sym);
        }
    }

    #[test]
    fn test_operator_precedence() {
        // a or (b and c)
        match parse_expr_str("a or b and c") {
            Expr::Binary { op: BinaryOp::Or, right, .. } => {
                assert!(matches!(*right, Expr::Binary { op: BinaryOp::And, .. }))
            }
            other => panic!("unexpected {:?}", other),
        }
        // (a ~ b) == c
        match parse_expr_str("a ~ b == c") {
            Expr::Binary { op: BinaryOp::Eq, left, .. } => {
                assert!(matches!(*left, Expr::Binary { op: BinaryOp::Concat, .. }))
            }
            other => panic!("unexpected {:?}", other),
        }
        // a ~ (b | f)
        match parse_expr_str("a ~ b | f") {
            Expr::Binary { op: BinaryOp::Concat, right, .. } => {
                assert!(matches!(*right, Expr::Pipe { .. }))
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_left_associativity() {
        match parse_expr_str("a ~ b ~ c") {
            Expr::Binary { left, right, .. } => {
                assert!(matches!(*left, Expr::Binary { op: BinaryOp::Concat, .. }));
                assert_eq!(name(&right), "c");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_unary_binds_tighter_than_binary() {
        match parse_expr_str("!a and b") {
            Expr::Binary { op: BinaryOp::And, left, .. } => {
                assert!(matches!(*left, Expr::Unary { op: UnaryOp::Not, .. }))
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(matches!(parse_expr_str("!!a"), Expr::Unary { operand, .. } if matches!(*operand, Expr::Unary { .. })));
    }

    #[test]
    fn test_parenthesized_expressions() {
        match parse_expr_str("(a or b) and c") {
            Expr::Binary { op: BinaryOp::And, left, .. } => {
                assert!(matches!(*left, Expr::Paren { .. }))
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_function_calls() {
        if let Expr::Call { func, args } = parse_expr_str("foo()") {
            assert_eq!(func.name, "foo");
            assert_eq!(args.len(), 0);
        } else {
            panic!("Expected Call");
        }

        if let Expr::Call { func, args } = parse_expr_str("join(a, \"b\", c ~ d)") {
            assert_eq!(func.name, "join");
            assert_eq!(args.len(), 3);
        } else {
            panic!("Expected Call");
        }
    }

    #[test]
    fn test_pipes_chain_left_to_right() {
        match parse_expr_str("name | lower | upper") {
            Expr::Pipe { arg, func } => {
                assert_eq!(func.name, "upper");
                assert!(matches!(*arg, Expr::Pipe { ref func, .. } if func.name == "lower"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_positions() {
        let file = parse_str("ab\n  {{ x ~ y }}");
        let Block::Render(e) = &file.blocks[2] else { panic!("expected render") };
        assert_eq!(e.pos(), Position::new(1, 5));
        let Expr::Binary { right, .. } = e else { panic!("expected binary") };
        assert_eq!(right.pos(), Position::new(1, 9));
    }

    #[test]
    fn test_if_statement() {
        let file = parse_str("{% if a %}x{% elseif b %}y{% elseif c %}z{% else %}w{% end %}");
        let Block::If(stmt) = &file.blocks[0] else { panic!("expected if") };
        assert_eq!(stmt.branches.len(), 3);
        assert_eq!(stmt.else_body.as_ref().map(Vec::len), Some(1));
        assert_eq!(name(&stmt.branches[1].cond), "b");
    }

    #[test]
    fn test_nested_if() {
        let file = parse_str("{% if a %}{% if b %}in{% end %}out{% end %}");
        let Block::If(outer) = &file.blocks[0] else { panic!("expected if") };
        assert_eq!(outer.branches[0].body.len(), 2);
        assert!(matches!(outer.branches[0].body[0], Block::If(_)));
    }

    #[test]
    fn test_switch_statement() {
        let file = parse_str("{% switch kind %}\n  {% case \"a\", \"b\" %}ab{% case \"c\" %}c{% end %}");
        let Block::Switch(stmt) = &file.blocks[0] else { panic!("expected switch") };
        assert_eq!(stmt.cases.len(), 2);
        assert_eq!(stmt.cases[0].patterns.len(), 2);
    }

    #[test]
    fn test_if_errors() {
        let e = parse_err("{% if a %}x{% else %}y{% elseif b %}{% end %}");
        assert!(e.msg.contains("'elseif' after 'else'"), "{}", e);
        let e = parse_err("{% if a %}{% else %}{% else %}{% end %}");
        assert!(e.msg.contains("duplicate 'else'"), "{}", e);
        let e = parse_err("{% if a %}never closed");
        assert!(e.msg.contains("end of input"), "{}", e);
        let e = parse_err("{% end %}");
        assert!(e.msg.contains("outside of a block"), "{}", e);
        assert_eq!(e.pos, Position::new(0, 3));
    }

    #[test]
    fn test_expression_errors() {
        assert!(parse_err("{{ }}").msg.contains("expected expression"));
        assert!(parse_err("{{ a b }}").msg.contains("expected '}}', found identifier"));
        assert!(parse_err("{{ a | \"x\" }}").msg.contains("function name"));
        assert!(parse_err("{{ f(a,) }}").msg.contains("expected expression"));
        assert!(parse_err("{{ (a }}").msg.contains("expected ')'"));
        assert!(parse_err("{{ a").msg.contains("end of input"));
        assert!(parse_err("{% foo %}").msg.contains("'if' or 'switch'"));
    }

    #[test]
    fn test_lexical_errors_surface_as_parse_errors() {
        let e = parse_err("{{ a\n}}");
        assert_eq!(e.msg, "unexpected newline inside tag");
        assert_eq!(e.pos, Position::new(0, 4));
        assert_eq!(parse_err("{{ \"abc }}").msg, "unterminated string literal");
        assert_eq!(parse_err("{{ a $ b }}").msg, "unexpected character '$'");
        assert_eq!(parse_err("{# a\n #}").msg, "unexpected newline inside tag");
    }

    #[test]
    fn test_nesting_limit() {
        let max = parser::MAX_DEPTH;
        let deep = format!("{{{{ {}a{} }}}}", "(".repeat(max), ")".repeat(max));
        assert!(parse(deep.as_bytes()).is_ok());
        let too_deep = format!("{{{{ {}a }}}}", "!".repeat(max + 1));
        assert!(parse_err(&too_deep).msg.contains("nested too deeply"));
    }

    #[test]
    fn test_parse_never_panics() {
        let corpus = [
            "hello {{ name }}!\n",
            "{% if a and !b %}x{% elseif c == \"d\" %}y{% else %}z{% end %}",
            "{{ upper(a ~ \"-\" ~ b) | lower }}",
            "{# comment #}{##}",
            "{% switch k %}{% case \"a\", \"b\" %}1{% end %}",
            "{{ (a or (b and c)) }}",
            "{% if %}{% end",
            "{{ \"unterminated",
            "}} %} #} {{ {% {#",
        ];
        for src in corpus {
            let bytes = src.as_bytes();
            for i in 0..=bytes.len() {
                let _ = parse(&bytes[..i]);
                let _ = parse(&bytes[i..]);
                if i < bytes.len() {
                    let mut deleted = bytes.to_vec();
                    deleted.remove(i);
                    let _ = parse(&deleted);
                }
            }
        }
    }
}
