//! Vie lexer: converts template bytes into positioned tokens.
//!
//! The lexer is a byte-level state machine that never fails. Bytes it cannot
//! make sense of become [`TokenKind::Error`] tokens and scanning resumes right
//! after them. Three modes bracket the states:
//!
//! - outside: raw `TEXT` and the tag openers `{{`, `{%`, `{#`;
//! - expression: everything between `{{`/`{%` and `}}`/`%}`;
//! - comment: everything between `{#` and `#}`.
use vie_syntax::token::{Token, TokenKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Start,
    Text,
    LBrace,
    RBrace,
    Percent,
    Pound,
    StartExpression,
    StartComment,
    Comment,
    Identifier,
    StringLiteral,
    Bang,
    Equal,
}

/// Streaming scanner over a byte buffer.
pub struct Lexer<'a> {
    src: &'a [u8],
    index: usize,
    state: State,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer over the given buffer.
    pub fn new(src: &'a [u8]) -> Self {
        Self {
            src,
            index: 0,
            state: State::Start,
        }
    }

    /// Byte at `index + ahead`, or the zero sentinel past the end.
    fn peek_at(&self, ahead: usize) -> u8 {
        self.src.get(self.index + ahead).copied().unwrap_or(0)
    }

    fn peek(&self) -> u8 {
        self.peek_at(0)
    }

    fn at_end(&self) -> bool {
        self.index >= self.src.len()
    }

    fn at_tag_open(&self) -> bool {
        self.peek() == b'{' && matches!(self.peek_at(1), b'{' | b'%' | b'#')
    }

    fn token(&self, kind: TokenKind, start: usize) -> Token {
        Token {
            kind,
            start,
            end: self.index,
        }
    }

    fn eof(&self) -> Token {
        Token {
            kind: TokenKind::Eof,
            start: self.src.len(),
            end: self.src.len(),
        }
    }

    /// Returns the next token. Once the input is exhausted every call returns
    /// `Eof` with `start == end == len`.
    pub fn next_token(&mut self) -> Token {
        let mut start = self.index;
        loop {
            let c = self.peek();
            match self.state {
                State::Start => {
                    if self.at_end() {
                        return self.eof();
                    }
                    start = self.index;
                    self.index += 1;
                    self.state = if c == b'{' { State::LBrace } else { State::Text };
                }
                State::Text => {
                    if self.at_end() || c == b'\n' || self.at_tag_open() {
                        self.state = State::Start;
                        return self.token(TokenKind::Text, start);
                    }
                    self.index += 1;
                }
                State::LBrace => {
                    let (kind, next) = match c {
                        b'{' => (TokenKind::LDoubleBrace, State::StartExpression),
                        b'%' => (TokenKind::LBracePercent, State::StartExpression),
                        b'#' => (TokenKind::LBracePound, State::StartComment),
                        _ => {
                            // A lone '{' is ordinary text.
                            self.state = State::Text;
                            continue;
                        }
                    };
                    self.index += 1;
                    self.state = next;
                    return self.token(kind, start);
                }
                State::StartExpression => {
                    while matches!(self.peek(), b' ' | b'\t' | b'\r') {
                        self.index += 1;
                    }
                    if self.at_end() {
                        return self.eof();
                    }
                    start = self.index;
                    let c = self.peek();
                    self.index += 1;
                    let kind = match c {
                        b'}' => {
                            self.state = State::RBrace;
                            continue;
                        }
                        b'%' => {
                            self.state = State::Percent;
                            continue;
                        }
                        b'!' => {
                            self.state = State::Bang;
                            continue;
                        }
                        b'=' => {
                            self.state = State::Equal;
                            continue;
                        }
                        b'"' => {
                            self.state = State::StringLiteral;
                            continue;
                        }
                        c if is_ident_start(c) => {
                            self.state = State::Identifier;
                            continue;
                        }
                        b'(' => TokenKind::LParen,
                        b')' => TokenKind::RParen,
                        b',' => TokenKind::Comma,
                        b'|' => TokenKind::Pipe,
                        b'~' => TokenKind::Tilde,
                        // Newlines are not allowed inside tags; this also
                        // covers any other stray byte.
                        _ => TokenKind::Error,
                    };
                    return self.token(kind, start);
                }
                State::RBrace => {
                    if c == b'}' {
                        self.index += 1;
                        self.state = State::Start;
                        return self.token(TokenKind::RDoubleBrace, start);
                    }
                    self.state = State::StartExpression;
                    return self.token(TokenKind::Error, start);
                }
                State::Percent => {
                    if c == b'}' {
                        self.index += 1;
                        self.state = State::Start;
                        return self.token(TokenKind::RBracePercent, start);
                    }
                    self.state = State::StartExpression;
                    return self.token(TokenKind::Error, start);
                }
                State::Bang => {
                    self.state = State::StartExpression;
                    if c == b'=' {
                        self.index += 1;
                        return self.token(TokenKind::NotEq, start);
                    }
                    return self.token(TokenKind::Bang, start);
                }
                State::Equal => {
                    self.state = State::StartExpression;
                    if c == b'=' {
                        self.index += 1;
                        return self.token(TokenKind::EqEq, start);
                    }
                    return self.token(TokenKind::Error, start);
                }
                State::Identifier => {
                    if is_ident_continue(c) {
                        self.index += 1;
                        continue;
                    }
                    self.state = State::StartExpression;
                    let kind = TokenKind::keyword(&self.src[start..self.index])
                        .unwrap_or(TokenKind::Identifier);
                    return self.token(kind, start);
                }
                State::StringLiteral => {
                    // TODO: define an escape grammar; backslashes are kept verbatim for now.
                    if self.at_end() || c == b'\n' {
                        self.state = State::StartExpression;
                        return self.token(TokenKind::Error, start);
                    }
                    self.index += 1;
                    if c == b'"' {
                        self.state = State::StartExpression;
                        return self.token(TokenKind::StringLiteral, start);
                    }
                }
                State::StartComment => {
                    if self.at_end() {
                        return self.eof();
                    }
                    start = self.index;
                    self.index += 1;
                    match c {
                        b'\n' => return self.token(TokenKind::Error, start),
                        b'#' => self.state = State::Pound,
                        _ => self.state = State::Comment,
                    }
                }
                State::Pound => {
                    if c == b'}' {
                        self.index += 1;
                        self.state = State::Start;
                        return self.token(TokenKind::RBracePound, start);
                    }
                    self.state = State::Comment;
                }
                State::Comment => {
                    if self.at_end() || c == b'\n' || (c == b'#' && self.peek_at(1) == b'}') {
                        self.state = State::StartComment;
                        return self.token(TokenKind::Comment, start);
                    }
                    self.index += 1;
                }
            }
        }
    }

    /// Tokenize the entire input into a vector of tokens ending with Eof.
    pub fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let tk = self.next_token();
            tokens.push(tk);
            if tk.kind == TokenKind::Eof {
                break;
            }
        }
        tokens
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    /// Yields every token up to, but not including, `Eof`.
    fn next(&mut self) -> Option<Token> {
        let tk = self.next_token();
        (tk.kind != TokenKind::Eof).then_some(tk)
    }
}

fn is_ident_start(c: u8) -> bool {
    c.is_ascii_alphabetic() || c == b'_'
}

fn is_ident_continue(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'_'
}

/// Convenience wrapper: lex `src` to completion.
pub fn tokenize(src: &[u8]) -> Vec<Token> {
    Lexer::new(src).tokenize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use TokenKind::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        tokenize(src.as_bytes()).iter().map(|t| t.kind).collect()
    }

    fn texts(src: &str) -> Vec<String> {
        tokenize(src.as_bytes())
            .iter()
            .map(|t| String::from_utf8_lossy(t.text(src.as_bytes())).into_owned())
            .collect()
    }

    #[test]
    fn test_empty_input() {
        let tokens = tokenize(b"");
        assert_eq!(tokens, vec![Token { kind: Eof, start: 0, end: 0 }]);
    }

    #[test]
    fn test_plain_text() {
        assert_eq!(kinds("hello world"), vec![Text, Eof]);
        assert_eq!(texts("hello world"), vec!["hello world", ""]);
    }

    #[test]
    fn test_text_splits_before_newline() {
        assert_eq!(kinds("a\nb\n"), vec![Text, Text, Text, Eof]);
        assert_eq!(texts("a\nb\n"), vec!["a", "\nb", "\n", ""]);
    }

    #[test]
    fn test_render_tag() {
        assert_eq!(kinds("{{ name }}"), vec![LDoubleBrace, Identifier, RDoubleBrace, Eof]);
        assert_eq!(texts("{{name}}"), vec!["{{", "name", "}}", ""]);
    }

    #[test]
    fn test_statement_keywords() {
        assert_eq!(
            kinds("{% if a and b or c %}{% elseif x %}{% else %}{% end %}"),
            vec![
                LBracePercent, If, Identifier, And, Identifier, Or, Identifier, RBracePercent,
                LBracePercent, ElseIf, Identifier, RBracePercent,
                LBracePercent, Else, RBracePercent,
                LBracePercent, End, RBracePercent,
                Eof,
            ]
        );
    }

    #[test]
    fn test_operators() {
        assert_eq!(
            kinds("{{ !a != b == c | f ~ (d, e) }}"),
            vec![
                LDoubleBrace, Bang, Identifier, NotEq, Identifier, EqEq, Identifier, Pipe,
                Identifier, Tilde, LParen, Identifier, Comma, Identifier, RParen, RDoubleBrace,
                Eof,
            ]
        );
    }

    #[test]
    fn test_keyword_prefix_is_identifier() {
        assert_eq!(kinds("{{ iffy endless true_ }}"), vec![LDoubleBrace, Identifier, Identifier, Identifier, RDoubleBrace, Eof]);
        assert_eq!(kinds("{{ true false }}"), vec![LDoubleBrace, True, False, RDoubleBrace, Eof]);
    }

    #[test]
    fn test_string_literal() {
        assert_eq!(texts(r#"{{ "a b" }}"#), vec!["{{", "\"a b\"", "}}", ""]);
        // backslashes are not escapes
        assert_eq!(texts(r#"{{ "a\" }}"#), vec!["{{", "\"a\\\"", "}}", ""]);
    }

    #[test]
    fn test_unterminated_string_is_error() {
        assert_eq!(kinds("{{ \"abc }}"), vec![LDoubleBrace, Error, Eof]);
        assert_eq!(kinds("{{ \"abc\n}}"), vec![LDoubleBrace, Error, Error, RDoubleBrace, Eof]);
    }

    #[test]
    fn test_newline_in_expression_is_error() {
        let src = "{{ a\n}}";
        let tokens = tokenize(src.as_bytes());
        let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(kinds, vec![LDoubleBrace, Identifier, Error, RDoubleBrace, Eof]);
        assert_eq!(tokens[2].start, 4);
        assert_eq!(tokens[2].end, 5);
    }

    #[test]
    fn test_unknown_bytes_are_single_byte_errors() {
        let tokens = tokenize(b"{{ a $ 1 = }}");
        let errors: Vec<_> = tokens.iter().filter(|t| t.kind == Error).collect();
        assert_eq!(errors.len(), 3);
        assert!(errors.iter().all(|t| t.len() == 1));
    }

    #[test]
    fn test_comment() {
        assert_eq!(kinds("{# note #}"), vec![LBracePound, Comment, RBracePound, Eof]);
        assert_eq!(texts("{# a # b #}"), vec!["{#", " a # b ", "#}", ""]);
        assert_eq!(kinds("{##}"), vec![LBracePound, RBracePound, Eof]);
    }

    #[test]
    fn test_newline_in_comment_is_error() {
        assert_eq!(kinds("{# a\nb #}"), vec![LBracePound, Comment, Error, Comment, RBracePound, Eof]);
    }

    #[test]
    fn test_lone_brace_is_text() {
        assert_eq!(kinds("a { b } c"), vec![Text, Eof]);
        assert_eq!(kinds("{"), vec![Text, Eof]);
        assert_eq!(texts("x{{y}}"), vec!["x", "{{", "y", "}}", ""]);
    }

    #[test]
    fn test_closers_outside_tags_are_text() {
        assert_eq!(kinds("a }} b %} c #}"), vec![Text, Eof]);
    }

    #[test]
    fn test_eof_is_sticky() {
        let mut lexer = Lexer::new(b"{{ a");
        let tokens: Vec<_> = lexer.by_ref().collect();
        assert_eq!(tokens.len(), 2);
        for _ in 0..3 {
            assert_eq!(lexer.next_token(), Token { kind: Eof, start: 4, end: 4 });
        }
    }

    #[test]
    fn test_token_stream_is_total() {
        let corpus = [
            "", "{", "{{", "{%", "{#", "}}", "{{ \"", "{{ a | }}", "{# #", "\n\n{{\n",
            "{% if a %}x{% end %}", "{{ \u{e9} }}", "\0{{\0}}", "{{=!}}",
        ];
        for src in corpus {
            let tokens = tokenize(src.as_bytes());
            let last = tokens.last().copied().unwrap();
            assert_eq!(last, Token { kind: Eof, start: src.len(), end: src.len() }, "input {:?}", src);
            assert_eq!(tokens.iter().filter(|t| t.kind == Eof).count(), 1);
            assert!(last.is_empty());
            let mut prev_end = 0;
            for t in &tokens {
                assert!(t.start <= t.end && t.end <= src.len(), "span out of bounds in {:?}", src);
                assert!(t.start >= prev_end, "overlapping tokens in {:?}", src);
                prev_end = t.end;
            }
        }
    }
}
