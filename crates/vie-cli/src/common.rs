use std::path::Path;

use owo_colors::OwoColorize;
use vie_analyzer::Diagnostic;
use vie_builtins::Registry;
use vie_render::RenderError;
use vie_syntax::pos::Position;

/// Colors stderr output unless `NO_COLOR` is set to a non-empty value.
#[derive(Debug, Clone, Copy)]
pub struct Painter {
    color: bool,
}

impl Painter {
    pub fn from_env() -> Self {
        Self {
            color: std::env::var_os("NO_COLOR").map_or(true, |v| v.is_empty()),
        }
    }

    pub fn error(&self, s: &str) -> String {
        if self.color {
            s.red().bold().to_string()
        } else {
            s.to_string()
        }
    }

    pub fn red(&self, s: &str) -> String {
        if self.color {
            s.red().to_string()
        } else {
            s.to_string()
        }
    }

    pub fn help(&self, s: &str) -> String {
        if self.color {
            s.yellow().to_string()
        } else {
            s.to_string()
        }
    }

    pub fn dim(&self, s: &str) -> String {
        if self.color {
            s.bright_black().to_string()
        } else {
            s.to_string()
        }
    }
}

/// Prints `msg` with the offending source line and a caret under `pos`.
pub fn render_error(p: &Painter, kind: &str, path: &Path, source: &[u8], pos: Position, msg: &str) {
    eprintln!("{}: {}", p.error(kind), p.red(msg));
    eprintln!("  --> {}:{}", path.display(), pos);
    if let Some(line) = source.split(|&b| b == b'\n').nth(pos.line) {
        let line = String::from_utf8_lossy(line);
        let gutter = format!("{:3} | ", pos.line + 1);
        eprintln!("     |");
        eprintln!("{}{}", p.dim(&gutter), line.trim_end_matches('\r'));
        let marker = format!("{}^", " ".repeat(gutter.len() + pos.character));
        eprintln!("{}{}", p.red(&marker), p.red(" error here"));
        eprintln!("     |");
    }
    provide_error_suggestions(p, msg);
}

/// The error text without its trailing `at line:char`.
pub fn render_message(e: &RenderError) -> String {
    let msg = e.to_string();
    match (e.pos(), msg.rfind(" at ")) {
        (Some(_), Some(i)) => msg[..i].to_string(),
        _ => msg,
    }
}

/// One `path:line:char: message` line per diagnostic.
pub fn print_diagnostics(p: &Painter, diagnostics: &[Diagnostic]) {
    for d in diagnostics {
        let location = format!("{}:{}:", d.path.display(), d.pos);
        eprintln!("{} {}", p.error(&location), d.kind);
    }
}

pub fn provide_error_suggestions(p: &Painter, msg: &str) {
    if msg.contains("undefined variable") {
        eprintln!("{}", p.help("Help: bind it with --set name=value or in the --context file."));
    } else if msg.contains("undefined function") {
        let names: Vec<_> = Registry::standard().names().collect();
        eprintln!("{}", p.help("Help: check the spelling of the function name."));
        eprintln!("    {}", p.dim(&format!("Available builtins: {}", names.join(", "))));
    } else if msg.contains("unexpected newline inside tag") {
        eprintln!("{}", p.help("Help: tags must open and close on the same line."));
    } else if msg.contains("unterminated string literal") {
        eprintln!("{}", p.help("Help: string is missing its closing quote."));
    } else if msg.contains("expected '{% end %}'") {
        eprintln!("{}", p.help("Help: every 'if' and 'switch' needs a matching '{% end %}'."));
    } else if msg.contains("'switch' statements are not supported") {
        eprintln!("{}", p.help("Help: 'switch' is reserved; use an if/elseif chain instead."));
    } else if msg.contains("invalid operation") {
        eprintln!("{}", p.help("Help: both sides of '==', '!=', 'and', 'or' and '~' must share a type."));
    }
}
