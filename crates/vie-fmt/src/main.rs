use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context as _, Result};
use clap::Parser;

/// Format Vie templates.
#[derive(Debug, Parser)]
#[command(name = "vie-fmt", version)]
struct Args {
    /// Report files that are not formatted instead of printing them
    #[arg(long, conflicts_with = "write")]
    check: bool,

    /// Rewrite files in place
    #[arg(long)]
    write: bool,

    #[arg(required = true, value_name = "FILE")]
    files: Vec<PathBuf>,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();
    match run(&args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Returns false when `--check` found an unformatted file.
fn run(args: &Args) -> Result<bool> {
    let mut clean = true;
    let stdout = io::stdout();
    let mut stdout = stdout.lock();
    for file in &args.files {
        let src = fs::read(file).with_context(|| format!("failed to read {}", file.display()))?;
        let formatted = match vie_fmt::format_source(&src) {
            Ok(out) => out,
            Err(e) => bail!("{}:{}: {}", file.display(), e.pos, e.msg),
        };
        if args.check {
            if normalize_newlines(&formatted) != normalize_newlines(&src) {
                eprintln!("{}: not formatted", file.display());
                clean = false;
            } else {
                writeln!(stdout, "{}: ok", file.display())?;
            }
        } else if args.write {
            if formatted != src {
                log::info!("rewriting {}", file.display());
                fs::write(file, &formatted).with_context(|| format!("failed to write {}", file.display()))?;
            }
        } else {
            stdout.write_all(&formatted)?;
        }
    }
    Ok(clean)
}

fn normalize_newlines(s: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(s.len());
    let mut iter = s.iter().peekable();
    while let Some(&b) = iter.next() {
        if b == b'\r' && iter.peek() == Some(&&b'\n') {
            continue;
        }
        out.push(b);
    }
    out
}
