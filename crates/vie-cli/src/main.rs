mod common;
mod context;
mod tree;

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context as _, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use vie_analyzer::analyze;
use vie_builtins::Registry;
use vie_render::Renderer;
use vie_syntax::ast::File;

use crate::common::{print_diagnostics, render_error, render_message, Painter};

#[derive(Debug, Parser)]
#[command(name = "vie", version, about = "Render and check Vie templates")]
struct Cli {
    /// Log debug output (overrides RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Args)]
struct ContextArgs {
    /// JSON object of string and boolean values
    #[arg(long = "context", value_name = "FILE")]
    context: Option<PathBuf>,

    /// Bind NAME to a string value; may be repeated and wins over --context
    #[arg(long = "set", value_name = "NAME=VALUE", action = ArgAction::Append)]
    sets: Vec<String>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Render a template to stdout or a file
    Render {
        template: PathBuf,

        #[command(flatten)]
        ctx: ContextArgs,

        /// Write the output here instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Skip type analysis; missing names are then errors
        #[arg(long)]
        unchecked: bool,
    },

    /// Parse and type-check templates as one set
    Check {
        #[arg(required = true, value_name = "FILE")]
        files: Vec<PathBuf>,

        /// Print the inferred type of every name
        #[arg(long)]
        types: bool,
    },

    /// Render a directory of templates into DEST
    Tree {
        src: PathBuf,
        dest: PathBuf,

        #[command(flatten)]
        ctx: ContextArgs,

        /// Overwrite files that already exist in DEST
        #[arg(long)]
        force: bool,
    },
}

fn init_logger(verbose: bool) {
    let mut builder = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logger(cli.verbose);
    let painter = Painter::from_env();
    let result = match cli.command {
        Command::Render {
            template,
            ctx,
            output,
            unchecked,
        } => cmd_render(&painter, &template, &ctx, output.as_deref(), unchecked),
        Command::Check { files, types } => cmd_check(&painter, &files, types),
        Command::Tree { src, dest, ctx, force } => cmd_tree(&painter, &src, &dest, &ctx, force),
    };
    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("{}: {:#}", painter.error("error"), e);
            ExitCode::FAILURE
        }
    }
}

fn read_template(p: &Painter, path: &Path) -> Result<Option<(Vec<u8>, File)>> {
    let source = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    match vie_parser::parse(&source) {
        Ok(file) => Ok(Some((source, file))),
        Err(e) => {
            render_error(p, "parse error", path, &source, e.pos, &e.msg);
            Ok(None)
        }
    }
}

fn cmd_render(p: &Painter, template: &Path, args: &ContextArgs, output: Option<&Path>, unchecked: bool) -> Result<bool> {
    let Some((source, file)) = read_template(p, template)? else {
        return Ok(false);
    };
    let ctx = context::load(args.context.as_deref(), &args.sets)?;
    let registry = Registry::standard();

    let types = if unchecked {
        None
    } else {
        let (types, diagnostics) = analyze([(template, &file)], &registry);
        if !diagnostics.is_empty() {
            print_diagnostics(p, &diagnostics);
            return Ok(false);
        }
        Some(types)
    };
    let mut renderer = Renderer::new(&registry);
    if let Some(types) = &types {
        renderer = renderer.with_types(types);
    }

    let out = match renderer.render_to_vec(&file, &ctx) {
        Ok(out) => out,
        Err(e) => match e.pos() {
            Some(pos) => {
                render_error(p, "render error", template, &source, pos, &render_message(&e));
                return Ok(false);
            }
            None => return Err(e.into()),
        },
    };
    match output {
        Some(path) => fs::write(path, &out).with_context(|| format!("failed to write {}", path.display()))?,
        None => io::stdout().lock().write_all(&out)?,
    }
    Ok(true)
}

fn cmd_check(p: &Painter, files: &[PathBuf], print_types: bool) -> Result<bool> {
    let mut parsed = Vec::new();
    let mut ok = true;
    for path in files {
        match read_template(p, path)? {
            Some((_, file)) => parsed.push((path.as_path(), file)),
            None => ok = false,
        }
    }
    let registry = Registry::standard();
    let (types, diagnostics) = analyze(parsed.iter().map(|(path, file)| (*path, file)), &registry);
    print_diagnostics(p, &diagnostics);
    if print_types {
        let mut stdout = io::stdout().lock();
        for (name, ty) in &types {
            writeln!(stdout, "{}: {}", name, ty)?;
        }
    }
    Ok(ok && diagnostics.is_empty())
}

fn cmd_tree(p: &Painter, src: &Path, dest: &Path, args: &ContextArgs, force: bool) -> Result<bool> {
    let ctx = context::load(args.context.as_deref(), &args.sets)?;
    let summary = tree::run(src, dest, &ctx, force, p)?;
    eprintln!(
        "rendered {} file(s), copied {}, created {} dir(s), skipped {}",
        summary.rendered, summary.copied, summary.dirs, summary.skipped
    );
    Ok(true)
}
