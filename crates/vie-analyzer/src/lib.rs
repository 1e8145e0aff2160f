//! Vie analyzer: infers one type per free identifier from how it is used.
//!
//! Every identifier occurrence is recorded with the type its surrounding
//! construct expects (a rendered value must be a string, a condition a bool,
//! a builtin argument whatever the signature says). Once all templates of a
//! set are visited, each identifier takes the type most of its usages expect
//! and every dissenting usage becomes a diagnostic.

pub mod analyzer;
pub mod diagnostic;

pub use analyzer::{resolve, Analyzer, Usage, UsageKind};
pub use diagnostic::{Diagnostic, DiagnosticKind};

use std::path::Path;

use vie_builtins::Registry;
use vie_syntax::ast::File;
use vie_syntax::types::TypeMap;

/// Analyze a set of templates as one unit.
pub fn analyze<'a>(
    files: impl IntoIterator<Item = (&'a Path, &'a File)>,
    registry: &Registry,
) -> (TypeMap, Vec<Diagnostic>) {
    let analyzer = Analyzer::new(registry);
    for (path, file) in files {
        analyzer.analyze_file(path, file);
    }
    analyzer.results()
}
