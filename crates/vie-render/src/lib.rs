//! Vie renderer: evaluates a parsed template against a context and writes the
//! result to a byte sink.
//!
//! ```
//! use vie_builtins::Registry;
//! use vie_render::{render_to_vec, Context};
//!
//! let file = vie_parser::parse(b"Hello, {{ name | title }}!").unwrap();
//! let ctx = Context::new().with("name", "world");
//! let out = render_to_vec(&file, &ctx, &Registry::standard(), None).unwrap();
//! assert_eq!(out, b"Hello, World!");
//! ```

pub mod context;
pub mod error;
pub mod renderer;

pub use context::Context;
pub use error::{RenderError, Result};
pub use renderer::Renderer;

use std::io::Write;

use vie_builtins::Registry;
use vie_syntax::ast::File;
use vie_syntax::types::TypeMap;

/// Render `file` into `out` with the given registry and optional type map.
pub fn render<W: Write + ?Sized>(
    file: &File,
    ctx: &Context,
    registry: &Registry,
    types: Option<&TypeMap>,
    out: &mut W,
) -> Result<()> {
    let mut renderer = Renderer::new(registry);
    if let Some(types) = types {
        renderer = renderer.with_types(types);
    }
    renderer.render(file, ctx, out)
}

pub fn render_to_vec(
    file: &File,
    ctx: &Context,
    registry: &Registry,
    types: Option<&TypeMap>,
) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    render(file, ctx, registry, types, &mut out)?;
    Ok(out)
}
