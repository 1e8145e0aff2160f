//! Rendering a directory of templates into a new directory.
//!
//! Every path component under the source root is itself a template, so
//! `{{ name }}/src/main.rs.vie` becomes `demo/src/main.rs` for
//! `name = "demo"`. Files ending in `.vie` have the extension dropped and
//! their contents rendered; all other files are copied unchanged. A component
//! that renders to nothing skips the entry together with everything below it.
//!
//! Each entry owns only its last component. Children are placed under the
//! target their parent already rendered to, so a directory name is parsed,
//! analyzed and rendered once no matter how much sits below it.
//!
//! The whole tree is parsed, analyzed and rendered in memory before anything
//! is written.

use std::collections::HashMap;
use std::fs;
use std::path::{Component, Path, PathBuf};

use anyhow::{anyhow, bail, Context as _, Result};
use vie_builtins::Registry;
use vie_render::{Context, Renderer};
use vie_syntax::ast::File;
use walkdir::WalkDir;

use crate::common::{print_diagnostics, render_message, Painter};

const TEMPLATE_EXT: &str = ".vie";

enum Body {
    Dir,
    Copy,
    Template(File),
}

struct Entry {
    src: PathBuf,
    /// The last path component, `.vie` stripped for templates
    name: File,
    body: Body,
}

enum Action {
    CreateDir,
    Copy(PathBuf),
    Write(Vec<u8>),
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct Summary {
    pub dirs: usize,
    pub rendered: usize,
    pub copied: usize,
    pub skipped: usize,
}

pub fn run(src: &Path, dest: &Path, ctx: &Context, force: bool, p: &Painter) -> Result<Summary> {
    let registry = Registry::standard();
    let entries = collect(src)?;

    let (types, diagnostics) = vie_analyzer::analyze(templates(&entries), &registry);
    if !diagnostics.is_empty() {
        print_diagnostics(p, &diagnostics);
        bail!("{} type error(s) in {}", diagnostics.len(), src.display());
    }

    let renderer = Renderer::new(&registry).with_types(&types);
    let (plan, summary) = plan(&entries, src, dest, &renderer, ctx, force)?;
    for (target, action) in plan {
        match action {
            Action::CreateDir => fs::create_dir_all(&target),
            Action::Copy(from) => fs::copy(&from, &target).map(|_| ()),
            Action::Write(bytes) => fs::write(&target, bytes),
        }
        .with_context(|| format!("failed to write {}", target.display()))?;
    }
    log::info!("{:?}", summary);
    Ok(summary)
}

fn collect(src: &Path) -> Result<Vec<Entry>> {
    if !src.is_dir() {
        bail!("{} is not a directory", src.display());
    }
    let mut entries = Vec::new();
    for item in WalkDir::new(src).min_depth(1).sort_by_file_name() {
        let item = item.with_context(|| format!("failed to walk {}", src.display()))?;
        let path = item.path();
        let rel = path.strip_prefix(src).with_context(|| format!("{} escapes the source root", path.display()))?;
        if rel.components().any(|c| !matches!(c, Component::Normal(_))) {
            bail!("unexpected path component in {}", rel.display());
        }
        let mut name = item
            .file_name()
            .to_str()
            .ok_or_else(|| anyhow!("{} is not valid UTF-8", path.display()))?;

        let mut body = Body::Copy;
        if item.file_type().is_dir() {
            body = Body::Dir;
        } else if let Some(stem) = name.strip_suffix(TEMPLATE_EXT) {
            name = stem;
            let source = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
            body = Body::Template(parse(path, &source)?);
        }
        log::debug!("collected {}", rel.display());
        entries.push(Entry {
            src: path.to_path_buf(),
            name: parse(path, name.as_bytes())?,
            body,
        });
    }
    Ok(entries)
}

/// Every template of the tree, labelled with its source path.
fn templates(entries: &[Entry]) -> Vec<(&Path, &File)> {
    let mut units = Vec::new();
    for entry in entries {
        units.push((entry.src.as_path(), &entry.name));
        if let Body::Template(file) = &entry.body {
            units.push((entry.src.as_path(), file));
        }
    }
    units
}

fn parse(path: &Path, source: &[u8]) -> Result<File> {
    vie_parser::parse(source).map_err(|e| anyhow!("{}:{}: {}", path.display(), e.pos, e.msg))
}

fn plan(
    entries: &[Entry],
    src: &Path,
    dest: &Path,
    renderer: &Renderer<'_>,
    ctx: &Context,
    force: bool,
) -> Result<(Vec<(PathBuf, Action)>, Summary)> {
    let mut summary = Summary::default();
    let mut owners: HashMap<PathBuf, &Path> = HashMap::new();
    // Source directory -> rendered target, `None` once skipped.
    let mut placed: HashMap<&Path, Option<PathBuf>> = HashMap::new();
    placed.insert(src, Some(dest.to_path_buf()));
    let mut plan = vec![(dest.to_path_buf(), Action::CreateDir)];

    for entry in entries {
        let parent = entry
            .src
            .parent()
            .and_then(|parent| placed.get(parent))
            .ok_or_else(|| anyhow!("{}: parent directory was not visited", entry.src.display()))?;
        let Some(parent) = parent.clone() else {
            summary.skipped += 1;
            placed.insert(&entry.src, None);
            continue;
        };

        let rendered = render(renderer, &entry.src, &entry.name, ctx)?;
        if rendered.is_empty() {
            summary.skipped += 1;
            placed.insert(&entry.src, None);
            continue;
        }
        let rendered = String::from_utf8(rendered)
            .map_err(|_| anyhow!("{}: file name is not valid UTF-8", entry.src.display()))?;
        if rendered == "." || rendered == ".." || rendered.contains(['/', '\\']) {
            bail!("{}: invalid file name '{}'", entry.src.display(), rendered);
        }
        let target = parent.join(rendered);

        if let Some(other) = owners.insert(target.clone(), entry.src.as_path()) {
            bail!(
                "{} and {} both render to {}",
                other.display(),
                entry.src.display(),
                target.display()
            );
        }
        let action = match &entry.body {
            Body::Dir => {
                summary.dirs += 1;
                placed.insert(&entry.src, Some(target.clone()));
                Action::CreateDir
            }
            Body::Copy => {
                summary.copied += 1;
                Action::Copy(entry.src.clone())
            }
            Body::Template(file) => {
                summary.rendered += 1;
                Action::Write(render(renderer, &entry.src, file, ctx)?)
            }
        };
        if !matches!(action, Action::CreateDir) && target.exists() && !force {
            bail!("{} already exists (use --force to overwrite)", target.display());
        }
        plan.push((target, action));
    }
    Ok((plan, summary))
}

fn render(renderer: &Renderer<'_>, path: &Path, file: &File, ctx: &Context) -> Result<Vec<u8>> {
    renderer.render_to_vec(file, ctx).map_err(|e| match e.pos() {
        Some(pos) => anyhow!("{}:{}: {}", path.display(), pos, render_message(&e)),
        None => anyhow!(e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use vie_syntax::types::Type;

    fn write(path: &Path, contents: &str) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn test_directory_name_counts_once() {
        let dir = tempfile::tempdir().unwrap();
        let named = dir.path().join("{{ a }}");
        for child in ["x", "y", "z"] {
            write(&named.join(child), "");
        }
        write(&named.join("cond.vie"), "{% if a %}{% end %}{% if a %}{% end %}");

        let entries = collect(dir.path()).unwrap();
        let (types, diagnostics) = vie_analyzer::analyze(templates(&entries), &Registry::standard());
        assert_eq!(types.get("a"), Some(&Type::Bool));
        assert_eq!(diagnostics.len(), 1, "{:?}", diagnostics);
        assert_eq!(diagnostics[0].path, named);
    }

    #[test]
    fn test_children_land_under_rendered_parent() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src");
        let dest = dir.path().join("out");
        write(&src.join("{{ name }}/sub/{{ name }}.txt.vie"), "{{ name | upper }}");
        write(&src.join("{% if docs %}docs{% end %}/a/b.txt"), "b");

        let entries = collect(&src).unwrap();
        let registry = Registry::standard();
        let (types, diagnostics) = vie_analyzer::analyze(templates(&entries), &registry);
        assert!(diagnostics.is_empty(), "{:?}", diagnostics);

        let renderer = Renderer::new(&registry).with_types(&types);
        let ctx = Context::new().with("name", "demo").with("docs", false);
        let (plan, summary) = plan(&entries, &src, &dest, &renderer, &ctx, false).unwrap();

        let targets: Vec<_> = plan.iter().map(|(target, _)| target.clone()).collect();
        assert_eq!(
            targets,
            vec![
                dest.clone(),
                dest.join("demo"),
                dest.join("demo/sub"),
                dest.join("demo/sub/demo.txt"),
            ]
        );
        match &plan[3].1 {
            Action::Write(bytes) => assert_eq!(bytes, b"DEMO"),
            _ => panic!("expected a rendered file"),
        }
        assert_eq!(
            summary,
            Summary {
                dirs: 2,
                rendered: 1,
                copied: 0,
                skipped: 3,
            }
        );
    }
}
