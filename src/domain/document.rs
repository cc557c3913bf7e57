//! Units of renderable content discovered at build start.

use std::path::{Path, PathBuf};

/// How a document is rendered: articles run through the Markdown pipeline,
/// pages are template views rendered directly into the layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Article,
    Page,
}

/// A named unit of content. Immutable once discovered; each build task owns
/// exactly one document and the output slice it writes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub kind: DocumentKind,
    /// Where the source file lives.
    pub source: PathBuf,
    /// Where the rendered output is written.
    pub destination: PathBuf,
    /// Human-readable name, derived from the file name without extension.
    pub title: String,
}

impl Document {
    /// An article renders to `<target>/<basename-without-extension>`.
    pub fn article(source: PathBuf, target_dir: &Path) -> Self {
        let title = trim_extension(file_name(&source));
        let destination = target_dir.join(&title);
        Self {
            kind: DocumentKind::Article,
            source,
            destination,
            title,
        }
    }

    /// A page preserves its directory structure relative to the pages root,
    /// with the template extension stripped.
    pub fn page(source: PathBuf, pages_dir: &Path, target_dir: &Path) -> Self {
        let title = trim_extension(file_name(&source));
        let relative = source.strip_prefix(pages_dir).unwrap_or(&source);
        let destination = match relative.parent() {
            Some(parent) if parent != Path::new("") => target_dir.join(parent).join(&title),
            _ => target_dir.join(&title),
        };
        Self {
            kind: DocumentKind::Page,
            source,
            destination,
            title,
        }
    }
}

/// Hidden directory entries (dotfiles like `.gitkeep`) are never documents.
pub fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}

/// Strip the final extension from a file name: `hello.md` becomes `hello`.
pub fn trim_extension(name: &str) -> String {
    match name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem.to_string(),
        _ => name.to_string(),
    }
}

fn file_name(path: &Path) -> &str {
    path.file_name().and_then(|name| name.to_str()).unwrap_or("")
}
