//! `!fig` directive expansion.
//!
//! Runs before the Markdown stage because it emits raw HTML that the
//! renderer must pass through untouched.

use std::path::Path;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use super::is_svg;

// Greedy captures: a caption may contain escaped quotes, so the final `"`
// on the line delimits it.
static FIGURE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"!fig src="(.*)" caption="(.*)""#).unwrap());

/// Rewrite `!fig src="S" caption="C"` into a `<figure>` block with a linked
/// image and caption. Non-SVG images link to their `@2x` retina variant.
pub(crate) fn expand_figures(source: &str) -> String {
    FIGURE_RE
        .replace_all(source, |caps: &Captures| {
            let src = &caps[1];
            let link = retina_variant(src);
            let caption = caps[2].replace("\\\"", "\"");

            format!(
                "\n<figure>\n  <p><a href=\"{link}\"><img src=\"{src}\" class=\"overflowing\"></a></p>\n  <figcaption>{caption}</figcaption>\n</figure>\n"
            )
        })
        .into_owned()
}

/// `a.png` becomes `a@2x.png`; SVG and extensionless paths are returned
/// unchanged.
fn retina_variant(source: &str) -> String {
    if is_svg(source) {
        return source.to_string();
    }
    match Path::new(source).extension().and_then(|ext| ext.to_str()) {
        Some(ext) => {
            let stem = &source[..source.len() - ext.len() - 1];
            format!("{stem}@2x.{ext}")
        }
        None => source.to_string(),
    }
}
