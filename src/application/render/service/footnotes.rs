//! Footnote relinking.
//!
//! Must run after the Markdown stage: it keys off the `<p>`-wrapped
//! paragraph boundaries the renderer produces, locating a trailing footer
//! block of `<p>[N] ...` lines and cross-linking it with the in-body `[N]`
//! references.

use once_cell::sync::Lazy;
use regex::Regex;

use super::collapse_html;

// The footer starts at the first paragraph opening with a bracketed number
// and runs to the end of the document.
static FOOTER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?ms)^<p>\[\d+\].*").unwrap());

// A single footnote within the footer.
static FOOTNOTE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[(\d+)\](\s+.*)").unwrap());

/// Split off the trailing footnote block, replace each footer entry with an
/// anchor, replace every in-body `[N]` reference with a superscript link to
/// that anchor, and re-append the footer wrapped in a styling layer.
/// References with no matching footer entry are left untouched.
pub(crate) fn relink_footnotes(source: &str) -> String {
    let Some(footer_match) = FOOTER_RE.find(source) else {
        return source.to_string();
    };
    let footer = footer_match.as_str();

    let mut body = String::with_capacity(source.len());
    body.push_str(&source[..footer_match.start()]);
    body.push_str(&source[footer_match.end()..]);

    // Fold over the footer entries, rebuilding the footer with anchors while
    // swapping the body references for superscript links.
    let mut new_footer = String::with_capacity(footer.len());
    let mut last = 0;
    for caps in FOOTNOTE_RE.captures_iter(footer) {
        let whole = caps.get(0).unwrap();
        new_footer.push_str(&footer[last..whole.start()]);

        let number = &caps[1];
        let text = &caps[2];

        let anchor = format!(
            "\n<sup id=\"footnote-{number}\">\n  <a href=\"#footnote-{number}-source\">{number}</a>\n</sup>\n{text}"
        );
        new_footer.push_str(&collapse_html(&anchor));

        let reference = format!(
            "\n<sup id=\"footnote-{number}-source\">\n  <a href=\"#footnote-{number}\">{number}</a>\n</sup>\n"
        );
        body = body.replace(&format!("[{number}]"), &collapse_html(&reference));

        last = whole.end();
    }
    new_footer.push_str(&footer[last..]);

    format!("{body}\n<div id=\"footnotes\">\n  {new_footer}\n</div>\n")
}
