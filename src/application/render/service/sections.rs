//! `!section` directive expansion.
//!
//! Runs after the Markdown stage, so directives arrive wrapped in paragraph
//! tags and with their quotes curled by smart punctuation. Best-effort text
//! substitution: unbalanced markers are not validated.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static OPEN_SECTION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(<p>)?!section class=("|“|”|&ldquo;)(.*?)("|“|”|&rdquo;)(</p>)?"#).unwrap()
});

static CLOSE_SECTION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(<p>)?!/section(</p>)?").unwrap());

/// Rewrite `!section class="C"` into `<section class="C">` and `!/section`
/// into `</section>`, swallowing any paragraph tags the renderer wrapped
/// around the directive.
pub(crate) fn expand_sections(source: &str) -> String {
    let opened = OPEN_SECTION_RE.replace_all(source, |caps: &Captures| {
        format!("<section class=\"{}\">", &caps[3])
    });
    CLOSE_SECTION_RE.replace_all(&opened, "</section>").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expands_paragraph_wrapped_directives() {
        assert_eq!(
            expand_sections("<p>!section class=\u{201c}wide\u{201d}</p>\n<p>body</p>\n<p>!/section</p>"),
            "<section class=\"wide\">\n<p>body</p>\n</section>"
        );
    }

    #[test]
    fn accepts_straight_quotes() {
        assert_eq!(
            expand_sections("!section class=\"narrow\""),
            "<section class=\"narrow\">"
        );
    }

    #[test]
    fn accepts_entity_encoded_quotes() {
        assert_eq!(
            expand_sections("!section class=&ldquo;aside&rdquo;"),
            "<section class=\"aside\">"
        );
    }

    #[test]
    fn unbalanced_markers_pass_through_best_effort() {
        assert_eq!(expand_sections("<p>!/section</p>"), "</section>");
        assert_eq!(expand_sections("plain text"), "plain text");
    }
}
