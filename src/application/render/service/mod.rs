mod config;
mod figures;
mod footnotes;
mod headers;
mod rewrite;
mod sections;

use std::{path::Path, sync::Arc};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::application::render::types::{RenderError, RenderOptions, RenderService};

static INTER_TAG_WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r">\s+<").unwrap());

/// Collapse an HTML snippet constant by removing newlines and whitespace
/// between tags, so multi-line snippets sit inline in the rendered markup.
pub(crate) fn collapse_html(html: &str) -> String {
    let html = html.replace('\n', "");
    INTER_TAG_WHITESPACE_RE.replace_all(&html, "><").into_owned()
}

/// SVGs are resolution independent; retina handling skips them.
pub(crate) fn is_svg(source: &str) -> bool {
    Path::new(source)
        .extension()
        .is_some_and(|ext| ext == "svg")
}

/// Default Comrak-based rendering pipeline with the project's custom
/// transforms layered around it.
///
/// The transform order is fixed. Figure and header expansion run on raw
/// Markdown because they emit HTML the Markdown stage must pass through
/// untouched; footnote relinking runs after it because it depends on the
/// `<p>`-wrapped paragraph boundaries the renderer produces.
pub struct MarkdownRenderService {
    options: comrak::Options<'static>,
}

impl MarkdownRenderService {
    fn new() -> Self {
        Self {
            options: config::default_options(),
        }
    }
}

static RENDER_SERVICE: Lazy<Arc<MarkdownRenderService>> =
    Lazy::new(|| Arc::new(MarkdownRenderService::new()));

/// Access the shared render service instance, initialised on first use.
pub fn render_service() -> Arc<MarkdownRenderService> {
    Arc::clone(&RENDER_SERVICE)
}

impl Default for MarkdownRenderService {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderService for MarkdownRenderService {
    fn render(&self, source: &str, options: &RenderOptions) -> Result<String, RenderError> {
        let pre = pre_transform_stage(source, options);
        let html = markdown_stage(&pre, &self.options);
        post_transform_stage(html, options)
    }
}

fn pre_transform_stage(source: &str, options: &RenderOptions) -> String {
    let source = figures::expand_figures(source);
    headers::anchor_headers(&source, options)
}

fn markdown_stage(source: &str, options: &comrak::Options<'static>) -> String {
    comrak::markdown_to_html(source, options)
}

fn post_transform_stage(html: String, options: &RenderOptions) -> Result<String, RenderError> {
    let html = rewrite::prefix_code_languages(&html)?;
    let html = sections::expand_sections(&html);
    let html = footnotes::relink_footnotes(&html);
    rewrite::rewrite_images(&html, options)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapse_html_removes_inter_tag_whitespace() {
        assert_eq!(
            collapse_html("\n<p>\n  <strong>strong</strong>\n</p>"),
            "<p><strong>strong</strong></p>"
        );
    }

    fn render(source: &str) -> String {
        MarkdownRenderService::default()
            .render(source, &RenderOptions::default())
            .expect("render")
    }

    #[test]
    fn renders_plain_markdown() {
        assert_eq!(render("**strong**"), "<p><strong>strong</strong></p>\n");
    }

    #[test]
    fn figure_markup_survives_the_markdown_stage() {
        let html = render("Intro.\n\n!fig src=\"shot.png\" caption=\"A screenshot\"\n\nOutro.");
        assert!(html.contains("<figure>"));
        assert!(html.contains("<a href=\"shot@2x.png\">"));
        assert!(html.contains("<img src=\"shot.png\" class=\"overflowing\" data-rjs=\"2\">"));
        assert!(html.contains("<figcaption>A screenshot</figcaption>"));
    }

    #[test]
    fn headers_get_stable_anchors_through_the_full_pipeline() {
        let html = render("## Introduction (#intro)\n\nBody text.\n\n## Untitled\n");
        assert!(html.contains("<h2 id=\"intro\"><a href=\"#intro\">Introduction</a></h2>"));
        assert!(html.contains("<h2 id=\"section-1\"><a href=\"#section-1\">Untitled</a></h2>"));
    }

    #[test]
    fn header_links_can_be_disabled() {
        let options = RenderOptions {
            no_header_links: true,
            ..RenderOptions::default()
        };
        let html = MarkdownRenderService::default()
            .render("## Quiet (#quiet)\n", &options)
            .expect("render");
        assert!(html.contains("<h2>Quiet</h2>"));
        assert!(!html.contains("href=\"#quiet\""));
    }

    #[test]
    fn section_directives_survive_smart_punctuation() {
        let html = render("!section class=\"wide\"\n\nInside.\n\n!/section\n");
        assert!(html.contains("<section class=\"wide\">"));
        assert!(html.contains("</section>"));
        assert!(!html.contains("!section"));
    }

    #[test]
    fn footnotes_are_relinked_after_markdown() {
        let html = render("A claim.[1]\n\n[1] The supporting source.\n");
        assert!(html.contains("<sup id=\"footnote-1-source\"><a href=\"#footnote-1\">1</a></sup>"));
        assert!(html.contains("<sup id=\"footnote-1\"><a href=\"#footnote-1-source\">1</a></sup>"));
        assert!(html.contains("<div id=\"footnotes\">"));
    }

    #[test]
    fn fenced_code_blocks_keep_language_prefixed_classes() {
        let html = render("```ruby\nputs 1\n```\n");
        assert!(html.contains("class=\"language-ruby\""));
        assert!(!html.contains("language-language"));
    }

    #[test]
    fn markdown_images_gain_retina_attributes() {
        let html = render("![diagram](chart.jpg)");
        assert!(html.contains("data-rjs=\"2\""));

        let svg = render("![diagram](chart.svg)");
        assert!(!svg.contains("data-rjs"));
    }
}
