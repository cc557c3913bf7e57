use comrak::options::Options;

/// Markdown options for the main rendering stage.
///
/// Raw HTML passthrough is required: the figure and header transforms run
/// before this stage and emit HTML snippets the renderer must not escape.
pub(crate) fn default_options() -> Options<'static> {
    let mut options = Options::default();

    let ext = &mut options.extension;
    ext.autolink = true;
    ext.table = true;
    ext.strikethrough = true;
    ext.tagfilter = false;
    // Headings the header transform left alone (level 1) still get ids.
    ext.header_ids = Some(String::new());

    let parse = &mut options.parse;
    parse.smart = true;

    let render = &mut options.render;
    render.r#unsafe = true;

    options
}

#[cfg(test)]
mod tests {
    use super::default_options;
    use comrak::markdown_to_html;

    #[test]
    fn raw_html_blocks_pass_through_unescaped() {
        let options = default_options();
        let html = markdown_to_html("<figure>\n  <figcaption>hi</figcaption>\n</figure>\n", &options);
        assert!(html.contains("<figure>"));
        assert!(!html.contains("&lt;figure&gt;"));
    }

    #[test]
    fn smart_punctuation_is_enabled() {
        let options = default_options();
        let html = markdown_to_html("\"quoted\"", &options);
        assert!(html.contains("\u{201c}quoted\u{201d}"));
    }

    #[test]
    fn level_one_headings_receive_automatic_ids() {
        let options = default_options();
        let html = markdown_to_html("# Top Title\n", &options);
        assert!(html.contains("id=\"top-title\""));
    }

    #[test]
    fn fenced_code_blocks_carry_the_info_string() {
        let options = default_options();
        let html = markdown_to_html("```ruby\nputs 1\n```\n", &options);
        assert!(html.contains("language-ruby"));
    }
}
