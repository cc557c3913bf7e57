//! Streaming HTML rewrites applied after the Markdown stage.

use lol_html::{RewriteStrSettings, element, rewrite_str};

use super::is_svg;
use crate::application::render::types::{RenderError, RenderOptions};

/// Rewrite `<code class="LANG">` to `<code class="language-LANG">` for
/// syntax highlighters expecting the `language-` prefix. Idempotent: an
/// already-prefixed class contains a hyphen and is not a bare language word.
pub(crate) fn prefix_code_languages(html: &str) -> Result<String, RenderError> {
    rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: vec![element!("code[class]", |el| {
                if let Some(class) = el.get_attribute("class")
                    && is_bare_language(&class)
                {
                    el.set_attribute("class", &format!("language-{class}"))?;
                }
                Ok(())
            })],
            ..RewriteStrSettings::default()
        },
    )
    .map_err(rewrite_error)
}

/// Mark every raster `<img>` for Retina.JS replacement and, when requested,
/// rewrite root-relative sources against the public site URL. SVGs are
/// resolution agnostic and keep their plain markup.
pub(crate) fn rewrite_images(html: &str, options: &RenderOptions) -> Result<String, RenderError> {
    if options.no_retina && !options.absolute_urls {
        return Ok(html.to_string());
    }

    let base_url = options.base_url.trim_end_matches('/').to_string();
    let absolute_urls = options.absolute_urls && !base_url.is_empty();
    let no_retina = options.no_retina;

    rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: vec![element!("img[src]", move |el| {
                let Some(src) = el.get_attribute("src") else {
                    return Ok(());
                };
                if absolute_urls && src.starts_with('/') {
                    el.set_attribute("src", &format!("{base_url}{src}"))?;
                }
                if !no_retina && !is_svg(&src) {
                    el.set_attribute("data-rjs", "2")?;
                }
                Ok(())
            })],
            ..RewriteStrSettings::default()
        },
    )
    .map_err(rewrite_error)
}

fn is_bare_language(class: &str) -> bool {
    !class.is_empty()
        && class
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn rewrite_error(err: lol_html::errors::RewritingError) -> RenderError {
    RenderError::Rewrite {
        message: err.to_string(),
    }
}
