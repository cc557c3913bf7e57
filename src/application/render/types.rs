use thiserror::Error;

/// Per-invocation knobs for the rendering pipeline. Passed read-only into
/// every transform; never mutated mid-render.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderOptions {
    /// Rewrite root-relative image sources against `base_url`.
    pub absolute_urls: bool,
    /// Disable automatic permalinks on headers.
    pub no_header_links: bool,
    /// Disable the Retina.JS rendering attributes.
    pub no_retina: bool,
    /// Public site URL used when `absolute_urls` is set.
    pub base_url: String,
}

/// Structured errors surfaced by the rendering pipeline. Malformed input
/// directives are never errors; transforms pass unmatched text through
/// unchanged. Only the streaming HTML rewriter can fail.
#[derive(Debug, Clone, Error)]
pub enum RenderError {
    #[error("html rewrite failed: {message}")]
    Rewrite { message: String },
}

/// Trait exposed by the rendering pipeline. Implementations must be pure and
/// deterministic: given the same input, they return identical outputs.
pub trait RenderService: Send + Sync {
    fn render(&self, source: &str, options: &RenderOptions) -> Result<String, RenderError>;
}
