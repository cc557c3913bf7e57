pub mod service;
pub mod types;

pub use service::{MarkdownRenderService, render_service};
pub use types::{RenderError, RenderOptions, RenderService};
