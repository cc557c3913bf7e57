//! Template rendering: composes a layout around a view.
//!
//! Templates are plain Tera files loaded from disk on every render. The view
//! renders first with the caller's locals; the layout then renders with the
//! view's output bound as `content`. There is no template cache; a build
//! task reads exactly the two templates it needs.

use std::{
    error::Error as StdError,
    path::{Path, PathBuf},
};

use serde_json::{Map, Value};
use tera::{Context, Tera};
use thiserror::Error;
use tokio::fs;

/// Named values passed into a render: at minimum `Content` for articles,
/// plus page metadata such as `Title` and the site `Release`.
pub type Locals = Map<String, Value>;

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("template `{path}` could not be read: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("template `{name}` failed to parse: {message}")]
    Parse { name: String, message: String },
    #[error("template `{name}` failed to render: {message}")]
    Render { name: String, message: String },
}

/// Loads layout and view templates from disk and renders them per call.
pub struct TemplateEngine {
    layouts_dir: PathBuf,
}

impl TemplateEngine {
    pub fn new(layouts_dir: impl Into<PathBuf>) -> Self {
        Self {
            layouts_dir: layouts_dir.into(),
        }
    }

    /// Path of a view that lives alongside the layouts (e.g. the article
    /// view every article renders through).
    pub fn layout_view(&self, name: &str) -> PathBuf {
        self.layouts_dir.join(format!("{name}.html"))
    }

    /// Render `view` with `locals`, then render the named layout with the
    /// view's output bound as `content`.
    pub async fn render(
        &self,
        layout: &str,
        view: &Path,
        locals: &Locals,
    ) -> Result<String, TemplateError> {
        let layout_path = self.layouts_dir.join(format!("{layout}.html"));
        let layout_source = read_template(&layout_path).await?;
        let view_source = read_template(view).await?;

        let mut tera = Tera::default();
        tera.add_raw_template("layout", &layout_source)
            .map_err(|err| parse_error("layout", &err))?;
        tera.add_raw_template("view", &view_source)
            .map_err(|err| parse_error("view", &err))?;

        let mut context = Context::from_serialize(locals)
            .map_err(|err| render_error("view", &err))?;
        let content = tera
            .render("view", &context)
            .map_err(|err| render_error("view", &err))?;

        context.insert("content", &content);
        tera.render("layout", &context)
            .map_err(|err| render_error("layout", &err))
    }
}

async fn read_template(path: &Path) -> Result<String, TemplateError> {
    fs::read_to_string(path)
        .await
        .map_err(|source| TemplateError::Read {
            path: path.to_path_buf(),
            source,
        })
}

fn parse_error(name: &str, err: &tera::Error) -> TemplateError {
    TemplateError::Parse {
        name: name.to_string(),
        message: describe(err),
    }
}

fn render_error(name: &str, err: &tera::Error) -> TemplateError {
    TemplateError::Render {
        name: name.to_string(),
        message: describe(err),
    }
}

// Tera nests the useful detail in its error sources; flatten the chain so
// task failures read as one line.
fn describe(err: &tera::Error) -> String {
    let mut message = err.to_string();
    let mut cause = err.source();
    while let Some(inner) = cause {
        message.push_str(": ");
        message.push_str(&inner.to_string());
        cause = inner.source();
    }
    message
}
