//! Build orchestration: discover documents, fan tasks out to the pool,
//! aggregate the outcome.

pub mod pool;

use std::{
    io,
    num::NonZeroUsize,
    path::Path,
    sync::Arc,
    time::Instant,
};

use serde_json::Value;
use thiserror::Error;
use tokio::fs;
use tracing::{debug, error, info};
use walkdir::WalkDir;

use crate::{
    RELEASE,
    application::{
        error::AppError,
        render::{MarkdownRenderService, RenderError, RenderOptions, RenderService, render_service},
    },
    config::{Settings, SiteSettings},
    domain::document::{Document, DocumentKind, is_hidden},
    infra::{assets, error::InfraError},
    presentation::templates::{Locals, TemplateEngine, TemplateError},
};

use pool::{Pool, Task, TaskResults};

const MAIN_LAYOUT: &str = "main";
const ARTICLE_VIEW: &str = "article";

// Reporting stops after this many task errors so a broken layout doesn't
// flood the output with one line per document.
const MAX_REPORTED_ERRORS: usize = 10;

/// Errors captured per task. A failing task never aborts its siblings; the
/// pool collects these and the orchestrator reports them afterwards.
#[derive(Debug, Error)]
pub enum TaskError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Template(#[from] TemplateError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildSummary {
    pub articles: usize,
    pub pages: usize,
}

/// Drives one full site build.
pub struct BuildService {
    site: SiteSettings,
    concurrency: NonZeroUsize,
    render_options: RenderOptions,
    renderer: Arc<MarkdownRenderService>,
    templates: Arc<TemplateEngine>,
}

impl BuildService {
    pub fn new(settings: &Settings) -> Self {
        let render_options = RenderOptions {
            absolute_urls: settings.build.absolute_urls,
            no_header_links: settings.build.no_header_links,
            no_retina: settings.build.no_retina,
            base_url: settings.site.base_url.clone(),
        };

        Self {
            site: settings.site.clone(),
            concurrency: settings.build.concurrency,
            render_options,
            renderer: render_service(),
            templates: Arc::new(TemplateEngine::new(&settings.site.layouts_dir)),
        }
    }

    /// Render every article and page and link the static directories,
    /// running all tasks through the pool. Per-task failures are logged
    /// (capped) and folded into the returned error; a missing content
    /// directory is fatal before any task runs.
    pub async fn build(&self) -> Result<BuildSummary, AppError> {
        let started = Instant::now();

        assets::create_output_dirs(&self.site.target_dir, RELEASE)
            .await
            .map_err(InfraError::from)?;

        let articles = discover_articles(&self.site.articles_dir, &self.site.target_dir)
            .await
            .map_err(InfraError::from)?;
        let pages = discover_pages(&self.site.pages_dir, &self.site.target_dir)
            .map_err(InfraError::from)?;
        let summary = BuildSummary {
            articles: articles.len(),
            pages: pages.len(),
        };

        let mut tasks = Vec::with_capacity(articles.len() + pages.len() + 2);
        tasks.push(self.link_task("assets", self.site.assets_dir.clone()));
        if fs::metadata(&self.site.fonts_dir).await.is_ok() {
            tasks.push(self.link_task("fonts", self.site.fonts_dir.clone()));
        }
        for document in articles.into_iter().chain(pages) {
            tasks.push(self.render_task(document));
        }

        debug!(
            target = "brezza::build",
            concurrency = self.concurrency.get(),
            tasks = tasks.len(),
            "Starting build"
        );

        let results = Pool::new(tasks, self.concurrency).run().await;
        report_errors(&results);

        info!(
            target = "brezza::build",
            articles = summary.articles,
            pages = summary.pages,
            elapsed = ?started.elapsed(),
            "Site built"
        );

        if results.has_errors() {
            return Err(AppError::Build {
                failed: results.error_count(),
            });
        }
        Ok(summary)
    }

    fn render_task(&self, document: Document) -> Task {
        let renderer = Arc::clone(&self.renderer);
        let templates = Arc::clone(&self.templates);
        let options = self.render_options.clone();
        let label = match document.kind {
            DocumentKind::Article => format!("article `{}`", document.title),
            DocumentKind::Page => format!("page `{}`", document.title),
        };

        Task::new(label, async move {
            match document.kind {
                DocumentKind::Article => {
                    render_article(&document, renderer.as_ref(), &templates, &options).await
                }
                DocumentKind::Page => render_page(&document, &templates).await,
            }
        })
    }

    fn link_task(&self, name: &'static str, source_dir: std::path::PathBuf) -> Task {
        let dest = self.site.target_dir.join(name);
        Task::new(format!("link `{name}`"), async move {
            assets::link_directory(&source_dir, &dest).await?;
            Ok(())
        })
    }
}

async fn render_article(
    document: &Document,
    renderer: &dyn RenderService,
    templates: &TemplateEngine,
    options: &RenderOptions,
) -> Result<(), TaskError> {
    debug!(
        target = "brezza::build",
        source = %document.source.display(),
        "Rendering article"
    );

    let source = fs::read_to_string(&document.source).await?;
    let content = renderer.render(&source, options)?;

    let mut extra = Locals::new();
    extra.insert("Content".to_string(), Value::String(content));
    let locals = page_locals(&document.title, extra);

    let view = templates.layout_view(ARTICLE_VIEW);
    let html = templates.render(MAIN_LAYOUT, &view, &locals).await?;
    write_output(&document.destination, &html).await
}

async fn render_page(document: &Document, templates: &TemplateEngine) -> Result<(), TaskError> {
    debug!(
        target = "brezza::build",
        source = %document.source.display(),
        "Rendering page"
    );

    let locals = page_locals(&document.title, Locals::new());
    let html = templates
        .render(MAIN_LAYOUT, &document.source, &locals)
        .await?;
    write_output(&document.destination, &html).await
}

/// Locals every rendered page receives, merged over task-specific values.
fn page_locals(title: &str, mut locals: Locals) -> Locals {
    locals.insert("Release".to_string(), Value::String(RELEASE.to_string()));
    locals.insert("Title".to_string(), Value::String(title.to_string()));
    locals
}

async fn write_output(destination: &Path, html: &str) -> Result<(), TaskError> {
    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent).await?;
    }
    fs::write(destination, html).await?;
    Ok(())
}

/// Articles live flat in their directory; hidden entries and subdirectories
/// are skipped. Enumeration failure is fatal: no tasks can be generated.
async fn discover_articles(articles_dir: &Path, target_dir: &Path) -> io::Result<Vec<Document>> {
    let mut documents = Vec::new();
    let mut entries = fs::read_dir(articles_dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name().to_string_lossy().into_owned();
        if is_hidden(&name) || !entry.file_type().await?.is_file() {
            continue;
        }
        documents.push(Document::article(entry.path(), target_dir));
    }
    documents.sort_by(|a, b| a.source.cmp(&b.source));
    Ok(documents)
}

/// Pages are walked recursively, preserving their directory structure.
fn discover_pages(pages_dir: &Path, target_dir: &Path) -> io::Result<Vec<Document>> {
    let mut documents = Vec::new();
    let walker = WalkDir::new(pages_dir).sort_by_file_name().into_iter();
    for entry in walker.filter_entry(|entry| {
        entry.depth() == 0 || !is_hidden(&entry.file_name().to_string_lossy())
    }) {
        let entry = entry.map_err(io::Error::from)?;
        if entry.file_type().is_file() {
            documents.push(Document::page(entry.into_path(), pages_dir, target_dir));
        }
    }
    Ok(documents)
}

fn report_errors(results: &TaskResults) {
    for (index, (label, err)) in results.errors().enumerate() {
        if index >= MAX_REPORTED_ERRORS {
            error!(
                target = "brezza::build",
                total = results.error_count(),
                "Too many task errors, suppressing the rest"
            );
            break;
        }
        error!(target = "brezza::build", task = label, error = %err, "Task failed");
    }
}
