//! Plain-HTTP preview server over the built output directory.
//!
//! File-serving semantics follow a standard static handler: directories
//! serve their `index.html` when present and a listing otherwise. Rendered
//! articles are written without an extension, so extensionless files are
//! served as HTML.

use std::{
    path::{Component, Path, PathBuf},
    sync::Arc,
};

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{
        HeaderValue, StatusCode, Uri,
        header::{CACHE_CONTROL, CONTENT_LENGTH, CONTENT_TYPE},
    },
    response::{IntoResponse, Response},
};
use tokio::{fs, net::TcpListener};
use tracing::info;

use crate::config::Settings;

use super::error::InfraError;

#[derive(Clone)]
struct PreviewState {
    root: Arc<PathBuf>,
}

/// Serve the output directory until the process is stopped.
pub async fn serve(settings: &Settings) -> Result<(), InfraError> {
    let root = settings.site.target_dir.clone();
    info!(
        target = "brezza::serve",
        addr = %settings.server.addr,
        root = %root.display(),
        "Serving site"
    );

    let router = build_router(root);
    let listener = TcpListener::bind(settings.server.addr).await?;
    axum::serve(listener, router.into_make_service())
        .await
        .map_err(InfraError::from)
}

pub fn build_router(root: PathBuf) -> Router {
    Router::new()
        .fallback(serve_path)
        .with_state(PreviewState {
            root: Arc::new(root),
        })
}

async fn serve_path(State(state): State<PreviewState>, uri: Uri) -> Response {
    let Some(path) = resolve(&state.root, uri.path()) else {
        return not_found();
    };

    match fs::metadata(&path).await {
        Ok(meta) if meta.is_dir() => {
            let index = path.join("index.html");
            if fs::metadata(&index).await.is_ok() {
                serve_file(&index).await
            } else {
                directory_listing(uri.path(), &path).await
            }
        }
        Ok(_) => serve_file(&path).await,
        Err(_) => not_found(),
    }
}

// Only plain path segments may reach the filesystem; anything attempting to
// climb out of the root is a 404.
fn resolve(root: &Path, raw_path: &str) -> Option<PathBuf> {
    let relative = Path::new(raw_path.trim_start_matches('/'));
    let safe = relative
        .components()
        .all(|component| matches!(component, Component::Normal(_) | Component::CurDir));
    safe.then(|| root.join(relative))
}

async fn serve_file(path: &Path) -> Response {
    let bytes = match fs::read(path).await {
        Ok(bytes) => bytes,
        Err(_) => return not_found(),
    };

    let mime = match path.extension() {
        Some(_) => mime_guess::from_path(path)
            .first_or_octet_stream()
            .to_string(),
        // Rendered documents have their extension stripped.
        None => "text/html; charset=utf-8".to_string(),
    };

    let length = bytes.len();
    let mut response = Response::new(Body::from(bytes));
    let headers = response.headers_mut();
    if let Ok(value) = HeaderValue::from_str(&mime) {
        headers.insert(CONTENT_TYPE, value);
    }
    if let Ok(value) = HeaderValue::from_str(&length.to_string()) {
        headers.insert(CONTENT_LENGTH, value);
    }
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-store"));

    response
}

async fn directory_listing(request_path: &str, dir: &Path) -> Response {
    let mut entries = Vec::new();
    let Ok(mut reader) = fs::read_dir(dir).await else {
        return not_found();
    };
    while let Ok(Some(entry)) = reader.next_entry().await {
        let mut name = entry.file_name().to_string_lossy().into_owned();
        if entry.file_type().await.map(|t| t.is_dir()).unwrap_or(false) {
            name.push('/');
        }
        entries.push(name);
    }
    entries.sort();

    let prefix = request_path.trim_end_matches('/');
    let items: String = entries
        .iter()
        .map(|name| format!("<li><a href=\"{prefix}/{name}\">{name}</a></li>\n"))
        .collect();
    let body = format!(
        "<!DOCTYPE html>\n<html><head><title>{request_path}</title></head>\n<body><h1>Index of {request_path}</h1>\n<ul>\n{items}</ul></body></html>\n"
    );

    let mut response = Response::new(Body::from(body));
    response.headers_mut().insert(
        CONTENT_TYPE,
        HeaderValue::from_static("text/html; charset=utf-8"),
    );
    response
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, "404 page not found").into_response()
}
