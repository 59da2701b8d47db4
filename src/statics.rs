//! Static file and directory handlers.
//!
//! Registered through [`Application::static_file`] and
//! [`Application::static_directory`]; both are plain handlers that capture the
//! filesystem path they serve.
//!
//! [`Application::static_file`]: crate::Application::static_file
//! [`Application::static_directory`]: crate::Application::static_directory

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::warn;

use crate::handler::Handler;
use crate::request::Request;
use crate::response::Response;
use crate::statuses::{self, HttpStatus};

/// Serves one file for every request on the route.
pub(crate) fn file(path: PathBuf) -> impl Handler {
    let path = Arc::new(path);
    move |_req: Request| {
        let path = Arc::clone(&path);
        async move { serve(&path).await }
    }
}

/// Serves files under `root`, named by the route's first argument.
pub(crate) fn directory(root: PathBuf) -> impl Handler {
    let root = Arc::new(root);
    move |req: Request| {
        let root = Arc::clone(&root);
        async move {
            let relative = resolve(req.arg(0).unwrap_or_default())?;
            serve(&root.join(relative)).await
        }
    }
}

/// Rejects names that would escape the served directory.
fn resolve(name: &str) -> Result<&Path, HttpStatus> {
    if name.is_empty() {
        return Err(statuses::not_found());
    }
    let path = Path::new(name);
    let escapes = path.components().any(|c| {
        matches!(c, Component::ParentDir | Component::RootDir | Component::Prefix(_))
    });
    if escapes {
        return Err(statuses::forbidden().with_detail(format!("refusing to serve `{name}`")));
    }
    Ok(path)
}

async fn serve(path: &Path) -> Result<Response, HttpStatus> {
    let metadata = tokio::fs::metadata(path).await.map_err(|e| io_status(path, e))?;
    if !metadata.is_file() {
        return Err(statuses::not_found());
    }
    let data = tokio::fs::read(path).await.map_err(|e| io_status(path, e))?;

    let content_type = mime_guess::from_path(path)
        .first_raw()
        .unwrap_or("application/octet-stream");
    let mut builder = Response::builder();
    if let Ok(modified) = metadata.modified() {
        let modified = DateTime::<Utc>::from(modified).format("%a, %d %b %Y %H:%M:%S GMT");
        builder = builder.header("last-modified", &modified.to_string());
    }
    Ok(builder.raw(content_type, data))
}

fn io_status(path: &Path, err: std::io::Error) -> HttpStatus {
    match err.kind() {
        ErrorKind::NotFound => statuses::not_found(),
        ErrorKind::PermissionDenied => statuses::forbidden(),
        _ => {
            warn!(path = %path.display(), "cannot read static file: {err}");
            statuses::internal_server_error().with_detail(err.to_string())
        }
    }
}
