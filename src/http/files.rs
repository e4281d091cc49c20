//! # Archivos Estáticos
//! src/http/files.rs
//!
//! Sirve archivos que están debajo del directorio raíz. El path del request
//! se interpreta relativo a esa raíz (`/index.html` -> `<root>/index.html`).

use super::{url_decode, Response, StatusCode};
use std::io;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};

pub struct StaticFiles {
    root: PathBuf,
}

impl StaticFiles {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Construye la respuesta para `path` (sin query)
    pub fn serve(&self, path: &str) -> Response {
        let decoded = url_decode(path);

        let Some(file_path) = self.resolve(&decoded) else {
            warn!(path = %decoded, "path escapes document root");
            return Response::error(StatusCode::Forbidden, &format!("Forbidden: {}", decoded));
        };

        if file_path.is_dir() {
            return Response::error(StatusCode::NotFound, &format!("File not found: {}", decoded));
        }

        match std::fs::read(&file_path) {
            Ok(contents) => {
                debug!(file = %file_path.display(), bytes = contents.len(), "serving file");
                Response::new(StatusCode::Ok)
                    .with_header("Content-Type", content_type(&file_path))
                    .with_body_bytes(contents)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Response::error(StatusCode::NotFound, &format!("File not found: {}", decoded))
            }
            Err(e) => {
                warn!(file = %file_path.display(), error = %e, "failed to read file");
                Response::error(
                    StatusCode::InternalServerError,
                    &format!("Failed to read file: {}", decoded),
                )
            }
        }
    }

    /// Une el path a la raíz; `None` si contiene `..`
    fn resolve(&self, path: &str) -> Option<PathBuf> {
        let mut resolved = self.root.clone();

        for component in Path::new(path.trim_start_matches('/')).components() {
            match component {
                Component::Normal(part) => resolved.push(part),
                Component::CurDir => {}
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
            }
        }

        Some(resolved)
    }
}

/// Content-Type según la extensión del archivo
pub fn content_type(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());

    match extension.as_deref() {
        Some("html") | Some("htm") => "text/html",
        Some("css") => "text/css",
        Some("js") => "application/javascript",
        Some("json") => "application/json",
        Some("txt") => "text/plain",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("ico") => "image/x-icon",
        _ => "application/octet-stream",
    }
}
