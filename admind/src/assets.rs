//! Bundled admin UI asset loader

use std::path::PathBuf;

use tokio::fs;

use crate::errors::AdminError;

/// Static assets rooted at the admin UI directory.
#[derive(Debug, Clone)]
pub struct AssetDir {
    root: PathBuf,
}

impl AssetDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Load an asset by request path (admin prefix already stripped).
    /// The empty path and `/` forward to `/index.html`.
    pub async fn load(&self, request_path: &str) -> Result<(&'static str, Vec<u8>), AdminError> {
        let rel = if request_path.is_empty() || request_path == "/" {
            "/index.html"
        } else {
            request_path
        };

        if rel.split('/').any(|segment| segment == "..") {
            return Err(AdminError::NotFound(format!("No such asset: {}", request_path)));
        }

        let path = self.root.join(rel.trim_start_matches('/'));
        let bytes = fs::read(&path)
            .await
            .map_err(|_| AdminError::NotFound(format!("No such asset: {}", request_path)))?;
        Ok((content_type_for(rel), bytes))
    }
}

fn content_type_for(path: &str) -> &'static str {
    match path.rsplit('.').next() {
        Some("html") => "text/html",
        Some("css") => "text/css",
        Some("js") => "application/javascript",
        Some("json") => "application/json",
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("ico") => "image/x-icon",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_types_follow_the_extension() {
        assert_eq!(content_type_for("/index.html"), "text/html");
        assert_eq!(content_type_for("/app/main.js"), "application/javascript");
        assert_eq!(content_type_for("/logo"), "application/octet-stream");
    }

    #[tokio::test]
    async fn rejects_parent_traversal() {
        let assets = AssetDir::new("/tmp/does-not-matter");
        assert!(assets.load("/../settings.json").await.is_err());
    }
}
