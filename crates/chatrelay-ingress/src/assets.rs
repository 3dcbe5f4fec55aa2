//! Page and static file lookup.
//!
//! Pages are HTML files at the top of the assets directory; static files
//! live under its `static/` subdirectory. Only plain relative paths are
//! resolved, so a request can never reach outside the assets tree.

use std::io;
use std::path::{Component, Path, PathBuf};

/// Errors from resolving an asset.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    /// No file at that path.
    #[error("asset not found: {0}")]
    NotFound(String),

    /// The path tried to leave the assets directory.
    #[error("rejected asset path: {0}")]
    Rejected(String),

    /// The file exists but could not be read.
    #[error("failed to read asset {path}: {source}")]
    Io {
        /// Requested path.
        path: String,
        /// Underlying I/O error.
        source: io::Error,
    },
}

/// A resolved file and the content type to send with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    /// File contents.
    pub bytes: Vec<u8>,
    /// `Content-Type` value, if the extension is known.
    pub content_type: Option<&'static str>,
}

/// Root directory for pages and static files.
#[derive(Debug, Clone)]
pub struct AssetDir {
    root: PathBuf,
}

impl AssetDir {
    /// Serve assets from `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Read an HTML page such as `index.html`.
    ///
    /// # Errors
    ///
    /// Returns [`AssetError`] if the name is not a plain relative path or
    /// the file cannot be read.
    pub async fn page(&self, name: &str) -> Result<Vec<u8>, AssetError> {
        self.read(&self.root, name).await
    }

    /// Read a file below `static/`, e.g. `style.css` for `/static/style.css`.
    ///
    /// # Errors
    ///
    /// Returns [`AssetError`] if the path is not a plain relative path or
    /// the file cannot be read.
    pub async fn static_file(&self, rel: &str) -> Result<Asset, AssetError> {
        let bytes = self.read(&self.root.join("static"), rel).await?;
        Ok(Asset {
            bytes,
            content_type: content_type_for(Path::new(rel)),
        })
    }

    async fn read(&self, base: &Path, rel: &str) -> Result<Vec<u8>, AssetError> {
        let rel_path = Path::new(rel);
        let plain = !rel.is_empty()
            && rel_path
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !plain {
            return Err(AssetError::Rejected(rel.to_owned()));
        }

        match tokio::fs::read(base.join(rel_path)).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(AssetError::NotFound(rel.to_owned()))
            }
            // Directories and the like are treated as absent.
            Err(e) if e.kind() == io::ErrorKind::IsADirectory => {
                Err(AssetError::NotFound(rel.to_owned()))
            }
            Err(source) => Err(AssetError::Io {
                path: rel.to_owned(),
                source,
            }),
        }
    }
}

/// Content type for a static file, by extension.
///
/// Only `.css` and `.png` are mapped; anything else is sent without a
/// `Content-Type` header.
pub fn content_type_for(path: &Path) -> Option<&'static str> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("css") => Some("text/css"),
        Some("png") => Some("image/png"),
        _ => None,
    }
}
