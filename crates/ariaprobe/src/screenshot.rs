//! Screenshot artifact written at the end of every run.

use image::GenericImageView;
use std::path::{Path, PathBuf};

use crate::result::{AriaError, AriaResult};

/// A screenshot persisted to disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenshotArtifact {
    /// Where the image was written
    pub path: PathBuf,
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Encoded size in bytes
    pub size_bytes: usize,
}

/// Validate image bytes and write them to `path`, replacing any existing file.
///
/// Missing parent directories are created.
pub async fn save(bytes: &[u8], path: &Path) -> AriaResult<ScreenshotArtifact> {
    if bytes.is_empty() {
        return Err(AriaError::screenshot("page returned no image data"));
    }
    let image = image::load_from_memory(bytes)
        .map_err(|e| AriaError::screenshot(format!("not a valid image: {e}")))?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }
    tokio::fs::write(path, bytes).await?;

    let (width, height) = image.dimensions();
    tracing::info!(path = %path.display(), bytes = bytes.len(), "screenshot saved");
    Ok(ScreenshotArtifact {
        path: path.to_path_buf(),
        width,
        height,
        size_bytes: bytes.len(),
    })
}
