//! Embedding image files as `data:` URLs.

use base64::{Engine as _, engine::general_purpose};
use camino::{Utf8Path, Utf8PathBuf};
use thiserror::Error;

/// Errors raised while embedding a file.
#[derive(Debug, Error)]
pub enum EmbedError {
    /// The file could not be read.
    #[error("failed to read image {path}: {source}")]
    Read {
        /// File being read.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// Guess the MIME type of an image from its extension.
///
/// # Examples
/// ```
/// use camino::Utf8Path;
/// use fieldmark_data::embed::mime_for_path;
///
/// assert_eq!(mime_for_path(Utf8Path::new("corner.JPG")), "image/jpeg");
/// assert_eq!(mime_for_path(Utf8Path::new("notes.txt")), "application/octet-stream");
/// ```
#[must_use]
pub fn mime_for_path(path: &Utf8Path) -> &'static str {
    let extension = path.extension().map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

/// Encode bytes as a base64 `data:` URL.
#[must_use]
pub fn encode_data_url(bytes: &[u8], mime: &str) -> String {
    format!("data:{mime};base64,{}", general_purpose::STANDARD.encode(bytes))
}

/// Read `path` and return it as a `data:` URL.
///
/// # Errors
/// Returns [`EmbedError::Read`] when the file cannot be read.
pub fn embed_file(path: &Utf8Path) -> Result<String, EmbedError> {
    let bytes = fieldmark_fs::read_bytes(path).map_err(|source| EmbedError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(encode_data_url(&bytes, mime_for_path(path)))
}
