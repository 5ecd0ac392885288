//! Loading the image bank from `image_bank.json`.

use camino::{Utf8Path, Utf8PathBuf};
use fieldmark_core::ImageBank;
use thiserror::Error;

/// File name of the image bank inside the data directory.
pub const IMAGE_BANK_FILE: &str = "image_bank.json";

/// Errors raised while loading the image bank.
#[derive(Debug, Error)]
pub enum ImageBankError {
    /// The file could not be read.
    #[error("failed to read image bank {path}: {source}")]
    Read {
        /// File being read.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The file is not a JSON array of image entries.
    #[error("invalid image bank {path}: {source}")]
    Decode {
        /// File being decoded.
        path: Utf8PathBuf,
        /// Decoder failure.
        #[source]
        source: serde_json::Error,
    },
}

/// Load `<data_dir>/image_bank.json`.
///
/// # Errors
/// Returns [`ImageBankError`] when the file is missing or malformed.
pub fn load_image_bank(data_dir: &Utf8Path) -> Result<ImageBank, ImageBankError> {
    read_image_bank(&data_dir.join(IMAGE_BANK_FILE))
}

/// Read an image bank from an explicit file.
///
/// # Errors
/// Returns [`ImageBankError`] when the file is missing or malformed.
pub fn read_image_bank(path: &Utf8Path) -> Result<ImageBank, ImageBankError> {
    let json = fieldmark_fs::read_utf8_to_string(path).map_err(|source| ImageBankError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&json).map_err(|source| ImageBankError::Decode {
        path: path.to_path_buf(),
        source,
    })
}
