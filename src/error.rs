use std::path::Path;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by file discovery, configuration and image loading.
///
/// Payloads are rendered strings so the error can travel inside UI messages.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(String),

    #[error("{path}: failed to open DICOM file ({reason})")]
    Dicom { path: String, reason: String },

    #[error("{0}")]
    Decode(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid image id `{0}`")]
    InvalidImageId(String),
}

impl Error {
    pub fn dicom(path: &Path, reason: impl std::fmt::Display) -> Self {
        Self::Dicom {
            path: path.display().to_string(),
            reason: reason.to_string(),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(err.to_string())
    }
}
