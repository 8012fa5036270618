/// Metadata-specific errors
use airwave_core::{LoadError, TrackId};
use thiserror::Error;

/// Result type alias using `MetadataError`
pub type Result<T> = std::result::Result<T, MetadataError>;

/// Metadata error types
#[derive(Error, Debug)]
pub enum MetadataError {
    /// Music directory does not exist
    #[error("Directory not found: {0}")]
    DirectoryNotFound(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Tag or stream parsing error
    #[error("Parse error: {0}")]
    ParseError(String),

    /// I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Lofty error
    #[error(transparent)]
    Lofty(#[from] lofty::error::LoftyError),
}

impl MetadataError {
    /// Attach a track identifier, turning this into a track load failure
    pub fn into_load_error(self, id: &TrackId) -> LoadError {
        LoadError::probe(id.clone(), self.to_string())
    }
}
