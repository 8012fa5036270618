/// Directory listing for the playlist
use crate::error::{MetadataError, Result};
use airwave_core::{ScanError, TrackId, TrackSource};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Scan configuration
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Supported audio file extensions, lowercase without the dot
    pub extensions: Vec<String>,

    /// Descend into subdirectories (default: false)
    pub recursive: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            extensions: vec!["mp3".to_string()],
            recursive: false,
        }
    }
}

/// Lists playable files in a music directory
#[derive(Debug, Clone, Default)]
pub struct DirectoryScanner {
    config: ScanConfig,
}

impl DirectoryScanner {
    /// Create a scanner with the given configuration
    pub fn new(config: ScanConfig) -> Self {
        Self { config }
    }

    /// List supported audio files under `dir`, ordered by file name
    ///
    /// Unreadable entries below the root are skipped with a warning.
    ///
    /// # Errors
    /// - `MetadataError::DirectoryNotFound` if `dir` is not a directory
    /// - `MetadataError::Io` if `dir` itself cannot be read
    pub fn list_tracks(&self, dir: &Path) -> Result<Vec<TrackId>> {
        if !dir.is_dir() {
            return Err(MetadataError::DirectoryNotFound(dir.display().to_string()));
        }

        let max_depth = if self.config.recursive { usize::MAX } else { 1 };
        let mut tracks = Vec::new();

        for entry in WalkDir::new(dir)
            .min_depth(1)
            .max_depth(max_depth)
            .follow_links(false)
            .sort_by_file_name()
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if e.depth() == 0 => {
                    let message = e.to_string();
                    return Err(e
                        .into_io_error()
                        .map(MetadataError::Io)
                        .unwrap_or(MetadataError::ParseError(message)));
                }
                Err(e) => {
                    tracing::warn!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };

            let path = entry.path();
            if entry.file_type().is_file() && self.is_supported_file(path) {
                tracks.push(TrackId::new(path));
            }
        }

        tracing::debug!("Listed {} tracks in {}", tracks.len(), dir.display());
        Ok(tracks)
    }

    /// Check if file has a supported audio extension
    fn is_supported_file(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| self.config.extensions.iter().any(|ext| ext.eq_ignore_ascii_case(e)))
            .unwrap_or(false)
    }
}

/// A music directory used as the station's track source
#[derive(Debug, Clone)]
pub struct MusicDirectory {
    path: PathBuf,
    scanner: DirectoryScanner,
}

impl MusicDirectory {
    /// Create a track source for `path`
    pub fn new(path: impl Into<PathBuf>, config: ScanConfig) -> Self {
        Self {
            path: path.into(),
            scanner: DirectoryScanner::new(config),
        }
    }

    /// Directory path
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TrackSource for MusicDirectory {
    fn list_tracks(&self) -> std::result::Result<Vec<TrackId>, ScanError> {
        self.scanner
            .list_tracks(&self.path)
            .map_err(|e| ScanError::new(self.path.display().to_string(), e.to_string()))
    }
}
