//! Error types for artifact verification.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using `VerifyError`.
pub type Result<T> = std::result::Result<T, VerifyError>;

/// Fatal conditions raised while discovering or scanning artifacts.
///
/// A class that cannot be resolved is deliberately absent here: the
/// resolver reports it as `None` and the scan carries on.
#[derive(Error, Debug)]
pub enum VerifyError {
    /// Discovery matched zero files.
    #[error("No files matching {pattern} under {}", display_paths(.roots))]
    NoArtifactsFound {
        /// Targets that were searched.
        roots: Vec<PathBuf>,
        /// Glob the files had to match.
        pattern: String,
    },

    /// The discovery glob could not be compiled.
    #[error("invalid artifact pattern {pattern}: {source}")]
    InvalidPattern {
        /// The rejected glob.
        pattern: String,
        /// Underlying glob error.
        #[source]
        source: ignore::Error,
    },

    /// The artifact is missing or is not a readable zip archive.
    #[error("cannot open archive {}: {source}", .path.display())]
    ArchiveOpen {
        /// Artifact path.
        path: PathBuf,
        /// Underlying zip or I/O error.
        #[source]
        source: zip::result::ZipError,
    },

    /// An entry of an already opened archive could not be read.
    #[error("cannot read entry of archive {}: {source}", .path.display())]
    ArchiveRead {
        /// Artifact path.
        path: PathBuf,
        /// Underlying zip error.
        #[source]
        source: zip::result::ZipError,
    },

    /// The archive holds two entries with the same name.
    #[error("File {} contains duplicate contents: {entry}", .archive.display())]
    DuplicateEntry {
        /// Artifact path.
        archive: PathBuf,
        /// The repeated entry name.
        entry: String,
    },
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

impl VerifyError {
    /// Short machine-readable tag used in JSON reports.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NoArtifactsFound { .. } => "no_artifacts_found",
            Self::InvalidPattern { .. } => "invalid_pattern",
            Self::ArchiveOpen { .. } => "archive_open",
            Self::ArchiveRead { .. } => "archive_read",
            Self::DuplicateEntry { .. } => "duplicate_entry",
        }
    }
}
