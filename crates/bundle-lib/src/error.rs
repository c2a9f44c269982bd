//! Error types for support bundle inspection.

use std::path::PathBuf;

/// Result type alias for bundle operations.
pub type Result<T> = std::result::Result<T, BundleError>;

/// Errors that can occur while reading a support bundle.
///
/// Absent artifacts that have a documented default never surface here;
/// reads return `Ok(None)` for those and the caller substitutes.
#[derive(Debug, thiserror::Error)]
pub enum BundleError {
    // =========================================================================
    // Archive Errors
    // =========================================================================
    /// The archive file is missing, unreadable or not a gzip tarball.
    #[error("cannot read archive {path}: {reason}")]
    ArchiveUnreadable { path: PathBuf, reason: String },

    /// A required member is absent and no default applies.
    #[error("artifact '{path}' not found in archive")]
    ArtifactMissing { path: String },

    /// The archive is present but lacks data every lookup depends on.
    #[error("invalid archive: {0}")]
    InvalidArchive(String),

    /// A JSON or YAML manifest could not be decoded.
    #[error("malformed manifest '{path}': {reason}")]
    MalformedManifest { path: String, reason: String },

    // =========================================================================
    // Resolution Errors
    // =========================================================================
    /// No abbreviation, exact or fuzzy match for a resource type token.
    #[error("resource type '{token}' not found in {scope}")]
    ResourceTypeNotFound { token: String, scope: String },

    /// Two artifacts that must describe the same resources disagree.
    #[error("inconsistent bundle data: {0}")]
    DataInconsistency(String),

    // =========================================================================
    // Caller Errors
    // =========================================================================
    /// Arguments supplied by the caller were rejected.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl BundleError {
    pub(crate) fn unreadable(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::ArchiveUnreadable {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Returns true if the error is caused by caller input rather than bundle content
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            BundleError::InvalidInput(_) | BundleError::ResourceTypeNotFound { .. }
        )
    }
}
