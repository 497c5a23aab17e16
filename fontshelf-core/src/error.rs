//! Font shelf error types
//!
//! Every variant is recoverable. Callers fall back to a default family,
//! the next provider, or an empty catalog; nothing here should end the
//! process.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by storage backends, remote sources and the upload boundary
#[derive(Error, Debug)]
pub enum FontError {
    /// Requested font (or font variant) is absent
    #[error("Font not found: {name}")]
    NotFound { name: String },

    /// A storage backend or remote listing could not be reached
    #[error("Font source '{source_name}' is unavailable: {reason}")]
    SourceUnavailable { source_name: String, reason: String },

    /// Upload rejected at the boundary (wrong extension, empty payload, too large)
    #[error("Upload rejected for '{name}': {reason}")]
    MalformedUpload { name: String, reason: String },

    /// Filesystem failure in a directory-backed store
    #[error("I/O error on {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Remote source answered with a non-success status
    #[error("Remote request failed (HTTP {status}): {message}")]
    Remote { status: u16, message: String },

    /// Listing or cache metadata could not be (de)serialized
    #[error("Failed to (de)serialize font metadata")]
    Serialization {
        #[source]
        source: serde_json::Error,
    },
}

impl FontError {
    pub fn not_found(name: impl Into<String>) -> Self {
        FontError::NotFound { name: name.into() }
    }

    pub fn unavailable(source_name: impl Into<String>, reason: impl ToString) -> Self {
        FontError::SourceUnavailable {
            source_name: source_name.into(),
            reason: reason.to_string(),
        }
    }

    pub fn malformed(name: impl Into<String>, reason: impl Into<String>) -> Self {
        FontError::MalformedUpload {
            name: name.into(),
            reason: reason.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        FontError::Io {
            path: path.into(),
            source,
        }
    }

    /// True for the "not found" class; everything else is "other failure"
    pub fn is_not_found(&self) -> bool {
        matches!(self, FontError::NotFound { .. })
    }

    /// Message suitable for showing to the person who triggered the request
    pub fn user_message(&self) -> String {
        self.to_string()
    }
}

pub type FontResult<T> = std::result::Result<T, FontError>;
