//! Upload validation at the storage boundary
//!
//! A batch is checked as a whole before anything is written, so a rejected
//! upload leaves no partial state behind.

use serde::{Deserialize, Serialize};

use crate::error::{FontError, FontResult};
use crate::font::{is_plain_file_name, FontFormat, ACCEPTED_EXTENSIONS};

/// One file in an upload request
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }
}

/// Limits applied to uploads
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadPolicy {
    /// Maximum number of files per request
    #[serde(default = "default_max_files")]
    pub max_files: usize,

    /// Maximum size of a single file in bytes
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            max_files: default_max_files(),
            max_file_size: default_max_file_size(),
        }
    }
}

fn default_max_files() -> usize {
    20
}

fn default_max_file_size() -> u64 {
    10 * 1024 * 1024
}

impl UploadPolicy {
    /// Check a single file; returns its font format when accepted
    pub fn validate(&self, name: &str, bytes: &[u8]) -> FontResult<FontFormat> {
        if !is_plain_file_name(name) {
            return Err(FontError::malformed(
                name,
                "file name must not contain path separators",
            ));
        }

        let format = FontFormat::from_file_name(name).ok_or_else(|| {
            FontError::malformed(
                name,
                format!(
                    "unsupported file type (accepted: {})",
                    ACCEPTED_EXTENSIONS.join(", ")
                ),
            )
        })?;

        if bytes.is_empty() {
            return Err(FontError::malformed(name, "file is empty"));
        }

        if bytes.len() as u64 > self.max_file_size {
            return Err(FontError::malformed(
                name,
                format!(
                    "file is {} bytes, limit is {} bytes",
                    bytes.len(),
                    self.max_file_size
                ),
            ));
        }

        Ok(format)
    }

    /// Check a whole batch; the first problem rejects all of it
    pub fn validate_batch(&self, files: &[UploadFile]) -> FontResult<()> {
        if files.is_empty() {
            return Err(FontError::malformed("(none)", "no files were uploaded"));
        }

        if files.len() > self.max_files {
            return Err(FontError::malformed(
                "(batch)",
                format!(
                    "{} files uploaded, at most {} allowed per request",
                    files.len(),
                    self.max_files
                ),
            ));
        }

        for file in files {
            self.validate(&file.name, &file.bytes)?;
        }

        Ok(())
    }
}
