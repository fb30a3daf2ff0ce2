//! Remote file seam and upload bookkeeping.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;

/// Largest file the upload mapper will attempt (20 MiB).
pub const MAX_UPLOAD_BYTES: u64 = 20 * 1024 * 1024;

/// A file discovered on disk and queued for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingUpload {
    /// Absolute path of the file.
    pub path: PathBuf,
    /// Content type declared on the first upload attempt.
    pub content_type: String,
    /// Size in bytes, always `<= MAX_UPLOAD_BYTES`.
    pub size: u64,
}

impl PendingUpload {
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

/// Opaque handle the service returns for an uploaded file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFile {
    /// Resource name used for deletion (e.g. `files/abc123`).
    pub name: String,
    /// URI referenced from message parts.
    pub uri: String,
    /// Content type the service recorded, if it reported one.
    pub mime_type: Option<String>,
    pub display_name: String,
}

impl RemoteFile {
    pub fn new(
        name: impl Into<String>,
        uri: impl Into<String>,
        display_name: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            uri: uri.into(),
            mime_type: None,
            display_name: display_name.into(),
        }
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }
}

/// Errors raised by the remote file store.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FileStoreError {
    /// The client does not accept this call parameter.
    ///
    /// This is a capability mismatch, not a business failure: the caller may
    /// retry once without the parameter.
    #[error("parameter '{parameter}' is not supported by this client")]
    UnsupportedParameter { parameter: &'static str },

    #[error("cannot read {path}: {message}")]
    Io { path: PathBuf, message: String },

    #[error("{code}. {message}")]
    Api { code: u16, message: String },

    #[error("request failed: {0}")]
    Transport(String),

    #[error("unexpected response: {0}")]
    Malformed(String),
}

impl FileStoreError {
    pub fn io(path: impl Into<PathBuf>, source: &std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            message: source.to_string(),
        }
    }

    pub fn is_unsupported_parameter(&self) -> bool {
        matches!(self, Self::UnsupportedParameter { .. })
    }
}

/// Upload and delete files on the model service.
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Whether `upload` accepts a declared content type.
    ///
    /// When `false` the caller skips straight to an upload without one.
    fn supports_declared_content_type(&self) -> bool {
        true
    }

    async fn upload(
        &self,
        path: &Path,
        content_type: Option<&str>,
    ) -> Result<RemoteFile, FileStoreError>;

    async fn delete(&self, file: &RemoteFile) -> Result<(), FileStoreError>;
}

/// Session-scoped set of uploaded files awaiting deletion.
///
/// Accumulates across every analyze command of one run. Draining hands
/// ownership of each handle to the cleanup pass exactly once.
#[derive(Debug, Default)]
pub struct CleanupRegistry {
    pending: Vec<RemoteFile>,
}

impl CleanupRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, file: RemoteFile) {
        self.pending.push(file);
    }

    pub fn pending(&self) -> &[RemoteFile] {
        &self.pending
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Removes and returns every pending handle, leaving the registry empty.
    pub fn drain(&mut self) -> Vec<RemoteFile> {
        std::mem::take(&mut self.pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_drain_empties() {
        let mut registry = CleanupRegistry::new();
        registry.register(RemoteFile::new("files/a", "uri-a", "a.txt"));
        registry.register(RemoteFile::new("files/b", "uri-b", "b.txt"));
        assert_eq!(registry.len(), 2);

        let drained = registry.drain();
        assert_eq!(drained.len(), 2);
        assert!(registry.is_empty());
        assert!(registry.drain().is_empty());
    }

    #[test]
    fn test_pending_upload_file_name() {
        let pending = PendingUpload {
            path: PathBuf::from("/tmp/project/main.py"),
            content_type: "text/plain".to_string(),
            size: 10,
        };
        assert_eq!(pending.file_name(), "main.py");
    }
}
