//! Upload Mapper: turns a folder into remote file handles.
//!
//! Uploads run one file at a time. A failing file is reported and skipped;
//! it never aborts the batch. Every handle produced is registered in the
//! session's [`CleanupRegistry`] so [`cleanup`] can release it at shutdown.

use std::path::{Path, PathBuf};

use parley_core::files::{CleanupRegistry, FileStore, FileStoreError, PendingUpload, RemoteFile};
use parley_infrastructure::folder_scan::{ScanEntry, scan_folder};

/// Progress notifications emitted while a folder is processed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadEvent {
    FolderNotFound(PathBuf),
    Analyzing(PathBuf),
    SkippedLarge { file_name: String, size: u64 },
    Uploading { file_name: String, content_type: String },
    /// The upload is retried (or sent) without a declared content type.
    Fallback { file_name: String },
    Failed { file_name: String, error: FileStoreError },
    /// No handle came out of an analyze command; `notice` explains why.
    NothingUploaded { notice: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    /// The path is not a directory; nothing was attempted.
    FolderNotFound,
    /// The directory was processed; the list may be empty.
    Uploaded(Vec<RemoteFile>),
}

impl UploadOutcome {
    pub fn files(&self) -> &[RemoteFile] {
        match self {
            UploadOutcome::FolderNotFound => &[],
            UploadOutcome::Uploaded(files) => files,
        }
    }
}

/// Uploads every eligible file under `folder`.
pub async fn upload_folder<S, F>(
    store: &S,
    folder: &Path,
    registry: &mut CleanupRegistry,
    mut on_event: F,
) -> UploadOutcome
where
    S: FileStore + ?Sized,
    F: FnMut(UploadEvent),
{
    let entries = match scan_folder(folder) {
        Ok(entries) => entries,
        Err(_) => {
            tracing::warn!("[UploadMapper] Not a directory: {}", folder.display());
            on_event(UploadEvent::FolderNotFound(folder.to_path_buf()));
            return UploadOutcome::FolderNotFound;
        }
    };
    on_event(UploadEvent::Analyzing(folder.to_path_buf()));

    let mut uploaded = Vec::new();
    for entry in entries {
        let pending = match entry {
            ScanEntry::Eligible(pending) => pending,
            ScanEntry::Oversized { path, size } => {
                on_event(UploadEvent::SkippedLarge {
                    file_name: file_name_of(&path),
                    size,
                });
                continue;
            }
        };

        match upload_one(store, &pending, &mut on_event).await {
            Ok(file) => {
                registry.register(file.clone());
                uploaded.push(file);
            }
            Err(error) => {
                tracing::warn!(
                    "[UploadMapper] Upload of {} failed: {}",
                    pending.path.display(),
                    error
                );
                on_event(UploadEvent::Failed {
                    file_name: pending.file_name(),
                    error,
                });
            }
        }
    }

    tracing::info!(
        "[UploadMapper] Uploaded {} files from {}",
        uploaded.len(),
        folder.display()
    );
    UploadOutcome::Uploaded(uploaded)
}

/// First attempt declares the content type when the store supports it; an
/// `UnsupportedParameter` rejection gets exactly one retry without it.
async fn upload_one<S, F>(
    store: &S,
    pending: &PendingUpload,
    on_event: &mut F,
) -> Result<RemoteFile, FileStoreError>
where
    S: FileStore + ?Sized,
    F: FnMut(UploadEvent),
{
    let file_name = pending.file_name();
    on_event(UploadEvent::Uploading {
        file_name: file_name.clone(),
        content_type: pending.content_type.clone(),
    });

    if !store.supports_declared_content_type() {
        on_event(UploadEvent::Fallback { file_name });
        return store.upload(&pending.path, None).await;
    }

    match store
        .upload(&pending.path, Some(&pending.content_type))
        .await
    {
        Err(error) if error.is_unsupported_parameter() => {
            tracing::debug!("[UploadMapper] {error}; retrying without content type");
            on_event(UploadEvent::Fallback { file_name });
            store.upload(&pending.path, None).await
        }
        result => result,
    }
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Result of a cleanup pass.
#[derive(Debug, Default)]
pub struct CleanupReport {
    pub deleted: usize,
    pub failures: Vec<(RemoteFile, FileStoreError)>,
}

/// Deletes every registered handle; the registry is empty afterwards.
pub async fn cleanup<S>(store: &S, registry: &mut CleanupRegistry) -> CleanupReport
where
    S: FileStore + ?Sized,
{
    let mut report = CleanupReport::default();
    for file in registry.drain() {
        match store.delete(&file).await {
            Ok(()) => report.deleted += 1,
            Err(error) => {
                tracing::warn!("[UploadMapper] Failed to delete {}: {}", file.name, error);
                report.failures.push((file, error));
            }
        }
    }
    report
}
