//! Recursive folder scan for `/analyze`.
//!
//! Per file, in order: oversized files are reported and skipped, files
//! outside the extension allow-list are silently excluded, and everything
//! else becomes a [`PendingUpload`] with a declared content type.
//! Walk order follows the file system and is not part of the contract.

use std::fs;
use std::path::{Path, PathBuf};

use parley_core::files::{MAX_UPLOAD_BYTES, PendingUpload};
use walkdir::WalkDir;

/// Extensions eligible for upload (lowercase, without the dot).
pub const ALLOWED_EXTENSIONS: [&str; 13] = [
    "py", "txt", "md", "html", "css", "js", "json", "sh", "log", "conf", "png", "jpg", "jpeg",
];

const IMAGE_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];
const TEXT_CONTENT_TYPE: &str = "text/plain";
const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// Outcome of scanning one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanEntry {
    Eligible(PendingUpload),
    Oversized { path: PathBuf, size: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanError {
    NotADirectory(PathBuf),
}

/// Maps an extension to the content type declared on upload.
///
/// Images get their specific type; every other allowed extension is plain
/// text. Returns `None` for extensions outside the allow-list.
pub fn declared_content_type(extension: &str) -> Option<String> {
    let extension = extension.to_lowercase();
    if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
        return None;
    }

    if IMAGE_EXTENSIONS.contains(&extension.as_str()) {
        let mime = mime_guess::from_ext(&extension)
            .first_raw()
            .unwrap_or(FALLBACK_CONTENT_TYPE);
        Some(mime.to_string())
    } else {
        Some(TEXT_CONTENT_TYPE.to_string())
    }
}

/// Walks `folder` recursively and classifies every regular file.
pub fn scan_folder(folder: &Path) -> Result<Vec<ScanEntry>, ScanError> {
    if !folder.is_dir() {
        return Err(ScanError::NotADirectory(folder.to_path_buf()));
    }
    let root = std::path::absolute(folder).unwrap_or_else(|_| folder.to_path_buf());

    let mut entries = Vec::new();
    for entry in WalkDir::new(&root).into_iter().filter_map(|e| e.ok()) {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if let Some(scanned) = scan_file(path) {
            entries.push(scanned);
        }
    }

    tracing::debug!(
        "[FolderScan] {} candidate files under {}",
        entries.len(),
        root.display()
    );
    Ok(entries)
}

fn scan_file(path: &Path) -> Option<ScanEntry> {
    let size = match fs::metadata(path) {
        Ok(metadata) => metadata.len(),
        Err(e) => {
            tracing::warn!("[FolderScan] Cannot stat {}: {}", path.display(), e);
            return None;
        }
    };

    if size > MAX_UPLOAD_BYTES {
        return Some(ScanEntry::Oversized {
            path: path.to_path_buf(),
            size,
        });
    }

    let extension = path.extension()?.to_string_lossy();
    let content_type = declared_content_type(&extension)?;

    Some(ScanEntry::Eligible(PendingUpload {
        path: path.to_path_buf(),
        content_type,
        size,
    }))
}
