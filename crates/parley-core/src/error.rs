//! Error types for local storage and configuration.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Failures of the local side of Parley: history files, config, log setup.
///
/// The chat API, the file store and speech have their own enums next to the
/// traits that produce them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParleyError {
    #[error("cannot {action} {}: {message}", path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        message: String,
    },

    #[error("configuration error: {0}")]
    Config(String),
}

impl ParleyError {
    /// `action` reads as a verb phrase: "create", "write", "read".
    pub fn io(action: &'static str, path: &Path, source: &std::io::Error) -> Self {
        Self::Io {
            action,
            path: path.to_path_buf(),
            message: source.to_string(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn is_io(&self) -> bool {
        matches!(self, Self::Io { .. })
    }

    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}

pub type Result<T> = std::result::Result<T, ParleyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_names_action_and_path() {
        let source = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = ParleyError::io("create", Path::new("/tmp/a.chat_history.txt"), &source);
        assert!(err.is_io());
        assert_eq!(err.to_string(), "cannot create /tmp/a.chat_history.txt: denied");
    }

    #[test]
    fn test_config_error_is_not_io() {
        let err = ParleyError::config("bad model");
        assert!(err.is_config());
        assert!(!err.is_io());
    }
}
