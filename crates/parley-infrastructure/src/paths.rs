//! Path management for parley.
//!
//! Two families of paths live here:
//!
//! ```text
//! ~/.config/parley/            # Config directory (dirs::config_dir)
//! ├── config.toml              # Optional application configuration
//! └── logs/                    # Application logs
//!     └── parley.log.YYYY-MM-DD
//!
//! ./                           # Current working directory
//! └── <name>.chat_history.txt  # One file per named conversation
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use parley_core::ParleyError;

/// Suffix every conversation log file carries.
pub const HISTORY_SUFFIX: &str = ".chat_history.txt";

const APP_DIR: &str = "parley";

/// Resolution of config and log locations.
pub struct ParleyPaths;

impl ParleyPaths {
    /// Returns the parley configuration directory (e.g. `~/.config/parley/`).
    pub fn config_dir() -> Result<PathBuf, ParleyError> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or_else(|| ParleyError::config("Cannot find configuration directory"))
    }

    /// Returns the path to the main configuration file.
    pub fn config_file() -> Result<PathBuf, ParleyError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Returns the directory that receives rolling log files.
    pub fn log_dir() -> Result<PathBuf, ParleyError> {
        Ok(Self::config_dir()?.join("logs"))
    }
}

/// Lists conversation logs directly inside `dir`, sorted by file name.
pub fn discover_histories(dir: &Path) -> Vec<PathBuf> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!("[Paths] Cannot list {}: {}", dir.display(), e);
            return Vec::new();
        }
    };

    let mut histories: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && is_history_file(path))
        .collect();
    histories.sort();
    histories
}

fn is_history_file(path: &Path) -> bool {
    path.file_name()
        .map(|name| name.to_string_lossy().ends_with(HISTORY_SUFFIX))
        .unwrap_or(false)
}

/// Canonicalizes a user-supplied history name.
///
/// Names already ending in the suffix (any case) are kept; otherwise the text
/// before the first `.` gets the suffix appended.
pub fn canonical_history_name(name: &str) -> String {
    if name.to_lowercase().ends_with(HISTORY_SUFFIX) {
        return name.to_string();
    }
    let stem = name.split('.').next().unwrap_or_default();
    format!("{stem}{HISTORY_SUFFIX}")
}

/// Name used when the operator does not pick one.
pub fn default_history_name(now: DateTime<Utc>) -> String {
    format!("default_{}{HISTORY_SUFFIX}", now.timestamp())
}

/// The history file a session will read from and save to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryChoice {
    pub path: PathBuf,
    /// Whether the file existed when it was chosen.
    pub exists: bool,
}

impl HistoryChoice {
    fn at(path: PathBuf) -> Self {
        let exists = path.exists();
        Self { path, exists }
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// A history prompt answer that cannot be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexOutOfRange {
    pub max: usize,
}

/// Resolves the answer to the history prompt.
///
/// - empty: a new default-named log in `dir`
/// - a number while `existing` is non-empty: that 1-based entry
/// - anything else: a canonicalized name in `dir`
pub fn resolve_history_choice(
    input: &str,
    existing: &[PathBuf],
    dir: &Path,
    now: DateTime<Utc>,
) -> Result<HistoryChoice, IndexOutOfRange> {
    let choice = input.trim();
    if choice.is_empty() {
        return Ok(HistoryChoice::at(dir.join(default_history_name(now))));
    }

    if !existing.is_empty()
        && let Ok(index) = choice.parse::<i64>()
    {
        let max = existing.len();
        return match usize::try_from(index) {
            Ok(i) if (1..=max).contains(&i) => Ok(HistoryChoice::at(existing[i - 1].clone())),
            _ => Err(IndexOutOfRange { max }),
        };
    }

    Ok(HistoryChoice::at(dir.join(canonical_history_name(choice))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn fixed_now() -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000, 0).unwrap()
    }

    #[test]
    fn test_canonical_history_name() {
        assert_eq!(canonical_history_name("project_A"), "project_A.chat_history.txt");
        assert_eq!(canonical_history_name("notes.txt"), "notes.chat_history.txt");
        assert_eq!(canonical_history_name("a.b.c"), "a.chat_history.txt");
        assert_eq!(canonical_history_name("x.CHAT_HISTORY.TXT"), "x.CHAT_HISTORY.TXT");
        assert_eq!(canonical_history_name("y.chat_history.txt"), "y.chat_history.txt");
    }

    #[test]
    fn test_default_history_name_uses_timestamp() {
        assert_eq!(default_history_name(fixed_now()), "default_1700000000.chat_history.txt");
    }

    #[test]
    fn test_discover_histories_filters_and_sorts() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("b.chat_history.txt"), "").unwrap();
        fs::write(temp_dir.path().join("a.chat_history.txt"), "").unwrap();
        fs::write(temp_dir.path().join("notes.txt"), "").unwrap();
        fs::create_dir(temp_dir.path().join("dir.chat_history.txt")).unwrap();

        let found = discover_histories(temp_dir.path());
        let names: Vec<String> = found
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();

        assert_eq!(names, vec!["a.chat_history.txt", "b.chat_history.txt"]);
    }

    #[test]
    fn test_resolve_empty_creates_default() {
        let temp_dir = TempDir::new().unwrap();
        let choice = resolve_history_choice("", &[], temp_dir.path(), fixed_now()).unwrap();

        assert_eq!(choice.file_name(), "default_1700000000.chat_history.txt");
        assert!(!choice.exists);
    }

    #[test]
    fn test_resolve_number_selects_existing() {
        let temp_dir = TempDir::new().unwrap();
        let first = temp_dir.path().join("a.chat_history.txt");
        let second = temp_dir.path().join("b.chat_history.txt");
        fs::write(&first, "").unwrap();
        fs::write(&second, "").unwrap();
        let existing = vec![first, second.clone()];

        let choice = resolve_history_choice("2", &existing, temp_dir.path(), fixed_now()).unwrap();
        assert_eq!(choice.path, second);
        assert!(choice.exists);

        let err = resolve_history_choice("3", &existing, temp_dir.path(), fixed_now()).unwrap_err();
        assert_eq!(err, IndexOutOfRange { max: 2 });
        assert!(resolve_history_choice("0", &existing, temp_dir.path(), fixed_now()).is_err());
        assert!(resolve_history_choice("-1", &existing, temp_dir.path(), fixed_now()).is_err());
    }

    #[test]
    fn test_resolve_number_without_histories_is_a_name() {
        let temp_dir = TempDir::new().unwrap();
        let choice = resolve_history_choice("42", &[], temp_dir.path(), fixed_now()).unwrap();

        assert_eq!(choice.file_name(), "42.chat_history.txt");
    }

    #[test]
    fn test_resolve_name_detects_existing_file() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("work.chat_history.txt"), "").unwrap();

        let choice = resolve_history_choice("work", &[], temp_dir.path(), fixed_now()).unwrap();
        assert!(choice.exists);
        assert_eq!(choice.path, temp_dir.path().join("work.chat_history.txt"));
    }
}
