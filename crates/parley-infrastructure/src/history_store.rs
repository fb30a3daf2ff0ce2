//! Flat-file conversation log.
//!
//! A log is a sequence of line pairs:
//!
//! ```text
//! role: user
//! <message text>
//! role: model
//! <message text>
//! ```
//!
//! Message text is escaped so that it always fits on one line
//! (`\` → `\\`, LF → `\n`, CR → `\r`). Reading is forgiving: unknown or
//! `system` role pairs are skipped, a dangling final line is ignored, and any
//! I/O or decoding failure yields an empty conversation.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use parley_core::ParleyError;
use parley_core::conversation::{ConversationRepository, RoleTag, Turn};
use parley_core::error::Result;
use regex::Regex;

static ROLE_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^role:\s*(\w+)$").expect("role line pattern is valid")
});

/// Conversation log stored in a single text file.
#[derive(Debug, Clone)]
pub struct FileConversationRepository {
    path: PathBuf,
}

impl FileConversationRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConversationRepository for FileConversationRepository {
    fn load(&self) -> Vec<Turn> {
        read_log(&self.path)
    }

    fn save(&self, turns: &[Turn]) -> Result<()> {
        write_log(&self.path, turns)
    }

    fn display_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

/// Reads the log at `path`. Never fails; see the module docs.
pub fn read_log(path: &Path) -> Vec<Turn> {
    if !path.exists() {
        return Vec::new();
    }

    match fs::read_to_string(path) {
        Ok(content) => {
            let turns = parse_log(&content);
            tracing::debug!(
                "[HistoryStore] Loaded {} turns from {}",
                turns.len(),
                path.display()
            );
            turns
        }
        Err(e) => {
            tracing::warn!(
                "[HistoryStore] Ignoring unreadable history {}: {}",
                path.display(),
                e
            );
            Vec::new()
        }
    }
}

/// Parses log content into turns, in file order.
pub fn parse_log(content: &str) -> Vec<Turn> {
    let lines: Vec<&str> = content.lines().collect();

    // chunks_exact drops an odd trailing line
    lines
        .chunks_exact(2)
        .filter_map(|pair| {
            let role = parse_role_line(pair[0])?.retained()?;
            Some(Turn::new(role, unescape_text(pair[1])))
        })
        .collect()
}

fn parse_role_line(line: &str) -> Option<RoleTag> {
    let captures = ROLE_LINE.captures(line.trim())?;
    captures.get(1)?.as_str().parse().ok()
}

/// Truncates `path` and writes every turn as a role line plus a text line.
pub fn write_log(path: &Path, turns: &[Turn]) -> Result<()> {
    let file = File::create(path).map_err(|e| ParleyError::io("create", path, &e))?;
    let mut writer = BufWriter::new(file);

    for turn in turns {
        writeln!(writer, "role: {}", turn.role)
            .and_then(|_| writeln!(writer, "{}", escape_text(&turn.text)))
            .map_err(|e| ParleyError::io("write", path, &e))?;
    }

    writer
        .flush()
        .map_err(|e| ParleyError::io("flush", path, &e))?;

    tracing::info!(
        "[HistoryStore] Saved {} turns to {}",
        turns.len(),
        path.display()
    );
    Ok(())
}

fn escape_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn unescape_text(line: &str) -> String {
    let mut text = String::with_capacity(line.len());
    let mut chars = line.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            text.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => text.push('\n'),
            Some('r') => text.push('\r'),
            Some('\\') => text.push('\\'),
            // Unknown escapes are kept verbatim
            Some(other) => {
                text.push('\\');
                text.push(other);
            }
            None => text.push('\\'),
        }
    }
    text
}
