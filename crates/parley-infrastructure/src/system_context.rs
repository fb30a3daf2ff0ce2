//! Environment context sent with the first turn of a session.

use std::fs;
use std::path::PathBuf;
use std::process::Command;

use once_cell::sync::Lazy;
use parley_core::locale::Messages;
use regex::Regex;

/// Number of shell commands included in the context block.
pub const HISTORY_LIMIT: usize = 10;

const SYSINFO_FAILED: &str = "System info retrieval failed. Neofetch not found or error occurred.";

static ANSI_ESCAPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\x1B\[[0-?]*[ -/]*[@-~]").expect("ANSI escape pattern is valid")
});

/// System description plus recent shell commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentContext {
    pub system_info: String,
    pub shell_history: Vec<String>,
}

impl EnvironmentContext {
    /// Collects the context for the local machine. Never fails.
    pub fn collect(messages: &Messages) -> Self {
        if !cfg!(target_os = "linux") {
            return Self {
                system_info: messages.sysinfo_non_linux.to_string(),
                shell_history: Vec::new(),
            };
        }

        let shell_history = std::env::var("SHELL")
            .ok()
            .and_then(|shell| ShellKind::from_shell_path(&shell))
            .map(read_shell_history)
            .unwrap_or_default();

        Self {
            system_info: system_info(),
            shell_history,
        }
    }

    /// Formats the two `[CONTEXT: ...]` lines.
    pub fn render(&self) -> String {
        format!(
            "[CONTEXT: SYSTEM]: {}\n[CONTEXT: HISTORY (last {} commands)]: {}",
            self.system_info,
            HISTORY_LIMIT,
            self.shell_history.join(", ")
        )
    }
}

fn system_info() -> String {
    match Command::new("neofetch")
        .args(["--stdout", "--disable", "ascii"])
        .output()
    {
        Ok(output) if output.status.success() => {
            strip_ansi(&String::from_utf8_lossy(&output.stdout))
        }
        Ok(output) => {
            tracing::warn!("[SystemContext] neofetch exited with {}", output.status);
            SYSINFO_FAILED.to_string()
        }
        Err(e) => {
            tracing::warn!("[SystemContext] neofetch unavailable: {}", e);
            SYSINFO_FAILED.to_string()
        }
    }
}

/// Removes terminal escape sequences and surrounding whitespace.
pub fn strip_ansi(text: &str) -> String {
    ANSI_ESCAPE.replace_all(text, "").trim().to_string()
}

/// Shells whose history file format is understood.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellKind {
    Bash,
    Zsh,
    Fish,
}

impl ShellKind {
    /// Picks the shell from a `$SHELL` value such as `/usr/bin/zsh`.
    pub fn from_shell_path(shell: &str) -> Option<Self> {
        match shell.rsplit('/').next()? {
            "bash" => Some(Self::Bash),
            "zsh" => Some(Self::Zsh),
            "fish" => Some(Self::Fish),
            _ => None,
        }
    }

    fn history_file(self) -> Option<PathBuf> {
        let home = dirs::home_dir()?;
        Some(match self {
            Self::Bash => home.join(".bash_history"),
            Self::Zsh => home.join(".zsh_history"),
            Self::Fish => home.join(".local/share/fish/fish_history"),
        })
    }
}

fn read_shell_history(shell: ShellKind) -> Vec<String> {
    let Some(path) = shell.history_file() else {
        return Vec::new();
    };
    match fs::read(&path) {
        Ok(bytes) => parse_shell_history(shell, &String::from_utf8_lossy(&bytes)),
        Err(e) => {
            tracing::debug!("[SystemContext] No shell history at {}: {}", path.display(), e);
            Vec::new()
        }
    }
}

/// Extracts the last [`HISTORY_LIMIT`] commands from a history file.
pub fn parse_shell_history(shell: ShellKind, content: &str) -> Vec<String> {
    let commands: Vec<String> = match shell {
        ShellKind::Fish => content
            .lines()
            .filter_map(|line| line.strip_prefix("- cmd: "))
            .map(|cmd| cmd.trim().to_string())
            .collect(),
        ShellKind::Bash | ShellKind::Zsh => content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(|line| strip_zsh_timestamp(line).to_string())
            .collect(),
    };

    let skip = commands.len().saturating_sub(HISTORY_LIMIT);
    commands.into_iter().skip(skip).collect()
}

// zsh EXTENDED_HISTORY lines look like `: 1700000000:0;git status`
fn strip_zsh_timestamp(line: &str) -> &str {
    if line.starts_with(": ")
        && let Some((_, command)) = line.split_once(';')
    {
        return command;
    }
    line
}
