//! Startup prompts: language, history file and interaction mode.
//!
//! Each prompt repeats until it gets a usable answer. `Ok(None)` means the
//! operator pressed Ctrl-C or Ctrl-D and wants to leave.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use colored::Colorize;
use parley_core::locale::{Language, Messages, render_template};
use parley_infrastructure::HistoryChoice;
use parley_infrastructure::paths::{default_history_name, resolve_history_choice};
use rustyline::error::ReadlineError;

use crate::cli_helper::ParleyEditor;

/// Source of operator input lines.
pub trait LineSource {
    fn read_line(&mut self, prompt: &str) -> rustyline::Result<String>;

    /// Adds an accepted line to the recall history, if the source keeps one.
    fn remember(&mut self, _line: &str) {}
}

impl LineSource for ParleyEditor {
    fn read_line(&mut self, prompt: &str) -> rustyline::Result<String> {
        self.readline(prompt)
    }

    fn remember(&mut self, line: &str) {
        if let Err(e) = self.add_history_entry(line) {
            tracing::debug!("[Prompt] Could not record line: {}", e);
        }
    }
}

/// Replays canned answers, then reports end of input.
#[cfg(test)]
pub(crate) struct Scripted(std::collections::VecDeque<String>);

#[cfg(test)]
impl Scripted {
    pub(crate) fn new(answers: &[&str]) -> Self {
        Self(answers.iter().map(|answer| answer.to_string()).collect())
    }
}

#[cfg(test)]
impl LineSource for Scripted {
    fn read_line(&mut self, _prompt: &str) -> rustyline::Result<String> {
        self.0.pop_front().ok_or(ReadlineError::Eof)
    }
}

/// Reads one answer, mapping Ctrl-C and Ctrl-D to `None`.
fn ask(source: &mut impl LineSource, prompt: &str) -> anyhow::Result<Option<String>> {
    match source.read_line(prompt) {
        Ok(line) => Ok(Some(line)),
        Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Text,
    Voice,
}

impl Mode {
    pub fn from_choice(input: &str) -> Option<Self> {
        match input.trim() {
            "" | "1" => Some(Mode::Text),
            "2" => Some(Mode::Voice),
            _ => None,
        }
    }
}

pub fn select_language(source: &mut impl LineSource) -> anyhow::Result<Option<Language>> {
    // The prompt is shown in English until a language is picked
    let messages = Language::English.messages();
    println!("{}", format!("--- {} ---", messages.lang_title).bright_magenta().bold());
    println!("{}", messages.lang_prompt);
    for option in [messages.lang_1, messages.lang_2, messages.lang_3] {
        println!("  {option}");
    }

    loop {
        let Some(answer) = ask(source, messages.lang_input)? else {
            return Ok(None);
        };
        match Language::from_choice(&answer) {
            Some(language) => return Ok(Some(language)),
            None => println!("{}", messages.lang_invalid.yellow()),
        }
    }
}

pub fn select_history(
    source: &mut impl LineSource,
    messages: &Messages,
    existing: &[PathBuf],
    dir: &Path,
    now: DateTime<Utc>,
) -> anyhow::Result<Option<HistoryChoice>> {
    println!();
    if existing.is_empty() {
        println!("{}", messages.history_none);
        let default_name = default_history_name(now);
        println!(
            "{}",
            render_template(
                messages.history_default_name,
                &[("default_name", &default_name)]
            )
            .bright_black()
        );
    } else {
        println!("{}", messages.history_available);
        for (index, path) in existing.iter().enumerate() {
            let name = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            println!("  [{}] {}", index + 1, name.cyan());
        }
        println!("{}", messages.history_prompt_1);
    }
    println!("{}", messages.history_prompt_2);

    loop {
        let Some(answer) = ask(source, messages.history_prompt_input)? else {
            return Ok(None);
        };
        match resolve_history_choice(&answer, existing, dir, now) {
            Ok(choice) => return Ok(Some(choice)),
            Err(err) => {
                let max = err.max.to_string();
                println!(
                    "{}",
                    render_template(messages.history_invalid_number, &[("max", &max)]).yellow()
                );
            }
        }
    }
}

pub fn select_mode(
    source: &mut impl LineSource,
    messages: &Messages,
) -> anyhow::Result<Option<Mode>> {
    println!();
    println!("{}", format!("--- {} ---", messages.mode_title).bright_magenta().bold());
    println!("{}", messages.mode_prompt);
    println!("  {}", messages.mode_1);
    println!("  {}", messages.mode_2);

    loop {
        let Some(answer) = ask(source, messages.mode_input)? else {
            return Ok(None);
        };
        match Mode::from_choice(&answer) {
            Some(mode) => return Ok(Some(mode)),
            None => println!("{}", messages.lang_invalid.yellow()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::fs;
    use tempfile::TempDir;

    fn now() -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000, 0).unwrap()
    }

    #[test]
    fn test_mode_from_choice() {
        assert_eq!(Mode::from_choice(""), Some(Mode::Text));
        assert_eq!(Mode::from_choice(" 1 "), Some(Mode::Text));
        assert_eq!(Mode::from_choice("2"), Some(Mode::Voice));
        assert_eq!(Mode::from_choice("voice"), None);
    }

    #[test]
    fn test_language_prompt_repeats_until_valid() {
        let mut source = Scripted::new(&["de", "9", "tr"]);
        let language = select_language(&mut source).unwrap();
        assert_eq!(language, Some(Language::Turkish));
    }

    #[test]
    fn test_language_prompt_eof_means_leave() {
        let mut source = Scripted::new(&["de"]);
        assert_eq!(select_language(&mut source).unwrap(), None);
    }

    #[test]
    fn test_history_prompt_rejects_out_of_range_number() {
        let temp_dir = TempDir::new().unwrap();
        let first = temp_dir.path().join("a.chat_history.txt");
        fs::write(&first, "").unwrap();
        let existing = vec![first.clone()];

        let mut source = Scripted::new(&["5", "1"]);
        let choice = select_history(&mut source, &parley_core::locale::EN, &existing, temp_dir.path(), now())
            .unwrap()
            .unwrap();
        assert_eq!(choice.path, first);
        assert!(choice.exists);
    }

    #[test]
    fn test_history_prompt_empty_answer_creates_default() {
        let dir = PathBuf::from("/tmp");
        let mut source = Scripted::new(&[""]);
        let choice = select_history(&mut source, &parley_core::locale::EN, &[], &dir, now())
            .unwrap()
            .unwrap();
        assert_eq!(choice.file_name(), "default_1700000000.chat_history.txt");
    }

    #[test]
    fn test_mode_prompt_repeats_until_valid() {
        let mut source = Scripted::new(&["x", "2"]);
        let mode = select_mode(&mut source, &parley_core::locale::EN).unwrap();
        assert_eq!(mode, Some(Mode::Voice));
    }
}
