//! Line editor helper for the chat prompt.
//!
//! Completes the analyze command names, then file system paths for the
//! folder argument. Hints show the rest of a partially typed command.

use std::borrow::Cow::{self, Borrowed, Owned};

use colored::Colorize;
use rustyline::completion::{Completer, FilenameCompleter, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};

pub type ParleyEditor = Editor<CliHelper, DefaultHistory>;

const COMMANDS: [&str; 2] = ["/analyze", "/analyse"];

pub struct CliHelper {
    paths: FilenameCompleter,
}

impl CliHelper {
    pub fn new() -> Self {
        Self {
            paths: FilenameCompleter::new(),
        }
    }
}

fn is_command(word: &str) -> bool {
    COMMANDS.iter().any(|cmd| cmd.eq_ignore_ascii_case(word))
}

/// True while the cursor is inside the folder argument of an analyze command.
fn in_folder_argument(head: &str) -> bool {
    match head.split_once(' ') {
        Some((command, rest)) => is_command(command) && !rest.trim_start().contains(' '),
        None => false,
    }
}

impl Helper for CliHelper {}

impl Completer for CliHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let head = &line[..pos];
        if !head.starts_with('/') {
            return Ok((pos, Vec::new()));
        }

        if !head.contains(' ') {
            let lowered = head.to_lowercase();
            let candidates = COMMANDS
                .iter()
                .filter(|cmd| cmd.starts_with(&lowered))
                .map(|cmd| Pair {
                    display: cmd.to_string(),
                    replacement: format!("{cmd} "),
                })
                .collect();
            return Ok((0, candidates));
        }

        if in_folder_argument(head) {
            return self.paths.complete(line, pos, ctx);
        }
        Ok((pos, Vec::new()))
    }
}

impl Highlighter for CliHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if !line.starts_with('/') {
            return Borrowed(line);
        }
        let (command, rest) = line.split_at(line.find(' ').unwrap_or(line.len()));
        if is_command(command) {
            Owned(format!("{}{}", command.bright_cyan(), rest))
        } else {
            Owned(line.yellow().to_string())
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Hinter for CliHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        let head = &line[..pos];
        if pos < line.len() || !head.starts_with('/') || head.contains(' ') {
            return None;
        }
        COMMANDS
            .iter()
            .find(|cmd| cmd.starts_with(head) && cmd.len() > head.len())
            .map(|cmd| cmd[head.len()..].to_string())
    }
}

impl Validator for CliHelper {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completes_command_names() {
        let helper = CliHelper::new();
        let history = DefaultHistory::new();
        let ctx = Context::new(&history);

        let (start, candidates) = helper.complete("/ANA", 4, &ctx).unwrap();
        assert_eq!(start, 0);
        let replacements: Vec<&str> = candidates.iter().map(|c| c.replacement.as_str()).collect();
        assert_eq!(replacements, vec!["/analyze ", "/analyse "]);

        let (_, none) = helper.complete("hello", 5, &ctx).unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn test_folder_argument_detection() {
        assert!(in_folder_argument("/analyze ./sr"));
        assert!(in_folder_argument("/Analyse "));
        assert!(!in_folder_argument("/analyze ./src \"expl"));
        assert!(!in_folder_argument("/plan ./src"));
    }

    #[test]
    fn test_hint_shows_rest_of_command() {
        let helper = CliHelper::new();
        let history = DefaultHistory::new();
        let ctx = Context::new(&history);

        assert_eq!(helper.hint("/an", 3, &ctx), Some("alyze".to_string()));
        assert_eq!(helper.hint("/analyze", 8, &ctx), None);
        assert_eq!(helper.hint("/an", 1, &ctx), None);
    }
}
