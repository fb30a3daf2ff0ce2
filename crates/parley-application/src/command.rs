//! Classification of chat-loop input.

use once_cell::sync::Lazy;
use parley_core::locale::Messages;
use regex::Regex;

static ANALYZE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)^/\s*anal(?:yz|ys)e\s+(\S+)\s+"(.+)""#).expect("analyze pattern is valid")
});

/// `/analyze <path> "<prompt>"`, as typed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyzeCommand {
    /// The path exactly as the operator wrote it.
    pub path: String,
    pub prompt: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatInput {
    Exit,
    Empty,
    Analyze(AnalyzeCommand),
    /// Looked like `/analyze` but did not match the expected shape.
    MalformedAnalyze,
    Message(String),
}

impl ChatInput {
    pub fn classify(input: &str, messages: &Messages) -> Self {
        if messages.is_exit(input) {
            return ChatInput::Exit;
        }

        let trimmed = input.trim();
        if trimmed.is_empty() {
            return ChatInput::Empty;
        }

        if is_analyze_invocation(trimmed) {
            return match parse_analyze(trimmed) {
                Some(command) => ChatInput::Analyze(command),
                None => ChatInput::MalformedAnalyze,
            };
        }

        ChatInput::Message(input.to_string())
    }
}

fn is_analyze_invocation(trimmed: &str) -> bool {
    let lowered = trimmed.to_lowercase();
    lowered.starts_with("/analyze ") || lowered.starts_with("/analyse ")
}

/// Extracts path and quoted prompt from an analyze invocation.
pub fn parse_analyze(input: &str) -> Option<AnalyzeCommand> {
    let captures = ANALYZE.captures(input.trim())?;
    let path = captures.get(1)?.as_str().trim().to_string();
    let prompt = captures.get(2)?.as_str().trim().to_string();
    if prompt.is_empty() {
        return None;
    }
    Some(AnalyzeCommand { path, prompt })
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_core::locale::{EN, TR};

    #[test]
    fn test_parse_quoted_prompt() {
        let command = parse_analyze(r#"/analyze ./src "explain this""#).unwrap();
        assert_eq!(command.path, "./src");
        assert_eq!(command.prompt, "explain this");
    }

    #[test]
    fn test_unquoted_prompt_is_malformed() {
        assert_eq!(parse_analyze("/analyze ./src explain this"), None);
        assert_eq!(
            ChatInput::classify("/analyze ./src explain this", &EN),
            ChatInput::MalformedAnalyze
        );
    }

    #[test]
    fn test_british_spelling_and_case() {
        let command = parse_analyze(r#"/ANALYSE logs "what failed?""#).unwrap();
        assert_eq!(command.path, "logs");
        assert_eq!(command.prompt, "what failed?");

        assert_eq!(
            ChatInput::classify(r#"/analyse ./src "explain this""#, &EN),
            ChatInput::Analyze(AnalyzeCommand {
                path: "./src".to_string(),
                prompt: "explain this".to_string(),
            })
        );
        assert_eq!(parse_analyze(r#"/analize ./src "x""#), None);
    }

    #[test]
    fn test_missing_path_is_malformed() {
        assert_eq!(
            ChatInput::classify(r#"/analyze "explain""#, &EN),
            ChatInput::MalformedAnalyze
        );
    }

    #[test]
    fn test_classify_exit_words() {
        assert_eq!(ChatInput::classify("EXIT", &EN), ChatInput::Exit);
        assert_eq!(ChatInput::classify("quit  ", &EN), ChatInput::Exit);
        assert_eq!(ChatInput::classify("çık", &TR), ChatInput::Exit);
        assert_eq!(
            ChatInput::classify("exit now", &EN),
            ChatInput::Message("exit now".to_string())
        );
    }

    #[test]
    fn test_classify_empty_and_message() {
        assert_eq!(ChatInput::classify("   ", &EN), ChatInput::Empty);
        assert_eq!(
            ChatInput::classify("What is Rust?", &EN),
            ChatInput::Message("What is Rust?".to_string())
        );
        // only a leading command word counts
        assert_eq!(
            ChatInput::classify("please /analyze src \"x\"", &EN),
            ChatInput::Message("please /analyze src \"x\"".to_string())
        );
    }
}
