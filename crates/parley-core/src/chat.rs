//! Chat API seam.
//!
//! The language-model service is an external collaborator. These traits are
//! the narrow surface the application relies on: open a session seeded with
//! prior turns, send one turn at a time, and read back the full transcript.

use async_trait::async_trait;
use thiserror::Error;

use crate::conversation::Turn;
use crate::files::RemoteFile;

/// One piece of a user turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentPart {
    Text(String),
    File(RemoteFile),
}

impl ContentPart {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ContentPart::Text(text) => Some(text),
            ContentPart::File(_) => None,
        }
    }
}

/// Everything needed to open a chat session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRequest {
    pub model: String,
    pub initial_turns: Vec<Turn>,
    pub system_instruction: Option<String>,
}

/// Errors raised by the chat API.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ChatError {
    /// The service answered with an error payload.
    #[error("{}", format_api_error(*code, status.as_deref(), message))]
    Api {
        code: u16,
        status: Option<String>,
        message: String,
    },

    /// The request never produced a response.
    #[error("request failed: {0}")]
    Transport(String),

    /// The response carried no text candidate.
    #[error("response contained no text")]
    EmptyResponse,

    /// The operator interrupted the turn before a reply arrived.
    #[error("interrupted")]
    Interrupted,
}

fn format_api_error(code: u16, status: Option<&str>, message: &str) -> String {
    match status {
        Some(status) if !status.is_empty() => format!("{code} {status}. {message}"),
        _ => format!("{code}. {message}"),
    }
}

/// An open multi-turn conversation with the model.
#[async_trait]
pub trait ChatSession: Send {
    /// Sends one user turn and returns the model's reply text.
    ///
    /// On success both the user turn and the reply are appended to the
    /// transcript. On failure the transcript is left untouched.
    async fn send(&mut self, parts: Vec<ContentPart>) -> Result<String, ChatError>;

    /// Returns every retained turn, seed turns included, oldest first.
    fn transcript(&self) -> Vec<Turn>;

    /// True while the transcript holds no turns at all.
    fn is_fresh(&self) -> bool {
        self.transcript().is_empty()
    }
}

/// Factory for chat sessions.
#[async_trait]
pub trait ChatClient: Send + Sync {
    type Session: ChatSession;

    async fn create_session(&self, request: SessionRequest) -> Result<Self::Session, ChatError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display_includes_code_and_status() {
        let err = ChatError::Api {
            code: 429,
            status: Some("RESOURCE_EXHAUSTED".to_string()),
            message: "Quota exceeded".to_string(),
        };
        assert_eq!(err.to_string(), "429 RESOURCE_EXHAUSTED. Quota exceeded");

        let bare = ChatError::Api {
            code: 500,
            status: None,
            message: "boom".to_string(),
        };
        assert_eq!(bare.to_string(), "500. boom");
    }

    #[test]
    fn test_content_part_text_accessor() {
        assert_eq!(ContentPart::text("hi").as_text(), Some("hi"));
        let file = ContentPart::File(RemoteFile::new("files/1", "uri", "a.txt"));
        assert_eq!(file.as_text(), None);
    }
}
