//! Adapters over the external services parley talks to.

pub mod gemini_api;
pub mod mock;
pub mod speech;

pub use gemini_api::{GeminiApiClient, GeminiChatSession};
pub use speech::{ArecordCapture, GoogleSpeechRecognizer};
