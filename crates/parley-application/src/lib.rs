pub mod bootstrap;
pub mod chat_service;
pub mod command;
pub mod upload_mapper;

pub use chat_service::{AnalyzeReply, ChatService, ContextPolicy, ShutdownReport};
pub use command::{AnalyzeCommand, ChatInput};
pub use upload_mapper::{CleanupReport, UploadEvent, UploadOutcome};
