//! Text chat loop.

use colored::Colorize;
use parley_application::{AnalyzeCommand, ChatInput, ChatService};
use parley_core::chat::{ChatError, ChatSession};
use parley_core::locale::Messages;
use rustyline::error::ReadlineError;

use crate::interrupt::interruptible;
use crate::prompts::LineSource;
use crate::render;

const PROMPT: &str = ">> You: ";

/// Reads lines until the operator leaves or a turn fails.
pub async fn run<L, S>(source: &mut L, service: &mut ChatService<S>, messages: &'static Messages)
where
    L: LineSource,
    S: ChatSession,
{
    render::chat_banner(messages, &service.history_name());

    loop {
        let line = match source.read_line(PROMPT) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) => {
                println!("{}", messages.interrupted.yellow());
                break;
            }
            Err(ReadlineError::Eof) => break,
            Err(e) => {
                tracing::error!("[TextMode] Readline failed: {}", e);
                eprintln!("{}", format!("🛑 {}{}", messages.error_unexpected, e).red());
                break;
            }
        };

        let result = match ChatInput::classify(&line, messages) {
            ChatInput::Exit => break,
            ChatInput::Empty => continue,
            ChatInput::MalformedAnalyze => {
                render::analyze_usage(messages);
                continue;
            }
            ChatInput::Analyze(command) => {
                source.remember(&line);
                analyze(service, &command, messages).await
            }
            ChatInput::Message(text) => {
                source.remember(&line);
                interruptible(service.send_message(&text)).await
            }
        };

        match result {
            Ok(reply) => render::reply(&reply),
            Err(e) => {
                tracing::warn!("[TextMode] Turn failed: {}", e);
                render::turn_error(messages, &e);
                break;
            }
        }
    }
}

async fn analyze<S: ChatSession>(
    service: &mut ChatService<S>,
    command: &AnalyzeCommand,
    messages: &'static Messages,
) -> Result<String, ChatError> {
    let folder = std::path::absolute(&command.path)
        .map(|path| path.display().to_string())
        .unwrap_or_else(|_| command.path.clone());
    println!("{}", format!("{}{}", messages.analyze_start, folder).cyan());

    let reply = interruptible::<_, _, ChatError>(
        service.analyze(command, |event| render::upload_event(messages, &event)),
    )
    .await?;
    tracing::debug!("[TextMode] Analyze turn used {} files", reply.uploaded);
    Ok(reply.reply)
}
