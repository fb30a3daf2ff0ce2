mod cli_helper;
mod interrupt;
mod logging;
mod prompts;
mod render;
#[cfg(test)]
mod test_support;
mod text_mode;
mod voice_mode;

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use colored::Colorize;
use rustyline::Editor;

use parley_application::bootstrap::open_session;
use parley_application::{ChatService, ContextPolicy};
use parley_core::chat::ChatSession;
use parley_core::files::FileStore;
use parley_core::locale::{EN, Language, Messages, render_template};
use parley_infrastructure::paths::discover_histories;
use parley_infrastructure::{AppConfig, EnvironmentContext, FileConversationRepository};
use parley_interaction::{ArecordCapture, GeminiApiClient, GoogleSpeechRecognizer};

use crate::cli_helper::{CliHelper, ParleyEditor};
use crate::prompts::Mode;
use crate::voice_mode::VoiceSettings;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}", format!("🛑 {}{:#}", EN.error_unexpected, e).red());
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<ExitCode> {
    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", format!("{}{}", EN.error_config, e).red());
            return Ok(ExitCode::FAILURE);
        }
    };
    let _log_guard = logging::init(&config.log.level);
    config.describe_source();
    tracing::info!("[Main] Starting parley with model {}", config.model);

    let mut rl: ParleyEditor = Editor::new().context("Failed to open line editor")?;
    rl.set_helper(Some(CliHelper::new()));

    let language = match config.language {
        Some(language) => language,
        None => match prompts::select_language(&mut rl)? {
            Some(language) => language,
            None => return Ok(ExitCode::SUCCESS),
        },
    };
    let messages = language.messages();
    println!(
        "{}",
        render_template(messages.lang_selected, &[("lang", messages.name)]).green()
    );

    let Some(api_key) = config.api_key() else {
        eprintln!("{}", messages.error_api_key.red());
        return Ok(ExitCode::FAILURE);
    };
    tracing::debug!("[Main] API key loaded ({} chars)", api_key.len());

    println!();
    println!("{}", messages.app_title.bright_magenta().bold());
    let cwd = std::env::current_dir().context("Cannot read current directory")?;
    let existing = discover_histories(&cwd);
    let Some(choice) = prompts::select_history(&mut rl, messages, &existing, &cwd, Utc::now())?
    else {
        return Ok(ExitCode::SUCCESS);
    };
    let announcement = if choice.exists {
        messages.history_loading_existing
    } else {
        messages.history_creating_new
    };
    println!("{}{}", announcement, choice.file_name().cyan());

    let client = GeminiApiClient::new(api_key);
    let repository = Arc::new(FileConversationRepository::new(choice.path.clone()));
    let session = match open_session(
        &client,
        repository.as_ref(),
        &config.model,
        Some(messages.system_instruction),
    )
    .await
    {
        Ok(session) => session,
        Err(e) => {
            tracing::error!("[Main] Session bootstrap failed: {}", e);
            eprintln!("{}", format!("{}{}", messages.error_init, e).red());
            return Ok(ExitCode::FAILURE);
        }
    };

    let Some(mode) = prompts::select_mode(&mut rl, messages)? else {
        return Ok(ExitCode::SUCCESS);
    };
    let policy = match mode {
        Mode::Text => {
            println!("{}", messages.mode_selected_text.green());
            ContextPolicy::WhileFresh
        }
        Mode::Voice => {
            println!("{}", messages.mode_selected_voice.green());
            ContextPolicy::FirstTurnOfRun
        }
    };

    let context = EnvironmentContext::collect(messages).render();
    let store: Arc<dyn FileStore> = Arc::new(client.clone());
    let mut service =
        ChatService::new(session, store, repository, messages).with_context(context, policy);

    match mode {
        Mode::Text => text_mode::run(&mut rl, &mut service, messages).await,
        Mode::Voice => run_voice(&mut service, &config, language, messages).await,
    }

    shutdown(service, messages).await;
    Ok(ExitCode::SUCCESS)
}

async fn run_voice<S: ChatSession>(
    service: &mut ChatService<S>,
    config: &AppConfig,
    language: Language,
    messages: &'static Messages,
) {
    let Some(speech_key) = config.speech_api_key() else {
        tracing::warn!("[Main] Voice mode requested without a speech API key");
        eprintln!("{}", messages.voice_error_no_key.red());
        return;
    };

    let mut capture = ArecordCapture::new(config.voice.device.clone());
    let recognizer = GoogleSpeechRecognizer::new(speech_key);
    let settings = VoiceSettings {
        phrase_limit: Duration::from_secs(config.voice.phrase_time_limit_secs),
        language: language.code(),
    };
    let end = voice_mode::run(service, &mut capture, &recognizer, &settings, messages).await;
    tracing::info!("[Main] Voice mode ended: {:?}", end);
}

async fn shutdown<S: ChatSession>(service: ChatService<S>, messages: &'static Messages) {
    println!("{}", "-".repeat(35));
    println!("{}", messages.saving_history);
    if !service.pending_uploads().is_empty() {
        println!("{}", messages.cleanup_start.bright_black());
    }
    let report = service.shutdown().await;
    render::shutdown_report(messages, &report);
}
