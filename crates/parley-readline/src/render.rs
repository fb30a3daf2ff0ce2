//! Console output.

use colored::Colorize;
use parley_application::{ShutdownReport, UploadEvent};
use parley_core::chat::ChatError;
use parley_core::locale::{Messages, render_template};

const RULE: &str = "-------------------------------------------------------------";

pub fn chat_banner(messages: &Messages, history_name: &str) {
    println!();
    println!("{}", RULE.bright_black());
    println!(
        "{}",
        format!("{}{}", messages.chat_mode_title, history_name).bright_magenta().bold()
    );
    println!("{}", RULE.bright_black());
    println!("   {}", messages.command_title.bold());
    for command in [messages.command_1, messages.command_2, messages.command_3] {
        println!("   {}", command.bright_black());
    }
    println!("{}", RULE.bright_black());
}

pub fn voice_banner(messages: &Messages, history_name: &str) {
    println!();
    println!("{}", RULE.bright_black());
    println!(
        "{}",
        format!("{}{}", messages.chat_mode_title, history_name).bright_magenta().bold()
    );
    println!("🎙️ {}", messages.voice_exit);
    println!("{}", RULE.bright_black());
}

pub fn reply(text: &str) {
    println!("{}", "✨ Gemini:".bright_blue().bold());
    for line in text.lines() {
        println!("{}", line.bright_blue());
    }
}

/// Reports a turn that ended the session.
pub fn turn_error(messages: &Messages, error: &ChatError) {
    match error {
        ChatError::Interrupted => println!("{}", messages.interrupted.yellow()),
        other => eprintln!("{}", format!("🛑 {}{}", messages.error_api, other).red()),
    }
}

pub fn upload_event(messages: &Messages, event: &UploadEvent) {
    match event {
        UploadEvent::FolderNotFound(path) => {
            eprintln!(
                "{}",
                format!("{}{}", messages.error_folder_not_found, path.display()).red()
            );
        }
        UploadEvent::Analyzing(path) => {
            println!("{}{}", messages.analyze_folder, path.display());
        }
        UploadEvent::SkippedLarge { file_name, .. } => {
            println!(
                "{}",
                format!("{}{}", messages.upload_skipping_large, file_name).yellow()
            );
        }
        UploadEvent::Uploading {
            file_name,
            content_type,
        } => {
            let line = render_template(
                messages.upload_file,
                &[("file_name", file_name), ("mime_type", content_type)],
            );
            println!("{}", line.bright_black());
        }
        UploadEvent::Fallback { .. } => {
            println!("{}", messages.upload_fallback.yellow());
        }
        UploadEvent::Failed { file_name, error } => {
            let line = render_template(
                messages.upload_failed,
                &[("file_name", file_name), ("error", &error.to_string())],
            );
            eprintln!("{}", line.red());
        }
        UploadEvent::NothingUploaded { notice } => {
            eprintln!("{}", notice.red());
        }
    }
}

pub fn analyze_usage(messages: &Messages) {
    eprintln!("{}", messages.analyze_usage_error.red());
    eprintln!("{}", messages.analyze_usage_note.yellow());
}

/// Prints the outcome of saving the log and deleting uploads.
pub fn shutdown_report(messages: &Messages, report: &ShutdownReport) {
    if let Err(e) = &report.saved {
        eprintln!("{}", format!("{}{}", messages.error_saving_history, e).red());
    }
    for (file, error) in &report.cleanup.failures {
        let line = render_template(
            messages.cleanup_warning,
            &[("file_name", &file.name), ("error", &error.to_string())],
        );
        eprintln!("{}", line.yellow());
    }
}
