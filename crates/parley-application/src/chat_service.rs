//! One chat session from first turn to shutdown.

use std::path::PathBuf;
use std::sync::Arc;

use parley_core::ParleyError;
use parley_core::chat::{ChatError, ChatSession, ContentPart};
use parley_core::conversation::ConversationRepository;
use parley_core::files::{CleanupRegistry, FileStore};
use parley_core::locale::{Messages, render_template};

use crate::command::AnalyzeCommand;
use crate::upload_mapper::{CleanupReport, UploadEvent, UploadOutcome, cleanup, upload_folder};

/// When the environment context block accompanies a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextPolicy {
    /// Every turn sent while the session transcript is still empty.
    WhileFresh,
    /// Only the first turn of this run, even when history was loaded.
    FirstTurnOfRun,
}

/// Reply to an analyze command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyzeReply {
    pub uploaded: usize,
    pub reply: String,
}

/// What happened during shutdown.
#[derive(Debug)]
pub struct ShutdownReport {
    /// Number of turns written, or why the log could not be written.
    pub saved: Result<usize, ParleyError>,
    pub cleanup: CleanupReport,
}

/// Drives a chat session and owns its upload bookkeeping.
pub struct ChatService<S: ChatSession> {
    session: S,
    store: Arc<dyn FileStore>,
    repository: Arc<dyn ConversationRepository>,
    registry: CleanupRegistry,
    messages: &'static Messages,
    context: Option<String>,
    policy: ContextPolicy,
    context_delivered: bool,
}

impl<S: ChatSession> ChatService<S> {
    pub fn new(
        session: S,
        store: Arc<dyn FileStore>,
        repository: Arc<dyn ConversationRepository>,
        messages: &'static Messages,
    ) -> Self {
        Self {
            session,
            store,
            repository,
            registry: CleanupRegistry::new(),
            messages,
            context: None,
            policy: ContextPolicy::WhileFresh,
            context_delivered: false,
        }
    }

    /// Attaches the environment context block sent with the first turn.
    pub fn with_context(mut self, context: impl Into<String>, policy: ContextPolicy) -> Self {
        self.context = Some(context.into());
        self.policy = policy;
        self
    }

    pub fn session(&self) -> &S {
        &self.session
    }

    /// Handles uploaded so far and not yet deleted.
    pub fn pending_uploads(&self) -> &CleanupRegistry {
        &self.registry
    }

    pub fn history_name(&self) -> String {
        self.repository.display_name()
    }

    fn take_context(&mut self) -> Option<String> {
        let context = self.context.as_ref()?;
        match self.policy {
            ContextPolicy::WhileFresh if self.session.is_fresh() => Some(context.clone()),
            ContextPolicy::FirstTurnOfRun if !self.context_delivered => {
                self.context_delivered = true;
                Some(context.clone())
            }
            _ => None,
        }
    }

    /// Sends a plain message and returns the model's reply.
    pub async fn send_message(&mut self, input: &str) -> Result<String, ChatError> {
        let prompt = match self.take_context() {
            Some(context) => format!("{context}\n\n[USER QUESTION]: {input}"),
            None => input.to_string(),
        };
        self.session.send(vec![ContentPart::Text(prompt)]).await
    }

    /// Uploads the command's folder and asks the model about it.
    ///
    /// When nothing could be uploaded the model is still asked, with a note
    /// telling it to have the operator check the path.
    pub async fn analyze<F>(
        &mut self,
        command: &AnalyzeCommand,
        mut on_event: F,
    ) -> Result<AnalyzeReply, ChatError>
    where
        F: FnMut(UploadEvent),
    {
        let folder = std::path::absolute(&command.path)
            .unwrap_or_else(|_| PathBuf::from(&command.path));
        let outcome = upload_folder(
            self.store.as_ref(),
            &folder,
            &mut self.registry,
            &mut on_event,
        )
        .await;

        let mut parts = Vec::new();
        if let Some(context) = self.take_context() {
            parts.push(ContentPart::Text(context));
        }

        let files = outcome.files();
        if files.is_empty() {
            let notice = self.nothing_uploaded_notice(&command.path, &outcome);
            parts.push(ContentPart::Text(format!(
                "[INTERNAL_ERROR_FILE_UPLOAD]: {}. Please inform the user that no files could be found/uploaded and ask them to verify the path or file types.",
                notice.trim_end_matches('.')
            )));
            on_event(UploadEvent::NothingUploaded { notice });
        } else {
            parts.extend(files.iter().cloned().map(ContentPart::File));
            parts.push(ContentPart::Text(command.prompt.clone()));
        }

        let reply = self.session.send(parts).await?;
        Ok(AnalyzeReply {
            uploaded: files.len(),
            reply,
        })
    }

    fn nothing_uploaded_notice(&self, path: &str, outcome: &UploadOutcome) -> String {
        let check = match outcome {
            UploadOutcome::FolderNotFound => self.messages.analyze_check_not_found,
            UploadOutcome::Uploaded(_) => self.messages.analyze_check_exists,
        };
        render_template(
            self.messages.analyze_failed_no_files,
            &[("path", path), ("check", check)],
        )
    }

    /// Writes the transcript back to the log and deletes every upload.
    ///
    /// Neither step can abort the other; failures are returned in the report.
    pub async fn shutdown(mut self) -> ShutdownReport {
        let transcript = self.session.transcript();
        let saved = self
            .repository
            .save(&transcript)
            .map(|()| transcript.len());
        if let Err(e) = &saved {
            tracing::error!("[ChatService] Failed to save history: {}", e);
        }

        let cleanup = cleanup(self.store.as_ref(), &mut self.registry).await;
        tracing::info!(
            "[ChatService] Shutdown: {} uploads deleted, {} failed",
            cleanup.deleted,
            cleanup.failures.len()
        );
        ShutdownReport { saved, cleanup }
    }
}
