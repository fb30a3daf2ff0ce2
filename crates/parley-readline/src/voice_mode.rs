//! Voice chat loop: listen, transcribe, send.

use std::time::Duration;

use colored::Colorize;
use parley_application::ChatService;
use parley_core::chat::{ChatError, ChatSession};
use parley_core::locale::Messages;
use parley_core::speech::{AudioCapture, SpeechError, SpeechRecognizer};

use crate::interrupt::{SpeechStep, interruptible};
use crate::render;

/// Consecutive recognition request failures tolerated before giving up.
const MAX_REQUEST_FAILURES: u32 = 3;

/// Why the voice loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceEnd {
    ExitWord,
    Interrupted,
    MicrophoneFailed,
    RecognitionUnavailable,
    TurnFailed,
}

pub struct VoiceSettings<'a> {
    pub phrase_limit: Duration,
    /// Recognition language, e.g. `en`.
    pub language: &'a str,
}

pub async fn run<S, A, R>(
    service: &mut ChatService<S>,
    capture: &mut A,
    recognizer: &R,
    settings: &VoiceSettings<'_>,
    messages: &'static Messages,
) -> VoiceEnd
where
    S: ChatSession,
    A: AudioCapture + ?Sized,
    R: SpeechRecognizer + ?Sized,
{
    render::voice_banner(messages, &service.history_name());

    match interruptible::<_, _, SpeechStep>(capture.calibrate()).await {
        Ok(()) => println!("{}", messages.voice_ready.green()),
        Err(SpeechStep::Interrupted) => {
            println!("{}", messages.interrupted.yellow());
            return VoiceEnd::Interrupted;
        }
        Err(SpeechStep::Failed(e)) => {
            tracing::error!("[VoiceMode] Calibration failed: {}", e);
            eprintln!("{}", messages.voice_error_mic.red());
            eprintln!("   {}", e.to_string().bright_black());
            return VoiceEnd::MicrophoneFailed;
        }
    }

    let mut request_failures = 0;
    loop {
        println!("{}{}", messages.voice_prompt, messages.voice_listening);
        let captured =
            interruptible::<_, _, SpeechStep>(capture.capture(settings.phrase_limit)).await;
        let clip = match captured {
            Ok(clip) => clip,
            Err(step) => match on_speech_failure(step, &mut request_failures, messages) {
                Some(end) => return end,
                None => continue,
            },
        };

        println!("{}", messages.voice_recognizing.bright_black());
        let recognized =
            interruptible::<_, _, SpeechStep>(recognizer.recognize(&clip, settings.language))
                .await;
        let text = match recognized {
            Ok(text) => text,
            Err(step) => match on_speech_failure(step, &mut request_failures, messages) {
                Some(end) => return end,
                None => continue,
            },
        };
        request_failures = 0;

        println!("{}{}", messages.voice_recognized, text.bold());
        if messages.is_exit(&text) {
            return VoiceEnd::ExitWord;
        }
        if text.trim().is_empty() {
            continue;
        }

        println!("{}{}", messages.voice_sending, text);
        match interruptible::<_, _, ChatError>(service.send_message(&text)).await {
            Ok(reply) => render::reply(&reply),
            Err(e) => {
                tracing::warn!("[VoiceMode] Turn failed: {}", e);
                render::turn_error(messages, &e);
                return match e {
                    ChatError::Interrupted => VoiceEnd::Interrupted,
                    _ => VoiceEnd::TurnFailed,
                };
            }
        }
    }
}

/// Reports a failed capture or recognition step. `Some` ends the loop.
fn on_speech_failure(
    step: SpeechStep,
    request_failures: &mut u32,
    messages: &Messages,
) -> Option<VoiceEnd> {
    let error = match step {
        SpeechStep::Interrupted => {
            println!("{}", messages.interrupted.yellow());
            return Some(VoiceEnd::Interrupted);
        }
        SpeechStep::Failed(error) => error,
    };

    match error {
        SpeechError::NoSpeech | SpeechError::Unintelligible => {
            println!("{}", messages.voice_error_speech.yellow());
            None
        }
        SpeechError::Device(detail) => {
            tracing::error!("[VoiceMode] Capture failed: {}", detail);
            eprintln!("{}", messages.voice_error_mic.red());
            eprintln!("   {}", detail.bright_black());
            Some(VoiceEnd::MicrophoneFailed)
        }
        SpeechError::Request(detail) => {
            *request_failures += 1;
            tracing::warn!(
                "[VoiceMode] Recognition request failed ({}/{}): {}",
                request_failures,
                MAX_REQUEST_FAILURES,
                detail
            );
            eprintln!("{}", format!("{}{}", messages.voice_error_request, detail).red());
            (*request_failures >= MAX_REQUEST_FAILURES)
                .then_some(VoiceEnd::RecognitionUnavailable)
        }
    }
}
