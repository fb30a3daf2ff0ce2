//! Ctrl-C handling for awaited operations.
//!
//! Once a handler is registered the process no longer dies on SIGINT, so
//! every await the operator might want to abort goes through
//! [`interruptible`].

use std::future::Future;

use parley_core::chat::ChatError;
use parley_core::speech::SpeechError;

/// Something a Ctrl-C can stand in for.
pub trait Interrupted {
    fn interrupted() -> Self;
}

impl Interrupted for ChatError {
    fn interrupted() -> Self {
        ChatError::Interrupted
    }
}

/// Marks a speech step the operator aborted.
#[derive(Debug)]
pub enum SpeechStep {
    Failed(SpeechError),
    Interrupted,
}

impl From<SpeechError> for SpeechStep {
    fn from(error: SpeechError) -> Self {
        SpeechStep::Failed(error)
    }
}

impl Interrupted for SpeechStep {
    fn interrupted() -> Self {
        SpeechStep::Interrupted
    }
}

/// Runs `future` unless Ctrl-C arrives first.
///
/// The in-flight future is dropped on interrupt; child processes it owns are
/// killed with it.
pub async fn interruptible<T, E, O>(future: impl Future<Output = Result<T, E>>) -> Result<T, O>
where
    O: Interrupted + From<E>,
{
    tokio::select! {
        result = future => result.map_err(O::from),
        Ok(()) = tokio::signal::ctrl_c() => {
            tracing::info!("[Interrupt] Ctrl-C received");
            Err(O::interrupted())
        }
    }
}
