//! Speech seam used by voice mode.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

/// Raw mono PCM audio.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioClip {
    /// Signed 16-bit big-endian samples.
    pub samples: Vec<u8>,
    pub sample_rate: u32,
}

impl AudioClip {
    pub fn duration(&self) -> Duration {
        if self.sample_rate == 0 {
            return Duration::ZERO;
        }
        let frames = self.samples.len() as u64 / 2;
        Duration::from_millis(frames * 1000 / u64::from(self.sample_rate))
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SpeechError {
    /// Nothing above the noise floor was heard within the capture window.
    #[error("no speech detected")]
    NoSpeech,

    /// Audio was sent but no transcript came back.
    #[error("speech was unintelligible")]
    Unintelligible,

    /// The capture device is missing or failed.
    #[error("audio device error: {0}")]
    Device(String),

    /// The recognition request itself failed.
    #[error("speech recognition request failed: {0}")]
    Request(String),
}

/// Records one utterance from a microphone.
#[async_trait]
pub trait AudioCapture: Send {
    /// Samples ambient noise once so later captures can tell speech apart.
    async fn calibrate(&mut self) -> Result<(), SpeechError>;

    async fn capture(&mut self, max_phrase: Duration) -> Result<AudioClip, SpeechError>;
}

/// Turns audio into text.
#[async_trait]
pub trait SpeechRecognizer: Send + Sync {
    async fn recognize(&self, clip: &AudioClip, language: &str) -> Result<String, SpeechError>;
}
