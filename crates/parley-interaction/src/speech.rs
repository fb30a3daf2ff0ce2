//! Microphone capture through `arecord` and Google speech recognition.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use parley_core::speech::{AudioCapture, AudioClip, SpeechError, SpeechRecognizer};
use reqwest::Client;
use serde::Deserialize;
use tokio::process::Command;

pub const SAMPLE_RATE: u32 = 16_000;

const RECOGNIZE_URL: &str = "http://www.google.com/speech-api/v2/recognize";
const CALIBRATION_SECS: u64 = 1;
/// Floor for the energy threshold, on the 16-bit sample scale.
const MIN_ENERGY_THRESHOLD: f64 = 300.0;
const THRESHOLD_MULTIPLIER: f64 = 1.5;
// 100 ms of 16-bit mono audio
const FRAME_BYTES: usize = (SAMPLE_RATE as usize / 10) * 2;

/// Records raw 16 kHz mono S16_BE audio with ALSA's `arecord`.
pub struct ArecordCapture {
    device: Option<String>,
    energy_threshold: f64,
}

impl ArecordCapture {
    pub fn new(device: Option<String>) -> Self {
        Self {
            device,
            energy_threshold: MIN_ENERGY_THRESHOLD,
        }
    }

    pub fn energy_threshold(&self) -> f64 {
        self.energy_threshold
    }

    async fn record(&self, seconds: u64) -> Result<Vec<u8>, SpeechError> {
        let mut command = Command::new("arecord");
        command
            .args(["-q", "-f", "S16_BE", "-c", "1", "-t", "raw"])
            .arg("-r")
            .arg(SAMPLE_RATE.to_string())
            .arg("-d")
            .arg(seconds.max(1).to_string());
        if let Some(device) = &self.device {
            command.arg("-D").arg(device);
        }

        let output = command
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| SpeechError::Device(format!("cannot run arecord: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SpeechError::Device(format!(
                "arecord exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }
        Ok(output.stdout)
    }
}

#[async_trait]
impl AudioCapture for ArecordCapture {
    async fn calibrate(&mut self) -> Result<(), SpeechError> {
        let ambient = self.record(CALIBRATION_SECS).await?;
        self.energy_threshold = calibrated_threshold(rms(&ambient));
        tracing::info!(
            "[Speech] Calibrated energy threshold to {:.0}",
            self.energy_threshold
        );
        Ok(())
    }

    async fn capture(&mut self, max_phrase: Duration) -> Result<AudioClip, SpeechError> {
        let seconds = max_phrase.as_secs_f64().ceil() as u64;
        let samples = self.record(seconds).await?;

        if !contains_speech(&samples, self.energy_threshold) {
            return Err(SpeechError::NoSpeech);
        }
        Ok(AudioClip {
            samples,
            sample_rate: SAMPLE_RATE,
        })
    }
}

/// Root mean square of signed 16-bit big-endian samples.
pub fn rms(samples: &[u8]) -> f64 {
    let values: Vec<f64> = samples
        .chunks_exact(2)
        .map(|pair| f64::from(i16::from_be_bytes([pair[0], pair[1]])))
        .collect();
    if values.is_empty() {
        return 0.0;
    }
    let mean_square = values.iter().map(|v| v * v).sum::<f64>() / values.len() as f64;
    mean_square.sqrt()
}

fn calibrated_threshold(ambient_rms: f64) -> f64 {
    (ambient_rms * THRESHOLD_MULTIPLIER).max(MIN_ENERGY_THRESHOLD)
}

/// True when any 100 ms frame rises above `threshold`.
pub fn contains_speech(samples: &[u8], threshold: f64) -> bool {
    samples
        .chunks(FRAME_BYTES)
        .any(|frame| rms(frame) > threshold)
}

/// Client for Google's speech recognition endpoint.
pub struct GoogleSpeechRecognizer {
    client: Client,
    api_key: String,
}

impl GoogleSpeechRecognizer {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl SpeechRecognizer for GoogleSpeechRecognizer {
    async fn recognize(&self, clip: &AudioClip, language: &str) -> Result<String, SpeechError> {
        let response = self
            .client
            .post(RECOGNIZE_URL)
            .query(&[
                ("client", "chromium"),
                ("lang", language),
                ("key", self.api_key.as_str()),
            ])
            .header(
                reqwest::header::CONTENT_TYPE,
                format!("audio/l16; rate={}", clip.sample_rate),
            )
            .body(clip.samples.clone())
            .send()
            .await
            .map_err(|e| SpeechError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SpeechError::Request(format!("HTTP {status}")));
        }
        let body = response
            .text()
            .await
            .map_err(|e| SpeechError::Request(e.to_string()))?;

        parse_recognition_response(&body).ok_or(SpeechError::Unintelligible)
    }
}

#[derive(Deserialize)]
struct RecognitionLine {
    #[serde(default)]
    result: Vec<RecognitionResult>,
}

#[derive(Deserialize)]
struct RecognitionResult {
    #[serde(default)]
    alternative: Vec<Alternative>,
}

#[derive(Deserialize)]
struct Alternative {
    transcript: Option<String>,
}

/// Extracts the best transcript from the newline-delimited JSON response.
///
/// The service usually emits an empty `{"result":[]}` line first.
pub fn parse_recognition_response(body: &str) -> Option<String> {
    body.lines()
        .filter_map(|line| serde_json::from_str::<RecognitionLine>(line).ok())
        .filter_map(|line| line.result.into_iter().next())
        .filter_map(|result| result.alternative.into_iter().next())
        .filter_map(|alternative| alternative.transcript)
        .map(|text| text.trim().to_string())
        .find(|text| !text.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tone(amplitude: i16, frames: usize) -> Vec<u8> {
        (0..frames)
            .flat_map(|i| {
                let sample = if i % 2 == 0 { amplitude } else { -amplitude };
                sample.to_be_bytes()
            })
            .collect()
    }

    #[test]
    fn test_rms_of_constant_amplitude() {
        assert_eq!(rms(&tone(1000, 160)), 1000.0);
        assert_eq!(rms(&[]), 0.0);
        // a dangling byte is not a sample
        assert_eq!(rms(&[0x7f]), 0.0);
    }

    #[test]
    fn test_calibrated_threshold_has_a_floor() {
        assert_eq!(calibrated_threshold(10.0), MIN_ENERGY_THRESHOLD);
        assert_eq!(calibrated_threshold(1000.0), 1500.0);
    }

    #[test]
    fn test_contains_speech_detects_one_loud_frame() {
        let mut samples = tone(50, 16_000);
        assert!(!contains_speech(&samples, 300.0));

        samples.extend(tone(5000, 1600));
        assert!(contains_speech(&samples, 300.0));
    }

    #[test]
    fn test_parse_recognition_response_skips_empty_result_line() {
        let body = concat!(
            "{\"result\":[]}\n",
            "{\"result\":[{\"alternative\":[{\"transcript\":\"what time is it\",\"confidence\":0.92},",
            "{\"transcript\":\"what time is at\"}],\"final\":true}],\"result_index\":0}\n"
        );
        assert_eq!(
            parse_recognition_response(body).as_deref(),
            Some("what time is it")
        );
    }

    #[test]
    fn test_parse_recognition_response_without_transcript() {
        assert_eq!(parse_recognition_response("{\"result\":[]}\n"), None);
        assert_eq!(parse_recognition_response(""), None);
        assert_eq!(parse_recognition_response("not json"), None);
    }

    #[test]
    fn test_clip_duration() {
        let clip = AudioClip {
            samples: tone(1, 8_000),
            sample_rate: SAMPLE_RATE,
        };
        assert_eq!(clip.duration(), Duration::from_millis(500));
    }
}
