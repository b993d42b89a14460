use serde::{Deserialize, Serialize};

use crate::{language::Language, sniff::AudioFormat};

/// Everything a synthesis backend needs for one call
#[derive(Debug, Clone)]
pub struct SynthesisJob {
    /// Text to speak
    pub text: String,
    /// Decoded reference clip whose voice is cloned
    pub reference_audio: Vec<u8>,
    pub language: Language,
    /// Detected container of `reference_audio`, used as the file suffix hint
    pub format: AudioFormat,
}

/// Successful synthesis response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SynthesisResult {
    /// Generated WAV audio, base64-encoded
    pub audio_base64: String,
    /// Seconds spent in the backend, rounded to two decimals
    pub duration: f64,
    pub language: String,
    /// Length of the input text in characters
    pub text_length: usize,
}
