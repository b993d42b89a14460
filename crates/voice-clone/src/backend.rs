pub mod command;
pub mod remote;

use async_trait::async_trait;

use crate::types::SynthesisJob;

/// A voice-cloning speech synthesizer
///
/// Implementations are opaque: they receive the text, the decoded reference
/// clip and its detected format, and either return WAV bytes or fail. Model
/// loading, retries and GPU scheduling are their own business.
#[async_trait]
pub trait SynthesisBackend: Send + Sync {
    /// Synthesize `job.text` in the voice of `job.reference_audio`
    async fn synthesize(&self, job: SynthesisJob) -> crate::error::Result<Vec<u8>>;

    /// Get the backend name
    fn name(&self) -> &str;
}

/// Last `max_bytes` of `text`, cut on a character boundary
pub(crate) fn excerpt(text: &str, max_bytes: usize) -> &str {
    if text.len() <= max_bytes {
        return text;
    }

    let mut start = text.len() - max_bytes;
    while !text.is_char_boundary(start) {
        start += 1;
    }

    &text[start..]
}
