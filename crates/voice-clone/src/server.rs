use std::time::Instant;

use base64::{
    Engine,
    alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig, general_purpose::STANDARD},
};
use vibelog_config::BackendConfig;
use vibelog_telemetry::metrics::{OUTCOME_FAILURE, OUTCOME_SUCCESS, SynthesisMetrics};

use crate::{
    backend::{SynthesisBackend, command::CommandBackend, remote::RemoteBackend},
    error::VoiceCloneError,
    sniff::AudioFormat,
    types::{SynthesisJob, SynthesisResult},
    validate::ValidatedRequest,
};

/// Standard alphabet, padding optional
const LENIENT_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Voice-clone server that hands validated requests to the configured backend
pub struct Server {
    backend: Box<dyn SynthesisBackend>,
    metrics: SynthesisMetrics,
    body_limit: usize,
}

impl Server {
    /// Create a server around an already-constructed backend
    pub fn new(backend: Box<dyn SynthesisBackend>, body_limit: usize) -> Self {
        Self {
            backend,
            metrics: SynthesisMetrics::new(),
            body_limit,
        }
    }

    /// Maximum accepted request body size in bytes
    pub fn body_limit(&self) -> usize {
        self.body_limit
    }

    /// Clone the voice in `request.voice_audio` and speak `request.text`
    ///
    /// Decodes the reference clip, sniffs its container, and times the
    /// backend call; the reported duration covers the backend only.
    pub async fn synthesize(&self, request: ValidatedRequest) -> crate::error::Result<SynthesisResult> {
        let ValidatedRequest {
            text,
            voice_audio,
            language,
        } = request;

        let reference_audio = decode_voice_audio(&voice_audio)?;
        drop(voice_audio);

        let format = AudioFormat::sniff(&reference_audio);
        let text_length = text.chars().count();

        tracing::info!(
            backend = self.backend.name(),
            language = language.as_str(),
            text_length,
            reference_bytes = reference_audio.len(),
            "Generating speech"
        );
        tracing::debug!(format = format.as_str(), "Detected reference audio format");

        let job = SynthesisJob {
            text,
            reference_audio,
            language,
            format,
        };

        let started = Instant::now();
        let outcome = self.backend.synthesize(job).await;
        let elapsed = started.elapsed();

        let audio = match outcome {
            Ok(audio) if !audio.is_empty() => audio,
            Ok(_) => {
                self.record(language.as_str(), OUTCOME_FAILURE, elapsed);
                return Err(VoiceCloneError::EmptyResult);
            }
            Err(e) => {
                self.record(language.as_str(), OUTCOME_FAILURE, elapsed);
                return Err(e);
            }
        };

        self.record(language.as_str(), OUTCOME_SUCCESS, elapsed);

        tracing::info!(
            output_bytes = audio.len(),
            elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
            "Speech generated"
        );

        Ok(SynthesisResult {
            audio_base64: STANDARD.encode(&audio),
            duration: round_to_hundredths(elapsed.as_secs_f64()),
            language: language.to_string(),
            text_length,
        })
    }

    fn record(&self, language: &str, outcome: &'static str, elapsed: std::time::Duration) {
        self.metrics.record(self.backend.name(), language, outcome, elapsed);
    }
}

/// Decode the base64 reference clip, ignoring embedded whitespace
fn decode_voice_audio(encoded: &str) -> crate::error::Result<Vec<u8>> {
    let compact: String = encoded.chars().filter(|c| !c.is_ascii_whitespace()).collect();

    let bytes = LENIENT_BASE64
        .decode(compact.as_bytes())
        .map_err(|e| VoiceCloneError::InvalidVoiceAudio(format!("not valid base64: {e}")))?;

    if bytes.is_empty() {
        return Err(VoiceCloneError::InvalidVoiceAudio("decoded audio is empty".to_string()));
    }

    Ok(bytes)
}

fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Builder for constructing the voice-clone server from configuration
pub struct VoiceCloneServerBuilder<'a> {
    config: &'a vibelog_config::Config,
}

impl<'a> VoiceCloneServerBuilder<'a> {
    pub const fn new(config: &'a vibelog_config::Config) -> Self {
        Self { config }
    }

    pub fn build(self) -> crate::error::Result<Server> {
        let synthesis = &self.config.synthesis;
        let timeout = synthesis
            .timeout_duration()
            .map_err(|e| VoiceCloneError::ConfigError(e.to_string()))?;

        let backend: Box<dyn SynthesisBackend> = match &synthesis.backend {
            BackendConfig::Command(command) => {
                tracing::debug!(program = %command.program, "Initializing command synthesis backend");

                Box::new(CommandBackend::new(
                    "command".to_string(),
                    command,
                    timeout,
                    synthesis.temp_dir.clone(),
                ))
            }
            BackendConfig::Remote(remote) => {
                tracing::debug!(url = %remote.url, "Initializing remote synthesis backend");

                Box::new(RemoteBackend::new(
                    "remote".to_string(),
                    remote.url.clone(),
                    remote.api_key.clone(),
                    timeout,
                )?)
            }
        };

        tracing::debug!(
            backend = backend.name(),
            timeout_secs = timeout.as_secs(),
            "Voice-clone server initialized"
        );

        Ok(Server::new(backend, self.config.server.body_limit))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    use async_trait::async_trait;

    use super::*;
    use crate::language::Language;

    /// Backend that records the job it receives and returns canned audio
    struct FakeBackend {
        audio: Vec<u8>,
        calls: Arc<AtomicUsize>,
        seen_format: Arc<std::sync::Mutex<Option<AudioFormat>>>,
    }

    #[async_trait]
    impl SynthesisBackend for FakeBackend {
        async fn synthesize(&self, job: SynthesisJob) -> crate::error::Result<Vec<u8>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.seen_format.lock().unwrap() = Some(job.format);
            Ok(self.audio.clone())
        }

        fn name(&self) -> &str {
            "fake"
        }
    }

    fn server(audio: &[u8]) -> (Server, Arc<AtomicUsize>, Arc<std::sync::Mutex<Option<AudioFormat>>>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen_format = Arc::new(std::sync::Mutex::new(None));
        let backend = FakeBackend {
            audio: audio.to_vec(),
            calls: Arc::clone(&calls),
            seen_format: Arc::clone(&seen_format),
        };
        (Server::new(Box::new(backend), 1024), calls, seen_format)
    }

    fn request(voice_audio: &str) -> ValidatedRequest {
        ValidatedRequest {
            text: "Grüß Gott".to_string(),
            voice_audio: voice_audio.to_string(),
            language: Language::De,
        }
    }

    #[tokio::test]
    async fn successful_synthesis_builds_result() {
        let (server, calls, seen_format) = server(b"RIFFoutput");

        let result = server.synthesize(request(&STANDARD.encode(b"RIFF1234WAVE"))).await.unwrap();

        assert_eq!(STANDARD.decode(&result.audio_base64).unwrap(), b"RIFFoutput");
        assert_eq!(result.language, "de");
        assert_eq!(result.text_length, 9);
        assert!(result.duration >= 0.0);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(*seen_format.lock().unwrap(), Some(AudioFormat::Wav));
    }

    #[tokio::test]
    async fn sniffed_format_reaches_backend() {
        let (server, _, seen_format) = server(b"RIFFoutput");

        server
            .synthesize(request(&STANDARD.encode([0x1A, 0x45, 0xDF, 0xA3, 0x01])))
            .await
            .unwrap();

        assert_eq!(*seen_format.lock().unwrap(), Some(AudioFormat::Webm));
    }

    #[tokio::test]
    async fn empty_backend_output_is_empty_result() {
        let (server, _, _) = server(b"");

        let err = server.synthesize(request("UklGRg==")).await.unwrap_err();
        assert!(matches!(err, VoiceCloneError::EmptyResult));
    }

    #[tokio::test]
    async fn invalid_base64_never_reaches_backend() {
        let (server, calls, _) = server(b"RIFF");

        let err = server.synthesize(request("not base64 at all!")).await.unwrap_err();

        assert!(matches!(err, VoiceCloneError::InvalidVoiceAudio(_)));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn decoding_tolerates_missing_padding_and_whitespace() {
        assert_eq!(decode_voice_audio("UklGRg").unwrap(), b"RIFF");
        assert_eq!(decode_voice_audio("UklG\nRg==\n").unwrap(), b"RIFF");
    }

    #[test]
    fn decoding_rejects_empty_audio() {
        assert!(matches!(
            decode_voice_audio("  \n"),
            Err(VoiceCloneError::InvalidVoiceAudio(_))
        ));
    }

    #[test]
    fn durations_round_to_two_decimals() {
        assert!((round_to_hundredths(1.23456) - 1.23).abs() < f64::EPSILON);
        assert!((round_to_hundredths(0.005) - 0.01).abs() < f64::EPSILON);
        assert!((round_to_hundredths(2.0) - 2.0).abs() < f64::EPSILON);
    }
}
