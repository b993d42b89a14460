use std::time::Duration;

use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::STANDARD};
use reqwest::{Client, Url};
use secrecy::{ExposeSecret, SecretString};

use crate::{error::VoiceCloneError, types::SynthesisJob};

use super::{SynthesisBackend, excerpt};

/// Longest worker error body carried into an error message
const ERROR_BODY_EXCERPT_BYTES: usize = 2048;

/// Synthesis worker reached over HTTP
///
/// Sends the job as JSON and treats the response body as the generated
/// audio. Used when the GPU lives on another host.
pub struct RemoteBackend {
    client: Client,
    url: Url,
    api_key: Option<SecretString>,
    name: String,
}

impl RemoteBackend {
    pub fn new(name: String, url: Url, api_key: Option<SecretString>, timeout: Duration) -> crate::error::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .pool_idle_timeout(Some(Duration::from_secs(90)))
            .tcp_nodelay(true)
            .build()
            .map_err(|e| VoiceCloneError::ConfigError(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            url,
            api_key,
            name,
        })
    }
}

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct RemoteJob<'a> {
    text: &'a str,
    speaker_wav: String,
    language: &'a str,
    format: &'a str,
    mime_type: &'a str,
}

#[async_trait]
impl SynthesisBackend for RemoteBackend {
    async fn synthesize(&self, job: SynthesisJob) -> crate::error::Result<Vec<u8>> {
        tracing::debug!(
            url = %self.url,
            language = job.language.as_str(),
            reference_bytes = job.reference_audio.len(),
            "Remote synthesis request"
        );

        let body = RemoteJob {
            text: &job.text,
            speaker_wav: STANDARD.encode(&job.reference_audio),
            language: job.language.as_str(),
            format: job.format.as_str(),
            mime_type: job.format.mime_type(),
        };

        let mut request = self.client.post(self.url.clone()).json(&body);
        if let Some(ref api_key) = self.api_key {
            request = request.bearer_auth(api_key.expose_secret());
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                VoiceCloneError::SynthesisFailure(format!("remote backend timed out: {e}"))
            } else {
                VoiceCloneError::SynthesisFailure(format!("failed to reach remote backend: {e}"))
            }
        })?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            return Err(VoiceCloneError::SynthesisFailure(format!(
                "remote backend returned {status}: {}",
                excerpt(error_text.trim(), ERROR_BODY_EXCERPT_BYTES)
            )));
        }

        let audio = response
            .bytes()
            .await
            .map_err(|e| VoiceCloneError::SynthesisFailure(format!("failed to read remote audio: {e}")))?;

        tracing::debug!("Remote synthesis complete, {} bytes", audio.len());

        Ok(audio.to_vec())
    }

    fn name(&self) -> &str {
        &self.name
    }
}
