#![allow(
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_const_for_fn,
    clippy::module_name_repetitions
)]

mod backend;
mod error;
mod language;
mod request;
mod server;
mod sniff;
mod types;
mod validate;

use std::sync::Arc;

use axum::{Json, Router, extract::State, routing::post};

pub use backend::{SynthesisBackend, command::CommandBackend, remote::RemoteBackend};
pub use error::{Result, VoiceCloneError};
pub use language::Language;
pub use server::{Server, VoiceCloneServerBuilder};
pub use sniff::AudioFormat;
pub use types::{SynthesisJob, SynthesisResult};
pub use validate::{ValidatedRequest, validate};
use request::ExtractPayload;

/// Build the voice-clone server from configuration
pub fn build_server(config: &vibelog_config::Config) -> anyhow::Result<Arc<Server>> {
    let server = Arc::new(
        VoiceCloneServerBuilder::new(config)
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to initialize voice-clone server: {e}"))?,
    );
    Ok(server)
}

/// Create the endpoint router for speech synthesis
pub fn endpoint_router() -> Router<Arc<Server>> {
    Router::new().route("/", post(synthesize))
}

/// Handle speech synthesis requests
async fn synthesize(
    State(server): State<Arc<Server>>,
    ExtractPayload(payload): ExtractPayload,
) -> Result<Json<SynthesisResult>> {
    let request = validate(payload)?;

    tracing::debug!("Speech handler called for language: {}", request.language);

    let result = server.synthesize(request).await?;

    tracing::debug!("Speech synthesis complete");

    Ok(Json(result))
}
