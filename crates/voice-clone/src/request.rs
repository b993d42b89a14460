use std::sync::Arc;

use axum::body::Body;
use serde_json::Value;

use crate::{error::VoiceCloneError, server::Server};

/// Extractor for loosely-typed JSON request bodies
///
/// Field-level checks are left to [`crate::validate`] so that every shape
/// problem is reported through the same error contract.
pub struct ExtractPayload(pub Value);

impl axum::extract::FromRequest<Arc<Server>> for ExtractPayload {
    type Rejection = VoiceCloneError;

    async fn from_request(request: http::Request<Body>, state: &Arc<Server>) -> Result<Self, Self::Rejection> {
        let (parts, body) = request.into_parts();

        if !is_json(parts.headers.get(http::header::CONTENT_TYPE)) {
            return Err(VoiceCloneError::UnsupportedMediaType);
        }

        let limit = state.body_limit();
        let bytes = axum::body::to_bytes(body, limit).await.map_err(|err| {
            if std::error::Error::source(&err).is_some_and(|source| source.is::<http_body_util::LengthLimitError>()) {
                VoiceCloneError::PayloadTooLarge(limit)
            } else {
                VoiceCloneError::InvalidJson(format!("failed to read request body: {err}"))
            }
        })?;

        let payload = serde_json::from_slice::<Value>(&bytes).map_err(|e| VoiceCloneError::InvalidJson(e.to_string()))?;

        Ok(Self(payload))
    }
}

/// Accept `application/json` with optional parameters such as `charset`
fn is_json(content_type: Option<&http::HeaderValue>) -> bool {
    content_type
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .is_some_and(|essence| essence.trim().eq_ignore_ascii_case("application/json"))
}
