use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::language::Language;

pub type Result<T> = std::result::Result<T, VoiceCloneError>;

/// Voice cloning errors with their HTTP status codes
#[derive(Debug, Error)]
pub enum VoiceCloneError {
    /// A required field is absent, empty, or not a string
    #[error("Missing '{0}' field")]
    MissingField(&'static str),

    /// The requested language is not one of the supported codes
    #[error("Unsupported language: {attempted}")]
    UnsupportedLanguage { attempted: String },

    /// The request body is not valid JSON
    #[error("Failed to parse request body: {0}")]
    InvalidJson(String),

    /// `voiceAudio` is not decodable base64 audio
    #[error("Invalid 'voiceAudio' field: {0}")]
    InvalidVoiceAudio(String),

    #[error("Unsupported Content-Type, expected: 'Content-Type: application/json'")]
    UnsupportedMediaType,

    #[error("Request body is too large, limit is {0} bytes")]
    PayloadTooLarge(usize),

    /// The synthesis backend failed; the message wraps the cause
    #[error("Failed to generate speech: {0}")]
    SynthesisFailure(String),

    /// The synthesis backend finished without producing audio
    #[error("Synthesis backend returned empty audio data")]
    EmptyResult,

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Internal server error
    /// If Some(message), the message is safe to show
    /// If None, details stay in the logs
    #[error("Internal server error")]
    InternalError(Option<String>),
}

impl VoiceCloneError {
    /// Get the appropriate HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingField(_)
            | Self::UnsupportedLanguage { .. }
            | Self::InvalidJson(_)
            | Self::InvalidVoiceAudio(_) => StatusCode::BAD_REQUEST,
            Self::UnsupportedMediaType => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Self::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::SynthesisFailure(_) | Self::EmptyResult | Self::ConfigError(_) | Self::InternalError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Get the error type string for the response
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::MissingField(_) => "missing_field",
            Self::UnsupportedLanguage { .. } => "unsupported_language",
            Self::InvalidJson(_) => "invalid_json",
            Self::InvalidVoiceAudio(_) => "invalid_voice_audio",
            Self::UnsupportedMediaType => "unsupported_media_type",
            Self::PayloadTooLarge(_) => "payload_too_large",
            Self::SynthesisFailure(_) => "synthesis_failure",
            Self::EmptyResult => "empty_result",
            Self::ConfigError(_) | Self::InternalError(_) => "internal_error",
        }
    }

    /// Message that is safe to expose to API consumers
    pub fn client_message(&self) -> String {
        match self {
            Self::InternalError(Some(message)) => message.clone(),
            Self::InternalError(None) | Self::ConfigError(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        }
    }
}

/// JSON body shared by every error response
#[derive(Debug, Serialize)]
struct ErrorResponse {
    detail: String,
    r#type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    supported: Option<Vec<&'static str>>,
}

impl IntoResponse for VoiceCloneError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!(error_type = self.error_type(), "{self}");
        } else {
            tracing::warn!(error_type = self.error_type(), "rejected request: {self}");
        }

        let supported = matches!(self, Self::UnsupportedLanguage { .. }).then(Language::supported_codes);

        let body = ErrorResponse {
            detail: self.client_message(),
            r#type: self.error_type(),
            supported,
        };

        (status, Json(body)).into_response()
    }
}
