use serde_json::Value;

use crate::{
    error::{Result, VoiceCloneError},
    language::Language,
};

/// Synthesis parameters that passed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedRequest {
    /// Text to speak
    pub text: String,
    /// Base64-encoded reference clip, not yet decoded
    pub voice_audio: String,
    pub language: Language,
}

/// Validate a loosely-typed synthesis payload
///
/// Takes the payload by value so the (potentially multi-megabyte) base64
/// string is moved out rather than copied. Fields are checked in order:
/// `text`, `voiceAudio`, then `language`.
pub fn validate(mut payload: Value) -> Result<ValidatedRequest> {
    let text = required_string(&mut payload, "text")?;
    let voice_audio = required_string(&mut payload, "voiceAudio")?;

    let language = match payload.get_mut("language").map(Value::take) {
        None | Some(Value::Null) => Language::default(),
        Some(Value::String(code)) => code
            .parse()
            .map_err(|_| VoiceCloneError::UnsupportedLanguage { attempted: code })?,
        Some(other) => {
            return Err(VoiceCloneError::UnsupportedLanguage {
                attempted: other.to_string(),
            });
        }
    };

    Ok(ValidatedRequest {
        text,
        voice_audio,
        language,
    })
}

fn required_string(payload: &mut Value, field: &'static str) -> Result<String> {
    match payload.get_mut(field).map(Value::take) {
        Some(Value::String(value)) if !value.is_empty() => Ok(value),
        _ => Err(VoiceCloneError::MissingField(field)),
    }
}
