use axum::http::StatusCode;
use md5::{Digest, Md5};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// A submission as accepted from a client, after validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRequest {
    pub text: String,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RequestValidationError {
    #[error("request must be a JSON object")]
    NotAnObject,
    #[error("text is a required field")]
    MissingText,
    #[error("text must be a string")]
    TextNotString,
}

impl MessageRequest {
    /// Validates an arbitrary JSON value as a submission.
    ///
    /// Only `text` is kept; every other field is dropped. The text is trimmed and
    /// must not be empty afterwards.
    ///
    /// # Errors
    /// Returns a `RequestValidationError` describing the first problem found.
    pub fn validate(value: &Value) -> Result<Self, RequestValidationError> {
        let object = value.as_object().ok_or(RequestValidationError::NotAnObject)?;

        let text = match object.get("text") {
            None | Some(Value::Null) => return Err(RequestValidationError::MissingText),
            Some(Value::String(s)) => s.trim_matches(is_trimmed_whitespace),
            Some(_) => return Err(RequestValidationError::TextNotString),
        };

        if text.is_empty() {
            return Err(RequestValidationError::MissingText);
        }

        Ok(Self { text: text.to_string() })
    }

    /// Content-derived identifier. Identical texts share an id.
    #[must_use]
    pub fn message_id(&self) -> String {
        message_id(&self.text)
    }
}

/// Unicode white space plus the byte order mark, excluding NEL.
fn is_trimmed_whitespace(c: char) -> bool {
    (c.is_whitespace() && c != '\u{85}') || c == '\u{FEFF}'
}

/// Lowercase hex MD5 of the text.
#[must_use]
pub fn message_id(text: &str) -> String {
    hex::encode(Md5::digest(text.as_bytes()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum AudioFormat {
    #[default]
    Mp3,
    #[value(name = "ogg_vorbis")]
    OggVorbis,
    Pcm,
}

impl AudioFormat {
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Mp3 => "mp3",
            Self::OggVorbis => "ogg",
            Self::Pcm => "pcm",
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Mp3 => "mp3",
            Self::OggVorbis => "ogg_vorbis",
            Self::Pcm => "pcm",
        }
    }
}

/// The artifact that is stored, queued and returned to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub message_id: String,
    pub text: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_format: Option<AudioFormat>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_data_base64: Option<String>,
}

impl Message {
    #[must_use]
    pub fn json_key(message_id: &str) -> String {
        format!("messages/{message_id}.json")
    }

    #[must_use]
    pub fn audio_key(message_id: &str, format: AudioFormat) -> String {
        format!("messages/{message_id}.{}", format.extension())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorCode {
    ProfanityDetected,
}

/// Result of one intake request. Exactly one variant per request; the JSON form
/// is untagged so clients branch on the fields present.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MessageResponse {
    #[serde(rename_all = "camelCase")]
    Ok { approximate_queue_index: u64, message: Message },
    #[serde(rename_all = "camelCase")]
    BadRequest { error_message: String, request: Value },
    #[serde(rename_all = "camelCase")]
    ProfaneText { error_code: ErrorCode, request: MessageRequest },
}

impl MessageResponse {
    #[must_use]
    pub fn profane(request: MessageRequest) -> Self {
        Self::ProfaneText { error_code: ErrorCode::ProfanityDetected, request }
    }

    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Ok { .. } => StatusCode::OK,
            Self::BadRequest { .. } | Self::ProfaneText { .. } => StatusCode::BAD_REQUEST,
        }
    }

    #[must_use]
    pub const fn outcome(&self) -> &'static str {
        match self {
            Self::Ok { .. } => "accepted",
            Self::BadRequest { .. } => "invalid",
            Self::ProfaneText { .. } => "profane",
        }
    }
}
