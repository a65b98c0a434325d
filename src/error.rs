use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Failures that abort an intake request. Expected rejections (invalid input,
/// profanity) are response variants, not errors.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Malformed request body: {0}")]
    MalformedBody(#[source] serde_json::Error),
    #[error("Speech synthesis returned no {0}")]
    IncompleteSynthesis(&'static str),
    #[error("Speech synthesis failed: {0}")]
    Synthesis(String),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Queue error: {0}")]
    Queue(String),
    #[error("Notification failed: {0}")]
    Notification(String),
    #[error("Credentials unavailable: {0}")]
    Credentials(String),
    #[error("Internal server error")]
    Internal,
}

pub type Result<T> = std::result::Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            Self::MalformedBody(e) => {
                tracing::warn!(error = %e, "Unparseable request body");
            }
            Self::IncompleteSynthesis(_) => {
                tracing::error!(error = %self, "Speech synthesizer returned incomplete output");
            }
            Self::Synthesis(_)
            | Self::Storage(_)
            | Self::Queue(_)
            | Self::Notification(_)
            | Self::Credentials(_) => {
                tracing::error!(error = %self, "Dependency failure");
            }
            Self::Internal => {
                tracing::error!("Internal server error occurred");
            }
        }

        let body = Json(json!({
            "error": "Internal server error"
        }));

        (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
    }
}
