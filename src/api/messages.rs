use crate::api::AppState;
use crate::error::Result;
use axum::{Json, body::Bytes, extract::State, response::IntoResponse};

/// Accepts a message for the LED wall.
///
/// The body is read as raw bytes so that unparseable JSON is handled by the
/// service rather than rejected by an extractor.
///
/// # Errors
/// Returns an `AppError` (500) when the body is not JSON or a dependency fails.
pub async fn submit_message(State(state): State<AppState>, body: Bytes) -> Result<impl IntoResponse> {
    let response = state.message_service.submit(&body).await?;
    Ok((response.status_code(), Json(response)))
}
