use crate::api::MgmtState;
use crate::api::schemas::health::HealthResponse;
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};

/// Liveness probe: returns 200 OK as long as the server is running.
pub async fn livez() -> impl IntoResponse {
    StatusCode::OK
}

/// Readiness probe: checks the website bucket and the message queue.
pub async fn readyz(State(state): State<MgmtState>) -> impl IntoResponse {
    let (storage_res, queue_res) =
        tokio::join!(state.health_service.check_storage(), state.health_service.check_queue());

    let mut status_code = StatusCode::OK;
    let storage_status = if let Err(e) = storage_res {
        tracing::warn!(error = %e, component = "storage", "Readiness probe failed");
        status_code = StatusCode::SERVICE_UNAVAILABLE;
        "error"
    } else {
        "ok"
    };

    let queue_status = if let Err(e) = queue_res {
        tracing::warn!(error = %e, component = "queue", "Readiness probe failed");
        status_code = StatusCode::SERVICE_UNAVAILABLE;
        "error"
    } else {
        "ok"
    };

    let response = HealthResponse {
        status: if status_code == StatusCode::OK { "ok" } else { "error" }.to_string(),
        storage: storage_status.to_string(),
        queue: queue_status.to_string(),
    };

    (status_code, Json(response))
}
