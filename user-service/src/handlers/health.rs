use crate::startup::AppState;
use axum::{extract::State, Json};
use serde::Serialize;
use service_core::error::{AppError, ErrorResponse};
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReadinessResponse {
    pub status: String,
    pub backend: String,
}

/// Liveness probe. Never touches the backend.
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up", body = HealthResponse)),
    tag = "Observability"
)]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// Readiness probe: 200 only while the selected backend answers a ping.
#[utoipa::path(
    get,
    path = "/ready",
    responses(
        (status = 200, description = "Backend reachable", body = ReadinessResponse),
        (status = 503, description = "Backend unreachable", body = ErrorResponse)
    ),
    tag = "Observability"
)]
pub async fn readiness_check(
    State(state): State<AppState>,
) -> Result<Json<ReadinessResponse>, AppError> {
    let backend = state.users.backend();
    let ctx = state.request_context();

    let result = match ctx.run(state.users.ping()).await {
        Ok(pinged) => pinged,
        Err(interrupted) => Err(interrupted.into()),
    };

    match result {
        Ok(()) => Ok(Json(ReadinessResponse {
            status: "ready".to_string(),
            backend: backend.to_string(),
        })),
        Err(e) => {
            tracing::warn!(error = %e, backend = %backend, "Readiness check failed");
            Err(AppError::ServiceUnavailable)
        }
    }
}
