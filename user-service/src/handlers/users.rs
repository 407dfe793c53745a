use crate::models::User;
use crate::startup::AppState;
use axum::{extract::State, Json};
use service_core::error::{AppError, ErrorResponse};

/// Lists up to ten users ordered by ascending id.
#[utoipa::path(
    get,
    path = "/users",
    responses(
        (status = 200, description = "Users ordered by id", body = [User]),
        (status = 500, description = "Backend failure", body = ErrorResponse)
    ),
    tag = "Users"
)]
pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<User>>, AppError> {
    let ctx = state.request_context();

    let users = state.users.list(&ctx).await.map_err(|e| {
        tracing::error!(error = %e, backend = %state.users.backend(), "Failed to list users");
        AppError::DatabaseError(anyhow::Error::new(e))
    })?;

    tracing::info!(count = users.len(), "Listed users");
    Ok(Json(users))
}
