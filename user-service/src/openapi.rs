use crate::handlers;
use crate::handlers::health::{HealthResponse, ReadinessResponse};
use crate::models::User;
use service_core::error::ErrorResponse;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(title = "User Service API", description = "Read-only access to users"),
    paths(
        handlers::health::health_check,
        handlers::health::readiness_check,
        handlers::users::list_users,
    ),
    components(schemas(User, HealthResponse, ReadinessResponse, ErrorResponse)),
    tags(
        (name = "Users", description = "User listing"),
        (name = "Observability", description = "Service health and monitoring"),
    )
)]
pub struct ApiDoc;
