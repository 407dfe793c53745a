use crate::config::PostgresConfig;
use secrecy::ExposeSecret;
use service_core::error::AppError;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::{info, instrument};

/// Opens the connection pool and verifies it with a round trip.
#[instrument(skip(config), fields(service = "user-service"))]
pub async fn connect(config: &PostgresConfig) -> Result<PgPool, AppError> {
    info!(
        dsn = %config.masked_url(),
        max_connections = config.max_connections,
        min_connections = config.min_connections,
        "Connecting to PostgreSQL"
    );

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(30))
        .idle_timeout(Duration::from_secs(600))
        .connect(config.url.expose_secret())
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to connect: {}", e)))?;

    if let Err(e) = sqlx::query("SELECT 1").execute(&pool).await {
        pool.close().await;
        return Err(AppError::DatabaseError(anyhow::anyhow!("Ping failed: {}", e)));
    }

    info!("PostgreSQL connection pool established");
    Ok(pool)
}
