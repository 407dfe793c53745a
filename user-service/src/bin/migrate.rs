//! Applies the bundled PostgreSQL migrations and exits.

use service_core::observability::init_tracing;
use tracing::Instrument;
use user_service::config::PostgresConfig;
use user_service::db;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let config = PostgresConfig::from_env().map_err(|e| {
        eprintln!("Database config invalid: {}", e);
        std::io::Error::other(format!("Configuration error: {}", e))
    })?;

    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    let otlp_endpoint = std::env::var("OTLP_ENDPOINT").ok();
    let _telemetry = init_tracing("user-service-migrate", &log_level, otlp_endpoint.as_deref())
        .map_err(|e| {
            eprintln!("Failed to initialize telemetry: {}", e);
            std::io::Error::other(format!("Telemetry error: {}", e))
        })?;

    let pool = db::postgres::connect(&config).await.map_err(|e| {
        tracing::error!(error = %e, "Migration init failed");
        std::io::Error::other(format!("Database connection error: {}", e))
    })?;

    tracing::info!("Running database migrations");
    let result = sqlx::migrate!("./migrations")
        .run(&pool)
        .instrument(tracing::info_span!("migrate.up"))
        .await;
    pool.close().await;

    match result {
        Ok(()) => {
            tracing::info!("Migrations applied successfully");
            Ok(())
        }
        Err(e) => {
            tracing::error!(error = %e, "Migration failed");
            Err(std::io::Error::other(format!("Migration failed: {}", e)))
        }
    }
}
