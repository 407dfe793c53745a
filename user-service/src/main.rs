//! User Service entry point.

use service_core::observability::init_tracing;
use tokio::signal;
use user_service::config::UserServiceConfig;
use user_service::services::init_metrics;
use user_service::startup::Application;

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let config = UserServiceConfig::from_env().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        std::io::Error::other(format!("Configuration error: {}", e))
    })?;

    let _telemetry = init_tracing(
        &config.service_name,
        &config.log_level,
        config.otlp_endpoint.as_deref(),
    )
    .map_err(|e| {
        eprintln!("Failed to initialize telemetry: {}", e);
        std::io::Error::other(format!("Telemetry error: {}", e))
    })?;

    init_metrics().map_err(|e| {
        tracing::error!(error = %e, "Failed to initialize metrics");
        std::io::Error::other(format!("Metrics error: {}", e))
    })?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        service_name = %config.service_name,
        http_port = config.common.port,
        db_backend = %config.backend.backend(),
        request_timeout_secs = config.request_timeout.as_secs(),
        "Starting user-service"
    );

    let app = Application::build(config).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to build application");
        std::io::Error::other(format!("Application build error: {}", e))
    })?;

    let shutdown = app.shutdown_token();
    tokio::spawn(async move {
        shutdown_signal().await;
        shutdown.cancel();
    });

    if let Err(e) = app.run_until_stopped().await {
        tracing::error!(error = %e, "Application error");
        return Err(e);
    }

    tracing::info!("Service shutdown complete");
    Ok(())
}
