//! Application startup and lifecycle management.

use crate::config::{BackendConfig, UserServiceConfig};
use crate::context::RequestContext;
use crate::db;
use crate::handlers;
use crate::openapi::ApiDoc;
use crate::repository::{MongoUserRepository, PostgresUserRepository, UserRepository};
use axum::{middleware, routing::get, Router};
use service_core::error::AppError;
use service_core::middleware::metrics::metrics_middleware;
use service_core::middleware::tracing::{http_trace_layer, request_id_middleware};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

const SERVICE_NAME: &str = "user-service";

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub request_timeout: Duration,
    shutdown: CancellationToken,
}

impl AppState {
    pub fn new(
        users: Arc<dyn UserRepository>,
        request_timeout: Duration,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            users,
            request_timeout,
            shutdown,
        }
    }

    /// Context for one request: bounded by the request timeout and cancelled
    /// when the server begins shutting down.
    pub fn request_context(&self) -> RequestContext {
        RequestContext::new(self.shutdown.child_token()).with_timeout(self.request_timeout)
    }
}

/// Connects the backend named by `config` and wraps it in its adapter.
///
/// This is the only place a concrete adapter type is named; everything
/// downstream sees `dyn UserRepository`.
pub async fn connect_repository(config: &BackendConfig) -> Result<Arc<dyn UserRepository>, AppError> {
    let repository: Arc<dyn UserRepository> = match config {
        BackendConfig::Postgres(pg) => {
            let pool = db::postgres::connect(pg).await?;
            Arc::new(PostgresUserRepository::new(pool))
        }
        BackendConfig::Mongo(mongo) => {
            let client = db::mongo::connect(mongo).await?;
            Arc::new(MongoUserRepository::new(
                client,
                &mongo.database,
                &mongo.collection,
            ))
        }
    };

    tracing::info!(backend = %repository.backend(), "User repository ready");
    Ok(repository)
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/users", get(handlers::list_users))
        .route("/metrics", get(handlers::metrics_handler))
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(state)
        .layer(middleware::from_fn(metrics_middleware))
        .layer(http_trace_layer(SERVICE_NAME))
        .layer(middleware::from_fn(request_id_middleware))
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    state: AppState,
}

impl Application {
    /// Connect the configured backend and bind the HTTP listener.
    pub async fn build(config: UserServiceConfig) -> Result<Self, AppError> {
        let users = connect_repository(&config.backend).await.map_err(|e| {
            tracing::error!(error = %e, backend = %config.backend.backend(), "Failed to connect backend");
            e
        })?;

        match Self::with_repository(&config, users.clone()).await {
            Ok(app) => Ok(app),
            Err(e) => {
                users.close().await;
                Err(e)
            }
        }
    }

    /// Bind the HTTP listener around an already-constructed repository.
    pub async fn with_repository(
        config: &UserServiceConfig,
        users: Arc<dyn UserRepository>,
    ) -> Result<Self, AppError> {
        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!(error = %e, addr = %addr, "Failed to bind HTTP listener");
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!(port = port, backend = %users.backend(), "User service listener bound");

        Ok(Self {
            port,
            listener,
            state: AppState::new(users, config.request_timeout, CancellationToken::new()),
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Token that stops the server when cancelled. In-flight backend calls
    /// observe the same token and abort.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.state.shutdown.clone()
    }

    /// Serve until the shutdown token is cancelled, then close the repository.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        let shutdown = self.state.shutdown.clone();
        let users = self.state.users.clone();
        let router = build_router(self.state);

        let result = axum::serve(self.listener, router)
            .with_graceful_shutdown(async move { shutdown.cancelled().await })
            .await;

        users.close().await;
        result
    }
}
