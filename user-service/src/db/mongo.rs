use crate::config::MongoConfig;
use mongodb::bson::doc;
use mongodb::options::ClientOptions;
use mongodb::Client;
use secrecy::ExposeSecret;
use service_core::error::AppError;
use std::time::Duration;
use tracing::{info, instrument};

const SERVER_SELECTION_TIMEOUT: Duration = Duration::from_secs(5);
const PING_TIMEOUT: Duration = Duration::from_secs(5);

/// Connects the client and pings the primary. The client is shut down again
/// if the ping does not succeed within [`PING_TIMEOUT`].
#[instrument(skip(config), fields(service = "user-service"))]
pub async fn connect(config: &MongoConfig) -> Result<Client, AppError> {
    info!(uri = %config.masked_uri(), database = %config.database, "Connecting to MongoDB");

    let mut options = ClientOptions::parse(config.uri.expose_secret())
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Invalid MongoDB URI: {}", e)))?;
    options.server_selection_timeout = Some(SERVER_SELECTION_TIMEOUT);
    options.app_name.get_or_insert_with(|| "user-service".to_string());

    let client = Client::with_options(options)
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to connect: {}", e)))?;

    let admin = client.database("admin");
    let ping = admin.run_command(doc! { "ping": 1 }, None);
    let failure = match tokio::time::timeout(PING_TIMEOUT, ping).await {
        Ok(Ok(_)) => None,
        Ok(Err(e)) => Some(format!("Ping failed: {}", e)),
        Err(_) => Some(format!("Ping timed out after {:?}", PING_TIMEOUT)),
    };
    if let Some(reason) = failure {
        client.shutdown().await;
        return Err(AppError::DatabaseError(anyhow::anyhow!(reason)));
    }

    info!(database = %config.database, "Successfully connected to MongoDB");
    Ok(client)
}
