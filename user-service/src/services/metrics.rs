//! Metrics collection and Prometheus export.
//!
//! Installs the global recorder and renders it for the /metrics endpoint.

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use service_core::error::AppError;
use std::sync::OnceLock;

/// Outcome of the one-time recorder installation. A failed install is kept so
/// every later caller sees the same error.
static METRICS_HANDLE: OnceLock<Result<PrometheusHandle, String>> = OnceLock::new();

fn install() -> Result<PrometheusHandle, String> {
    let recorder = PrometheusBuilder::new().build_recorder();
    let handle = recorder.handle();
    metrics::set_global_recorder(recorder)
        .map_err(|e| format!("failed to install Prometheus recorder: {}", e))?;
    Ok(handle)
}

/// Install the Prometheus recorder. Safe to call more than once and from
/// concurrent tasks; only the first call installs.
pub fn init_metrics() -> Result<(), AppError> {
    match METRICS_HANDLE.get_or_init(install) {
        Ok(_) => Ok(()),
        Err(e) => Err(AppError::InternalError(anyhow::anyhow!("{}", e))),
    }
}

/// Current metrics in Prometheus text format.
pub fn get_metrics() -> String {
    match METRICS_HANDLE.get() {
        Some(Ok(handle)) => handle.render(),
        _ => "# Metrics recorder not initialized".to_string(),
    }
}
