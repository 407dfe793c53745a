//! Process-wide logging and OpenTelemetry tracing setup.
//!
//! `init_tracing` installs the global subscriber once; the returned
//! [`TelemetryGuard`] flushes and shuts down the tracer provider when dropped.

use opentelemetry::KeyValue;
use opentelemetry::trace::TraceError;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::propagation::TraceContextPropagator;
use opentelemetry_sdk::{Resource, runtime, trace as sdktrace};
use thiserror::Error;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("failed to initialize OTLP tracer: {0}")]
    Exporter(#[from] TraceError),

    #[error("failed to install tracing subscriber: {0}")]
    Subscriber(#[from] TryInitError),
}

/// Keeps the tracer provider alive; dropping it flushes pending spans.
#[must_use = "dropping the guard shuts telemetry down immediately"]
#[derive(Debug)]
pub struct TelemetryGuard {
    otlp_enabled: bool,
}

impl TelemetryGuard {
    pub fn otlp_enabled(&self) -> bool {
        self.otlp_enabled
    }
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        if self.otlp_enabled {
            opentelemetry::global::shutdown_tracer_provider();
        }
    }
}

pub fn init_tracing(
    service_name: &str,
    log_level: &str,
    otlp_endpoint: Option<&str>,
) -> Result<TelemetryGuard, TelemetryError> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

    let tracer = match otlp_endpoint {
        Some(endpoint) => {
            opentelemetry::global::set_text_map_propagator(TraceContextPropagator::new());

            let otlp_exporter = opentelemetry_otlp::new_exporter()
                .tonic()
                .with_endpoint(endpoint);

            let tracer = opentelemetry_otlp::new_pipeline()
                .tracing()
                .with_exporter(otlp_exporter)
                .with_trace_config(sdktrace::config().with_resource(Resource::new(vec![
                    KeyValue::new("service.name", service_name.to_string()),
                ])))
                .install_batch(runtime::Tokio)?;
            Some(tracer)
        }
        None => None,
    };
    let otlp_enabled = tracer.is_some();
    let telemetry = tracer.map(|tracer| tracing_opentelemetry::layer().with_tracer(tracer));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(telemetry)
        .with(
            tracing_subscriber::fmt::layer()
                .with_file(true)
                .with_line_number(true)
                .json()
                .flatten_event(true),
        )
        .try_init()?;

    tracing::info!(
        service = service_name,
        otlp_enabled = otlp_enabled,
        "Telemetry initialized"
    );

    Ok(TelemetryGuard { otlp_enabled })
}
