pub mod logging;

pub use logging::{TelemetryError, TelemetryGuard, init_tracing};
