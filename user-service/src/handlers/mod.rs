pub mod health;
pub mod metrics;
pub mod users;

pub use health::{health_check, readiness_check};
pub use metrics::metrics_handler;
pub use users::list_users;
