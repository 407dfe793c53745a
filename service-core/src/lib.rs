//! service-core: Shared infrastructure for the user-facing services.
pub mod config;
pub mod error;
pub mod middleware;
pub mod observability;
