//! Startup-time connections to the supported backends.

pub mod mongo;
pub mod postgres;
