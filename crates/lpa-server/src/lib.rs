//! Learning Profile Assessment: HTTP API and command line
//!
//! - [`routes`]: warp filters for the parent-facing API
//! - [`cli`]: the `lpa` command (`serve`, `score`, `render`, `questions`)
//! - [`telemetry`]: tracing subscriber setup

#![warn(unreachable_pub)]

pub mod cli;
pub mod error;
pub mod routes;
pub mod telemetry;

pub use error::{ApiError, ErrorBody};
pub use routes::routes;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
