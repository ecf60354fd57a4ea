//! Service layer: turns change events into cached staleness reports and
//! serves them over HTTP
//!
//! # Modules
//!
//! - [`pipeline`]: Fetch, decode, look up, evaluate, cache
//! - [`trigger`]: Change-event payload handling
//! - [`presenter`]: Report rendering (json, text, status)
//! - [`routes`]: axum router
//! - [`server`]: Logging setup and process lifecycle

pub mod pipeline;
pub mod presenter;
pub mod routes;
pub mod server;
pub mod trigger;
