//! # Middleware Module
//!
//! Middleware run in front of a route's terminal handler. They are registered
//! under a path template (`Router::use_middleware("/api/*", mw)`) and selected
//! per request by testing each template against the request path.
//!
//! A middleware sees the request and a [`Next`](crate::dispatcher::Next)
//! continuation. It can:
//!
//! - rewrite the request or stash values in its extensions, then run `next`
//! - inspect or decorate the response returned by `next`
//! - answer on its own without running `next` (short-circuit)
//!
//! ## Built-in Middleware
//!
//! - [`AuthMiddleware`] - bearer-style token check, 401 on mismatch
//! - [`MetricsMiddleware`] - request counts, latency, error responses
//! - [`TracingMiddleware`] - per-request `tracing` span

mod auth;
mod core;
mod metrics;
mod table;
mod tracing;

pub use auth::AuthMiddleware;
pub use core::Middleware;
pub use metrics::MetricsMiddleware;
pub use table::{MiddlewareEntry, MiddlewareTable};
pub use tracing::TracingMiddleware;
