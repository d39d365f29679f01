//! Resolution observability hook.
//!
//! The resolver reports every decision it makes to a [`RouteObserver`].
//! The default [`NoopObserver`] discards them; [`TracingObserver`] turns
//! them into `tracing` events at `debug` level under the
//! `chainrouter::resolve` target.

use http::Method;
use tracing::debug;

use super::pattern::ParamMap;
use crate::dispatcher::MatchKind;

/// Receives resolver events
///
/// All methods default to doing nothing, so implementors only override
/// what they care about. Called synchronously on the dispatch path.
pub trait RouteObserver: Send + Sync + 'static {
    /// A cached chain was returned
    fn cache_hit(&self, _method: &Method, _path: &str) {}

    /// The static index answered
    fn static_match(&self, _method: &Method, _path: &str, _template: &str) {}

    /// A dynamic route matched with the given captures
    fn dynamic_match(&self, _method: &Method, _path: &str, _template: &str, _params: &ParamMap) {
    }

    /// No route matched; `kind` is `NotFound` or `MethodNotAllowed`
    fn fallback(&self, _method: &Method, _path: &str, _kind: MatchKind) {}
}

/// Observer that ignores every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl RouteObserver for NoopObserver {}

/// Observer that logs every event through `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl RouteObserver for TracingObserver {
    fn cache_hit(&self, method: &Method, path: &str) {
        debug!(target: "chainrouter::resolve", %method, path, "cache hit");
    }

    fn static_match(&self, method: &Method, path: &str, template: &str) {
        debug!(target: "chainrouter::resolve", %method, path, template, "static match");
    }

    fn dynamic_match(&self, method: &Method, path: &str, template: &str, params: &ParamMap) {
        debug!(
            target: "chainrouter::resolve",
            %method,
            path,
            template,
            params = ?params.to_hash_map(),
            "dynamic match"
        );
    }

    fn fallback(&self, method: &Method, path: &str, kind: MatchKind) {
        debug!(target: "chainrouter::resolve", %method, path, ?kind, "no route matched");
    }
}
