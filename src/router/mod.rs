//! # Router Module
//!
//! The router module owns registration and resolution: it classifies
//! registered templates, matches request paths against them, and turns each
//! `(method, path)` into a cached [`ExecutionChain`](crate::dispatcher::ExecutionChain).
//!
//! ## Overview
//!
//! The router is responsible for:
//! - Compiling path templates into [`Pattern`]s
//! - Indexing routes as static (exact string) or dynamic (pattern)
//! - Selecting the middleware whose template matches a path
//! - Falling back to "not found" / "method not allowed" handlers
//! - Caching resolutions per `(method, path)` in a bounded LRU
//!
//! ## Resolution Order
//!
//! 1. **Cache**: a previously composed chain is returned as-is
//! 2. **Middleware**: every entry whose template matches, in registration order
//! 3. **Static index**: exact match on the method's static routes
//! 4. **Dynamic list**: first matching pattern, most specific template first
//! 5. **Fallback**: 405 when the method has no dynamic routes at all,
//!    404 otherwise
//!
//! ## Example
//!
//! ```rust
//! use chainrouter::dispatcher::{Context, HandlerRequest, HandlerResponse, HandlerResult, MatchKind};
//! use chainrouter::router::Router;
//! use http::{Method, StatusCode};
//!
//! async fn ok(_req: HandlerRequest, _ctx: Context) -> HandlerResult {
//!     Ok(HandlerResponse::text(StatusCode::OK, "ok"))
//! }
//!
//! # fn main() -> Result<(), chainrouter::error::RouterError> {
//! let mut router: Router = Router::new();
//! router.get("/about", ok)?.get("/users/:id", ok)?;
//!
//! assert_eq!(router.resolve(&Method::GET, "/about").kind(), MatchKind::Static);
//! assert_eq!(router.resolve(&Method::GET, "/users/7").kind(), MatchKind::Dynamic);
//! assert_eq!(router.resolve(&Method::GET, "/nope").kind(), MatchKind::NotFound);
//! assert_eq!(router.resolve(&Method::POST, "/about").kind(), MatchKind::MethodNotAllowed);
//! # Ok(())
//! # }
//! ```

mod core;
mod observer;
mod pattern;
mod table;
#[cfg(test)]
mod tests;

pub use core::{DispatchFn, Router};
pub use observer::{NoopObserver, RouteObserver, TracingObserver};
pub use pattern::{is_dynamic, ParamMap, ParamVec, Pattern, SegmentKind, MAX_INLINE_PARAMS};
pub use table::{Route, RouteKind, RouteTable};
