//! # Dispatcher Module
//!
//! The dispatcher module holds everything that runs once a request has been
//! resolved: the request/response types, the per-call [`Context`], the
//! [`Handler`] trait for terminal handlers, and the execution chain that
//! threads a request through middleware to its terminal handler.
//!
//! ## Request Flow
//!
//! 1. `Router::dispatch` extracts the method and path ([`request_path`])
//! 2. The resolver returns a cached or freshly composed [`ExecutionChain`]
//! 3. The chain runs link 0 with a [`Next`] bound to link 1
//! 4. Each middleware either runs `next` or answers on its own
//! 5. The terminal handler produces the response, which unwinds back
//!    through every middleware that deferred to it
//!
//! ## Handler Example
//!
//! ```rust
//! use chainrouter::dispatcher::{Context, HandlerRequest, HandlerResponse, HandlerResult};
//! use http::StatusCode;
//!
//! async fn get_contact(_req: HandlerRequest, ctx: Context) -> HandlerResult {
//!     let name = ctx.param("name").unwrap_or("stranger");
//!     Ok(HandlerResponse::text(StatusCode::OK, format!("Contact: {name}")))
//! }
//! ```
//!
//! ## Error Handling
//!
//! - Handler errors propagate to the dispatch caller unmodified
//! - Running a `Next` twice yields `DispatchError::NextCalledTwice`
//! - Unmatched requests are ordinary 404/405 responses, not errors

mod chain;
mod core;
mod path;

pub use chain::{compose, AllowedMethods, ExecutionChain, MatchKind, Next};
pub use core::{
    Context, Handler, HandlerFuture, HandlerRequest, HandlerResponse, HandlerResult, HeaderVec,
    MAX_INLINE_HEADERS,
};
pub use path::{extract_path, request_path};
