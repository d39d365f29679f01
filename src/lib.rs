//! # chainrouter
//!
//! **chainrouter** is an HTTP request router with path-scoped middleware
//! chains. Handlers and middleware are registered against path templates;
//! each incoming `(method, path)` is resolved once into a ready-to-run
//! execution chain, cached, and run through a `next()` continuation
//! protocol.
//!
//! ## Architecture
//!
//! The library is organized into several key modules:
//!
//! - **[`router`]** - Path templates, the route table, resolution and the resolution cache
//! - **[`middleware`]** - The middleware trait, the middleware table and built-in middleware
//! - **[`dispatcher`]** - Request/response types, execution chains and `Next`
//! - **[`runtime_config`]** - Environment-driven router configuration
//! - **[`logging`]** - `tracing-subscriber` setup
//! - **[`error`]** - Registration and dispatch errors
//! - **[`ids`]** - Per-dispatch request ids
//!
//! ### Request Handling Flow
//!
//! ```text
//! Router::dispatch(request, env)
//!   -> request_path(uri)                   strip query and fragment
//!   -> Router::resolve(method, path)
//!        cache hit?  -> cached chain
//!        otherwise   -> matching middleware (registration order)
//!                     + static route | dynamic route | 404 | 405
//!                     -> compose -> store in cache
//!   -> ExecutionChain::run(request, context)
//!        mw[0] -> next -> mw[1] -> next -> ... -> terminal handler
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use bytes::Bytes;
//! use chainrouter::dispatcher::{Context, HandlerRequest, HandlerResponse, HandlerResult, Next};
//! use chainrouter::Router;
//! use http::StatusCode;
//!
//! async fn contact(_req: HandlerRequest, ctx: Context) -> HandlerResult {
//!     let name = ctx.param("name").unwrap_or_default().to_string();
//!     Ok(HandlerResponse::text(StatusCode::OK, format!("Contact: {name}")))
//! }
//!
//! async fn powered_by(req: HandlerRequest, ctx: Context, next: Next<()>) -> HandlerResult {
//!     let resp = next.run(req, ctx).await?;
//!     Ok(resp.with_header("x-powered-by", "chainrouter"))
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> anyhow::Result<()> {
//! let mut router: Router = Router::new();
//! router.use_middleware("*", powered_by)?;
//! router.get("/contacts/:name", contact)?;
//!
//! let handler = router.into_handler();
//! let req = http::Request::get("/contacts/ada").body(Bytes::new())?;
//! let resp = handler(req, ()).await?;
//! assert_eq!(resp.body_text(), "Contact: ada");
//! assert_eq!(resp.get_header("x-powered-by"), Some("chainrouter"));
//! # Ok(())
//! # }
//! ```
//!
//! ## Path Templates
//!
//! | Template          | Matches                          |
//! |-------------------|----------------------------------|
//! | `/about`          | exactly `/about` (static)        |
//! | `/users/:id`      | `/users/7`                       |
//! | `/items/:id?`     | `/items` and `/items/3`          |
//! | `/files/:path+`   | `/files/a/b.txt`                 |
//! | `/api/*`          | `/api` and everything below it   |
//! | `*`               | every path                       |
//!
//! ## Configuration
//!
//! See [`runtime_config::RouterConfig`] (`CHAINR_CACHE_CAPACITY`,
//! `CHAINR_TRACE_ROUTING`) and [`logging::LogConfig`] (`CHAINR_LOG_*`).

pub mod dispatcher;
pub mod error;
pub mod ids;
pub mod logging;
pub mod middleware;
pub mod router;
pub mod runtime_config;

pub use error::{DispatchError, RouterError};
pub use router::{DispatchFn, Router};
