//! Execution chains and the `next()` continuation protocol.
//!
//! A chain is the ordered middleware selected for one `(method, path)` plus
//! the terminal handler. Running it walks front to back: link 0 runs first
//! and receives a [`Next`] bound to link 1, and so on until the terminal.
//!
//! ```text
//! run(req, ctx)
//!   -> mw[0](req, ctx, next@1)
//!        -> next.run(req, ctx) -> mw[1](req, ctx, next@2)
//!                                   -> next.run(req, ctx) -> terminal(req, ctx)
//! ```
//!
//! A middleware that returns without running `next` short-circuits: nothing
//! behind it executes. Each continuation runs at most once; a second run
//! yields [`DispatchError::NextCalledTwice`] instead of re-running handlers.

use futures::future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::warn;

use super::core::{Context, Handler, HandlerFuture, HandlerRequest, HandlerResponse};
use crate::error::DispatchError;
use crate::middleware::Middleware;
use crate::router::ParamMap;

/// How the resolver arrived at a chain's terminal handler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchKind {
    /// Exact match in the static index
    Static,
    /// Pattern match in the method's dynamic list
    Dynamic,
    /// No route for the method matched the path
    NotFound,
    /// The method has no dynamic routes and no static route matched
    MethodNotAllowed,
}

impl MatchKind {
    /// Whether the terminal is a registered route rather than a fallback
    #[must_use]
    pub fn is_route(self) -> bool {
        matches!(self, MatchKind::Static | MatchKind::Dynamic)
    }
}

/// Methods served for a path, attached to the request of a
/// [`MatchKind::MethodNotAllowed`] chain as an extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowedMethods(pub Arc<[http::Method]>);

impl AllowedMethods {
    /// Render as an `Allow` header value (`GET, HEAD`)
    #[must_use]
    pub fn header_value(&self) -> String {
        self.0
            .iter()
            .map(http::Method::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// A composed, ready-to-run chain for one `(method, path)`
///
/// Built fresh for every cache miss and never mutated afterwards; cached
/// chains are shared through `Arc`.
pub struct ExecutionChain<E> {
    middleware: Vec<Arc<dyn Middleware<E>>>,
    terminal: Option<Arc<dyn Handler<E>>>,
    params: Arc<ParamMap>,
    kind: MatchKind,
    template: Option<Arc<str>>,
    allowed: Option<AllowedMethods>,
}

/// Compose middleware and a terminal handler into one chain
///
/// Middleware run in slice order; the terminal always runs last. A chain
/// without terminal answers with [`HandlerResponse::empty`] once its
/// middleware defer past the end.
pub fn compose<E>(
    middleware: Vec<Arc<dyn Middleware<E>>>,
    terminal: Option<Arc<dyn Handler<E>>>,
) -> ExecutionChain<E> {
    ExecutionChain {
        middleware,
        terminal,
        params: Arc::new(ParamMap::new()),
        kind: MatchKind::Static,
        template: None,
        allowed: None,
    }
}

impl<E> ExecutionChain<E> {
    /// Attach the terminal route's captures
    #[must_use]
    pub fn with_params(mut self, params: ParamMap) -> Self {
        self.params = Arc::new(params);
        self
    }

    /// Record how the terminal was selected
    #[must_use]
    pub fn with_match(mut self, kind: MatchKind, template: Option<Arc<str>>) -> Self {
        self.kind = kind;
        self.template = template;
        self
    }

    pub(crate) fn with_allowed(mut self, allowed: AllowedMethods) -> Self {
        self.allowed = Some(allowed);
        self
    }

    #[must_use]
    pub fn kind(&self) -> MatchKind {
        self.kind
    }

    /// Template of the matched route, `None` for fallbacks
    #[must_use]
    pub fn template(&self) -> Option<&str> {
        self.template.as_deref()
    }

    #[must_use]
    pub fn params(&self) -> &ParamMap {
        &self.params
    }

    /// Number of middleware in front of the terminal
    #[must_use]
    pub fn middleware_len(&self) -> usize {
        self.middleware.len()
    }

    /// Methods that would have matched, for `MethodNotAllowed` chains
    #[must_use]
    pub fn allowed_methods(&self) -> Option<&AllowedMethods> {
        self.allowed.as_ref()
    }
}

impl<E: Send + 'static> ExecutionChain<E> {
    /// Run the chain from its first link
    ///
    /// The context receives the chain's parameter map before link 0 runs.
    pub fn run(self: Arc<Self>, mut req: HandlerRequest, mut ctx: Context<E>) -> HandlerFuture {
        ctx.set_params(Arc::clone(&self.params));
        if let Some(allowed) = &self.allowed {
            req.extensions_mut().insert(allowed.clone());
        }
        Next::at(self, 0).run(req, ctx)
    }
}

/// Continuation handed to a middleware
///
/// Running it executes the rest of the chain and yields its response.
/// Clones share one "already run" flag, so the remainder executes at most
/// once per position.
pub struct Next<E> {
    chain: Arc<ExecutionChain<E>>,
    position: usize,
    called: Arc<AtomicBool>,
}

impl<E> Clone for Next<E> {
    fn clone(&self) -> Self {
        Self {
            chain: Arc::clone(&self.chain),
            position: self.position,
            called: Arc::clone(&self.called),
        }
    }
}

impl<E> Next<E> {
    fn at(chain: Arc<ExecutionChain<E>>, position: usize) -> Self {
        Self {
            chain,
            position,
            called: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Index of the link this continuation runs
    #[must_use]
    pub fn position(&self) -> usize {
        self.position
    }
}

impl<E: Send + 'static> Next<E> {
    /// Run the remainder of the chain
    ///
    /// A second run through this continuation (or any clone of it) fails
    /// with [`DispatchError::NextCalledTwice`].
    pub fn run(self, req: HandlerRequest, ctx: Context<E>) -> HandlerFuture {
        if self.called.swap(true, Ordering::AcqRel) {
            warn!(
                request_id = %ctx.request_id(),
                position = self.position,
                "next() invoked more than once"
            );
            let err: anyhow::Error = DispatchError::NextCalledTwice {
                position: self.position,
            }
            .into();
            return Box::pin(future::ready(Err(err)));
        }

        match self.chain.middleware.get(self.position) {
            Some(middleware) => {
                let next = Next::at(Arc::clone(&self.chain), self.position + 1);
                middleware.call(req, ctx, next)
            }
            None => match &self.chain.terminal {
                Some(terminal) => terminal.call(req, ctx),
                None => Box::pin(future::ready(Ok(HandlerResponse::empty()))),
            },
        }
    }
}
