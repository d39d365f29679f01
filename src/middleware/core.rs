use std::future::Future;

use crate::dispatcher::{Context, HandlerFuture, HandlerRequest, Next};

/// A link in front of a route's terminal handler
///
/// A middleware receives the request, the per-call [`Context`] and a [`Next`]
/// continuation. Running `next` yields the response of everything behind this
/// link; returning without running it short-circuits the chain.
///
/// Implemented for any `Fn(HandlerRequest, Context<E>, Next<E>) -> impl Future<Output = HandlerResult>`.
pub trait Middleware<E>: Send + Sync + 'static {
    fn call(&self, req: HandlerRequest, ctx: Context<E>, next: Next<E>) -> HandlerFuture;
}

impl<E, F, Fut> Middleware<E> for F
where
    E: Send + 'static,
    F: Fn(HandlerRequest, Context<E>, Next<E>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = crate::dispatcher::HandlerResult> + Send + 'static,
{
    fn call(&self, req: HandlerRequest, ctx: Context<E>, next: Next<E>) -> HandlerFuture {
        Box::pin(self(req, ctx, next))
    }
}
