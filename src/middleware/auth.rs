use futures::future;
use http::StatusCode;
use tracing::warn;

use super::Middleware;
use crate::dispatcher::{Context, HandlerFuture, HandlerRequest, HandlerResponse, Next};

/// Rejects requests whose `authorization` header is not the configured token
///
/// Matching requests continue down the chain; everything else is answered
/// with `401 Unauthorized` without running the rest of the chain.
pub struct AuthMiddleware {
    token: String,
}

impl AuthMiddleware {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    fn is_authorized(&self, req: &HandlerRequest) -> bool {
        req.headers()
            .get(http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v == self.token)
    }
}

impl<E: Send + 'static> Middleware<E> for AuthMiddleware {
    fn call(&self, req: HandlerRequest, ctx: Context<E>, next: Next<E>) -> HandlerFuture {
        if self.is_authorized(&req) {
            return next.run(req, ctx);
        }
        warn!(
            request_id = %ctx.request_id(),
            path = %req.uri().path(),
            "rejected request without valid authorization"
        );
        Box::pin(future::ready(Ok(HandlerResponse::error(
            StatusCode::UNAUTHORIZED,
            "Unauthorized",
        ))))
    }
}
