use std::time::Instant;

use tracing::{field, info_span, Instrument};

use super::Middleware;
use crate::dispatcher::{Context, HandlerFuture, HandlerRequest, Next};

/// Opens a `request` span around the rest of the chain
///
/// The span carries the method, path and request id, and records the
/// response status and latency once the chain completes. Everything
/// logged further down the chain is attributed to it.
pub struct TracingMiddleware;

impl<E: Send + 'static> Middleware<E> for TracingMiddleware {
    fn call(&self, req: HandlerRequest, ctx: Context<E>, next: Next<E>) -> HandlerFuture {
        let span = info_span!(
            "request",
            method = %req.method(),
            path = %req.uri().path(),
            request_id = %ctx.request_id(),
            status = field::Empty,
            latency_ms = field::Empty,
        );
        let start = Instant::now();
        let rest = span.in_scope(|| next.run(req, ctx));
        let record = span.clone();

        Box::pin(
            async move {
                let result = rest.await;
                record.record("latency_ms", start.elapsed().as_millis() as u64);
                match &result {
                    Ok(resp) => {
                        record.record("status", resp.status.as_u16());
                        tracing::debug!(status = resp.status.as_u16(), "request completed");
                    }
                    Err(err) => {
                        tracing::error!(error = %err, "request failed");
                    }
                }
                result
            }
            .instrument(span),
        )
    }
}
