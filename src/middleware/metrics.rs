use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::Middleware;
use crate::dispatcher::{Context, HandlerFuture, HandlerRequest, Next};

#[derive(Default)]
struct Counters {
    request_count: AtomicUsize,
    total_latency_ns: AtomicU64,
    client_errors: AtomicUsize,
    server_errors: AtomicUsize,
    handler_failures: AtomicUsize,
}

/// Middleware for collecting request metrics
///
/// Tracks request counts, latency and error responses. All counters use
/// atomic operations for thread-safe updates without locks.
///
/// Clones share their counters, so one clone can be registered with the
/// router while another is kept for reading.
///
/// Metrics collected:
/// - Total request count
/// - Average latency (time spent in the rest of the chain)
/// - 4xx and 5xx response counts
/// - Handler failures (the chain returned `Err`)
#[derive(Clone, Default)]
pub struct MetricsMiddleware {
    counters: Arc<Counters>,
}

impl MetricsMiddleware {
    /// Create a new metrics middleware with all counters initialized to zero
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the total number of requests processed
    #[must_use]
    pub fn request_count(&self) -> usize {
        self.counters.request_count.load(Ordering::Relaxed)
    }

    /// Calculate the average request latency
    ///
    /// Returns zero duration if no requests have been processed yet.
    #[must_use]
    pub fn average_latency(&self) -> Duration {
        let count = self.counters.request_count.load(Ordering::Relaxed) as u64;
        if count == 0 {
            Duration::from_nanos(0)
        } else {
            Duration::from_nanos(self.counters.total_latency_ns.load(Ordering::Relaxed) / count)
        }
    }

    /// Responses with a 4xx status
    #[must_use]
    pub fn client_errors(&self) -> usize {
        self.counters.client_errors.load(Ordering::Relaxed)
    }

    /// Responses with a 5xx status
    #[must_use]
    pub fn server_errors(&self) -> usize {
        self.counters.server_errors.load(Ordering::Relaxed)
    }

    /// Chains that returned an error instead of a response
    #[must_use]
    pub fn handler_failures(&self) -> usize {
        self.counters.handler_failures.load(Ordering::Relaxed)
    }
}

impl<E: Send + 'static> Middleware<E> for MetricsMiddleware {
    /// Count the request, run the rest of the chain and record its outcome
    ///
    /// This middleware is passive: it always runs `next` and hands back
    /// whatever the chain produced.
    fn call(&self, req: HandlerRequest, ctx: Context<E>, next: Next<E>) -> HandlerFuture {
        let counters = Arc::clone(&self.counters);
        counters.request_count.fetch_add(1, Ordering::Relaxed);
        let start = Instant::now();
        let rest = next.run(req, ctx);

        Box::pin(async move {
            let result = rest.await;
            counters
                .total_latency_ns
                .fetch_add(start.elapsed().as_nanos() as u64, Ordering::Relaxed);
            match &result {
                Ok(resp) if resp.status.is_client_error() => {
                    counters.client_errors.fetch_add(1, Ordering::Relaxed);
                }
                Ok(resp) if resp.status.is_server_error() => {
                    counters.server_errors.fetch_add(1, Ordering::Relaxed);
                }
                Ok(_) => {}
                Err(_) => {
                    counters.handler_failures.fetch_add(1, Ordering::Relaxed);
                }
            }
            result
        })
    }
}
