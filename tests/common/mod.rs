#![allow(dead_code)]

pub mod requests {
    use bytes::Bytes;
    use chainrouter::dispatcher::HandlerRequest;
    use http::Method;

    /// Builds a body-less request for `uri`
    pub fn request(method: Method, uri: &str) -> HandlerRequest {
        http::Request::builder()
            .method(method)
            .uri(uri)
            .body(Bytes::new())
            .unwrap()
    }

    pub fn get(uri: &str) -> HandlerRequest {
        request(Method::GET, uri)
    }

    /// Builds a request carrying one extra header
    pub fn with_header(method: Method, uri: &str, name: &str, value: &str) -> HandlerRequest {
        http::Request::builder()
            .method(method)
            .uri(uri)
            .header(name, value)
            .body(Bytes::new())
            .unwrap()
    }
}

pub mod handlers {
    use chainrouter::dispatcher::{Context, HandlerFuture, HandlerRequest, HandlerResponse, Next};
    use futures::future;
    use http::StatusCode;
    use std::sync::{Arc, Mutex};

    pub type Log = Arc<Mutex<Vec<String>>>;

    pub fn new_log() -> Log {
        Arc::new(Mutex::new(Vec::new()))
    }

    pub fn entries(log: &Log) -> Vec<String> {
        log.lock().unwrap().clone()
    }

    pub fn respond(resp: HandlerResponse) -> HandlerFuture {
        Box::pin(future::ready(Ok(resp)))
    }

    /// Terminal handler answering `200 text/plain` with a fixed body
    pub fn text(
        body: &'static str,
    ) -> impl Fn(HandlerRequest, Context<()>) -> HandlerFuture + Send + Sync + 'static {
        move |_req: HandlerRequest, _ctx: Context<()>| -> HandlerFuture {
            respond(HandlerResponse::text(StatusCode::OK, body))
        }
    }

    /// Middleware that appends `name` to `log` and defers to `next`
    pub fn recording(
        log: &Log,
        name: &'static str,
    ) -> impl Fn(HandlerRequest, Context<()>, Next<()>) -> HandlerFuture + Send + Sync + 'static
    {
        let log = Arc::clone(log);
        move |req: HandlerRequest, ctx: Context<()>, next: Next<()>| -> HandlerFuture {
            log.lock().unwrap().push(name.to_string());
            next.run(req, ctx)
        }
    }
}
