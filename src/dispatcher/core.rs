//! Request, response and handler types shared by every chain link.

use bytes::Bytes;
use futures::future::BoxFuture;
use http::StatusCode;
use serde::Serialize;
use smallvec::SmallVec;
use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

use crate::ids::RequestId;
use crate::router::ParamMap;

/// Maximum inline headers before heap allocation
/// Most responses carry <= 16 headers
pub const MAX_INLINE_HEADERS: usize = 16;

/// Stack-allocated header storage for responses
///
/// Header names use `Arc<str>` so static names (`content-type`, `allow`, ...)
/// are cheap to clone.
pub type HeaderVec = SmallVec<[(Arc<str>, String); MAX_INLINE_HEADERS]>;

/// The request every handler and middleware receives
///
/// Middleware may rewrite headers or stash values in
/// `request.extensions_mut()` before handing it to `next`.
pub type HandlerRequest = http::Request<Bytes>;

/// What a chain link eventually produces
///
/// Handler failures are plain `anyhow::Error`s and reach the dispatch caller
/// unmodified.
pub type HandlerResult = anyhow::Result<HandlerResponse>;

/// Boxed future returned by every chain link
pub type HandlerFuture = BoxFuture<'static, HandlerResult>;

/// Response data produced by a chain
///
/// Contains the HTTP status code, headers, and body to be sent to the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerResponse {
    /// HTTP status code (200, 404, 500, etc.)
    pub status: StatusCode,
    /// HTTP response headers (stack-allocated for <= 16 headers)
    pub headers: HeaderVec,
    /// Response body
    pub body: Bytes,
}

impl Default for HandlerResponse {
    fn default() -> Self {
        Self::empty()
    }
}

impl HandlerResponse {
    /// Create a new response with the given status, headers, and body
    #[must_use]
    pub fn new(status: StatusCode, headers: HeaderVec, body: Bytes) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// `200 OK` with no headers and no body
    ///
    /// What a chain yields when `next` runs past its last link.
    #[must_use]
    pub fn empty() -> Self {
        Self::new(StatusCode::OK, HeaderVec::new(), Bytes::new())
    }

    /// Create a `text/plain` response
    #[must_use]
    pub fn text(status: StatusCode, body: impl Into<String>) -> Self {
        let mut headers = HeaderVec::new();
        headers.push((
            Arc::from("content-type"),
            "text/plain; charset=utf-8".to_string(),
        ));
        Self::new(status, headers, Bytes::from(body.into()))
    }

    /// Create a JSON response
    ///
    /// # Errors
    ///
    /// Fails when `body` cannot be serialized.
    pub fn json<T: Serialize + ?Sized>(status: StatusCode, body: &T) -> anyhow::Result<Self> {
        let encoded = serde_json::to_vec(body)?;
        let mut headers = HeaderVec::new();
        headers.push((Arc::from("content-type"), "application/json".to_string()));
        Ok(Self::new(status, headers, Bytes::from(encoded)))
    }

    /// Create an error response with a `{"error": message}` JSON body
    #[must_use]
    pub fn error(status: StatusCode, message: &str) -> Self {
        let body = serde_json::json!({ "error": message }).to_string();
        let mut headers = HeaderVec::new();
        headers.push((Arc::from("content-type"), "application/json".to_string()));
        Self::new(status, headers, Bytes::from(body))
    }

    /// Get a header by name (case-insensitive)
    #[inline]
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Add or replace a header
    pub fn set_header(&mut self, name: &str, value: impl Into<String>) {
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        self.headers.push((Arc::from(name), value.into()));
    }

    /// Builder-style [`set_header`](Self::set_header)
    #[must_use]
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set_header(name, value);
        self
    }

    /// Body as UTF-8 text (lossy)
    #[must_use]
    pub fn body_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    /// Convert into an `http::Response` for a serving surface
    ///
    /// # Errors
    ///
    /// Fails when a header name or value is not valid HTTP.
    pub fn into_http(self) -> Result<http::Response<Bytes>, http::Error> {
        let mut builder = http::Response::builder().status(self.status);
        for (name, value) in &self.headers {
            builder = builder.header(name.as_ref(), value.as_str());
        }
        builder.body(self.body)
    }
}

/// Per-call context handed to every chain link
///
/// Carries the dispatch's [`RequestId`], the parameters captured by the
/// terminal route (empty for static routes and fallbacks), and the opaque
/// caller-supplied environment `E`.
#[derive(Debug, Clone)]
pub struct Context<E = ()> {
    request_id: RequestId,
    params: Arc<ParamMap>,
    env: E,
}

impl<E> Context<E> {
    /// Create a context with a fresh request id and no parameters
    pub fn new(env: E) -> Self {
        Self {
            request_id: RequestId::new(),
            params: Arc::new(ParamMap::new()),
            env,
        }
    }

    /// Replace the request id (e.g. with one taken from an incoming header)
    #[must_use]
    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = request_id;
        self
    }

    pub(crate) fn set_params(&mut self, params: Arc<ParamMap>) {
        self.params = params;
    }

    #[must_use]
    pub fn request_id(&self) -> RequestId {
        self.request_id
    }

    /// Parameters captured by the matched route
    #[must_use]
    pub fn params(&self) -> &ParamMap {
        &self.params
    }

    /// Shortcut for `ctx.params().get(name)`
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name)
    }

    pub fn env(&self) -> &E {
        &self.env
    }

    pub fn env_mut(&mut self) -> &mut E {
        &mut self.env
    }

    pub fn into_env(self) -> E {
        self.env
    }
}

/// A terminal request handler
///
/// Implemented for any `Fn(HandlerRequest, Context<E>) -> impl Future<Output = HandlerResult>`,
/// so plain async closures and functions can be registered directly.
pub trait Handler<E>: Send + Sync + 'static {
    fn call(&self, req: HandlerRequest, ctx: Context<E>) -> HandlerFuture;
}

impl<E, F, Fut> Handler<E> for F
where
    E: Send + 'static,
    F: Fn(HandlerRequest, Context<E>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    fn call(&self, req: HandlerRequest, ctx: Context<E>) -> HandlerFuture {
        Box::pin(self(req, ctx))
    }
}
