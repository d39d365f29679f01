//! Router core module - registration, resolution and dispatch.
//!
//! Resolution of one `(method, path)` is a pure function of the tables, so
//! its result is cached as a ready-to-run [`ExecutionChain`]. Registration
//! takes `&mut self` and clears the cache; once the router is shared (for
//! example through [`Router::into_handler`]) the tables are frozen.

use futures::future;
use http::{Method, StatusCode};
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::{Arc, RwLock};
use tracing::{debug, info};

use super::observer::{NoopObserver, RouteObserver, TracingObserver};
use super::pattern::Pattern;
use super::table::RouteTable;
use crate::dispatcher::{
    compose, extract_path, request_path, AllowedMethods, Context, ExecutionChain, Handler,
    HandlerFuture, HandlerRequest, HandlerResponse, MatchKind,
};
use crate::error::RouterError;
use crate::ids::RequestId;
use crate::middleware::{Middleware, MiddlewareTable};
use crate::runtime_config::RouterConfig;

/// A frozen router as a plain callable, ready to hand to a serving surface
pub type DispatchFn<E> = Arc<dyn Fn(HandlerRequest, E) -> HandlerFuture + Send + Sync>;

type CacheKey = (Method, String);

// `LruCache::get` updates recency, so reads take the write lock too.
type ResolutionCache<E> = RwLock<LruCache<CacheKey, Arc<ExecutionChain<E>>>>;

fn resolution_cache<E>(capacity: usize) -> Option<ResolutionCache<E>> {
    NonZeroUsize::new(capacity).map(|cap| RwLock::new(LruCache::new(cap)))
}

/// Every method registered by [`Router::all`]
const ALL_METHODS: [Method; 9] = [
    Method::GET,
    Method::HEAD,
    Method::POST,
    Method::PUT,
    Method::DELETE,
    Method::PATCH,
    Method::OPTIONS,
    Method::TRACE,
    Method::CONNECT,
];

/// HTTP request router
///
/// Holds the route table, the middleware table and the resolution cache.
/// `E` is an opaque per-dispatch environment handed to every chain link
/// through [`Context::env`].
///
/// # Example
///
/// ```rust
/// use chainrouter::dispatcher::{Context, HandlerRequest, HandlerResponse, HandlerResult};
/// use chainrouter::Router;
/// use http::StatusCode;
///
/// async fn contact(_req: HandlerRequest, ctx: Context) -> HandlerResult {
///     let name = ctx.param("name").unwrap_or_default().to_string();
///     Ok(HandlerResponse::text(StatusCode::OK, format!("Contact: {name}")))
/// }
///
/// # fn main() -> Result<(), chainrouter::error::RouterError> {
/// let mut router: Router = Router::new();
/// router.get("/contacts/:name", contact)?;
///
/// let chain = router.resolve(&http::Method::GET, "/contacts/ada");
/// assert_eq!(chain.params().get("name"), Some("ada"));
/// # Ok(())
/// # }
/// ```
pub struct Router<E = ()> {
    routes: RouteTable<E>,
    middleware: MiddlewareTable<E>,
    cache: Option<ResolutionCache<E>>,
    config: RouterConfig,
    observer: Arc<dyn RouteObserver>,
    not_found: Arc<dyn Handler<E>>,
    method_not_allowed: Arc<dyn Handler<E>>,
}

impl<E: Send + 'static> Default for Router<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Send + 'static> Router<E> {
    /// Create an empty router with the default configuration
    ///
    /// Use [`with_config`](Self::with_config) with
    /// [`RouterConfig::from_env`] to pick up environment overrides.
    #[must_use]
    pub fn new() -> Self {
        Self {
            routes: RouteTable::new(),
            middleware: MiddlewareTable::new(),
            cache: resolution_cache(RouterConfig::default().cache_capacity),
            config: RouterConfig::default(),
            observer: Arc::new(NoopObserver),
            not_found: default_not_found(),
            method_not_allowed: default_method_not_allowed(),
        }
    }

    /// Apply a runtime configuration
    ///
    /// `trace_routing` installs a [`TracingObserver`], replacing any observer
    /// set earlier.
    #[must_use]
    pub fn with_config(mut self, config: RouterConfig) -> Self {
        info!(
            cache_capacity = config.cache_capacity,
            trace_routing = config.trace_routing,
            "router configured"
        );
        if config.trace_routing {
            self.observer = Arc::new(TracingObserver);
        }
        self.config = config;
        self.cache = resolution_cache(config.cache_capacity);
        self
    }

    /// Install a resolution observer
    #[must_use]
    pub fn with_observer(mut self, observer: impl RouteObserver) -> Self {
        self.observer = Arc::new(observer);
        self
    }

    #[must_use]
    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    #[must_use]
    pub fn routes(&self) -> &RouteTable<E> {
        &self.routes
    }

    #[must_use]
    pub fn middleware(&self) -> &MiddlewareTable<E> {
        &self.middleware
    }

    /// Number of cached resolutions
    #[must_use]
    pub fn cache_len(&self) -> usize {
        self.cache
            .as_ref()
            .and_then(|cache| cache.read().ok().map(|guard| guard.len()))
            .unwrap_or(0)
    }

    /// Register `handler` for every method in `methods`
    ///
    /// # Arguments
    ///
    /// * `methods` - Methods to register under; one route per method
    /// * `template` - Path template (`/contacts/:name`, `/files/*`, ...)
    /// * `handler` - Terminal handler shared by all the registered routes
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::InvalidTemplate`] when the template is rejected.
    /// Nothing is registered in that case.
    pub fn add<H: Handler<E>>(
        &mut self,
        methods: &[Method],
        template: &str,
        handler: H,
    ) -> Result<&mut Self, RouterError> {
        self.add_arc(methods, template, Arc::new(handler))
    }

    fn add_arc(
        &mut self,
        methods: &[Method],
        template: &str,
        handler: Arc<dyn Handler<E>>,
    ) -> Result<&mut Self, RouterError> {
        Pattern::compile(template)?;
        for method in methods {
            self.routes
                .insert(method.clone(), template, Arc::clone(&handler))?;
            info!(method = %method, template, "route registered");
        }
        self.clear_cache();
        Ok(self)
    }

    /// Register a GET route; the same handler also answers HEAD
    ///
    /// # Errors
    ///
    /// See [`add`](Self::add).
    pub fn get<H: Handler<E>>(&mut self, template: &str, handler: H) -> Result<&mut Self, RouterError> {
        self.add(&[Method::GET, Method::HEAD], template, handler)
    }

    /// # Errors
    ///
    /// See [`add`](Self::add).
    pub fn post<H: Handler<E>>(&mut self, template: &str, handler: H) -> Result<&mut Self, RouterError> {
        self.add(&[Method::POST], template, handler)
    }

    /// # Errors
    ///
    /// See [`add`](Self::add).
    pub fn put<H: Handler<E>>(&mut self, template: &str, handler: H) -> Result<&mut Self, RouterError> {
        self.add(&[Method::PUT], template, handler)
    }

    /// # Errors
    ///
    /// See [`add`](Self::add).
    pub fn delete<H: Handler<E>>(&mut self, template: &str, handler: H) -> Result<&mut Self, RouterError> {
        self.add(&[Method::DELETE], template, handler)
    }

    /// # Errors
    ///
    /// See [`add`](Self::add).
    pub fn patch<H: Handler<E>>(&mut self, template: &str, handler: H) -> Result<&mut Self, RouterError> {
        self.add(&[Method::PATCH], template, handler)
    }

    /// # Errors
    ///
    /// See [`add`](Self::add).
    pub fn options<H: Handler<E>>(&mut self, template: &str, handler: H) -> Result<&mut Self, RouterError> {
        self.add(&[Method::OPTIONS], template, handler)
    }

    /// Register the handler under every standard method
    ///
    /// # Errors
    ///
    /// See [`add`](Self::add).
    pub fn all<H: Handler<E>>(&mut self, template: &str, handler: H) -> Result<&mut Self, RouterError> {
        self.add(&ALL_METHODS, template, handler)
    }

    /// Register middleware for every path matching `template`
    ///
    /// Registering again under the identical template appends to the same
    /// entry; a different template (even one matching the same paths)
    /// creates a new entry behind the existing ones.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::InvalidTemplate`] when the template is rejected.
    pub fn use_middleware<M: Middleware<E>>(
        &mut self,
        template: &str,
        middleware: M,
    ) -> Result<&mut Self, RouterError> {
        self.middleware.insert(template, Arc::new(middleware))?;
        info!(template, entries = self.middleware.len(), "middleware registered");
        self.clear_cache();
        Ok(self)
    }

    /// Replace the handler that answers unmatched paths
    ///
    /// # Errors
    ///
    /// Never fails; returns `Result` to chain with the other registration calls.
    pub fn not_found<H: Handler<E>>(&mut self, handler: H) -> Result<&mut Self, RouterError> {
        self.not_found = Arc::new(handler);
        self.clear_cache();
        Ok(self)
    }

    /// Replace the handler that answers methods with no dynamic routes
    ///
    /// The request carries an [`AllowedMethods`] extension listing the
    /// methods that do serve the path.
    ///
    /// # Errors
    ///
    /// Never fails; returns `Result` to chain with the other registration calls.
    pub fn method_not_allowed<H: Handler<E>>(
        &mut self,
        handler: H,
    ) -> Result<&mut Self, RouterError> {
        self.method_not_allowed = Arc::new(handler);
        self.clear_cache();
        Ok(self)
    }

    /// Resolve `(method, path)` into a ready-to-run chain
    ///
    /// Returns the cached chain when there is one. Otherwise the chain is
    /// composed from the matching middleware and the terminal route (or a
    /// fallback), stored in the cache and returned. A full cache evicts its
    /// least recently used resolution.
    #[must_use]
    pub fn resolve(&self, method: &Method, path: &str) -> Arc<ExecutionChain<E>> {
        let key: CacheKey = (method.clone(), path.to_string());
        if let Some(chain) = self.cached(&key) {
            self.observer.cache_hit(method, path);
            return chain;
        }

        let chain = Arc::new(self.compose_chain(method, path));
        let Some(cache) = &self.cache else {
            return chain;
        };
        let Ok(mut guard) = cache.write() else {
            return chain;
        };
        // A concurrent resolve may have stored the same key first; keep its chain.
        if let Some(stored) = guard.get(&key) {
            return Arc::clone(stored);
        }
        if guard.push(key, Arc::clone(&chain)).is_some() {
            debug!(capacity = self.config.cache_capacity, "resolution cache evicted an entry");
        }
        chain
    }

    fn cached(&self, key: &CacheKey) -> Option<Arc<ExecutionChain<E>>> {
        let mut guard = self.cache.as_ref()?.write().ok()?;
        guard.get(key).map(Arc::clone)
    }

    fn clear_cache(&mut self) {
        if let Some(Ok(guard)) = self.cache.as_mut().map(RwLock::get_mut) {
            guard.clear();
        }
    }

    /// [`resolve`](Self::resolve) for a raw URL string
    ///
    /// Accepts full URLs as well as paths; query strings and fragments are
    /// ignored.
    #[must_use]
    pub fn resolve_url(&self, method: &Method, url: &str) -> Arc<ExecutionChain<E>> {
        self.resolve(method, &extract_path(url))
    }

    fn compose_chain(&self, method: &Method, path: &str) -> ExecutionChain<E> {
        let middleware = self.middleware.select(path);

        if let Some(route) = self.routes.find_static(method, path) {
            self.observer.static_match(method, path, route.template());
            return compose(middleware, Some(Arc::clone(route.handler())))
                .with_match(MatchKind::Static, Some(route.template_arc()));
        }

        if let Some((route, params)) = self.routes.find_dynamic(method, path) {
            self.observer
                .dynamic_match(method, path, route.template(), &params);
            return compose(middleware, Some(Arc::clone(route.handler())))
                .with_params(params)
                .with_match(MatchKind::Dynamic, Some(route.template_arc()));
        }

        if !self.routes.has_dynamic(method) {
            let allowed = self.routes.allowed_methods(path);
            self.observer
                .fallback(method, path, MatchKind::MethodNotAllowed);
            return compose(middleware, Some(Arc::clone(&self.method_not_allowed)))
                .with_match(MatchKind::MethodNotAllowed, None)
                .with_allowed(AllowedMethods(Arc::from(allowed)));
        }

        self.observer.fallback(method, path, MatchKind::NotFound);
        compose(middleware, Some(Arc::clone(&self.not_found))).with_match(MatchKind::NotFound, None)
    }

    /// Dispatch a request through its chain
    ///
    /// The request id is taken from a valid `x-request-id` header when
    /// present, otherwise freshly generated. Handler errors are returned
    /// unmodified.
    pub fn dispatch(&self, req: HandlerRequest, env: E) -> HandlerFuture {
        let method = req.method().clone();
        let path = request_path(req.uri());
        let chain = self.resolve(&method, path);
        let request_id = RequestId::from_header_or_new(
            req.headers()
                .get("x-request-id")
                .and_then(|v| v.to_str().ok()),
        );
        debug!(
            request_id = %request_id,
            method = %method,
            path,
            kind = ?chain.kind(),
            template = chain.template().unwrap_or("-"),
            middleware = chain.middleware_len(),
            "dispatching request"
        );
        let ctx = Context::new(env).with_request_id(request_id);
        chain.run(req, ctx)
    }

    /// Freeze the router into a cloneable dispatch function
    pub fn into_handler(self) -> DispatchFn<E> {
        info!(
            routes = self.routes.len(),
            middleware_entries = self.middleware.len(),
            "router frozen"
        );
        let router = Arc::new(self);
        Arc::new(move |req: HandlerRequest, env: E| router.dispatch(req, env))
    }
}

fn default_not_found<E: Send + 'static>() -> Arc<dyn Handler<E>> {
    Arc::new(|_req: HandlerRequest, _ctx: Context<E>| -> HandlerFuture {
        Box::pin(future::ready(Ok(HandlerResponse::error(
            StatusCode::NOT_FOUND,
            "Not Found",
        ))))
    })
}

fn default_method_not_allowed<E: Send + 'static>() -> Arc<dyn Handler<E>> {
    Arc::new(|req: HandlerRequest, _ctx: Context<E>| -> HandlerFuture {
        let mut resp = HandlerResponse::error(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed");
        if let Some(allowed) = req.extensions().get::<AllowedMethods>() {
            resp.set_header("allow", allowed.header_value());
        }
        Box::pin(future::ready(Ok(resp)))
    })
}
