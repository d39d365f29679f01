//! Registered routes, indexed for resolution.
//!
//! Static templates live in a per-method hash index and match by exact
//! string equality. Dynamic templates are compiled into [`Pattern`]s and
//! kept per method in precedence order, most specific first.

use http::Method;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

use super::pattern::{is_dynamic, ParamMap, Pattern, SegmentKind};
use crate::dispatcher::Handler;
use crate::error::RouterError;

/// How a route is matched
#[derive(Debug, Clone)]
pub enum RouteKind {
    /// Exact string comparison against the request path
    Static,
    /// Compiled pattern with parameter captures
    Dynamic { pattern: Pattern },
}

/// A registered `(method, template) -> handler` binding
///
/// Immutable after registration.
pub struct Route<E> {
    method: Method,
    template: Arc<str>,
    kind: RouteKind,
    handler: Arc<dyn Handler<E>>,
}

impl<E> Clone for Route<E> {
    fn clone(&self) -> Self {
        Self {
            method: self.method.clone(),
            template: Arc::clone(&self.template),
            kind: self.kind.clone(),
            handler: Arc::clone(&self.handler),
        }
    }
}

impl<E> std::fmt::Debug for Route<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Route")
            .field("method", &self.method)
            .field("template", &self.template)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

impl<E> Route<E> {
    /// Build a route, classifying and compiling its template
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::InvalidTemplate`] when the template is neither
    /// a `/`-rooted path nor `*`, or a dynamic template does not compile.
    pub fn new(
        method: Method,
        template: &str,
        handler: Arc<dyn Handler<E>>,
    ) -> Result<Self, RouterError> {
        let kind = if is_dynamic(template) {
            RouteKind::Dynamic {
                pattern: Pattern::compile(template)?,
            }
        } else if template.starts_with('/') {
            RouteKind::Static
        } else {
            return Err(RouterError::invalid(template, "must start with '/' or be '*'"));
        };
        Ok(Self {
            method,
            template: Arc::from(template),
            kind,
            handler,
        })
    }

    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    #[must_use]
    pub fn template(&self) -> &str {
        &self.template
    }

    pub(crate) fn template_arc(&self) -> Arc<str> {
        Arc::clone(&self.template)
    }

    #[must_use]
    pub fn kind(&self) -> &RouteKind {
        &self.kind
    }

    #[must_use]
    pub fn handler(&self) -> &Arc<dyn Handler<E>> {
        &self.handler
    }

    #[must_use]
    pub fn is_static(&self) -> bool {
        matches!(self.kind, RouteKind::Static)
    }

    /// Match a request path, returning the captured parameters
    #[must_use]
    pub fn matches(&self, path: &str) -> Option<ParamMap> {
        match &self.kind {
            RouteKind::Static => (self.template.as_ref() == path).then(ParamMap::new),
            RouteKind::Dynamic { pattern } => pattern.matches(path),
        }
    }

    fn shape(&self) -> &[SegmentKind] {
        match &self.kind {
            RouteKind::Static => &[],
            RouteKind::Dynamic { pattern } => pattern.shape(),
        }
    }
}

/// All registered routes
pub struct RouteTable<E> {
    static_routes: HashMap<Method, HashMap<String, Route<E>>>,
    dynamic_routes: HashMap<Method, Vec<Route<E>>>,
}

impl<E> Default for RouteTable<E> {
    fn default() -> Self {
        Self {
            static_routes: HashMap::new(),
            dynamic_routes: HashMap::new(),
        }
    }
}

impl<E> RouteTable<E> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for `method` and `template`
    ///
    /// A static template registered twice for the same method replaces the
    /// earlier handler. Dynamic routes are inserted at their precedence
    /// position: after every route whose shape ranks at least as high, so
    /// equally ranked templates keep registration order.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::InvalidTemplate`] for a malformed template.
    pub fn insert(
        &mut self,
        method: Method,
        template: &str,
        handler: Arc<dyn Handler<E>>,
    ) -> Result<(), RouterError> {
        let route = Route::new(method.clone(), template, handler)?;
        match route.kind {
            RouteKind::Static => {
                let index = self.static_routes.entry(method).or_default();
                if index.insert(template.to_string(), route).is_some() {
                    warn!(template, "static route registered twice, last registration wins");
                }
            }
            RouteKind::Dynamic { .. } => {
                let list = self.dynamic_routes.entry(method).or_default();
                let at = list.partition_point(|existing| existing.shape() >= route.shape());
                debug!(template, position = at, "dynamic route ranked");
                list.insert(at, route);
            }
        }
        Ok(())
    }

    /// Exact match in the static index
    #[must_use]
    pub fn find_static(&self, method: &Method, path: &str) -> Option<&Route<E>> {
        self.static_routes.get(method)?.get(path)
    }

    /// First dynamic route for `method` whose pattern matches `path`
    #[must_use]
    pub fn find_dynamic(&self, method: &Method, path: &str) -> Option<(&Route<E>, ParamMap)> {
        self.dynamic_routes
            .get(method)?
            .iter()
            .find_map(|route| route.matches(path).map(|params| (route, params)))
    }

    /// Whether any dynamic route is registered for `method`
    ///
    /// A method without one answers every unmatched path with 405.
    #[must_use]
    pub fn has_dynamic(&self, method: &Method) -> bool {
        self.dynamic_routes.get(method).is_some_and(|l| !l.is_empty())
    }

    /// Methods with a route matching `path`, in a stable order
    #[must_use]
    pub fn allowed_methods(&self, path: &str) -> Vec<Method> {
        let mut methods: Vec<Method> = self
            .methods()
            .filter(|method| {
                self.find_static(method, path).is_some()
                    || self
                        .dynamic_routes
                        .get(*method)
                        .is_some_and(|list| list.iter().any(|r| r.matches(path).is_some()))
            })
            .cloned()
            .collect();
        methods.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        methods
    }

    /// Dynamic routes for `method` in precedence order
    pub fn dynamic_routes(&self, method: &Method) -> impl Iterator<Item = &Route<E>> {
        self.dynamic_routes.get(method).into_iter().flatten()
    }

    /// Total number of registered routes
    #[must_use]
    pub fn len(&self) -> usize {
        self.static_routes.values().map(HashMap::len).sum::<usize>()
            + self.dynamic_routes.values().map(Vec::len).sum::<usize>()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn methods(&self) -> impl Iterator<Item = &Method> {
        let mut seen: Vec<&Method> = self
            .static_routes
            .keys()
            .chain(self.dynamic_routes.keys())
            .collect();
        seen.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        seen.dedup();
        seen.into_iter()
    }
}
