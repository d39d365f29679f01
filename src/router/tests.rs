use super::*;
use crate::dispatcher::{
    AllowedMethods, Context, HandlerFuture, HandlerRequest, HandlerResponse, MatchKind, Next,
};
use crate::error::RouterError;
use crate::runtime_config::RouterConfig;
use bytes::Bytes;
use futures::future;
use http::{Method, StatusCode};
use std::sync::{Arc, Mutex};

fn reply(
    body: &'static str,
) -> impl Fn(HandlerRequest, Context<()>) -> HandlerFuture + Send + Sync + 'static {
    move |_req: HandlerRequest, _ctx: Context<()>| -> HandlerFuture {
        Box::pin(future::ready(Ok(HandlerResponse::text(StatusCode::OK, body))))
    }
}

fn request(method: Method, uri: &str) -> HandlerRequest {
    http::Request::builder()
        .method(method)
        .uri(uri)
        .body(Bytes::new())
        .unwrap()
}

#[derive(Default)]
struct CountingObserver {
    events: Arc<Mutex<Vec<String>>>,
}

impl RouteObserver for CountingObserver {
    fn cache_hit(&self, _method: &Method, path: &str) {
        self.events.lock().unwrap().push(format!("hit {path}"));
    }

    fn static_match(&self, _method: &Method, _path: &str, template: &str) {
        self.events.lock().unwrap().push(format!("static {template}"));
    }

    fn dynamic_match(&self, _method: &Method, _path: &str, template: &str, params: &ParamMap) {
        self.events
            .lock()
            .unwrap()
            .push(format!("dynamic {template} {}", params.len()));
    }

    fn fallback(&self, _method: &Method, path: &str, kind: MatchKind) {
        self.events.lock().unwrap().push(format!("{kind:?} {path}"));
    }
}

#[test]
fn test_static_and_dynamic_resolution() {
    let mut router: Router = Router::new();
    router.get("/users/list", reply("list")).unwrap();
    router.get("/users/:id", reply("one")).unwrap();

    let chain = router.resolve(&Method::GET, "/users/list");
    assert_eq!(chain.kind(), MatchKind::Static);
    assert_eq!(chain.template(), Some("/users/list"));
    assert!(chain.params().is_empty());

    let chain = router.resolve(&Method::GET, "/users/42");
    assert_eq!(chain.kind(), MatchKind::Dynamic);
    assert_eq!(chain.template(), Some("/users/:id"));
    assert_eq!(chain.params().get("id"), Some("42"));
}

#[test]
fn test_resolution_is_cached() {
    let mut router: Router = Router::new();
    router.get("/users/:id", reply("one")).unwrap();

    let first = router.resolve(&Method::GET, "/users/1");
    let second = router.resolve(&Method::GET, "/users/1");
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(router.cache_len(), 1);

    let other = router.resolve(&Method::GET, "/users/2");
    assert!(!Arc::ptr_eq(&first, &other));
    assert_eq!(router.cache_len(), 2);
}

#[test]
fn test_registration_clears_cache() {
    let mut router: Router = Router::new();
    router.get("/users/:id", reply("one")).unwrap();
    let before = router.resolve(&Method::GET, "/users/me");
    assert_eq!(before.template(), Some("/users/:id"));

    router.get("/users/me", reply("me")).unwrap();
    assert_eq!(router.cache_len(), 0);
    let after = router.resolve(&Method::GET, "/users/me");
    assert_eq!(after.kind(), MatchKind::Static);
    assert_eq!(after.template(), Some("/users/me"));

    router
        .use_middleware("*", |req: HandlerRequest, ctx: Context<()>, next: Next<()>| {
            next.run(req, ctx)
        })
        .unwrap();
    assert_eq!(router.cache_len(), 0);
    assert_eq!(router.resolve(&Method::GET, "/users/me").middleware_len(), 1);
}

#[test]
fn test_cache_capacity_is_honoured() {
    let mut router: Router = Router::new().with_config(RouterConfig {
        cache_capacity: 2,
        trace_routing: false,
    });
    router.get("/items/:id", reply("item")).unwrap();
    for id in 0..5 {
        let chain = router.resolve(&Method::GET, &format!("/items/{id}"));
        assert_eq!(chain.kind(), MatchKind::Dynamic);
    }
    assert_eq!(router.cache_len(), 2);

    // evicted paths still resolve correctly
    let chain = router.resolve(&Method::GET, "/items/0");
    assert_eq!(chain.params().get("id"), Some("0"));
}

#[test]
fn test_full_cache_evicts_least_recently_used() {
    let mut router: Router = Router::new().with_config(RouterConfig {
        cache_capacity: 2,
        trace_routing: false,
    });
    router.get("/items/:id", reply("item")).unwrap();

    let first = router.resolve(&Method::GET, "/items/1");
    let second = router.resolve(&Method::GET, "/items/2");
    // touch /items/1 so /items/2 is the oldest
    assert!(Arc::ptr_eq(&first, &router.resolve(&Method::GET, "/items/1")));

    let third = router.resolve(&Method::GET, "/items/3");
    assert_eq!(router.cache_len(), 2);
    assert!(Arc::ptr_eq(&first, &router.resolve(&Method::GET, "/items/1")));
    assert!(Arc::ptr_eq(&third, &router.resolve(&Method::GET, "/items/3")));
    // new paths keep being cached after the first eviction
    assert!(!Arc::ptr_eq(&second, &router.resolve(&Method::GET, "/items/2")));
}

#[test]
fn test_zero_capacity_disables_cache() {
    let mut router: Router = Router::new().with_config(RouterConfig {
        cache_capacity: 0,
        trace_routing: false,
    });
    router.get("/a", reply("a")).unwrap();
    let first = router.resolve(&Method::GET, "/a");
    let second = router.resolve(&Method::GET, "/a");
    assert!(!Arc::ptr_eq(&first, &second));
    assert_eq!(router.cache_len(), 0);
}

#[test]
fn test_not_found_vs_method_not_allowed() {
    let mut router: Router = Router::new();
    router.get("/x", reply("x")).unwrap();
    router.get("/x/:id", reply("x-one")).unwrap();
    router.post("/y/:id", reply("y")).unwrap();

    // method has dynamic routes, none match: not found even though GET serves /x
    let chain = router.resolve(&Method::POST, "/x");
    assert_eq!(chain.kind(), MatchKind::NotFound);
    assert!(chain.allowed_methods().is_none());
    assert_eq!(router.resolve(&Method::POST, "/x/1").kind(), MatchKind::NotFound);

    // method with no routes at all
    let chain = router.resolve(&Method::DELETE, "/x");
    assert_eq!(chain.kind(), MatchKind::MethodNotAllowed);
    assert_eq!(
        chain.allowed_methods(),
        Some(&AllowedMethods(Arc::from(vec![Method::GET, Method::HEAD])))
    );
    let chain = router.resolve(&Method::DELETE, "/nowhere");
    assert_eq!(chain.kind(), MatchKind::MethodNotAllowed);
    assert_eq!(
        chain.allowed_methods(),
        Some(&AllowedMethods(Arc::from(Vec::<Method>::new())))
    );

    // method has routes, path unknown everywhere
    assert_eq!(router.resolve(&Method::GET, "/nowhere").kind(), MatchKind::NotFound);
}

#[test]
fn test_static_only_method_answers_method_not_allowed() {
    let mut router: Router = Router::new();
    router.post("/items", reply("created")).unwrap();
    router.get("/items/:id", reply("item")).unwrap();

    let chain = router.resolve(&Method::POST, "/items");
    assert_eq!(chain.kind(), MatchKind::Static);
    assert!(chain.kind().is_route());

    // POST has no dynamic routes, so an unknown path is not "not found"
    let chain = router.resolve(&Method::POST, "/other");
    assert_eq!(chain.kind(), MatchKind::MethodNotAllowed);
    assert!(!chain.kind().is_route());

    // once POST has a dynamic route, unknown paths are not found
    router.post("/items/:id/tags", reply("tag")).unwrap();
    assert_eq!(router.resolve(&Method::POST, "/other").kind(), MatchKind::NotFound);
}

#[test]
fn test_static_lookup_survives_many_registrations() {
    let mut router: Router = Router::new();
    let mut statics = Vec::new();
    for n in 0..30 {
        let path = format!("/section{n}/index");
        router.get(&path, reply("static")).unwrap();
        router.get(&format!("/section{n}/:page"), reply("dynamic")).unwrap();
        router.post(&format!("/section{n}/items/:id"), reply("post")).unwrap();
        router
            .use_middleware(
                &format!("/section{n}/*"),
                |req: HandlerRequest, ctx: Context<()>, next: Next<()>| next.run(req, ctx),
            )
            .unwrap();
        statics.push(path);
    }
    router.get("*", reply("catch-all")).unwrap();

    for path in &statics {
        let chain = router.resolve(&Method::GET, path);
        assert_eq!(chain.kind(), MatchKind::Static, "path {path}");
        assert_eq!(chain.template(), Some(path.as_str()));
        assert!(chain.params().is_empty());
        assert_eq!(chain.middleware_len(), 1);
    }
    assert_eq!(
        router.resolve(&Method::GET, "/section7/about").template(),
        Some("/section7/:page")
    );
}

#[test]
fn test_get_also_registers_head() {
    let mut router: Router = Router::new();
    router.get("/health", reply("ok")).unwrap();
    assert_eq!(
        router.resolve(&Method::HEAD, "/health").kind(),
        MatchKind::Static
    );
}

#[test]
fn test_all_registers_every_method() {
    let mut router: Router = Router::new();
    router.all("/any/*", reply("any")).unwrap();
    for method in [Method::GET, Method::POST, Method::PATCH, Method::OPTIONS] {
        assert_eq!(router.resolve(&method, "/any/thing").kind(), MatchKind::Dynamic);
    }
}

#[test]
fn test_invalid_template_registers_nothing() {
    let mut router: Router = Router::new();
    let err = router.get("users/:id", reply("x")).err().unwrap();
    assert!(matches!(err, RouterError::InvalidTemplate { .. }));
    assert!(router.routes().is_empty());

    let err = router.get("/users/:", reply("x")).err().unwrap();
    assert!(matches!(err, RouterError::InvalidTemplate { .. }));
    assert!(router.routes().is_empty());
}

#[test]
fn test_observer_sees_every_decision() {
    let observer = CountingObserver::default();
    let events = Arc::clone(&observer.events);
    let mut router: Router = Router::new().with_observer(observer);
    router.get("/a", reply("a")).unwrap();
    router.get("/b/:id", reply("b")).unwrap();

    for path in ["/a", "/a", "/b/1", "/c"] {
        drop(router.resolve(&Method::GET, path));
    }

    assert_eq!(
        *events.lock().unwrap(),
        vec!["static /a", "hit /a", "dynamic /b/:id 1", "NotFound /c"]
    );
}

#[test]
fn test_resolve_url_ignores_query_and_fragment() {
    let mut router: Router = Router::new();
    router.get("/contacts/:name", reply("c")).unwrap();

    let chain = router.resolve_url(&Method::GET, "https://example.com/contacts/ada?x=1#top");
    assert_eq!(chain.params().get("name"), Some("ada"));
    let chain = router.resolve_url(&Method::GET, "/contacts/grace?sort=asc");
    assert_eq!(chain.params().get("name"), Some("grace"));
}

#[tokio::test]
async fn test_dispatch_default_fallback_bodies() {
    let mut router: Router = Router::new();
    router.get("/x", reply("x")).unwrap();
    router.get("/x/:id", reply("x-one")).unwrap();

    let resp = router
        .dispatch(request(Method::GET, "/missing"), ())
        .await
        .unwrap();
    assert_eq!(resp.status, StatusCode::NOT_FOUND);

    let resp = router.dispatch(request(Method::PUT, "/x"), ()).await.unwrap();
    assert_eq!(resp.status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(resp.get_header("allow"), Some("GET, HEAD"));
}

#[tokio::test]
async fn test_dispatch_reuses_valid_request_id_header() {
    let seen = Arc::new(Mutex::new(None));
    let seen_handler = Arc::clone(&seen);
    let mut router: Router = Router::new();
    router
        .get("/id", move |_req: HandlerRequest, ctx: Context<()>| -> HandlerFuture {
            *seen_handler.lock().unwrap() = Some(ctx.request_id());
            Box::pin(future::ready(Ok(HandlerResponse::empty())))
        })
        .unwrap();

    let id = crate::ids::RequestId::new();
    let req = http::Request::builder()
        .uri("/id")
        .header("x-request-id", id.to_string())
        .body(Bytes::new())
        .unwrap();
    router.dispatch(req, ()).await.unwrap();
    assert_eq!(*seen.lock().unwrap(), Some(id));
}

#[test]
fn test_trace_routing_config_keeps_resolution() {
    let mut router: Router = Router::new().with_config(RouterConfig {
        cache_capacity: 16,
        trace_routing: true,
    });
    router.get("/a/:id", reply("a")).unwrap();
    assert!(router.config().trace_routing);
    assert_eq!(router.resolve(&Method::GET, "/a/1").kind(), MatchKind::Dynamic);
    assert_eq!(router.resolve(&Method::GET, "/a/1").kind(), MatchKind::Dynamic);
    assert_eq!(router.cache_len(), 1);
}
