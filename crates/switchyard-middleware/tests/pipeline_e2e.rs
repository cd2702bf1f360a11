//! End-to-end pipeline integration tests.
//!
//! These tests resolve named middleware through a registry, combine the
//! global list with a route list and run the result around an endpoint:
//!
//! 1. Ordering - global then route, outer to inner
//! 2. Short-circuit - an early return stops inner layers and the endpoint
//! 3. Post-processing - outer layers see and transform inner replies
//! 4. Failures - endpoint errors reach every guarded layer unchanged
//! 5. Registration - unknown references fail before first use

use std::sync::{Arc, Mutex};

use serde_json::json;
use switchyard_core::{
    endpoint_fn, BoxFuture, DispatchError, DispatchResult, ErrorKind, Reply, RequestContext,
};
use switchyard_middleware::{
    GlobalMiddleware, Middleware, MiddlewareRef, MiddlewareRegistry, Next, Pipeline,
};

type Journal = Arc<Mutex<Vec<String>>>;

/// Records entry and exit of each layer, and any error seen from `next`.
struct Recorder {
    label: &'static str,
    journal: Journal,
}

impl Recorder {
    fn new(label: &'static str, journal: &Journal) -> Self {
        Self {
            label,
            journal: Arc::clone(journal),
        }
    }

    fn log(&self, event: impl Into<String>) {
        self.journal.lock().unwrap().push(event.into());
    }
}

impl Middleware for Recorder {
    fn name(&self) -> &'static str {
        self.label
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut RequestContext,
        next: Next<'a>,
    ) -> BoxFuture<'a, DispatchResult<Reply>> {
        Box::pin(async move {
            self.log(format!("{}:in", self.label));
            let result = next.run(ctx).await;
            match &result {
                Ok(_) => self.log(format!("{}:out", self.label)),
                Err(err) => self.log(format!("{}:err:{}", self.label, err.message())),
            }
            result
        })
    }
}

/// Returns without running the rest of the chain.
struct Gate;

impl Middleware for Gate {
    fn name(&self) -> &'static str {
        "gate"
    }

    fn process<'a>(
        &'a self,
        _ctx: &'a mut RequestContext,
        _next: Next<'a>,
    ) -> BoxFuture<'a, DispatchResult<Reply>> {
        Box::pin(async { Err(DispatchError::http(http::StatusCode::UNAUTHORIZED, "denied")) })
    }
}

fn registry(journal: &Journal) -> MiddlewareRegistry {
    let mut registry = MiddlewareRegistry::new();
    registry.register("Auth", Recorder::new("Auth", journal));
    registry.register("Log", Recorder::new("Log", journal));
    registry.register("Gate", Gate);
    registry
}

fn build(journal: &Journal, global: &[&str], route: &[&str]) -> Pipeline {
    let mut registry = registry(journal);
    let mut globals = GlobalMiddleware::new();
    for name in global {
        globals.add(*name);
    }
    let global = globals.init(&mut registry).unwrap();

    let route_refs: Vec<MiddlewareRef> = route.iter().map(|name| (*name).into()).collect();
    let route = registry.resolve_all(&route_refs).unwrap();
    global.then(&route)
}

fn journal() -> Journal {
    Arc::new(Mutex::new(Vec::new()))
}

fn entries(journal: &Journal) -> Vec<String> {
    journal.lock().unwrap().clone()
}

#[tokio::test]
async fn test_global_runs_before_route_middleware() {
    let journal = journal();
    let pipeline = build(&journal, &["Auth"], &["Log"]);
    assert_eq!(pipeline.stage_names(), vec!["Auth", "Log"]);

    let trail = Arc::clone(&journal);
    let endpoint = endpoint_fn(move |_ctx| {
        trail.lock().unwrap().push("handler".to_string());
        Box::pin(async { Ok(Reply::from("ok")) })
    });

    let mut ctx = RequestContext::mock();
    let reply = pipeline.execute(&mut ctx, &endpoint).await.unwrap();

    assert_eq!(reply.as_value(), Some(&json!("ok")));
    assert_eq!(
        entries(&journal),
        vec!["Auth:in", "Log:in", "handler", "Log:out", "Auth:out"]
    );
}

#[tokio::test]
async fn test_short_circuit_prevents_inner_layers() {
    let journal = journal();
    let pipeline = build(&journal, &["Auth", "Gate"], &["Log"]);

    let trail = Arc::clone(&journal);
    let endpoint = endpoint_fn(move |_ctx| {
        trail.lock().unwrap().push("handler".to_string());
        Box::pin(async { Ok(Reply::from("ok")) })
    });

    let mut ctx = RequestContext::mock();
    let err = pipeline.execute(&mut ctx, &endpoint).await.unwrap_err();

    assert_eq!(err.status_code(), http::StatusCode::UNAUTHORIZED);
    assert_eq!(entries(&journal), vec!["Auth:in", "Auth:err:denied"]);
}

#[tokio::test]
async fn test_outer_layer_post_processes_reply() {
    let wrap = switchyard_middleware::middleware_fn("wrap", |ctx, next| {
        Box::pin(async move {
            let reply = next.run(ctx).await?;
            let inner = reply.as_value().cloned().unwrap_or_default();
            Ok(Reply::from(json!({ "data": inner })))
        })
    });
    let pipeline = Pipeline::builder().add(wrap).build();
    let endpoint = endpoint_fn(|_ctx| Box::pin(async { Ok(Reply::from(json!([1, 2]))) }));

    let mut ctx = RequestContext::mock();
    let reply = pipeline.execute(&mut ctx, &endpoint).await.unwrap();
    assert_eq!(reply.as_value(), Some(&json!({ "data": [1, 2] })));
}

#[tokio::test]
async fn test_endpoint_failure_seen_unchanged_by_every_layer() {
    let journal = journal();
    let pipeline = build(&journal, &["Auth"], &["Log"]);
    let endpoint = endpoint_fn(|_ctx| {
        Box::pin(async { Err(DispatchError::validation("name is required")) })
    });

    let mut ctx = RequestContext::mock();
    let err = pipeline.execute(&mut ctx, &endpoint).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(err.message(), "name is required");
    assert_eq!(
        entries(&journal),
        vec![
            "Auth:in",
            "Log:in",
            "Log:err:name is required",
            "Auth:err:name is required"
        ]
    );
}

#[tokio::test]
async fn test_context_changes_flow_inward() {
    let stamp = switchyard_middleware::middleware_fn("stamp", |ctx, next| {
        Box::pin(async move {
            ctx.set_param("tenant", "acme");
            next.run(ctx).await
        })
    });
    let pipeline = Pipeline::builder().add(stamp).build();
    let endpoint = endpoint_fn(|ctx| {
        Box::pin(async move {
            let tenant = ctx.param_str("tenant").unwrap_or_default().to_string();
            Ok(Reply::from(tenant))
        })
    });

    let mut ctx = RequestContext::mock();
    let reply = pipeline.execute(&mut ctx, &endpoint).await.unwrap();
    assert_eq!(reply.as_value(), Some(&json!("acme")));
}

#[test]
fn test_unknown_global_reference_fails_init() {
    let journal = journal();
    let mut registry = registry(&journal);
    let mut global = GlobalMiddleware::new();
    global.add("Auth");
    global.add("App\\Missing");

    let err = global.init(&mut registry).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
    assert!(err.message().contains("App\\Missing"));
}

#[test]
fn test_shared_instance_across_routes() {
    let journal = journal();
    let mut registry = registry(&journal);

    let first = registry.resolve(&"Log".into()).unwrap();
    let second = registry.resolve(&"Log".into()).unwrap();
    assert!(Arc::ptr_eq(&first, &second));
}
