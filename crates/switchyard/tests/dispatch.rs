//! Dispatcher integration tests.

use std::sync::{Arc, Mutex};

use http::{Method, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Map, Value};
use switchyard::prelude::*;
use switchyard::settings::SwitchyardConfig as Config;

type Journal = Arc<Mutex<Vec<String>>>;

async fn body_json(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_text(response: Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn text(value: &'static str) -> Handler {
    Handler::endpoint(endpoint_fn(move |_ctx| {
        Box::pin(async move { Ok(Reply::from(value)) })
    }))
}

fn tracer(label: &'static str, journal: &Journal) -> impl Middleware {
    let journal = Arc::clone(journal);
    middleware_fn(label, move |ctx, next| {
        let journal = Arc::clone(&journal);
        Box::pin(async move {
            journal.lock().unwrap().push(format!("{label}:in"));
            let result = next.run(ctx).await;
            journal.lock().unwrap().push(format!("{label}:out"));
            result
        })
    })
}

/// Records every error it is asked to render.
#[derive(Clone, Default)]
struct RecordingRender {
    seen: Arc<Mutex<Vec<(ErrorKind, String)>>>,
}

impl ExceptionRender for RecordingRender {
    fn render(&self, error: DispatchError) -> Response {
        self.seen
            .lock()
            .unwrap()
            .push((error.kind(), error.message().to_string()));
        JsonExceptionRender::default().render(error)
    }
}

async fn get(dispatcher: &Dispatcher, path: &str) -> Response {
    dispatcher
        .dispatch_parts(path, Map::new(), Method::GET, "localhost")
        .await
}

#[tokio::test]
async fn pattern_constrained_variable() {
    let dispatcher = Dispatcher::builder()
        .routes(|r| {
            r.get(
                "/users/{id}",
                endpoint_fn(|ctx| {
                    Box::pin(async move { Ok(Reply::from(json!({ "id": ctx.param("id") }))) })
                }),
            )
            .pattern("id", r"\d+");
        })
        .build()
        .unwrap();

    let response = get(&dispatcher, "/users/42").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({ "id": "42" }));

    let response = get(&dispatcher, "/users/abc").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn literal_route_wins_over_variable() {
    let dispatcher = Dispatcher::builder()
        .routes(|r| {
            r.get("/a", text("literal"));
            r.get("/{any}", text("variable"));
        })
        .build()
        .unwrap();

    assert_eq!(body_text(get(&dispatcher, "/a").await).await, "literal");
    assert_eq!(body_text(get(&dispatcher, "/b").await).await, "variable");
}

#[tokio::test]
async fn global_then_route_middleware_order() {
    let journal = Journal::default();
    let handler_journal = Arc::clone(&journal);

    let dispatcher = Dispatcher::builder()
        .middleware("Auth", tracer("Auth", &journal))
        .middleware("Log", tracer("Log", &journal))
        .global("Auth")
        .routes(move |r| {
            r.get(
                "/",
                endpoint_fn(move |_ctx| {
                    let journal = Arc::clone(&handler_journal);
                    Box::pin(async move {
                        journal.lock().unwrap().push("handler".to_string());
                        Ok(Reply::from("ok"))
                    })
                }),
            )
            .middleware(["Log"]);
        })
        .build()
        .unwrap();

    let response = get(&dispatcher, "/").await;
    assert_eq!(body_text(response).await, "ok");
    assert_eq!(
        *journal.lock().unwrap(),
        vec!["Auth:in", "Log:in", "handler", "Log:out", "Auth:out"]
    );
}

#[tokio::test]
async fn short_circuit_skips_inner_layers() {
    let journal = Journal::default();
    let handler_journal = Arc::clone(&journal);

    let dispatcher = Dispatcher::builder()
        .middleware(
            "Auth",
            middleware_fn("Auth", |_ctx, _next| {
                Box::pin(async { Err(DispatchError::http(StatusCode::UNAUTHORIZED, "login first")) })
            }),
        )
        .middleware("Log", tracer("Log", &journal))
        .global("Auth")
        .routes(move |r| {
            r.get(
                "/",
                endpoint_fn(move |_ctx| {
                    let journal = Arc::clone(&handler_journal);
                    Box::pin(async move {
                        journal.lock().unwrap().push("handler".to_string());
                        Ok(Reply::empty())
                    })
                }),
            )
            .middleware(["Log"]);
        })
        .build()
        .unwrap();

    let response = get(&dispatcher, "/").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        body_json(response).await,
        json!({ "errCode": 401, "errMsg": "login first", "data": null })
    );
    assert!(journal.lock().unwrap().is_empty());
}

#[tokio::test]
async fn miss_renders_not_found() {
    let render = RecordingRender::default();
    let dispatcher = Dispatcher::builder()
        .routes(|r| {
            r.get("/present", text("here"));
        })
        .render(render.clone())
        .build()
        .unwrap();

    let response = get(&dispatcher, "/missing").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        body_json(response).await,
        json!({ "errCode": 404, "errMsg": "routing resource not found", "data": null })
    );
    assert_eq!(
        *render.seen.lock().unwrap(),
        vec![(ErrorKind::RouteNotFound, "routing resource not found".to_string())]
    );
}

#[tokio::test]
async fn miss_skips_global_middleware() {
    let journal = Journal::default();
    let dispatcher = Dispatcher::builder()
        .middleware("Log", tracer("Log", &journal))
        .global("Log")
        .build()
        .unwrap();

    let response = get(&dispatcher, "/anything").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(journal.lock().unwrap().is_empty());
}

#[tokio::test]
async fn handler_error_rendered_exactly_once() {
    let render = RecordingRender::default();
    let journal = Journal::default();

    let dispatcher = Dispatcher::builder()
        .middleware("Log", tracer("Log", &journal))
        .global("Log")
        .routes(|r| {
            r.post(
                "/orders",
                endpoint_fn(|_ctx| {
                    Box::pin(async { Err(DispatchError::validation("quantity must be positive")) })
                }),
            );
        })
        .render(render.clone())
        .build()
        .unwrap();

    let response = dispatcher
        .dispatch_parts("/orders", Map::new(), Method::POST, "localhost")
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        *render.seen.lock().unwrap(),
        vec![(ErrorKind::Validation, "quantity must be positive".to_string())]
    );
    assert_eq!(*journal.lock().unwrap(), vec!["Log:in", "Log:out"]);
}

#[tokio::test]
async fn internal_errors_hidden_unless_debug() {
    let failing = || {
        endpoint_fn(|_ctx| {
            Box::pin(async {
                Err(DispatchError::internal_with_source(
                    "ledger write failed",
                    anyhow::anyhow!("disk full"),
                ))
            })
        })
    };

    let quiet = Dispatcher::builder()
        .routes(|r| {
            r.get("/", failing());
        })
        .build()
        .unwrap();
    let body = body_json(get(&quiet, "/").await).await;
    assert_eq!(body["errCode"], 500);
    assert_eq!(body["errMsg"], "Internal Server Error");
    assert!(body["data"].is_null());

    let loud = Dispatcher::with_config(Config::development())
        .routes(|r| {
            r.get("/", failing());
        })
        .build()
        .unwrap();
    let body = body_json(get(&loud, "/").await).await;
    assert_eq!(body["errMsg"], "ledger write failed");
    assert!(body["data"]
        .as_array()
        .unwrap()
        .iter()
        .any(|line| line == "disk full"));
}

#[tokio::test]
async fn path_variables_override_seeded_params() {
    let dispatcher = Dispatcher::builder()
        .routes(|r| {
            r.get(
                "/posts/{slug}",
                endpoint_fn(|ctx| {
                    Box::pin(async move {
                        Ok(Reply::from(json!({
                            "slug": ctx.param("slug"),
                            "page": ctx.param("page"),
                        })))
                    })
                }),
            );
        })
        .build()
        .unwrap();

    let mut params = Map::new();
    params.insert("slug".to_string(), json!("from-query"));
    params.insert("page".to_string(), json!(2));

    let response = dispatcher
        .dispatch_parts("/posts/hello", params, Method::GET, "localhost")
        .await;
    assert_eq!(
        body_json(response).await,
        json!({ "slug": "hello", "page": 2 })
    );
}

#[tokio::test]
async fn matched_route_visible_to_middleware() {
    let dispatcher = Dispatcher::builder()
        .middleware(
            "inspect",
            middleware_fn("inspect", |ctx, next| {
                Box::pin(async move {
                    let info = ctx.get_extension::<MatchedRoute>().map(|m| {
                        (
                            m.template.clone(),
                            m.suffix.clone(),
                            m.definition.params().clone(),
                        )
                    });
                    let Some((template, suffix, rules)) = info else {
                        return Err(DispatchError::internal("no matched route"));
                    };
                    if rules.get("id").is_none() {
                        return Err(DispatchError::validation("missing rule"));
                    }
                    let reply = next.run(ctx).await?;
                    Ok(Reply::from(json!({
                        "template": template,
                        "suffix": suffix,
                        "inner": reply.as_value().cloned(),
                    })))
                })
            }),
        )
        .routes(|r| {
            let mut rules = Map::new();
            rules.insert("id".to_string(), json!("required|integer"));
            r.get("/items/{id}", text("item"))
                .middleware(["inspect"])
                .params(rules);
        })
        .build()
        .unwrap();

    let body = body_json(get(&dispatcher, "/items/7.json").await).await;
    assert_eq!(
        body,
        json!({ "template": "/items/{id}", "suffix": "json", "inner": "item" })
    );
}

#[tokio::test]
async fn controller_actions_resolved_at_build() {
    struct Users;

    impl Controller for Users {
        fn action(&self, name: &str) -> Option<Arc<dyn Endpoint>> {
            match name {
                "show" => Some(Arc::new(endpoint_fn(|ctx| {
                    Box::pin(async move {
                        let id = ctx.param_str("id").unwrap_or_default().to_string();
                        Ok(Reply::from(format!("user {id}")))
                    })
                }))),
                _ => None,
            }
        }
    }

    let dispatcher = Dispatcher::builder()
        .controller("Users", Users)
        .routes(|r| {
            r.get("/users/{id}", "Users@show");
        })
        .build()
        .unwrap();
    assert_eq!(body_text(get(&dispatcher, "/users/9").await).await, "user 9");

    let err = Dispatcher::builder()
        .controller("Users", Users)
        .routes(|r| {
            r.get("/users", "Users::index");
        })
        .build()
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
}

#[tokio::test]
async fn unknown_global_middleware_fails_build() {
    let err = Dispatcher::builder().global("Missing").build().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
    assert!(err.message().contains("Missing"));
}

#[tokio::test]
async fn config_shapes_routes_and_not_found() {
    let mut config = Config::default();
    config.router.domain = vec!["*.example.com".to_string()];
    config.router.suffix = vec!["html".to_string(), String::new()];
    config.dispatch.not_found_message = "no such page".to_string();

    let dispatcher = Dispatcher::with_config(config)
        .routes(|r| {
            r.get("/about", text("about"));
        })
        .build()
        .unwrap();

    let hit = dispatcher
        .dispatch_parts("/about.html", Map::new(), Method::GET, "www.example.com:8080")
        .await;
    assert_eq!(body_text(hit).await, "about");

    let wrong_suffix = dispatcher
        .dispatch_parts("/about.php", Map::new(), Method::GET, "www.example.com")
        .await;
    assert_eq!(wrong_suffix.status(), StatusCode::NOT_FOUND);

    let wrong_host = dispatcher
        .dispatch_parts("/about", Map::new(), Method::GET, "example.org")
        .await;
    assert_eq!(body_json(wrong_host).await["errMsg"], "no such page");
}

#[tokio::test]
async fn custom_fallback_replaces_not_found() {
    let dispatcher = Dispatcher::builder()
        .fallback(endpoint_fn(|ctx| {
            Box::pin(async move { Ok(Reply::from(format!("nothing at {}", ctx.path()))) })
        }))
        .build()
        .unwrap();

    let response = get(&dispatcher, "/gone").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "nothing at /gone");
}

#[tokio::test]
async fn try_dispatch_returns_raw_error() {
    let dispatcher = Dispatcher::builder().build().unwrap();
    let mut ctx = RequestContext::new(Method::DELETE, "localhost", "/x");

    let err = dispatcher.try_dispatch(&mut ctx).await.unwrap_err();
    match err {
        DispatchError::RouteNotFound { method, path, .. } => {
            assert_eq!(method, "DELETE");
            assert_eq!(path, "/x");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn method_mismatch_is_a_miss() {
    let dispatcher = Dispatcher::builder()
        .routes(|r| {
            r.post("/submit", text("posted"));
        })
        .build()
        .unwrap();

    assert!(!dispatcher
        .match_route("/submit", &Method::GET, "localhost")
        .is_found());
    assert_eq!(get(&dispatcher, "/submit").await.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn dispatcher_is_shareable_across_tasks() {
    let dispatcher = Arc::new(
        Dispatcher::builder()
            .routes(|r| {
                r.get("/n/{n}", endpoint_fn(|ctx| {
                    Box::pin(async move {
                        Ok(Reply::from(ctx.param_str("n").unwrap_or_default().to_string()))
                    })
                }))
                .pattern("n", r"\d+");
            })
            .build()
            .unwrap(),
    );

    let tasks: Vec<_> = (0..8)
        .map(|i| {
            let dispatcher = Arc::clone(&dispatcher);
            tokio::spawn(async move { body_text(get(&dispatcher, &format!("/n/{i}")).await).await })
        })
        .collect();

    for (i, task) in tasks.into_iter().enumerate() {
        assert_eq!(task.await.unwrap(), i.to_string());
    }
}
