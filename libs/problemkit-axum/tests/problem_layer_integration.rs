#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Integration tests for the problem middleware, exercised through a real
//! Axum router without touching private implementation details.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use parking_lot::Mutex;
use tower::ServiceExt; // for oneshot

use problemkit_axum::{
    problem_middleware, Problem, ProblemConfig, ProblemEngine, ProblemParts, ProblemTypeConfig,
};

/// Wire the middleware the way an application would.
fn app(engine: ProblemEngine, router: Router<ProblemEngine>) -> Router {
    router
        .layer(middleware::from_fn_with_state(
            engine.clone(),
            problem_middleware,
        ))
        .with_state(engine)
}

async fn body_json(response: Response) -> serde_json::Map<String, serde_json::Value> {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("failed to read body");
    serde_json::from_slice(&bytes).expect("failed to parse problem JSON")
}

async fn body_text(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("failed to read body");
    String::from_utf8(bytes.to_vec()).expect("body is not UTF-8")
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn engine_problem_gets_status_type_title_and_instance() {
    let engine = ProblemEngine::new(
        ProblemConfig::default().with_base_url("https://api.example.com/errors"),
    );

    async fn handler(State(engine): State<ProblemEngine>) -> Response {
        engine
            .problem(404, ProblemParts::new().with_detail("User not found"))
            .map_or_else(|e| e.to_string().into_response(), IntoResponse::into_response)
    }

    let app = app(engine, Router::new().route("/users/{id}", get(handler)));
    let response = app.oneshot(get_request("/users/123")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    assert_eq!(content_type, "application/problem+json");

    let body = body_json(response).await;
    let keys: Vec<&str> = body.keys().map(String::as_str).collect();
    assert_eq!(keys, ["type", "title", "status", "detail", "instance"]);
    assert_eq!(body["type"], "https://api.example.com/errors/not-found");
    assert_eq!(body["title"], "Not Found");
    assert_eq!(body["status"], 404);
    assert_eq!(body["detail"], "User not found");
    assert_eq!(body["instance"], "/users/123");
}

#[tokio::test]
async fn registered_problem_type_resolves_end_to_end() {
    let engine = ProblemEngine::new(
        ProblemConfig::default().with_base_url("https://api.example.com/errors"),
    );
    engine.register_problem_type(
        "insufficient-funds",
        ProblemTypeConfig {
            status: 403,
            title: "Insufficient Funds".to_owned(),
            type_url: None,
        },
    );

    async fn handler(State(engine): State<ProblemEngine>) -> Response {
        engine
            .problem(
                403,
                ProblemParts::new()
                    .with_type("insufficient-funds")
                    .with_detail("Your balance is 30, but the transfer requires 50")
                    .with_extension("balance", 30)
                    .with_extension("required", 50),
            )
            .map_or_else(|e| e.to_string().into_response(), IntoResponse::into_response)
    }

    let app = app(engine, Router::new().route("/transfer", post(handler)));
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/transfer")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = body_json(response).await;
    assert_eq!(body["type"], "https://api.example.com/errors/insufficient-funds");
    assert_eq!(body["title"], "Insufficient Funds");
    assert_eq!(body["balance"], 30);
    assert_eq!(body["required"], 50);
}

#[tokio::test]
async fn title_override_wins_over_builtin_table() {
    let engine = ProblemEngine::new(
        ProblemConfig::default().with_title_override(404, "Risorsa non trovata"),
    );

    async fn handler(State(engine): State<ProblemEngine>) -> Response {
        engine
            .problem(404, ProblemParts::new())
            .map_or_else(|e| e.to_string().into_response(), IntoResponse::into_response)
    }

    let app = app(engine, Router::new().route("/test", get(handler)));
    let response = app.oneshot(get_request("/test")).await.unwrap();
    let body = body_json(response).await;
    assert_eq!(body["title"], "Risorsa non trovata");
}

#[tokio::test]
async fn per_status_sugar_is_finalized_by_the_middleware() {
    let engine = ProblemEngine::new(ProblemConfig::default());

    async fn handler() -> Problem {
        Problem::unprocessable_entity("Not enough stock")
            .with_extension("available", 5)
            .with_extension("requested", 10)
    }

    let app = app(engine, Router::new().route("/orders", post(handler)));
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/orders")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(response).await;
    assert_eq!(body["title"], "Unprocessable Content");
    assert_eq!(body["type"], "about:blank");
    assert_eq!(body["instance"], "/orders");
    assert_eq!(body["available"], 5);
    assert_eq!(body["requested"], 10);
}

#[tokio::test]
async fn xml_is_negotiated_when_enabled() {
    let engine = ProblemEngine::new(ProblemConfig::default().with_xml_support(true));

    async fn handler() -> Problem {
        Problem::not_found("Not found")
    }

    let app = app(engine, Router::new().route("/test", get(handler)));
    let response = app
        .oneshot(
            Request::builder()
                .uri("/test")
                .header("accept", "application/problem+xml")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    assert_eq!(content_type, "application/problem+xml");

    let body = body_text(response).await;
    assert!(body.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
    assert!(body.contains("<problem xmlns=\"urn:ietf:rfc:9457\">"));
    assert!(body.contains("<detail>Not found</detail>"));
}

#[tokio::test]
async fn xml_accept_is_ignored_when_support_is_off() {
    let engine = ProblemEngine::new(ProblemConfig::default());

    async fn handler() -> Problem {
        Problem::not_found("Not found")
    }

    let app = app(engine, Router::new().route("/test", get(handler)));
    let response = app
        .oneshot(
            Request::builder()
                .uri("/test")
                .header("accept", "application/problem+xml")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    assert_eq!(content_type, "application/problem+json");
}

#[tokio::test]
async fn framework_error_responses_are_converted() {
    let engine = ProblemEngine::new(
        ProblemConfig::default().with_base_url("https://api.example.com/errors"),
    );

    async fn handler() -> (StatusCode, &'static str) {
        (StatusCode::BAD_REQUEST, "Invalid payload")
    }

    let app = app(engine, Router::new().route("/users", post(handler)));
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/users")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["type"], "https://api.example.com/errors/bad-request");
    assert_eq!(body["status"], 400);
    assert_eq!(body["detail"], "Invalid payload");
    assert_eq!(body["instance"], "/users");
}

#[tokio::test]
async fn router_fallback_404_becomes_a_problem() {
    let engine = ProblemEngine::new(ProblemConfig::default());
    let app = app(engine, Router::new());

    let response = app.oneshot(get_request("/missing")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["status"], 404);
    assert_eq!(body["title"], "Not Found");
}

#[tokio::test]
async fn successful_responses_pass_through_untouched() {
    let engine = ProblemEngine::new(ProblemConfig::default());

    async fn handler() -> &'static str {
        "all good"
    }

    let app = app(engine, Router::new().route("/ok", get(handler)));
    let response = app.oneshot(get_request("/ok")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "all good");
}

#[tokio::test]
async fn conversion_can_be_disabled() {
    let mut config = ProblemConfig::default();
    config.convert_framework_errors = false;
    let engine = ProblemEngine::new(config);

    async fn handler() -> (StatusCode, &'static str) {
        (StatusCode::BAD_REQUEST, "plain text error")
    }

    let app = app(engine, Router::new().route("/raw", get(handler)));
    let response = app.oneshot(get_request("/raw")).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_text(response).await, "plain text error");
}

#[tokio::test]
async fn production_sanitizes_converted_server_errors() {
    let engine = ProblemEngine::new(ProblemConfig::default().with_production(true));

    async fn handler() -> (StatusCode, &'static str) {
        (StatusCode::INTERNAL_SERVER_ERROR, "db exploded")
    }

    let app = app(engine, Router::new().route("/jobs", get(handler)));
    let response = app.oneshot(get_request("/jobs")).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert_eq!(body["detail"], "An unexpected error occurred");
}

#[tokio::test]
async fn hook_observes_every_problem_before_it_is_sent() {
    let seen: Arc<Mutex<Vec<(u16, String)>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let hook: problemkit::ProblemHook = Arc::new(move |problem, context| {
        let sink = Arc::clone(&sink);
        let status = problem.status.as_u16();
        let path = context.path.clone();
        Box::pin(async move {
            sink.lock().push((status, path));
            Ok(())
        })
    });

    let engine = ProblemEngine::new(ProblemConfig::default().with_hook(hook));

    async fn not_found() -> Problem {
        Problem::not_found("a")
    }
    async fn bad_request() -> Problem {
        Problem::bad_request("b")
    }

    let app = app(
        engine,
        Router::new()
            .route("/a", get(not_found))
            .route("/b", get(bad_request)),
    );

    let response = app.clone().oneshot(get_request("/a")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let response = app.oneshot(get_request("/b")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let seen = seen.lock();
    assert_eq!(*seen, vec![(404, "/a".to_owned()), (400, "/b".to_owned())]);
}

#[tokio::test]
async fn hook_failure_never_fails_the_response() {
    let hook: problemkit::ProblemHook = Arc::new(|_problem, _context| {
        Box::pin(async { Err(anyhow::anyhow!("observer exploded")) })
    });
    let engine = ProblemEngine::new(ProblemConfig::default().with_hook(hook));

    async fn handler() -> Problem {
        Problem::not_found("still delivered")
    }

    let app = app(engine, Router::new().route("/test", get(handler)));
    let response = app.oneshot(get_request("/test")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["detail"], "still delivered");
}

#[tokio::test]
async fn problem_is_valid_json_even_without_the_middleware() {
    async fn handler() -> Problem {
        Problem::not_found("bare").with_instance("/bare")
    }

    let app: Router = Router::new().route("/bare", get(handler));
    let response = app.oneshot(get_request("/bare")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    assert_eq!(content_type, "application/problem+json");
    let body = body_json(response).await;
    assert_eq!(body["detail"], "bare");
    assert_eq!(body["instance"], "/bare");
}
