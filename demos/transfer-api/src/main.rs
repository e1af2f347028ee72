//! Example service showing the problemkit engine end to end: per-status
//! sugar, registered problem types with extension fields, automatic
//! conversion of uncaught errors and XML negotiation.
//!
//! Try it:
//!
//! ```text
//! curl -i http://127.0.0.1:8080/users/42
//! curl -i -X POST http://127.0.0.1:8080/transfer
//! curl -i -H 'Accept: application/problem+xml' http://127.0.0.1:8080/users/42
//! curl -i http://127.0.0.1:8080/boom
//! ```

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use tracing_subscriber::EnvFilter;

use problemkit::{Problem, ProblemConfig, ProblemHook, ProblemParts, ProblemTypeConfig};
use problemkit_axum::{problem_middleware, ProblemEngine};

async fn get_user(State(engine): State<ProblemEngine>, Path(id): Path<u64>) -> Response {
    // No storage behind this demo; every lookup misses.
    engine
        .problem(
            404,
            ProblemParts::new()
                .with_detail(format!("User {id} not found"))
                .with_extension("userId", id),
        )
        .map_or_else(
            |e| Problem::internal_server_error(e.to_string()).into_response(),
            IntoResponse::into_response,
        )
}

async fn transfer(State(engine): State<ProblemEngine>) -> Response {
    engine
        .problem(
            403,
            ProblemParts::new()
                .with_type("insufficient-funds")
                .with_detail("Your balance is 30, but the transfer requires 50")
                .with_extension("balance", 30)
                .with_extension("required", 50),
        )
        .map_or_else(
            |e| Problem::internal_server_error(e.to_string()).into_response(),
            IntoResponse::into_response,
        )
}

async fn rate_limited() -> Problem {
    Problem::too_many_requests("Rate limit exceeded").with_extension("retryAfter", 60)
}

/// A plain error response; the middleware converts it into a problem
/// document.
async fn boom() -> (StatusCode, &'static str) {
    (StatusCode::INTERNAL_SERVER_ERROR, "db exploded")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let hook: ProblemHook = Arc::new(|problem, context| {
        let status = problem.status.as_u16();
        let method = context.method.clone();
        let path = context.path.clone();
        Box::pin(async move {
            tracing::info!(status, %method, %path, "problem response");
            Ok(())
        })
    });

    let config = ProblemConfig::from_env()
        .with_base_url("https://api.example.com/errors")
        .with_xml_support(true)
        .with_hook(hook);
    let engine = ProblemEngine::new(config);
    engine.register_problem_type(
        "insufficient-funds",
        ProblemTypeConfig {
            status: 403,
            title: "Insufficient Funds".to_owned(),
            type_url: None,
        },
    );

    let app = Router::new()
        .route("/users/{id}", get(get_user))
        .route("/transfer", post(transfer))
        .route("/limited", get(rate_limited))
        .route("/boom", get(boom))
        .layer(middleware::from_fn_with_state(
            engine.clone(),
            problem_middleware,
        ))
        .with_state(engine);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:8080").await?;
    tracing::info!("transfer-api listening on http://127.0.0.1:8080");
    axum::serve(listener, app).await?;
    Ok(())
}
