//! Centralized problem finalization middleware.
//!
//! Handlers return a `Problem` (or any error response); this middleware
//! turns it into the final wire form: it defaults the `instance` to the
//! request path, awaits the observation hook, negotiates JSON vs XML from
//! the Accept header and serializes the document. Error responses produced
//! by the framework itself (rejections, fallbacks) are converted into
//! problem documents when `convert_framework_errors` is enabled.
//!
//! Install with request state:
//!
//! ```ignore
//! let app = Router::new()
//!     .route("/users/{id}", get(handler))
//!     .layer(middleware::from_fn_with_state(engine.clone(), problem_middleware));
//! ```

use axum::{
    body::Body,
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use http::{header, HeaderValue, Method};

use problemkit::{
    negotiate_content_type, serialize, status, CaughtError, Problem, ProblemContext,
};

use crate::engine::ProblemEngine;

/// Upper bound on how much of a framework error body is read back for
/// conversion.
const MAX_CONVERT_BODY: usize = 8 * 1024;

/// Middleware that finalizes problem responses and converts framework
/// errors.
pub async fn problem_middleware(
    State(engine): State<ProblemEngine>,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let path = request
        .uri()
        .path_and_query()
        .map_or_else(|| request.uri().path().to_owned(), |pq| pq.as_str().to_owned());
    let accept = request
        .headers()
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .map(ToOwned::to_owned);

    let mut response = next.run(request).await;

    // A handler returned a Problem: its IntoResponse stashed the document
    // in the response extensions for us to finalize.
    if let Some(problem) = response.extensions_mut().remove::<Problem>() {
        return send_problem(&engine, problem, &method, &path, accept.as_deref()).await;
    }

    let status_code = response.status();
    if engine.config().convert_framework_errors
        && status::is_valid_problem_status(status_code.as_u16())
        && !is_problem_response(&response)
    {
        let message = read_error_message(response).await.unwrap_or_else(|| {
            status::title(status_code.as_u16(), &engine.config().default_language).to_owned()
        });
        let error = CaughtError::new(message).with_status(status_code.as_u16());
        let problem = engine.converter().from_error(&error, &path);
        return send_problem(&engine, problem, &method, &path, accept.as_deref()).await;
    }

    response
}

/// Check if a response already carries a problem media type.
fn is_problem_response(response: &Response) -> bool {
    response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.contains("application/problem+"))
}

/// Bounded read of an error response body, used as the converted error's
/// message. `None` when the body is empty, oversized or unreadable.
async fn read_error_message(response: Response) -> Option<String> {
    let body = response.into_body();
    let bytes = axum::body::to_bytes(body, MAX_CONVERT_BODY).await.ok()?;
    let text = String::from_utf8_lossy(&bytes).trim().to_owned();
    (!text.is_empty()).then_some(text)
}

/// Finalize one problem document into the outgoing response: instance
/// defaulting, observation hook, negotiation, serialization.
async fn send_problem(
    engine: &ProblemEngine,
    mut problem: Problem,
    method: &Method,
    path: &str,
    accept: Option<&str>,
) -> Response {
    if problem.instance.is_none() {
        problem = problem.with_instance(path);
    }

    // The hook sees the document before the client does. Its failure is
    // logged and discarded; it never blocks or fails the response.
    if let Some(hook) = &engine.config().on_problem {
        let context = ProblemContext {
            method: method.clone(),
            path: path.to_owned(),
        };
        if let Err(error) = hook(&problem, &context).await {
            tracing::warn!(%error, "problem observation hook failed");
        }
    }

    let format = negotiate_content_type(accept, engine.config().support_xml);
    let (body, content_type) = serialize(&problem, format);

    let mut response = Response::new(Body::from(body));
    *response.status_mut() = problem.status;
    response
        .headers_mut()
        .insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
    response
}
