//! Building canonical problem documents from explicit caller-supplied parts
//! or from caught generic errors.
//!
//! Path (a), [`ProblemConverter::from_parts`], serves application code that
//! says "return a 404 with this detail". Path (b),
//! [`ProblemConverter::from_error`], is the last line of defense for
//! uncaught errors: it is total, never fails, and falls closed to a 500
//! server error rather than dropping the event.

use std::sync::Arc;

use http::StatusCode;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::ProblemConfig;
use crate::problem::{checked_status, Problem, ProblemError, ABOUT_BLANK};
use crate::registry::ProblemTypeRegistry;
use crate::status;

/// Replacement detail for sanitized 5xx conversions in production.
pub const UNEXPECTED_ERROR_DETAIL: &str = "An unexpected error occurred";

/// One field-level validation failure carried by a caught error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationViolation {
    /// Field path, e.g. "email" or "user.email".
    pub field: String,
    /// Human-readable message describing the failure.
    pub message: String,
    /// Machine-readable rule identifier of the failed constraint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyword: Option<String>,
}

/// Caller-supplied fields for explicit problem construction.
///
/// Everything beyond the reserved fields lands in `extensions`, in
/// insertion order. `cause` never becomes an extension; it only feeds the
/// optional stack-trace attachment.
#[derive(Debug, Default)]
pub struct ProblemParts {
    /// Registered problem-type name, or a literal type URI.
    pub type_ref: Option<String>,
    pub title: Option<String>,
    pub detail: Option<String>,
    pub instance: Option<String>,
    pub extensions: IndexMap<String, Value>,
    pub cause: Option<CaughtError>,
}

impl ProblemParts {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_type(mut self, type_ref: impl Into<String>) -> Self {
        self.type_ref = Some(type_ref.into());
        self
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    #[must_use]
    pub fn with_instance(mut self, instance: impl Into<String>) -> Self {
        self.instance = Some(instance.into());
        self
    }

    #[must_use]
    pub fn with_extension(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extensions.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_cause(mut self, cause: CaughtError) -> Self {
        self.cause = Some(cause);
        self
    }
}

/// A generic error caught by a top-level handler, normalized to the fields
/// the converter cares about.
#[derive(Debug, Clone, Default)]
pub struct CaughtError {
    /// The error's message, used as `detail` unless sanitized away.
    pub message: String,
    /// Error-carried HTTP status, when the error knows one.
    pub status: Option<u16>,
    /// Application error code, attached as the `code` extension.
    pub code: Option<String>,
    /// Field-level validation failures, attached as the `errors` extension.
    pub validation: Vec<ValidationViolation>,
    /// Pre-rendered trace text, attached as the `stack` extension when the
    /// stack-trace policy allows.
    pub backtrace: Option<String>,
}

impl CaughtError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Self::default()
        }
    }

    /// Normalize a standard error, rendering its source chain as the trace
    /// text.
    #[must_use]
    pub fn from_std(error: &(dyn std::error::Error + 'static)) -> Self {
        let mut chain = Vec::new();
        let mut source = error.source();
        while let Some(err) = source {
            chain.push(format!("caused by: {err}"));
            source = err.source();
        }
        Self {
            message: error.to_string(),
            backtrace: (!chain.is_empty()).then(|| chain.join("\n")),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    #[must_use]
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    #[must_use]
    pub fn with_violation(mut self, violation: ValidationViolation) -> Self {
        self.validation.push(violation);
        self
    }

    #[must_use]
    pub fn with_backtrace(mut self, backtrace: impl Into<String>) -> Self {
        self.backtrace = Some(backtrace.into());
        self
    }
}

/// Turns explicit parts or caught errors into canonical problem documents,
/// applying type/title defaulting, instance defaulting and the production
/// sanitization policy.
#[derive(Debug, Clone)]
pub struct ProblemConverter {
    config: ProblemConfig,
    registry: Arc<ProblemTypeRegistry>,
}

impl ProblemConverter {
    #[must_use]
    pub fn new(config: ProblemConfig, registry: Arc<ProblemTypeRegistry>) -> Self {
        Self { config, registry }
    }

    #[must_use]
    pub fn config(&self) -> &ProblemConfig {
        &self.config
    }

    #[must_use]
    pub fn registry(&self) -> &Arc<ProblemTypeRegistry> {
        &self.registry
    }

    /// Default type URI for a status: per-deployment slug override, else
    /// the built-in slug, prefixed with the base URL when one is
    /// configured.
    fn type_uri_for(&self, status: u16) -> String {
        let Some(base) = &self.config.base_url else {
            return ABOUT_BLANK.to_owned();
        };
        match self.config.type_map.get(&status) {
            Some(slug) => format!("{base}/{slug}"),
            None => format!("{base}/{}", status::slug(status)),
        }
    }

    /// Default title for a status: per-deployment override, else the title
    /// table in the configured language.
    fn title_for(&self, status: u16) -> String {
        match self.config.title_map.get(&status) {
            Some(title) => title.clone(),
            None => status::title(status, &self.config.default_language).to_owned(),
        }
    }

    /// Path (a): build a document from explicit caller-supplied parts.
    ///
    /// `status` must be a valid problem status. A `type_ref` naming a
    /// registered problem type resolves to that entry's type URI and title
    /// (a caller-supplied title still wins); any other `type_ref` is used
    /// verbatim. `instance` defaults to the request path; callers that do
    /// not know the path yet pass `None` and default it later.
    pub fn from_parts(
        &self,
        status: u16,
        parts: ProblemParts,
        request_path: Option<&str>,
    ) -> Result<Problem, ProblemError> {
        let status_code = checked_status(status)?;

        let (type_url, title) = match parts.type_ref {
            Some(type_ref) => match self.registry.resolve(&type_ref) {
                Some(entry) => (entry.type_url, parts.title.or(Some(entry.title))),
                None => (type_ref, parts.title),
            },
            None => (self.type_uri_for(status), parts.title),
        };

        let mut problem = Problem::for_status(status_code)
            .with_type(type_url)
            .with_title(title.unwrap_or_else(|| self.title_for(status)));
        if let Some(instance) = parts.instance.or_else(|| request_path.map(ToOwned::to_owned)) {
            problem = problem.with_instance(instance);
        }
        if let Some(detail) = parts.detail {
            problem = problem.with_detail(detail);
        }
        problem = problem.with_extensions(parts.extensions);

        if self.config.stack_traces_enabled() {
            if let Some(trace) = parts.cause.and_then(|cause| cause.backtrace) {
                problem = problem.with_extension("stack", trace);
            }
        }

        Ok(problem)
    }

    /// Path (b): convert a caught generic error. Total over all inputs; an
    /// error without a usable status code becomes a 500.
    pub fn from_error(&self, error: &CaughtError, request_path: &str) -> Problem {
        let status = error
            .status
            .filter(|s| status::is_valid_problem_status(*s))
            .unwrap_or(500);
        let status_code =
            StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let sanitized = self.config.production
            && self.config.sanitize_production
            && status::is_server_error(status);
        let detail = if sanitized {
            UNEXPECTED_ERROR_DETAIL.to_owned()
        } else {
            error.message.clone()
        };

        if status::is_server_error(status) {
            tracing::error!(status, error = %error.message, "converted uncaught error to problem");
        }

        let mut problem = Problem::for_status(status_code)
            .with_type(self.type_uri_for(status))
            .with_title(self.title_for(status))
            .with_instance(request_path)
            .with_detail(detail);

        if !error.validation.is_empty() {
            let errors = serde_json::to_value(&error.validation).unwrap_or_default();
            problem = problem.with_extension("errors", errors);
        }
        if self.config.stack_traces_enabled() && !self.config.production {
            if let Some(trace) = &error.backtrace {
                problem = problem.with_extension("stack", trace.clone());
            }
        }
        if let Some(code) = &error.code {
            problem = problem.with_extension("code", code.clone());
        }

        problem
    }
}
