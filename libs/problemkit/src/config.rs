//! Engine configuration and the observation hook contract.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use futures::future::BoxFuture;
use http::Method;
use serde::Deserialize;

use crate::problem::Problem;

/// Request context handed to the observation hook alongside the finished
/// document.
#[derive(Debug, Clone)]
pub struct ProblemContext {
    pub method: Method,
    pub path: String,
}

/// Observation hook invoked with every finished problem document before it
/// is serialized and sent.
///
/// Best-effort from the perspective of response delivery: the caller awaits
/// the hook (the hook sees the document before the client does) but an
/// `Err` is logged and discarded, never surfacing to the response.
pub type ProblemHook =
    Arc<dyn for<'a> Fn(&'a Problem, &'a ProblemContext) -> BoxFuture<'a, anyhow::Result<()>> + Send + Sync>;

/// Setup-time options for the problem engine.
///
/// Plain serde struct so an embedding application can load it from its own
/// configuration layer; the hook is attached programmatically.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct ProblemConfig {
    /// Prefix for synthesized type URIs. Absent means synthesized types are
    /// `about:blank`.
    pub base_url: Option<String>,
    /// Language key into the title tables.
    pub default_language: String,
    /// Enables the XML negotiation branch. XML is opt-in and never selected
    /// unless this is set.
    pub support_xml: bool,
    /// Gates stack-trace attachment. Unset resolves to "on outside
    /// production, off in production".
    pub include_stack_trace: Option<bool>,
    /// Replace 5xx detail text with a generic message in production.
    pub sanitize_production: bool,
    /// Auto-convert uncaught host-framework errors into problem documents.
    pub convert_framework_errors: bool,
    /// Per-deployment title overrides, consulted before the built-in
    /// tables.
    pub title_map: HashMap<u16, String>,
    /// Per-deployment type-slug overrides, consulted before the built-in
    /// slug table.
    pub type_map: HashMap<u16, String>,
    /// Production-mode flag; drives stack-trace and sanitization defaults.
    pub production: bool,
    /// Observation hook, attached via [`ProblemConfig::with_hook`].
    #[serde(skip)]
    pub on_problem: Option<ProblemHook>,
}

impl Default for ProblemConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            default_language: "en".to_owned(),
            support_xml: false,
            include_stack_trace: None,
            sanitize_production: true,
            convert_framework_errors: true,
            title_map: HashMap::new(),
            type_map: HashMap::new(),
            production: false,
            on_problem: None,
        }
    }
}

impl ProblemConfig {
    /// Defaults with the production flag taken from the `APP_ENV`
    /// environment variable.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            production: std::env::var("APP_ENV").is_ok_and(|v| v == "production"),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    #[must_use]
    pub fn with_default_language(mut self, language: impl Into<String>) -> Self {
        self.default_language = language.into();
        self
    }

    #[must_use]
    pub fn with_xml_support(mut self, support_xml: bool) -> Self {
        self.support_xml = support_xml;
        self
    }

    #[must_use]
    pub fn with_stack_traces(mut self, include: bool) -> Self {
        self.include_stack_trace = Some(include);
        self
    }

    #[must_use]
    pub fn with_production(mut self, production: bool) -> Self {
        self.production = production;
        self
    }

    #[must_use]
    pub fn with_title_override(mut self, status: u16, title: impl Into<String>) -> Self {
        self.title_map.insert(status, title.into());
        self
    }

    #[must_use]
    pub fn with_type_override(mut self, status: u16, slug: impl Into<String>) -> Self {
        self.type_map.insert(status, slug.into());
        self
    }

    #[must_use]
    pub fn with_hook(mut self, hook: ProblemHook) -> Self {
        self.on_problem = Some(hook);
        self
    }

    /// Effective stack-trace policy for this configuration.
    #[must_use]
    pub fn stack_traces_enabled(&self) -> bool {
        self.include_stack_trace.unwrap_or(!self.production)
    }
}

impl fmt::Debug for ProblemConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProblemConfig")
            .field("base_url", &self.base_url)
            .field("default_language", &self.default_language)
            .field("support_xml", &self.support_xml)
            .field("include_stack_trace", &self.include_stack_trace)
            .field("sanitize_production", &self.sanitize_production)
            .field("convert_framework_errors", &self.convert_framework_errors)
            .field("title_map", &self.title_map)
            .field("type_map", &self.type_map)
            .field("production", &self.production)
            .field("on_problem", &self.on_problem.is_some())
            .finish()
    }
}
