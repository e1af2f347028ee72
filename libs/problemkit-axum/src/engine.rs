//! The engine object an application installs at setup time.

use std::sync::Arc;

use problemkit::{
    Problem, ProblemConfig, ProblemConverter, ProblemError, ProblemParts, ProblemTypeConfig,
    ProblemTypeRegistry,
};

/// Shared problem engine: configuration, problem-type registry and
/// converter behind one cheaply cloneable handle.
///
/// Built once during application setup and handed to the router as state;
/// all per-request work reads it concurrently.
#[derive(Debug, Clone)]
pub struct ProblemEngine {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    converter: ProblemConverter,
    registry: Arc<ProblemTypeRegistry>,
}

impl ProblemEngine {
    #[must_use]
    pub fn new(config: ProblemConfig) -> Self {
        let registry = Arc::new(ProblemTypeRegistry::new(config.base_url.clone()));
        let converter = ProblemConverter::new(config, Arc::clone(&registry));
        Self {
            inner: Arc::new(Inner {
                converter,
                registry,
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &ProblemConfig {
        self.inner.converter.config()
    }

    #[must_use]
    pub fn converter(&self) -> &ProblemConverter {
        &self.inner.converter
    }

    #[must_use]
    pub fn registry(&self) -> &ProblemTypeRegistry {
        &self.inner.registry
    }

    /// Register a named problem type. Typically called during setup; the
    /// type URI is resolved now, against the current base URL.
    pub fn register_problem_type(&self, name: impl Into<String>, config: ProblemTypeConfig) {
        self.inner.registry.register(name, config);
    }

    /// Build a problem document from explicit parts.
    ///
    /// A `type_ref` matching a registered problem-type name resolves to the
    /// registered entry (the caller's title still wins); anything else is a
    /// literal type URI. The instance is left unset here; the middleware
    /// defaults it to the request path before the response is sent.
    pub fn problem(&self, status: u16, parts: ProblemParts) -> Result<Problem, ProblemError> {
        self.inner.converter.from_parts(status, parts, None)
    }
}
