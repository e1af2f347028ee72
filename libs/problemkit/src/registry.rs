//! Process-wide problem type registry.
//!
//! Maps a short symbolic name to a resolved `(status, title, type-URI)`
//! triple so call sites do not repeat type URIs. Modeled as an explicit
//! object, not a global: tests and multi-tenant setups can run independent
//! registries in one process. Expected lifecycle is write-at-setup,
//! read-concurrently-forever, but the interior lock also makes registration
//! during live traffic safe.

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::problem::ABOUT_BLANK;

/// Registration input for one problem type.
#[derive(Debug, Clone)]
pub struct ProblemTypeConfig {
    /// Default status for this problem type.
    pub status: u16,
    /// Default title for this problem type.
    pub title: String,
    /// Explicit type URI. When absent, the URI is synthesized from the
    /// registry's base URL and the type name at registration time.
    pub type_url: Option<String>,
}

/// A resolved registry entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedProblemType {
    pub status: u16,
    pub title: String,
    pub type_url: String,
}

/// Registry of named problem types.
#[derive(Debug, Default)]
pub struct ProblemTypeRegistry {
    base_url: Option<String>,
    entries: RwLock<HashMap<String, ResolvedProblemType>>,
}

impl ProblemTypeRegistry {
    /// Create a registry. `base_url`, when set, is the prefix for type URIs
    /// synthesized at registration time; later base-URL changes never
    /// retroactively affect already-registered types.
    #[must_use]
    pub fn new(base_url: Option<String>) -> Self {
        Self {
            base_url,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Register a problem type under a symbolic name.
    ///
    /// The type URI is resolved here, once: an explicit `type_url` wins,
    /// else `<base_url>/<name>`, else `about:blank`. Re-registering a name
    /// replaces the previous entry.
    pub fn register(&self, name: impl Into<String>, config: ProblemTypeConfig) {
        let name = name.into();
        let type_url = config.type_url.unwrap_or_else(|| match &self.base_url {
            Some(base) => format!("{base}/{name}"),
            None => ABOUT_BLANK.to_owned(),
        });
        self.entries.write().insert(
            name,
            ResolvedProblemType {
                status: config.status,
                title: config.title,
                type_url,
            },
        );
    }

    /// Look up a registered type by name.
    ///
    /// `None` is a normal outcome, not an error: callers passing an
    /// unregistered name use it as a literal type string instead.
    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<ResolvedProblemType> {
        self.entries.read().get(name).cloned()
    }

    /// Whether a type is registered under this name.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.read().contains_key(name)
    }
}
