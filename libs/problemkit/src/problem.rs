//! RFC 9457 Problem Details document model (pure data, no HTTP framework
//! dependencies).
//!
//! A [`Problem`] is constructed once per error event and is immutable
//! afterwards; "modification" means building a new document. Field order is
//! a wire contract: the reserved fields `type, title, status, detail,
//! instance` come first (absent optionals skipped), then extension fields in
//! insertion order, and both serialization formats reproduce that order
//! exactly.

use http::StatusCode;
use indexmap::IndexMap;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::status;

/// Default type URI: "no more specific type than the HTTP status itself".
pub const ABOUT_BLANK: &str = "about:blank";

/// The five reserved problem-document field names. Extension keys colliding
/// with these are dropped on merge; reserved fields always win.
pub const RESERVED_FIELDS: [&str; 5] = ["type", "title", "status", "detail", "instance"];

/// Errors this subsystem can itself produce. Construction-time, developer
/// facing; end users only ever see well-formed problem documents.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ProblemError {
    /// The status code is outside the 4xx/5xx range accepted for problem
    /// documents.
    #[error("invalid status code: {status}. Must be 4xx or 5xx")]
    InvalidStatus { status: u16 },
}

/// RFC 9457 Problem Details document.
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub struct Problem {
    /// A URI reference that identifies the problem type.
    pub type_url: String,
    /// A short, human-readable summary of the problem type.
    pub title: String,
    /// The HTTP status code for this occurrence of the problem.
    /// Serializes as u16 for RFC 9457 compatibility.
    pub status: StatusCode,
    /// A human-readable explanation specific to this occurrence.
    pub detail: Option<String>,
    /// A URI reference identifying this specific occurrence (typically the
    /// request path).
    pub instance: Option<String>,
    extensions: IndexMap<String, Value>,
}

/// Validate a raw status code against the problem-status gate and convert
/// it to a typed `StatusCode`.
pub(crate) fn checked_status(status: u16) -> Result<StatusCode, ProblemError> {
    if !status::is_valid_problem_status(status) {
        return Err(ProblemError::InvalidStatus { status });
    }
    StatusCode::from_u16(status).map_err(|_| ProblemError::InvalidStatus { status })
}

impl Problem {
    /// Create a problem for the given status code.
    ///
    /// Fails with [`ProblemError::InvalidStatus`] when the code is outside
    /// 4xx/5xx. `title` defaults to the English canonical title and `type`
    /// to `about:blank`; both can be replaced with the `with_*` builders.
    pub fn new(status: u16) -> Result<Self, ProblemError> {
        Ok(Self::for_status(checked_status(status)?))
    }

    /// Single defaulting path for all constructors. The status is known
    /// valid here.
    pub(crate) fn for_status(status: StatusCode) -> Self {
        Self {
            type_url: ABOUT_BLANK.to_owned(),
            title: status::title(status.as_u16(), "en").to_owned(),
            status,
            detail: None,
            instance: None,
            extensions: IndexMap::new(),
        }
    }

    pub fn with_type(mut self, type_url: impl Into<String>) -> Self {
        self.type_url = type_url.into();
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn with_instance(mut self, uri: impl Into<String>) -> Self {
        self.instance = Some(uri.into());
        self
    }

    /// Add one extension field, preserving insertion order.
    ///
    /// Keys equal to a reserved field name are silently dropped; the
    /// reserved fields are never overridable through this channel.
    pub fn with_extension(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let key = key.into();
        if !RESERVED_FIELDS.contains(&key.as_str()) {
            self.extensions.insert(key, value.into());
        }
        self
    }

    /// Merge a batch of extension fields, in iteration order, applying the
    /// same reserved-name filter as [`Problem::with_extension`].
    pub fn with_extensions<I, K>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        for (key, value) in entries {
            self = self.with_extension(key, value);
        }
        self
    }

    /// Extension fields in insertion order.
    #[must_use]
    pub fn extensions(&self) -> &IndexMap<String, Value> {
        &self.extensions
    }

    // Convenience constructors for the common problem statuses. All of them
    // route through the same defaulting path as `Problem::new`.

    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self::for_status(StatusCode::BAD_REQUEST).with_detail(detail)
    }

    pub fn unauthorized(detail: impl Into<String>) -> Self {
        Self::for_status(StatusCode::UNAUTHORIZED).with_detail(detail)
    }

    pub fn payment_required(detail: impl Into<String>) -> Self {
        Self::for_status(StatusCode::PAYMENT_REQUIRED).with_detail(detail)
    }

    pub fn forbidden(detail: impl Into<String>) -> Self {
        Self::for_status(StatusCode::FORBIDDEN).with_detail(detail)
    }

    pub fn not_found(detail: impl Into<String>) -> Self {
        Self::for_status(StatusCode::NOT_FOUND).with_detail(detail)
    }

    pub fn method_not_allowed(detail: impl Into<String>) -> Self {
        Self::for_status(StatusCode::METHOD_NOT_ALLOWED).with_detail(detail)
    }

    pub fn not_acceptable(detail: impl Into<String>) -> Self {
        Self::for_status(StatusCode::NOT_ACCEPTABLE).with_detail(detail)
    }

    pub fn conflict(detail: impl Into<String>) -> Self {
        Self::for_status(StatusCode::CONFLICT).with_detail(detail)
    }

    pub fn gone(detail: impl Into<String>) -> Self {
        Self::for_status(StatusCode::GONE).with_detail(detail)
    }

    pub fn unprocessable_entity(detail: impl Into<String>) -> Self {
        Self::for_status(StatusCode::UNPROCESSABLE_ENTITY).with_detail(detail)
    }

    pub fn too_many_requests(detail: impl Into<String>) -> Self {
        Self::for_status(StatusCode::TOO_MANY_REQUESTS).with_detail(detail)
    }

    pub fn internal_server_error(detail: impl Into<String>) -> Self {
        Self::for_status(StatusCode::INTERNAL_SERVER_ERROR).with_detail(detail)
    }

    pub fn not_implemented(detail: impl Into<String>) -> Self {
        Self::for_status(StatusCode::NOT_IMPLEMENTED).with_detail(detail)
    }

    pub fn bad_gateway(detail: impl Into<String>) -> Self {
        Self::for_status(StatusCode::BAD_GATEWAY).with_detail(detail)
    }

    pub fn service_unavailable(detail: impl Into<String>) -> Self {
        Self::for_status(StatusCode::SERVICE_UNAVAILABLE).with_detail(detail)
    }

    pub fn gateway_timeout(detail: impl Into<String>) -> Self {
        Self::for_status(StatusCode::GATEWAY_TIMEOUT).with_detail(detail)
    }
}

impl Serialize for Problem {
    /// Emits the fixed key order `type, title, status, detail, instance`
    /// (absent optionals skipped) followed by extensions in insertion
    /// order.
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("type", &self.type_url)?;
        map.serialize_entry("title", &self.title)?;
        map.serialize_entry("status", &self.status.as_u16())?;
        if let Some(detail) = &self.detail {
            map.serialize_entry("detail", detail)?;
        }
        if let Some(instance) = &self.instance {
            map.serialize_entry("instance", instance)?;
        }
        for (key, value) in &self.extensions {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Problem {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::Error as _;

        let mut fields = serde_json::Map::deserialize(deserializer)?;

        // shift_remove keeps the relative order of the remaining keys, which
        // become the extension fields.
        let status = fields
            .shift_remove("status")
            .and_then(|v| v.as_u64())
            .and_then(|v| u16::try_from(v).ok())
            .ok_or_else(|| D::Error::custom("missing or non-numeric status"))?;
        let status = checked_status(status).map_err(D::Error::custom)?;

        let take_string = |fields: &mut serde_json::Map<String, Value>, key: &str| {
            fields.shift_remove(key).and_then(|v| match v {
                Value::String(s) => Some(s),
                _ => None,
            })
        };

        let mut problem = Self::for_status(status);
        if let Some(type_url) = take_string(&mut fields, "type") {
            problem = problem.with_type(type_url);
        }
        if let Some(title) = take_string(&mut fields, "title") {
            problem = problem.with_title(title);
        }
        if let Some(detail) = take_string(&mut fields, "detail") {
            problem = problem.with_detail(detail);
        }
        if let Some(instance) = take_string(&mut fields, "instance") {
            problem = problem.with_instance(instance);
        }
        Ok(problem.with_extensions(fields))
    }
}

/// Axum integration: make Problem directly usable as a response.
///
/// The body is the plain JSON rendering; the document itself is stashed in
/// the response extensions so the problemkit-axum middleware can re-render
/// it with instance defaulting, the observation hook and content
/// negotiation.
#[cfg(feature = "axum")]
impl axum::response::IntoResponse for Problem {
    fn into_response(self) -> axum::response::Response {
        use axum::http::HeaderValue;

        let status = self.status;
        let body = crate::render::to_json(&self);
        let mut resp = axum::response::Response::new(axum::body::Body::from(body));
        *resp.status_mut() = status;
        resp.headers_mut().insert(
            axum::http::header::CONTENT_TYPE,
            HeaderValue::from_static(crate::render::APPLICATION_PROBLEM_JSON),
        );
        resp.extensions_mut().insert(self);
        resp
    }
}
