//! RFC 9457 Problem Details for HTTP APIs.
//!
//! This crate is the framework-independent core: the problem document
//! model, the status metadata and problem-type registries, the explicit
//! and error-conversion construction paths, Accept-header content
//! negotiation and the JSON/XML serializers. It includes:
//! - the canonical document type (`Problem`) with its field-ordering
//!   contract
//! - total status metadata lookups (`status`)
//! - a registry of named problem types (`ProblemTypeRegistry`)
//! - the builder/converter (`ProblemConverter`)
//! - negotiation and rendering (`negotiate_content_type`, `serialize`)
//!
//! The `axum` feature makes `Problem` usable as a response; the
//! `problemkit-axum` crate supplies the request-cycle glue.

pub mod config;
pub mod convert;
pub mod negotiate;
pub mod problem;
pub mod registry;
pub mod render;
pub mod status;

// Re-export commonly used types
pub use config::{ProblemConfig, ProblemContext, ProblemHook};
pub use convert::{
    CaughtError, ProblemConverter, ProblemParts, ValidationViolation, UNEXPECTED_ERROR_DETAIL,
};
pub use negotiate::{negotiate_content_type, Format};
pub use problem::{Problem, ProblemError, ABOUT_BLANK, RESERVED_FIELDS};
pub use registry::{ProblemTypeConfig, ProblemTypeRegistry, ResolvedProblemType};
pub use render::{serialize, APPLICATION_PROBLEM_JSON, APPLICATION_PROBLEM_XML};
