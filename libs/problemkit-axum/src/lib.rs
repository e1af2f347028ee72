//! Axum glue for the problemkit RFC 9457 Problem Details engine.
//!
//! The host framework owns the request lifecycle; this crate supplies the
//! two pieces that connect it to the core: a [`ProblemEngine`] built at
//! setup time (configuration + problem-type registry + converter) and the
//! [`problem_middleware`] that finalizes every problem response before it
//! reaches the wire. Handlers construct documents with the core `Problem`
//! API or [`ProblemEngine::problem`] and simply return them.

pub mod engine;
pub mod layer;

pub use engine::ProblemEngine;
pub use layer::problem_middleware;

// Core types most applications need alongside the engine
pub use problemkit::{
    CaughtError, Problem, ProblemConfig, ProblemContext, ProblemError, ProblemHook,
    ProblemParts, ProblemTypeConfig, ValidationViolation,
};
