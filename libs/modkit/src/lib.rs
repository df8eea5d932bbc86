//! # ModKit
//!
//! Shared HTTP plumbing for SignDesk modules: RFC 9457 problem responses,
//! trace-id extraction and process shutdown signals.

pub use anyhow::Result;

pub mod api;
pub mod runtime;

pub use api::problem::{Problem, ProblemResponse, ValidationError, APPLICATION_PROBLEM_JSON};
pub use api::trace::{extract_trace_id, IntoProblemResponse};
