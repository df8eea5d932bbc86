//! Request correlation helpers shared by the error mappers.

use axum::http::{HeaderMap, StatusCode};

use crate::api::problem::{Problem, ProblemResponse};

/// Trace id from `x-trace-id`, `x-request-id` or `traceparent`, falling back
/// to the id of the current tracing span.
pub fn extract_trace_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-trace-id")
        .or_else(|| headers.get("x-request-id"))
        .or_else(|| headers.get("traceparent"))
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
        .or_else(current_span_id)
}

/// Id of the current tracing span, if any.
pub fn current_span_id() -> Option<String> {
    tracing::Span::current()
        .id()
        .map(|id| id.into_u64().to_string())
}

/// Errors that know how to become a Problem for a given request path.
pub trait IntoProblemResponse {
    fn into_problem_response(self, instance: &str, trace_id: Option<String>) -> ProblemResponse;
}

impl IntoProblemResponse for anyhow::Error {
    fn into_problem_response(self, instance: &str, trace_id: Option<String>) -> ProblemResponse {
        tracing::error!(error = %self, "Internal server error");
        let mut problem = Problem::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal Server Error",
            "An internal error occurred",
        )
        .with_code("INTERNAL_ERROR")
        .with_type("https://errors.signdesk.dev/INTERNAL_ERROR")
        .with_instance(instance);
        if let Some(tid) = trace_id {
            problem = problem.with_trace_id(tid);
        }
        problem.into()
    }
}
