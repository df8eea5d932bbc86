use axum::http::StatusCode;
use modkit::api::problem::{Problem, ProblemResponse, ValidationError};
use modkit::api::trace::current_span_id;

use crate::domain::error::DomainError;

/// Helper to create a ProblemResponse with less boilerplate
pub fn from_parts(
    status: StatusCode,
    code: &str,
    title: &str,
    detail: impl Into<String>,
    instance: &str,
) -> ProblemResponse {
    let problem = Problem::new(status, title, detail)
        .with_type(format!("https://errors.signdesk.dev/{code}"))
        .with_code(code)
        .with_instance(instance);

    let problem = match current_span_id() {
        Some(id) => problem.with_trace_id(id),
        None => problem,
    };

    ProblemResponse(problem)
}

/// Map domain error to RFC9457 ProblemResponse
pub fn map_domain_error(e: &DomainError, instance: &str) -> ProblemResponse {
    match e {
        DomainError::InvalidInput { missing } => {
            let mut resp = from_parts(
                StatusCode::BAD_REQUEST,
                "SIGNDESK_INVALID_INPUT",
                "Invalid input",
                e.to_string(),
                instance,
            );
            resp.0 = resp.0.with_errors(
                missing
                    .iter()
                    .map(|f| ValidationError::missing_field(f))
                    .collect(),
            );
            resp
        }
        DomainError::Validation { .. } => from_parts(
            StatusCode::BAD_REQUEST,
            "SIGNDESK_INVALID_INPUT",
            "Invalid input",
            e.to_string(),
            instance,
        ),
        DomainError::Unauthenticated => from_parts(
            StatusCode::UNAUTHORIZED,
            "SIGNDESK_UNAUTHENTICATED",
            "Unauthenticated",
            "A valid session is required",
            instance,
        ),
        DomainError::Unauthorized => from_parts(
            StatusCode::FORBIDDEN,
            "SIGNDESK_FORBIDDEN",
            "Forbidden",
            "Your role does not permit this operation",
            instance,
        ),
        DomainError::NotFound { .. } => from_parts(
            StatusCode::NOT_FOUND,
            "SIGNDESK_NOT_FOUND",
            "Not found",
            e.to_string(),
            instance,
        ),
        DomainError::Conflict { message } => from_parts(
            StatusCode::CONFLICT,
            "SIGNDESK_CONFLICT",
            "Conflict",
            message.clone(),
            instance,
        ),
        DomainError::Internal { .. } => {
            // Log the internal error details but don't expose them to the client
            tracing::error!(error = ?e, "Internal error");
            from_parts(
                StatusCode::INTERNAL_SERVER_ERROR,
                "SIGNDESK_INTERNAL",
                "Internal error",
                "An internal error occurred",
                instance,
            )
        }
    }
}
