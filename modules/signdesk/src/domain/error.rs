use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("Missing required fields: {}", missing.join(", "))]
    InvalidInput { missing: Vec<String> },

    #[error("Validation error on '{field}': {message}")]
    Validation { field: String, message: String },

    #[error("Authentication required")]
    Unauthenticated,

    #[error("Insufficient role for this operation")]
    Unauthorized,

    #[error("{resource} not found: {id}")]
    NotFound { resource: &'static str, id: String },

    #[error("Conflict: {message}")]
    Conflict { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DomainError {
    pub fn missing(fields: Vec<String>) -> Self {
        Self::InvalidInput { missing: fields }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn not_found(resource: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            resource,
            id: id.to_string(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// True for failures caused by the caller rather than the server.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, Self::Internal { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_are_listed_in_message() {
        let e = DomainError::missing(vec!["title".into(), "client_id".into()]);
        assert_eq!(e.to_string(), "Missing required fields: title, client_id");
        assert!(e.is_client_error());
    }

    #[test]
    fn internal_is_not_a_client_error() {
        assert!(!DomainError::internal("boom").is_client_error());
        assert!(DomainError::not_found("brand", "x").is_client_error());
    }
}
