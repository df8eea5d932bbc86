//! Per-resource schema description driving the generic service and handlers.

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::error::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    List,
    Get,
    Create,
    Update,
    Delete,
}

/// Minimum role needed for an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    AnyRole,
    Admin,
    /// Admin, or the caller addressing their own record.
    AdminOrSelf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteMode {
    Hard,
    /// Keep the row and mark it disabled.
    Disable,
}

/// Values the service supplies when materializing a new record.
#[derive(Debug, Clone)]
pub struct BuildCtx {
    pub id: Uuid,
    pub now: DateTime<Utc>,
    pub actor: Uuid,
}

pub trait Resource: Send + Sync + 'static {
    /// Singular name used in errors and logs ("brand").
    const NAME: &'static str;
    /// Collection / table name, also the route prefix ("brands").
    const COLLECTION: &'static str;
    /// Fields that must be present, non-null and non-blank on create.
    const REQUIRED: &'static [&'static str];
    /// Query parameter filtering the list by parent id.
    const PARENT_KEY: Option<&'static str> = None;
    const DELETE_MODE: DeleteMode = DeleteMode::Hard;

    type Model: Serialize + ToSchema + Clone + Send + Sync + 'static;
    type New: DeserializeOwned + ToSchema + Send + 'static;
    type Patch: DeserializeOwned + ToSchema + Send + 'static;

    fn id(model: &Self::Model) -> Uuid;

    fn build(new: Self::New, ctx: &BuildCtx) -> Self::Model;

    fn apply(model: &mut Self::Model, patch: Self::Patch);

    /// Bookkeeping after a patch is applied, e.g. a refreshed `updated_at`.
    fn touch(_model: &mut Self::Model, _now: DateTime<Utc>) {}

    fn access(_op: Operation) -> Access {
        Access::AnyRole
    }

    /// Value that must be unique across the collection, if any.
    fn unique_value(_model: &Self::Model) -> Option<&str> {
        None
    }

    /// Used by `DeleteMode::Disable`.
    fn disable(_model: &mut Self::Model) {}

    /// Presentation order applied to list results.
    fn arrange(items: Vec<Self::Model>) -> Vec<Self::Model> {
        items
    }
}

fn is_blank(v: &Value) -> bool {
    match v {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

/// Every required field that is absent, null or a blank string, in declaration order.
pub fn missing_fields(body: &Value, required: &[&str]) -> Vec<String> {
    required
        .iter()
        .filter(|field| body.get(**field).map(is_blank).unwrap_or(true))
        .map(|field| field.to_string())
        .collect()
}

/// Required fields a patch tries to blank out.
pub fn blanked_fields(body: &Value, required: &[&str]) -> Vec<String> {
    required
        .iter()
        .filter(|field| body.get(**field).map(is_blank).unwrap_or(false))
        .map(|field| field.to_string())
        .collect()
}

/// Decode a create payload after the required-field check.
pub fn decode_new<R: Resource>(body: Value) -> Result<R::New, DomainError> {
    if !body.is_object() {
        return Err(DomainError::missing(
            R::REQUIRED.iter().map(|f| f.to_string()).collect(),
        ));
    }
    let missing = missing_fields(&body, R::REQUIRED);
    if !missing.is_empty() {
        return Err(DomainError::missing(missing));
    }
    serde_json::from_value(body).map_err(|e| DomainError::validation("body", e.to_string()))
}

pub fn decode_patch<R: Resource>(body: Value) -> Result<R::Patch, DomainError> {
    if !body.is_object() {
        return Err(DomainError::validation("body", "expected a JSON object"));
    }
    let blanked = blanked_fields(&body, R::REQUIRED);
    if !blanked.is_empty() {
        return Err(DomainError::missing(blanked));
    }
    serde_json::from_value(body).map_err(|e| DomainError::validation("body", e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const REQUIRED: &[&str] = &["title", "client_id"];

    #[test]
    fn reports_every_missing_field() {
        assert_eq!(missing_fields(&json!({}), REQUIRED), vec!["title", "client_id"]);
        assert_eq!(
            missing_fields(&json!({ "title": "A" }), REQUIRED),
            vec!["client_id"]
        );
    }

    #[test]
    fn null_and_blank_count_as_missing() {
        let body = json!({ "title": "   ", "client_id": null });
        assert_eq!(missing_fields(&body, REQUIRED), vec!["title", "client_id"]);
    }

    #[test]
    fn non_string_values_are_present() {
        let body = json!({ "title": "T", "client_id": 0 });
        assert!(missing_fields(&body, REQUIRED).is_empty());
    }

    #[test]
    fn patches_may_omit_but_not_blank_required_fields() {
        assert!(blanked_fields(&json!({ "job_number": "7" }), REQUIRED).is_empty());
        assert_eq!(blanked_fields(&json!({ "title": "" }), REQUIRED), vec!["title"]);
    }
}
