use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::contract::model::User;
use crate::domain::resource::Resource;

/// Store failures the domain tells apart; everything else is `Other`.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A foreign key did not resolve, or the row is still referenced.
    #[error("reference violation: {0}")]
    Reference(String),

    #[error("duplicate value: {0}")]
    Duplicate(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Port for the domain layer: persistence of one collection.
/// Object-safe and async-friendly via `async_trait`.
#[async_trait]
pub trait Repository<R: Resource>: Send + Sync {
    /// All rows, optionally restricted to one parent, oldest first.
    async fn list(&self, parent: Option<Uuid>) -> Result<Vec<R::Model>, StoreError>;
    async fn find(&self, id: Uuid) -> Result<Option<R::Model>, StoreError>;
    /// Insert a fully-formed record; the service computes ids and timestamps.
    async fn insert(&self, model: R::Model) -> Result<R::Model, StoreError>;
    /// Write the row with the same id and return it as stored, or `None` if no such row.
    /// Columns the store owns (a job's `updated_at`) keep their stored value.
    async fn update(&self, model: R::Model) -> Result<Option<R::Model>, StoreError>;
    /// Returns true if a row was deleted.
    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;
    /// Whether another row already holds the collection's unique value.
    async fn unique_taken(&self, value: &str, except: Option<Uuid>) -> Result<bool, StoreError>;
}

/// Lookups the identity resolver and the sign-in flow need.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    async fn touch_last_active(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), StoreError>;
}

#[async_trait]
pub trait JobTimestamps: Send + Sync {
    async fn updated_at(&self, job_id: Uuid) -> Result<Option<DateTime<Utc>>, StoreError>;
    /// Returns false if the job does not exist.
    async fn set_updated_at(&self, job_id: Uuid, at: DateTime<Utc>) -> Result<bool, StoreError>;
}
