use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;
use tracing::{debug, error, info, instrument};
use uuid::Uuid;

use crate::domain::error::DomainError;
use crate::domain::identity::Identity;
use crate::domain::repo::{Repository, StoreError};
use crate::domain::resource::{decode_new, decode_patch, BuildCtx, DeleteMode, Resource};

/// Outcome of a delete: rows are either removed or kept and disabled.
#[derive(Debug)]
pub enum Deleted<M> {
    Removed,
    Disabled(M),
}

/// Which write a store failure came from; reference violations read differently.
#[derive(Clone, Copy)]
enum Write {
    Insert,
    Update,
    Delete,
}

fn map_store<R: Resource>(e: StoreError, write: Option<Write>) -> DomainError {
    match (e, write) {
        (StoreError::Reference(detail), Some(Write::Delete)) => {
            debug!(%detail, "delete refused, row still referenced");
            DomainError::conflict(format!("{} is still referenced by other records", R::NAME))
        }
        (StoreError::Reference(detail), _) => {
            debug!(%detail, "reference does not resolve");
            DomainError::validation("reference", "referenced record does not exist")
        }
        (StoreError::Duplicate(detail), _) => {
            debug!(%detail, "unique constraint violated");
            DomainError::conflict(format!("{} already exists", R::NAME))
        }
        (StoreError::Other(e), _) => {
            error!(resource = R::NAME, error = ?e, "store operation failed");
            DomainError::internal(format!("{e:#}"))
        }
    }
}

/// Domain service for one collection. Depends only on the repository port.
pub struct ResourceService<R: Resource> {
    repo: Arc<dyn Repository<R>>,
}

impl<R: Resource> Clone for ResourceService<R> {
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
        }
    }
}

impl<R: Resource> ResourceService<R> {
    pub fn new(repo: Arc<dyn Repository<R>>) -> Self {
        Self { repo }
    }

    #[instrument(name = "signdesk.service.list", skip(self), fields(resource = R::COLLECTION))]
    pub async fn list(&self, parent: Option<Uuid>) -> Result<Vec<R::Model>, DomainError> {
        let rows = self
            .repo
            .list(parent)
            .await
            .map_err(|e| map_store::<R>(e, None))?;
        debug!("listed {} rows", rows.len());
        Ok(R::arrange(rows))
    }

    #[instrument(name = "signdesk.service.get", skip(self), fields(resource = R::COLLECTION, id = %id))]
    pub async fn get(&self, id: Uuid) -> Result<R::Model, DomainError> {
        self.repo
            .find(id)
            .await
            .map_err(|e| map_store::<R>(e, None))?
            .ok_or_else(|| DomainError::not_found(R::NAME, id))
    }

    /// Validate the raw body, build the record and persist it.
    #[instrument(
        name = "signdesk.service.create",
        skip(self, body, actor),
        fields(resource = R::COLLECTION, actor = %actor.user_id)
    )]
    pub async fn create(&self, body: Value, actor: &Identity) -> Result<R::Model, DomainError> {
        let new = decode_new::<R>(body)?;
        let ctx = BuildCtx {
            id: Uuid::new_v4(),
            now: Utc::now(),
            actor: actor.user_id,
        };
        let model = R::build(new, &ctx);

        self.ensure_unique(&model, None).await?;

        let created = self
            .repo
            .insert(model)
            .await
            .map_err(|e| map_store::<R>(e, Some(Write::Insert)))?;
        info!(id = %R::id(&created), "created {}", R::NAME);
        Ok(created)
    }

    #[instrument(name = "signdesk.service.update", skip(self, body), fields(resource = R::COLLECTION, id = %id))]
    pub async fn update(&self, id: Uuid, body: Value) -> Result<R::Model, DomainError> {
        let patch = decode_patch::<R>(body)?;
        let mut current = self.get(id).await?;
        R::apply(&mut current, patch);
        R::touch(&mut current, Utc::now());

        self.ensure_unique(&current, Some(id)).await?;

        let stored = self
            .repo
            .update(current)
            .await
            .map_err(|e| map_store::<R>(e, Some(Write::Update)))?
            .ok_or_else(|| DomainError::not_found(R::NAME, id))?;
        info!("updated {}", R::NAME);
        Ok(stored)
    }

    #[instrument(name = "signdesk.service.delete", skip(self), fields(resource = R::COLLECTION, id = %id))]
    pub async fn delete(&self, id: Uuid) -> Result<Deleted<R::Model>, DomainError> {
        match R::DELETE_MODE {
            DeleteMode::Hard => {
                let deleted = self
                    .repo
                    .delete(id)
                    .await
                    .map_err(|e| map_store::<R>(e, Some(Write::Delete)))?;
                if !deleted {
                    return Err(DomainError::not_found(R::NAME, id));
                }
                info!("deleted {}", R::NAME);
                Ok(Deleted::Removed)
            }
            DeleteMode::Disable => {
                let mut current = self.get(id).await?;
                R::disable(&mut current);
                let stored = self
                    .repo
                    .update(current)
                    .await
                    .map_err(|e| map_store::<R>(e, Some(Write::Update)))?
                    .ok_or_else(|| DomainError::not_found(R::NAME, id))?;
                info!("disabled {}", R::NAME);
                Ok(Deleted::Disabled(stored))
            }
        }
    }

    async fn ensure_unique(&self, model: &R::Model, except: Option<Uuid>) -> Result<(), DomainError> {
        let Some(value) = R::unique_value(model) else {
            return Ok(());
        };
        let taken = self
            .repo
            .unique_taken(value, except)
            .await
            .map_err(|e| map_store::<R>(e, None))?;
        if taken {
            return Err(DomainError::conflict(format!(
                "{} '{}' already exists",
                R::NAME,
                value
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::model::{Brand, Client, Role, User, UserStatus};
    use crate::domain::resources::{Brands, Clients, Users};
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// In-memory repository keyed by id.
    struct MemRepo<R: Resource> {
        rows: Mutex<HashMap<Uuid, R::Model>>,
        fail_with_reference: bool,
    }

    impl<R: Resource> MemRepo<R> {
        fn new() -> Self {
            Self {
                rows: Mutex::new(HashMap::new()),
                fail_with_reference: false,
            }
        }
    }

    #[async_trait]
    impl<R: Resource> Repository<R> for MemRepo<R> {
        async fn list(&self, _parent: Option<Uuid>) -> Result<Vec<R::Model>, StoreError> {
            Ok(self.rows.lock().unwrap().values().cloned().collect())
        }
        async fn find(&self, id: Uuid) -> Result<Option<R::Model>, StoreError> {
            Ok(self.rows.lock().unwrap().get(&id).cloned())
        }
        async fn insert(&self, model: R::Model) -> Result<R::Model, StoreError> {
            if self.fail_with_reference {
                return Err(StoreError::Reference("fk".into()));
            }
            self.rows.lock().unwrap().insert(R::id(&model), model.clone());
            Ok(model)
        }
        async fn update(&self, model: R::Model) -> Result<Option<R::Model>, StoreError> {
            let mut rows = self.rows.lock().unwrap();
            let id = R::id(&model);
            if !rows.contains_key(&id) {
                return Ok(None);
            }
            rows.insert(id, model.clone());
            Ok(Some(model))
        }
        async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
            if self.fail_with_reference {
                return Err(StoreError::Reference("fk".into()));
            }
            Ok(self.rows.lock().unwrap().remove(&id).is_some())
        }
        async fn unique_taken(
            &self,
            value: &str,
            except: Option<Uuid>,
        ) -> Result<bool, StoreError> {
            Ok(self
                .rows
                .lock()
                .unwrap()
                .values()
                .any(|m| R::unique_value(m) == Some(value) && Some(R::id(m)) != except))
        }
    }

    fn admin() -> Identity {
        Identity {
            user_id: Uuid::new_v4(),
            email: "admin@signdesk.dev".into(),
            role: Role::Admin,
            display_name: "Admin".into(),
        }
    }

    fn brands() -> (ResourceService<Brands>, Arc<MemRepo<Brands>>) {
        let repo = Arc::new(MemRepo::<Brands>::new());
        (ResourceService::new(repo.clone()), repo)
    }

    #[tokio::test]
    async fn create_with_missing_fields_persists_nothing() {
        let (svc, repo) = brands();
        let err = svc.create(json!({ "description": "x" }), &admin()).await.unwrap_err();
        assert_eq!(err, DomainError::missing(vec!["name".into()]));
        assert!(repo.rows.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn non_object_body_lists_all_required_fields() {
        let svc = ResourceService::<Users>::new(Arc::new(MemRepo::<Users>::new()));
        let err = svc.create(json!(null), &admin()).await.unwrap_err();
        assert_eq!(
            err,
            DomainError::missing(vec!["display_name".into(), "email".into()])
        );
    }

    #[tokio::test]
    async fn get_unknown_is_not_found() {
        let (svc, _) = brands();
        let err = svc.get(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound { resource: "brand", .. }));
    }

    #[tokio::test]
    async fn second_delete_is_not_found() {
        let (svc, _) = brands();
        let brand: Brand = svc.create(json!({ "name": "Acme" }), &admin()).await.unwrap();
        assert!(matches!(svc.delete(brand.id).await.unwrap(), Deleted::Removed));
        assert!(matches!(
            svc.delete(brand.id).await.unwrap_err(),
            DomainError::NotFound { .. }
        ));
    }

    #[tokio::test]
    async fn referenced_delete_is_conflict_and_bad_reference_is_invalid() {
        let repo = Arc::new(MemRepo::<Brands> {
            rows: Mutex::new(HashMap::new()),
            fail_with_reference: true,
        });
        let svc = ResourceService::new(repo);
        assert!(matches!(
            svc.delete(Uuid::new_v4()).await.unwrap_err(),
            DomainError::Conflict { .. }
        ));
        assert!(matches!(
            svc.create(json!({ "name": "A" }), &admin()).await.unwrap_err(),
            DomainError::Validation { .. }
        ));
    }

    #[tokio::test]
    async fn user_delete_disables_instead_of_removing() {
        let repo = Arc::new(MemRepo::<Users>::new());
        let svc = ResourceService::<Users>::new(repo.clone());
        let user: User = svc
            .create(json!({ "display_name": "E", "email": "e@x.io" }), &admin())
            .await
            .unwrap();
        assert_eq!(user.role, Role::Employee);

        match svc.delete(user.id).await.unwrap() {
            Deleted::Disabled(u) => assert_eq!(u.status, UserStatus::Disabled),
            Deleted::Removed => panic!("users must not be hard-deleted"),
        }
        assert_eq!(repo.rows.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn duplicate_email_is_conflict() {
        let svc = ResourceService::<Users>::new(Arc::new(MemRepo::<Users>::new()));
        svc.create(json!({ "display_name": "A", "email": "dup@x.io" }), &admin())
            .await
            .unwrap();
        let err = svc
            .create(json!({ "display_name": "B", "email": "DUP@x.io" }), &admin())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict { .. }));
    }

    #[tokio::test]
    async fn update_unknown_is_not_found_and_blank_required_is_invalid() {
        let (svc, _) = brands();
        assert!(matches!(
            svc.update(Uuid::new_v4(), json!({ "name": "B" })).await.unwrap_err(),
            DomainError::NotFound { .. }
        ));
        let brand: Brand = svc.create(json!({ "name": "Acme" }), &admin()).await.unwrap();
        assert_eq!(
            svc.update(brand.id, json!({ "name": " " })).await.unwrap_err(),
            DomainError::missing(vec!["name".into()])
        );
        let updated = svc
            .update(brand.id, json!({ "description": "neon" }))
            .await
            .unwrap();
        assert_eq!(updated.name, "Acme");
        assert_eq!(updated.description.as_deref(), Some("neon"));
    }

    #[tokio::test]
    async fn client_update_refreshes_updated_at() {
        let svc = ResourceService::<Clients>::new(Arc::new(MemRepo::<Clients>::new()));
        let client: Client = svc
            .create(json!({ "legal_name": "Northwind" }), &admin())
            .await
            .unwrap();
        assert_eq!(client.updated_at, client.created_at);

        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        let updated = svc
            .update(client.id, json!({ "city": "Austin" }))
            .await
            .unwrap();
        assert!(updated.updated_at > client.updated_at);
        assert_eq!(updated.created_at, client.created_at);
    }
}
