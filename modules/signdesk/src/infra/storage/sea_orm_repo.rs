use std::marker::PhantomData;

use anyhow::Context;
use async_trait::async_trait;
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    IntoActiveModel, PaginatorTrait, PrimaryKeyTrait, QueryFilter, QueryOrder, RuntimeErr, SqlErr,
};
use uuid::Uuid;

use crate::domain::repo::{Repository, StoreError};
use crate::infra::storage::mapper::StoredResource;

/// SQLite raises `ON DELETE RESTRICT` as SQLITE_CONSTRAINT_TRIGGER, which `sql_err` leaves unmapped.
const SQLITE_CONSTRAINT_TRIGGER: &str = "1811";

fn restricted_delete(e: &DbErr) -> Option<String> {
    let (DbErr::Exec(RuntimeErr::SqlxError(sqlx::Error::Database(db)))
    | DbErr::Query(RuntimeErr::SqlxError(sqlx::Error::Database(db)))) = e
    else {
        return None;
    };
    let fk = db.message().contains("FOREIGN KEY constraint failed")
        || db.code().as_deref() == Some(SQLITE_CONSTRAINT_TRIGGER);
    fk.then(|| db.message().to_owned())
}

/// Sorts store failures into the kinds the domain reacts to.
pub(crate) fn classify(e: DbErr, what: &'static str) -> StoreError {
    match e.sql_err() {
        Some(SqlErr::ForeignKeyConstraintViolation(msg)) => StoreError::Reference(msg),
        Some(SqlErr::UniqueConstraintViolation(msg)) => StoreError::Duplicate(msg),
        _ => match restricted_delete(&e) {
            Some(msg) => StoreError::Reference(msg),
            None => StoreError::Other(anyhow::Error::new(e).context(what)),
        },
    }
}

/// SeaORM-backed repository for any stored resource.
pub struct SeaOrmRepository<R> {
    conn: DatabaseConnection,
    _resource: PhantomData<fn() -> R>,
}

impl<R> SeaOrmRepository<R> {
    pub fn new(conn: DatabaseConnection) -> Self {
        Self {
            conn,
            _resource: PhantomData,
        }
    }
}

#[async_trait]
impl<R, E, AM> Repository<R> for SeaOrmRepository<R>
where
    R: StoredResource<Entity = E>,
    E: EntityTrait<ActiveModel = AM>,
    E::Model: IntoActiveModel<AM> + Send + Sync,
    AM: ActiveModelTrait<Entity = E> + ActiveModelBehavior + Send + Sync,
    <E::PrimaryKey as PrimaryKeyTrait>::ValueType: From<Uuid>,
{
    async fn list(&self, parent: Option<Uuid>) -> Result<Vec<R::Model>, StoreError> {
        let mut query = E::find();
        if let (Some(parent), Some(column)) = (parent, R::parent_column()) {
            query = query.filter(column.eq(parent));
        }
        let rows = query
            .order_by_asc(R::order_column())
            .all(&self.conn)
            .await
            .map_err(|e| classify(e, "list rows"))?;
        Ok(rows.into_iter().map(R::from_row).collect())
    }

    async fn find(&self, id: Uuid) -> Result<Option<R::Model>, StoreError> {
        let row = E::find_by_id(id)
            .one(&self.conn)
            .await
            .map_err(|e| classify(e, "find row by id"))?;
        Ok(row.map(R::from_row))
    }

    async fn insert(&self, model: R::Model) -> Result<R::Model, StoreError> {
        R::to_active(&model)
            .insert(&self.conn)
            .await
            .map_err(|e| classify(e, "insert row"))?;
        Ok(model)
    }

    async fn update(&self, model: R::Model) -> Result<Option<R::Model>, StoreError> {
        match R::to_update(&model).update(&self.conn).await {
            Ok(row) => Ok(Some(R::from_row(row))),
            Err(DbErr::RecordNotUpdated) => Ok(None),
            Err(e) => Err(classify(e, "update row")),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let res = E::delete_by_id(id)
            .exec(&self.conn)
            .await
            .map_err(|e| classify(e, "delete row"))?;
        Ok(res.rows_affected > 0)
    }

    async fn unique_taken(&self, value: &str, except: Option<Uuid>) -> Result<bool, StoreError> {
        let Some(column) = R::unique_column() else {
            return Ok(false);
        };
        let mut query = E::find().filter(column.eq(value));
        if let Some(id) = except {
            query = query.filter(R::id_column().ne(id));
        }
        let count = query
            .count(&self.conn)
            .await
            .context("count rows holding unique value")?;
        Ok(count > 0)
    }
}
