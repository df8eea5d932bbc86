use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QuerySelect};
use uuid::Uuid;

use crate::domain::repo::{JobTimestamps, StoreError};
use crate::infra::storage::entity::job;
use crate::infra::storage::sea_orm_repo::classify;

pub struct SeaOrmJobTimestamps {
    conn: DatabaseConnection,
}

impl SeaOrmJobTimestamps {
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl JobTimestamps for SeaOrmJobTimestamps {
    async fn updated_at(&self, job_id: Uuid) -> Result<Option<DateTime<Utc>>, StoreError> {
        job::Entity::find_by_id(job_id)
            .select_only()
            .column(job::Column::UpdatedAt)
            .into_tuple::<DateTime<Utc>>()
            .one(&self.conn)
            .await
            .map_err(|e| classify(e, "read job updated_at"))
    }

    async fn set_updated_at(&self, job_id: Uuid, at: DateTime<Utc>) -> Result<bool, StoreError> {
        let res = job::Entity::update_many()
            .col_expr(job::Column::UpdatedAt, Expr::value(at))
            .filter(job::Column::Id.eq(job_id))
            .exec(&self.conn)
            .await
            .map_err(|e| classify(e, "write job updated_at"))?;
        Ok(res.rows_affected > 0)
    }
}
