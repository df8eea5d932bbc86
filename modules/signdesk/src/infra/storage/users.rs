use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use uuid::Uuid;

use crate::contract::model::User;
use crate::domain::repo::{StoreError, UserDirectory};
use crate::infra::storage::entity::user;
use crate::infra::storage::mapper::user_from_row;
use crate::infra::storage::sea_orm_repo::classify;

pub struct SeaOrmUserDirectory {
    conn: DatabaseConnection,
}

impl SeaOrmUserDirectory {
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl UserDirectory for SeaOrmUserDirectory {
    /// `email` must already be normalized.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let row = user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.conn)
            .await
            .map_err(|e| classify(e, "find user by email"))?;
        Ok(row.map(user_from_row))
    }

    async fn touch_last_active(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), StoreError> {
        user::Entity::update_many()
            .col_expr(user::Column::LastActiveAt, Expr::value(at))
            .filter(user::Column::Id.eq(id))
            .exec(&self.conn)
            .await
            .map_err(|e| classify(e, "touch user last_active_at"))?;
        Ok(())
    }
}
