use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::contract::model::Role;
use crate::domain::identity::Identity;

/// Body of `POST /jobs/update-last-modified`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct TouchJobReq {
    #[serde(rename = "jobId")]
    pub job_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TouchJobResp {
    pub success: bool,
    pub updated_at: DateTime<Utc>,
}

/// The caller's resolved session.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SessionDto {
    pub user_id: Uuid,
    pub email: String,
    pub role: Role,
    pub display_name: String,
}

impl From<Identity> for SessionDto {
    fn from(i: Identity) -> Self {
        Self {
            user_id: i.user_id,
            email: i.email,
            role: i.role,
            display_name: i.display_name,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SignOutResp {
    pub success: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
}
