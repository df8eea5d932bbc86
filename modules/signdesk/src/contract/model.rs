//! Records exchanged with callers. Creation payloads (`New*`) carry only
//! client-settable fields; patches (`*Patch`) leave absent fields unchanged.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    Employee,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Employee => "employee",
        }
    }

    /// Unknown stored values grant the least privilege.
    pub fn parse(s: &str) -> Self {
        match s {
            "admin" => Role::Admin,
            _ => Role::Employee,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    #[default]
    Active,
    Disabled,
}

impl UserStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserStatus::Active => "active",
            UserStatus::Disabled => "disabled",
        }
    }

    /// Unknown stored values are treated as disabled.
    pub fn parse(s: &str) -> Self {
        match s {
            "active" => UserStatus::Active,
            _ => UserStatus::Disabled,
        }
    }
}

// ---- users ----

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub display_name: String,
    pub email: String,
    pub role: Role,
    pub status: UserStatus,
    pub last_active_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn is_active(&self) -> bool {
        self.status == UserStatus::Active
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NewUser {
    pub display_name: String,
    pub email: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub status: UserStatus,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UserPatch {
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
    pub status: Option<UserStatus>,
}

// ---- clients ----

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Client {
    pub id: Uuid,
    pub legal_name: String,
    pub address_line1: Option<String>,
    pub address_line2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
    pub contact_name: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NewClient {
    pub legal_name: String,
    #[serde(default)]
    pub address_line1: Option<String>,
    #[serde(default)]
    pub address_line2: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub contact_name: Option<String>,
    #[serde(default)]
    pub contact_email: Option<String>,
    #[serde(default)]
    pub contact_phone: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct ClientPatch {
    pub legal_name: Option<String>,
    pub address_line1: Option<String>,
    pub address_line2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
    pub contact_name: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
}

// ---- jobs ----

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Job {
    pub id: Uuid,
    pub title: String,
    pub job_number: Option<String>,
    pub site_address: Option<String>,
    pub site_city: Option<String>,
    pub site_state: Option<String>,
    pub site_postal_code: Option<String>,
    pub brand_id: Option<Uuid>,
    pub client_id: Uuid,
    pub project_manager_id: Option<Uuid>,
    /// Always the authenticated caller that created the job.
    pub creator_id: Uuid,
    pub created_at: DateTime<Utc>,
    /// Moved only by the update-last-modified operation.
    pub updated_at: DateTime<Utc>,
}

/// No `creator_id`: a client-supplied value is dropped on decode.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NewJob {
    pub title: String,
    pub client_id: Uuid,
    #[serde(default)]
    pub job_number: Option<String>,
    #[serde(default)]
    pub site_address: Option<String>,
    #[serde(default)]
    pub site_city: Option<String>,
    #[serde(default)]
    pub site_state: Option<String>,
    #[serde(default)]
    pub site_postal_code: Option<String>,
    #[serde(default)]
    pub brand_id: Option<Uuid>,
    #[serde(default)]
    pub project_manager_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct JobPatch {
    pub title: Option<String>,
    pub client_id: Option<Uuid>,
    pub job_number: Option<String>,
    pub site_address: Option<String>,
    pub site_city: Option<String>,
    pub site_state: Option<String>,
    pub site_postal_code: Option<String>,
    pub brand_id: Option<Uuid>,
    pub project_manager_id: Option<Uuid>,
}

// ---- brands ----

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Brand {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub logo_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NewBrand {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub logo_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct BrandPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub logo_url: Option<String>,
}

// ---- signs ----

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Sign {
    pub id: Uuid,
    pub brand_id: Uuid,
    pub name: String,
    pub image_name: Option<String>,
    pub image_url: Option<String>,
    pub multipliers: BTreeMap<String, f64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NewSign {
    pub brand_id: Uuid,
    pub name: String,
    #[serde(default)]
    pub image_name: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub multipliers: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct SignPatch {
    pub brand_id: Option<Uuid>,
    pub name: Option<String>,
    pub image_name: Option<String>,
    pub image_url: Option<String>,
    pub multipliers: Option<BTreeMap<String, f64>>,
}

// ---- sign options ----

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SignOption {
    pub id: Uuid,
    pub sign_id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NewSignOption {
    pub sign_id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct SignOptionPatch {
    pub sign_id: Option<Uuid>,
    pub name: Option<String>,
}

// ---- option values ----

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct OptionValue {
    pub id: Uuid,
    pub option_id: Uuid,
    pub value: String,
    pub price_delta: f64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NewOptionValue {
    pub option_id: Uuid,
    pub value: String,
    #[serde(default)]
    pub price_delta: f64,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct OptionValuePatch {
    pub option_id: Option<Uuid>,
    pub value: Option<String>,
    pub price_delta: Option<f64>,
}

// ---- pricing lines ----

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PricingLine {
    pub id: Uuid,
    pub job_id: Uuid,
    pub sign_id: Uuid,
    pub quantity: i32,
    pub unit_price: f64,
    pub unit_cost: f64,
    pub budget: f64,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NewPricingLine {
    pub job_id: Uuid,
    pub sign_id: Uuid,
    #[serde(default = "default_quantity")]
    pub quantity: i32,
    #[serde(default)]
    pub unit_price: f64,
    #[serde(default)]
    pub unit_cost: f64,
    #[serde(default)]
    pub budget: f64,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct PricingLinePatch {
    pub job_id: Option<Uuid>,
    pub sign_id: Option<Uuid>,
    pub quantity: Option<i32>,
    pub unit_price: Option<f64>,
    pub unit_cost: Option<f64>,
    pub budget: Option<f64>,
    pub description: Option<String>,
}

fn default_quantity() -> i32 {
    1
}
