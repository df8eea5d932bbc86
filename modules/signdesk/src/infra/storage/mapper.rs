//! Table binding for every resource: which entity stores it and how rows convert.

use std::collections::BTreeMap;

use sea_orm::{EntityTrait, NotSet, Set};
use serde_json::Value as Json;

use crate::contract::model::*;
use crate::domain::resource::Resource;
use crate::domain::resources::{
    Brands, Clients, Jobs, OptionValues, PricingLines, SignOptions, Signs, Users,
};
use crate::infra::storage::entity::{
    brand, client, job, option_value, pricing_line, sign, sign_option, user,
};

type ColumnOf<R> = <<R as StoredResource>::Entity as EntityTrait>::Column;
type ActiveOf<R> = <<R as StoredResource>::Entity as EntityTrait>::ActiveModel;
type RowOf<R> = <<R as StoredResource>::Entity as EntityTrait>::Model;

pub trait StoredResource: Resource {
    type Entity: EntityTrait;

    fn id_column() -> ColumnOf<Self>;

    /// Listing order; ties keep insertion order only where the store does.
    fn order_column() -> ColumnOf<Self>;

    /// Column matched against the `PARENT_KEY` query parameter.
    fn parent_column() -> Option<ColumnOf<Self>> {
        None
    }

    /// Column holding `Resource::unique_value`.
    fn unique_column() -> Option<ColumnOf<Self>> {
        None
    }

    fn to_active(model: &Self::Model) -> ActiveOf<Self>;

    /// Active model for an update of an existing row.
    fn to_update(model: &Self::Model) -> ActiveOf<Self> {
        Self::to_active(model)
    }

    fn from_row(row: RowOf<Self>) -> Self::Model;
}

impl StoredResource for Brands {
    type Entity = brand::Entity;

    fn id_column() -> brand::Column {
        brand::Column::Id
    }

    fn order_column() -> brand::Column {
        brand::Column::CreatedAt
    }

    fn to_active(m: &Brand) -> brand::ActiveModel {
        brand::ActiveModel {
            id: Set(m.id),
            name: Set(m.name.clone()),
            description: Set(m.description.clone()),
            logo_url: Set(m.logo_url.clone()),
            created_at: Set(m.created_at),
        }
    }

    fn from_row(r: brand::Model) -> Brand {
        Brand {
            id: r.id,
            name: r.name,
            description: r.description,
            logo_url: r.logo_url,
            created_at: r.created_at,
        }
    }
}

impl StoredResource for Clients {
    type Entity = client::Entity;

    fn id_column() -> client::Column {
        client::Column::Id
    }

    fn order_column() -> client::Column {
        client::Column::CreatedAt
    }

    fn to_active(m: &Client) -> client::ActiveModel {
        client::ActiveModel {
            id: Set(m.id),
            legal_name: Set(m.legal_name.clone()),
            address_line1: Set(m.address_line1.clone()),
            address_line2: Set(m.address_line2.clone()),
            city: Set(m.city.clone()),
            state: Set(m.state.clone()),
            postal_code: Set(m.postal_code.clone()),
            country: Set(m.country.clone()),
            contact_name: Set(m.contact_name.clone()),
            contact_email: Set(m.contact_email.clone()),
            contact_phone: Set(m.contact_phone.clone()),
            created_at: Set(m.created_at),
            updated_at: Set(m.updated_at),
        }
    }

    fn from_row(r: client::Model) -> Client {
        Client {
            id: r.id,
            legal_name: r.legal_name,
            address_line1: r.address_line1,
            address_line2: r.address_line2,
            city: r.city,
            state: r.state,
            postal_code: r.postal_code,
            country: r.country,
            contact_name: r.contact_name,
            contact_email: r.contact_email,
            contact_phone: r.contact_phone,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

impl StoredResource for Jobs {
    type Entity = job::Entity;

    fn id_column() -> job::Column {
        job::Column::Id
    }

    fn order_column() -> job::Column {
        job::Column::CreatedAt
    }

    fn parent_column() -> Option<job::Column> {
        Some(job::Column::ClientId)
    }

    fn to_active(m: &Job) -> job::ActiveModel {
        job::ActiveModel {
            id: Set(m.id),
            title: Set(m.title.clone()),
            job_number: Set(m.job_number.clone()),
            site_address: Set(m.site_address.clone()),
            site_city: Set(m.site_city.clone()),
            site_state: Set(m.site_state.clone()),
            site_postal_code: Set(m.site_postal_code.clone()),
            brand_id: Set(m.brand_id),
            client_id: Set(m.client_id),
            project_manager_id: Set(m.project_manager_id),
            creator_id: Set(m.creator_id),
            created_at: Set(m.created_at),
            updated_at: Set(m.updated_at),
        }
    }

    // Only `SeaOrmJobTimestamps` writes `updated_at`.
    fn to_update(m: &Job) -> job::ActiveModel {
        job::ActiveModel {
            updated_at: NotSet,
            ..Self::to_active(m)
        }
    }

    fn from_row(r: job::Model) -> Job {
        Job {
            id: r.id,
            title: r.title,
            job_number: r.job_number,
            site_address: r.site_address,
            site_city: r.site_city,
            site_state: r.site_state,
            site_postal_code: r.site_postal_code,
            brand_id: r.brand_id,
            client_id: r.client_id,
            project_manager_id: r.project_manager_id,
            creator_id: r.creator_id,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

fn multipliers_to_json(m: &BTreeMap<String, f64>) -> Json {
    Json::Object(
        m.iter()
            .map(|(k, v)| (k.clone(), Json::from(*v)))
            .collect(),
    )
}

/// Non-numeric entries are dropped.
fn multipliers_from_json(v: Json) -> BTreeMap<String, f64> {
    match v {
        Json::Object(map) => map
            .into_iter()
            .filter_map(|(k, v)| v.as_f64().map(|f| (k, f)))
            .collect(),
        _ => BTreeMap::new(),
    }
}

impl StoredResource for Signs {
    type Entity = sign::Entity;

    fn id_column() -> sign::Column {
        sign::Column::Id
    }

    fn order_column() -> sign::Column {
        sign::Column::CreatedAt
    }

    fn parent_column() -> Option<sign::Column> {
        Some(sign::Column::BrandId)
    }

    fn to_active(m: &Sign) -> sign::ActiveModel {
        sign::ActiveModel {
            id: Set(m.id),
            brand_id: Set(m.brand_id),
            name: Set(m.name.clone()),
            image_name: Set(m.image_name.clone()),
            image_url: Set(m.image_url.clone()),
            multipliers: Set(multipliers_to_json(&m.multipliers)),
            created_at: Set(m.created_at),
        }
    }

    fn from_row(r: sign::Model) -> Sign {
        Sign {
            id: r.id,
            brand_id: r.brand_id,
            name: r.name,
            image_name: r.image_name,
            image_url: r.image_url,
            multipliers: multipliers_from_json(r.multipliers),
            created_at: r.created_at,
        }
    }
}

impl StoredResource for SignOptions {
    type Entity = sign_option::Entity;

    fn id_column() -> sign_option::Column {
        sign_option::Column::Id
    }

    fn order_column() -> sign_option::Column {
        sign_option::Column::CreatedAt
    }

    fn parent_column() -> Option<sign_option::Column> {
        Some(sign_option::Column::SignId)
    }

    fn to_active(m: &SignOption) -> sign_option::ActiveModel {
        sign_option::ActiveModel {
            id: Set(m.id),
            sign_id: Set(m.sign_id),
            name: Set(m.name.clone()),
            created_at: Set(m.created_at),
        }
    }

    fn from_row(r: sign_option::Model) -> SignOption {
        SignOption {
            id: r.id,
            sign_id: r.sign_id,
            name: r.name,
            created_at: r.created_at,
        }
    }
}

impl StoredResource for OptionValues {
    type Entity = option_value::Entity;

    fn id_column() -> option_value::Column {
        option_value::Column::Id
    }

    fn order_column() -> option_value::Column {
        option_value::Column::CreatedAt
    }

    fn parent_column() -> Option<option_value::Column> {
        Some(option_value::Column::OptionId)
    }

    fn to_active(m: &OptionValue) -> option_value::ActiveModel {
        option_value::ActiveModel {
            id: Set(m.id),
            option_id: Set(m.option_id),
            value: Set(m.value.clone()),
            price_delta: Set(m.price_delta),
            created_at: Set(m.created_at),
        }
    }

    fn from_row(r: option_value::Model) -> OptionValue {
        OptionValue {
            id: r.id,
            option_id: r.option_id,
            value: r.value,
            price_delta: r.price_delta,
            created_at: r.created_at,
        }
    }
}

impl StoredResource for PricingLines {
    type Entity = pricing_line::Entity;

    fn id_column() -> pricing_line::Column {
        pricing_line::Column::Id
    }

    fn order_column() -> pricing_line::Column {
        pricing_line::Column::CreatedAt
    }

    fn parent_column() -> Option<pricing_line::Column> {
        Some(pricing_line::Column::JobId)
    }

    fn to_active(m: &PricingLine) -> pricing_line::ActiveModel {
        pricing_line::ActiveModel {
            id: Set(m.id),
            job_id: Set(m.job_id),
            sign_id: Set(m.sign_id),
            quantity: Set(m.quantity),
            unit_price: Set(m.unit_price),
            unit_cost: Set(m.unit_cost),
            budget: Set(m.budget),
            description: Set(m.description.clone()),
            created_at: Set(m.created_at),
        }
    }

    fn from_row(r: pricing_line::Model) -> PricingLine {
        PricingLine {
            id: r.id,
            job_id: r.job_id,
            sign_id: r.sign_id,
            quantity: r.quantity,
            unit_price: r.unit_price,
            unit_cost: r.unit_cost,
            budget: r.budget,
            description: r.description,
            created_at: r.created_at,
        }
    }
}

impl StoredResource for Users {
    type Entity = user::Entity;

    fn id_column() -> user::Column {
        user::Column::Id
    }

    fn order_column() -> user::Column {
        user::Column::CreatedAt
    }

    fn unique_column() -> Option<user::Column> {
        Some(user::Column::Email)
    }

    fn to_active(m: &User) -> user::ActiveModel {
        user::ActiveModel {
            id: Set(m.id),
            display_name: Set(m.display_name.clone()),
            email: Set(m.email.clone()),
            role: Set(m.role.as_str().to_owned()),
            status: Set(m.status.as_str().to_owned()),
            last_active_at: Set(m.last_active_at),
            created_at: Set(m.created_at),
        }
    }

    fn from_row(r: user::Model) -> User {
        user_from_row(r)
    }
}

pub(crate) fn user_from_row(r: user::Model) -> User {
    User {
        id: r.id,
        display_name: r.display_name,
        email: r.email,
        role: Role::parse(&r.role),
        status: UserStatus::parse(&r.status),
        last_active_at: r.last_active_at,
        created_at: r.created_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn multipliers_keep_numbers_only() {
        let m = multipliers_from_json(json!({ "lit": 1.5, "bad": "x", "size": 2 }));
        assert_eq!(m.len(), 2);
        assert_eq!(m["lit"], 1.5);
        assert_eq!(m["size"], 2.0);
        assert!(multipliers_from_json(json!(null)).is_empty());
    }

    #[test]
    fn unknown_stored_role_reads_as_employee() {
        let row = user::Model {
            id: uuid::Uuid::new_v4(),
            display_name: "A".into(),
            email: "a@x.io".into(),
            role: "superuser".into(),
            status: "active".into(),
            last_active_at: None,
            created_at: chrono::Utc::now(),
        };
        let u = user_from_row(row);
        assert_eq!(u.role, Role::Employee);
        assert!(u.is_active());
    }
}
