//! Resource descriptions for every collection served by the module.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::contract::model::*;
use crate::domain::resource::{Access, BuildCtx, DeleteMode, Operation, Resource};
use crate::domain::sign_order::arrange_signs;

pub struct Brands;
pub struct Clients;
pub struct Jobs;
pub struct Signs;
pub struct SignOptions;
pub struct OptionValues;
pub struct PricingLines;
pub struct Users;

fn set<T>(slot: &mut T, value: Option<T>) {
    if let Some(v) = value {
        *slot = v;
    }
}

fn set_opt<T>(slot: &mut Option<T>, value: Option<T>) {
    if value.is_some() {
        *slot = value;
    }
}

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

impl Resource for Brands {
    const NAME: &'static str = "brand";
    const COLLECTION: &'static str = "brands";
    const REQUIRED: &'static [&'static str] = &["name"];

    type Model = Brand;
    type New = NewBrand;
    type Patch = BrandPatch;

    fn id(model: &Brand) -> Uuid {
        model.id
    }

    fn build(new: NewBrand, ctx: &BuildCtx) -> Brand {
        Brand {
            id: ctx.id,
            name: new.name,
            description: new.description,
            logo_url: new.logo_url,
            created_at: ctx.now,
        }
    }

    fn apply(model: &mut Brand, patch: BrandPatch) {
        set(&mut model.name, patch.name);
        set_opt(&mut model.description, patch.description);
        set_opt(&mut model.logo_url, patch.logo_url);
    }
}

impl Resource for Clients {
    const NAME: &'static str = "client";
    const COLLECTION: &'static str = "clients";
    const REQUIRED: &'static [&'static str] = &["legal_name"];

    type Model = Client;
    type New = NewClient;
    type Patch = ClientPatch;

    fn id(model: &Client) -> Uuid {
        model.id
    }

    fn build(new: NewClient, ctx: &BuildCtx) -> Client {
        Client {
            id: ctx.id,
            legal_name: new.legal_name,
            address_line1: new.address_line1,
            address_line2: new.address_line2,
            city: new.city,
            state: new.state,
            postal_code: new.postal_code,
            country: new.country,
            contact_name: new.contact_name,
            contact_email: new.contact_email,
            contact_phone: new.contact_phone,
            created_at: ctx.now,
            updated_at: ctx.now,
        }
    }

    fn apply(model: &mut Client, patch: ClientPatch) {
        set(&mut model.legal_name, patch.legal_name);
        set_opt(&mut model.address_line1, patch.address_line1);
        set_opt(&mut model.address_line2, patch.address_line2);
        set_opt(&mut model.city, patch.city);
        set_opt(&mut model.state, patch.state);
        set_opt(&mut model.postal_code, patch.postal_code);
        set_opt(&mut model.country, patch.country);
        set_opt(&mut model.contact_name, patch.contact_name);
        set_opt(&mut model.contact_email, patch.contact_email);
        set_opt(&mut model.contact_phone, patch.contact_phone);
    }

    fn touch(model: &mut Client, now: DateTime<Utc>) {
        model.updated_at = now;
    }
}

impl Resource for Jobs {
    const NAME: &'static str = "job";
    const COLLECTION: &'static str = "jobs";
    const REQUIRED: &'static [&'static str] = &["title", "client_id"];
    const PARENT_KEY: Option<&'static str> = Some("client_id");

    type Model = Job;
    type New = NewJob;
    type Patch = JobPatch;

    fn id(model: &Job) -> Uuid {
        model.id
    }

    fn build(new: NewJob, ctx: &BuildCtx) -> Job {
        Job {
            id: ctx.id,
            title: new.title,
            job_number: new.job_number,
            site_address: new.site_address,
            site_city: new.site_city,
            site_state: new.site_state,
            site_postal_code: new.site_postal_code,
            brand_id: new.brand_id,
            client_id: new.client_id,
            project_manager_id: new.project_manager_id,
            creator_id: ctx.actor,
            created_at: ctx.now,
            updated_at: ctx.now,
        }
    }

    // `updated_at` stays put; only the update-last-modified operation moves it.
    fn apply(model: &mut Job, patch: JobPatch) {
        set(&mut model.title, patch.title);
        set(&mut model.client_id, patch.client_id);
        set_opt(&mut model.job_number, patch.job_number);
        set_opt(&mut model.site_address, patch.site_address);
        set_opt(&mut model.site_city, patch.site_city);
        set_opt(&mut model.site_state, patch.site_state);
        set_opt(&mut model.site_postal_code, patch.site_postal_code);
        set_opt(&mut model.brand_id, patch.brand_id);
        set_opt(&mut model.project_manager_id, patch.project_manager_id);
    }
}

impl Resource for Signs {
    const NAME: &'static str = "sign";
    const COLLECTION: &'static str = "signs";
    const REQUIRED: &'static [&'static str] = &["brand_id", "name"];
    const PARENT_KEY: Option<&'static str> = Some("brand_id");

    type Model = Sign;
    type New = NewSign;
    type Patch = SignPatch;

    fn id(model: &Sign) -> Uuid {
        model.id
    }

    fn build(new: NewSign, ctx: &BuildCtx) -> Sign {
        Sign {
            id: ctx.id,
            brand_id: new.brand_id,
            name: new.name,
            image_name: new.image_name,
            image_url: new.image_url,
            multipliers: new.multipliers,
            created_at: ctx.now,
        }
    }

    fn apply(model: &mut Sign, patch: SignPatch) {
        set(&mut model.brand_id, patch.brand_id);
        set(&mut model.name, patch.name);
        set_opt(&mut model.image_name, patch.image_name);
        set_opt(&mut model.image_url, patch.image_url);
        set(&mut model.multipliers, patch.multipliers);
    }

    fn arrange(items: Vec<Sign>) -> Vec<Sign> {
        arrange_signs(items)
    }
}

impl Resource for SignOptions {
    const NAME: &'static str = "option";
    const COLLECTION: &'static str = "options";
    const REQUIRED: &'static [&'static str] = &["sign_id", "name"];
    const PARENT_KEY: Option<&'static str> = Some("sign_id");

    type Model = SignOption;
    type New = NewSignOption;
    type Patch = SignOptionPatch;

    fn id(model: &SignOption) -> Uuid {
        model.id
    }

    fn build(new: NewSignOption, ctx: &BuildCtx) -> SignOption {
        SignOption {
            id: ctx.id,
            sign_id: new.sign_id,
            name: new.name,
            created_at: ctx.now,
        }
    }

    fn apply(model: &mut SignOption, patch: SignOptionPatch) {
        set(&mut model.sign_id, patch.sign_id);
        set(&mut model.name, patch.name);
    }
}

impl Resource for OptionValues {
    const NAME: &'static str = "option value";
    const COLLECTION: &'static str = "option-values";
    const REQUIRED: &'static [&'static str] = &["option_id", "value"];
    const PARENT_KEY: Option<&'static str> = Some("option_id");

    type Model = OptionValue;
    type New = NewOptionValue;
    type Patch = OptionValuePatch;

    fn id(model: &OptionValue) -> Uuid {
        model.id
    }

    fn build(new: NewOptionValue, ctx: &BuildCtx) -> OptionValue {
        OptionValue {
            id: ctx.id,
            option_id: new.option_id,
            value: new.value,
            price_delta: new.price_delta,
            created_at: ctx.now,
        }
    }

    fn apply(model: &mut OptionValue, patch: OptionValuePatch) {
        set(&mut model.option_id, patch.option_id);
        set(&mut model.value, patch.value);
        set(&mut model.price_delta, patch.price_delta);
    }
}

impl Resource for PricingLines {
    const NAME: &'static str = "pricing line";
    const COLLECTION: &'static str = "pricing-lines";
    const REQUIRED: &'static [&'static str] = &["job_id", "sign_id"];
    const PARENT_KEY: Option<&'static str> = Some("job_id");

    type Model = PricingLine;
    type New = NewPricingLine;
    type Patch = PricingLinePatch;

    fn id(model: &PricingLine) -> Uuid {
        model.id
    }

    fn build(new: NewPricingLine, ctx: &BuildCtx) -> PricingLine {
        PricingLine {
            id: ctx.id,
            job_id: new.job_id,
            sign_id: new.sign_id,
            quantity: new.quantity,
            unit_price: new.unit_price,
            unit_cost: new.unit_cost,
            budget: new.budget,
            description: new.description,
            created_at: ctx.now,
        }
    }

    fn apply(model: &mut PricingLine, patch: PricingLinePatch) {
        set(&mut model.job_id, patch.job_id);
        set(&mut model.sign_id, patch.sign_id);
        set(&mut model.quantity, patch.quantity);
        set(&mut model.unit_price, patch.unit_price);
        set(&mut model.unit_cost, patch.unit_cost);
        set(&mut model.budget, patch.budget);
        set_opt(&mut model.description, patch.description);
    }
}

impl Resource for Users {
    const NAME: &'static str = "user";
    const COLLECTION: &'static str = "users";
    const REQUIRED: &'static [&'static str] = &["display_name", "email"];
    const DELETE_MODE: DeleteMode = DeleteMode::Disable;

    type Model = User;
    type New = NewUser;
    type Patch = UserPatch;

    fn id(model: &User) -> Uuid {
        model.id
    }

    fn build(new: NewUser, ctx: &BuildCtx) -> User {
        User {
            id: ctx.id,
            display_name: new.display_name,
            email: normalize_email(&new.email),
            role: new.role,
            status: new.status,
            last_active_at: None,
            created_at: ctx.now,
        }
    }

    fn apply(model: &mut User, patch: UserPatch) {
        set(&mut model.display_name, patch.display_name);
        set(&mut model.email, patch.email.as_deref().map(normalize_email));
        set(&mut model.role, patch.role);
        set(&mut model.status, patch.status);
    }

    fn access(op: Operation) -> Access {
        match op {
            Operation::Get => Access::AdminOrSelf,
            Operation::List | Operation::Create | Operation::Update | Operation::Delete => {
                Access::Admin
            }
        }
    }

    fn unique_value(model: &User) -> Option<&str> {
        Some(&model.email)
    }

    fn disable(model: &mut User) {
        model.status = UserStatus::Disabled;
    }
}
