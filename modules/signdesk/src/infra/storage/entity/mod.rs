//! SeaORM entities, one per table.

pub mod brand;
pub mod client;
pub mod job;
pub mod option_value;
pub mod pricing_line;
pub mod sign;
pub mod sign_option;
pub mod user;
