pub mod authz;
pub mod error;
pub mod identity;
pub mod jobs;
pub mod repo;
pub mod resource;
pub mod resources;
pub mod service;
pub mod session;
pub mod sign_order;
