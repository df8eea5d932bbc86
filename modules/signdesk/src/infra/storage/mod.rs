pub mod entity;
pub mod jobs;
pub mod mapper;
pub mod migrations;
pub mod sea_orm_repo;
pub mod users;

pub use jobs::SeaOrmJobTimestamps;
pub use sea_orm_repo::SeaOrmRepository;
pub use users::SeaOrmUserDirectory;
