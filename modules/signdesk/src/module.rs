use std::sync::Arc;

use axum::Router;
use modkit_db::DbHandle;
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use tracing::info;
use utoipa::openapi::OpenApi;

use crate::api::rest::extract::AuthState;
use crate::api::rest::{openapi, routes};
use crate::config::SignDeskConfig;
use crate::domain::identity::IdentityProvider;
use crate::domain::jobs::JobActivity;
use crate::domain::repo::Repository;
use crate::domain::resources::{
    Brands, Clients, Jobs, OptionValues, PricingLines, SignOptions, Signs, Users,
};
use crate::domain::service::ResourceService;
use crate::domain::session::SessionService;
use crate::infra::identity::HttpIdentityProvider;
use crate::infra::storage::mapper::StoredResource;
use crate::infra::storage::migrations::Migrator;
use crate::infra::storage::{SeaOrmJobTimestamps, SeaOrmRepository, SeaOrmUserDirectory};

/// The SignDesk module: owns the service graph built over one database
/// connection and one identity provider.
#[derive(Clone)]
pub struct SignDesk {
    conn: DatabaseConnection,
    provider: Arc<dyn IdentityProvider>,
    config: SignDeskConfig,
}

fn service<R>(conn: &DatabaseConnection) -> ResourceService<R>
where
    R: StoredResource,
    SeaOrmRepository<R>: Repository<R>,
{
    ResourceService::new(Arc::new(SeaOrmRepository::<R>::new(conn.clone())))
}

impl SignDesk {
    pub fn new(
        conn: DatabaseConnection,
        provider: Arc<dyn IdentityProvider>,
        config: SignDeskConfig,
    ) -> Self {
        Self {
            conn,
            provider,
            config,
        }
    }

    /// Wires the HTTP identity provider from `config.auth`.
    pub fn from_config(db: &DbHandle, config: SignDeskConfig) -> anyhow::Result<Self> {
        let provider = HttpIdentityProvider::from_config(&config.auth)?;
        info!(provider_url = %config.auth.provider_url, "identity provider configured");
        Ok(Self::new(db.sea(), Arc::new(provider), config))
    }

    pub async fn migrate(db: &DbHandle) -> anyhow::Result<()> {
        info!("Running signdesk database migrations");
        Migrator::up(&db.sea(), None).await?;
        info!("signdesk database migrations completed successfully");
        Ok(())
    }

    pub fn config(&self) -> &SignDeskConfig {
        &self.config
    }

    /// Every route of the module, with the session state installed.
    pub fn register_rest(&self, router: Router) -> Router {
        info!("Registering signdesk REST routes");

        let conn = &self.conn;
        let users = Arc::new(SeaOrmUserDirectory::new(conn.clone()));
        let auth = Arc::new(AuthState {
            sessions: SessionService::new(self.provider.clone(), users),
            cookies: self.config.session.clone(),
        });
        let jobs = JobActivity::new(Arc::new(SeaOrmJobTimestamps::new(conn.clone())));

        let module = Router::new()
            .merge(routes::resource_routes::<Brands>(service(conn)))
            .merge(routes::resource_routes::<Clients>(service(conn)))
            .merge(routes::resource_routes::<Jobs>(service(conn)))
            .merge(routes::resource_routes::<Signs>(service(conn)))
            .merge(routes::resource_routes::<SignOptions>(service(conn)))
            .merge(routes::resource_routes::<OptionValues>(service(conn)))
            .merge(routes::resource_routes::<PricingLines>(service(conn)))
            .merge(routes::resource_routes::<Users>(service(conn)))
            .merge(routes::job_routes(jobs))
            .merge(routes::auth_routes());

        router.merge(routes::with_auth(module, auth))
    }

    pub fn openapi(&self) -> OpenApi {
        openapi::document(&self.config.session)
    }
}
