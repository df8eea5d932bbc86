use std::sync::Arc;

use axum::routing::{get, post};
use axum::{Extension, Router};

use crate::api::rest::extract::AuthState;
use crate::api::rest::handlers;
use crate::domain::jobs::JobActivity;
use crate::domain::resource::Resource;
use crate::domain::service::ResourceService;

/// `/{collection}` and `/{collection}/{id}` for one resource.
pub fn resource_routes<R: Resource>(svc: ResourceService<R>) -> Router {
    let collection = format!("/{}", R::COLLECTION);
    let item = format!("/{}/{{id}}", R::COLLECTION);

    Router::new()
        .route(
            &collection,
            get(handlers::list::<R>).post(handlers::create::<R>),
        )
        .route(
            &item,
            get(handlers::get_one::<R>)
                .put(handlers::update::<R>)
                .patch(handlers::update::<R>)
                .delete(handlers::delete::<R>),
        )
        .layer(Extension(Arc::new(svc)))
}

pub fn job_routes(jobs: JobActivity) -> Router {
    Router::new()
        .route("/jobs/update-last-modified", post(handlers::touch_job))
        .layer(Extension(Arc::new(jobs)))
}

pub fn auth_routes() -> Router {
    Router::new()
        .route("/auth/callback", get(handlers::auth_callback))
        .route("/auth/sign-out", post(handlers::sign_out))
        .route("/auth/session", get(handlers::current_session))
}

/// Installs the shared auth state on every route so the session extractor
/// can resolve identities.
pub fn with_auth(router: Router, auth: Arc<AuthState>) -> Router {
    router.layer(Extension(auth))
}
