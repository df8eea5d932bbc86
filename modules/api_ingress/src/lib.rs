//! HTTP host: wraps the application router in the shared middleware stack,
//! adds `/health` and the API docs, and serves until cancelled.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::http::header;
use axum::response::IntoResponse;
use axum::{middleware::from_fn, routing::get, Router};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::{
    cors::CorsLayer,
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
};
use utoipa::openapi::OpenApi;

mod config;
pub mod request_id;
mod web;

pub use config::ApiIngressConfig;

/// Owns the HTTP surface of the server.
pub struct ApiIngress {
    config: ApiIngressConfig,
}

impl ApiIngress {
    pub fn new(config: ApiIngressConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ApiIngressConfig {
        &self.config
    }

    /// Mount host routes next to `app` and apply the middleware stack.
    ///
    /// `openapi` is served at `/openapi.json` (with a viewer at `/docs`) only
    /// when `enable_docs` is set.
    pub fn build_router(&self, app: Router, openapi: Option<OpenApi>) -> Result<Router> {
        let mut router = app.route("/health", get(web::health_check));

        if self.config.enable_docs {
            if let Some(doc) = openapi {
                let doc = Arc::new(serde_json::to_value(&doc).context("serialize OpenAPI")?);
                tracing::info!("API docs enabled at /docs");
                router = router
                    .route(
                        "/openapi.json",
                        get(move || {
                            let doc = doc.clone();
                            async move {
                                (
                                    [(header::CACHE_CONTROL, "no-store")],
                                    axum::Json((*doc).clone()),
                                )
                                    .into_response()
                            }
                        }),
                    )
                    .route("/docs", get(web::serve_docs));
            }
        }

        // Layers added last run first. Effective order, outermost to innermost:
        // SetRequestId -> PropagateRequestId -> Trace -> expose id -> Timeout -> CORS -> BodyLimit
        let x_request_id = request_id::header();

        router = router.layer(RequestBodyLimitLayer::new(self.config.body_limit_bytes));

        if self.config.cors_enabled {
            router = router.layer(CorsLayer::permissive());
        }

        router = router.layer(TimeoutLayer::new(Duration::from_secs(
            self.config.request_timeout_secs.max(1),
        )));
        router = router.layer(from_fn(request_id::expose_to_handlers));
        router = router.layer(request_id::trace_layer());
        router = router.layer(PropagateRequestIdLayer::new(x_request_id.clone()));
        router = router.layer(SetRequestIdLayer::new(x_request_id, request_id::NanoIdGen));

        Ok(router)
    }
}

pub async fn bind(addr: &str) -> Result<TcpListener> {
    let addr: SocketAddr = addr
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid bind address '{}': {}", addr, e))?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("bind {addr}"))?;
    Ok(listener)
}

/// Serve `router` on `listener` until `cancel` fires, then drain in-flight requests.
pub async fn serve(listener: TcpListener, router: Router, cancel: CancellationToken) -> Result<()> {
    if let Ok(addr) = listener.local_addr() {
        tracing::info!("HTTP server bound on {}", addr);
    }

    let shutdown = async move {
        cancel.cancelled().await;
        tracing::info!("HTTP server shutting down gracefully (cancellation)");
    };

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| anyhow::anyhow!(e))
}
