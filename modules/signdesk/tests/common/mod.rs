#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use chrono::Utc;
use http_body_util::BodyExt;
use modkit_db::{ConnectOpts, DbHandle};
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use signdesk::domain::identity::{IdentityProvider, ProviderError, ProviderSession, ProviderUser};
use signdesk::infra::storage::entity::user;
use signdesk::{SignDesk, SignDeskConfig};

/// Tokens are `tok:<email>`; codes are the email itself; `bad-code` fails.
#[derive(Default)]
pub struct FakeProvider {
    pub sign_outs: AtomicUsize,
}

#[async_trait]
impl IdentityProvider for FakeProvider {
    async fn exchange_code(
        &self,
        code: &str,
        _verifier: Option<&str>,
    ) -> Result<ProviderSession, ProviderError> {
        if code == "bad-code" {
            return Err(ProviderError::Rejected { status: 400 });
        }
        Ok(ProviderSession {
            access_token: format!("tok:{code}"),
            refresh_token: Some("refresh".into()),
            email: code.to_string(),
        })
    }

    async fn user_for_token(&self, token: &str) -> Result<Option<ProviderUser>, ProviderError> {
        Ok(token.strip_prefix("tok:").map(|email| ProviderUser {
            email: email.to_string(),
        }))
    }

    async fn sign_out(&self, _token: &str) -> Result<(), ProviderError> {
        self.sign_outs.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

pub struct TestApp {
    pub router: Router,
    pub conn: DatabaseConnection,
    pub provider: Arc<FakeProvider>,
}

pub const ADMIN: &str = "admin@signdesk.dev";
pub const EMPLOYEE: &str = "emp@signdesk.dev";
pub const DISABLED: &str = "gone@signdesk.dev";

pub async fn app() -> TestApp {
    let db = DbHandle::connect("sqlite::memory:", ConnectOpts::default())
        .await
        .expect("connect in-memory sqlite");
    SignDesk::migrate(&db).await.expect("migrate");

    let conn = db.sea();
    seed_user(&conn, ADMIN, "admin", "active").await;
    seed_user(&conn, EMPLOYEE, "employee", "active").await;
    seed_user(&conn, DISABLED, "admin", "disabled").await;

    let provider = Arc::new(FakeProvider::default());
    let module = SignDesk::new(conn.clone(), provider.clone(), SignDeskConfig::default());
    TestApp {
        router: module.register_rest(Router::new()),
        conn,
        provider,
    }
}

pub async fn seed_user(conn: &DatabaseConnection, email: &str, role: &str, status: &str) -> Uuid {
    let id = Uuid::new_v4();
    user::ActiveModel {
        id: Set(id),
        display_name: Set(email.split('@').next().unwrap_or(email).to_string()),
        email: Set(email.to_string()),
        role: Set(role.to_string()),
        status: Set(status.to_string()),
        last_active_at: Set(None),
        created_at: Set(Utc::now()),
    }
    .insert(conn)
    .await
    .expect("seed user");
    id
}

pub fn cookie_for(email: &str) -> String {
    format!("sd-access-token=tok:{email}")
}

pub struct Reply {
    pub status: StatusCode,
    pub headers: axum::http::HeaderMap,
    pub body: Value,
}

impl TestApp {
    pub async fn call(
        &self,
        method: &str,
        uri: &str,
        as_user: Option<&str>,
        body: Option<Value>,
    ) -> Reply {
        let mut req = Request::builder().method(method).uri(uri);
        if let Some(email) = as_user {
            req = req.header(header::COOKIE, cookie_for(email));
        }
        let req = match body {
            Some(v) => req
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(v.to_string())),
            None => req.body(Body::empty()),
        }
        .unwrap();
        self.send(req).await
    }

    pub async fn send(&self, req: Request<Body>) -> Reply {
        let resp = self.router.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let headers = resp.headers().clone();
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        Reply {
            status,
            headers,
            body,
        }
    }

    /// Creates a row as admin and returns its id.
    pub async fn create(&self, collection: &str, body: Value) -> Uuid {
        let reply = self
            .call("POST", &format!("/{collection}"), Some(ADMIN), Some(body))
            .await;
        assert_eq!(reply.status, StatusCode::CREATED, "{}", reply.body);
        reply.body["id"].as_str().unwrap().parse().unwrap()
    }
}
