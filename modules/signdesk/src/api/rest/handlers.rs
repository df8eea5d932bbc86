use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, Query},
    http::{header, HeaderMap, HeaderValue, StatusCode, Uri},
    response::{IntoResponse, Json, Redirect, Response},
    Extension,
};
use cookie::{time::Duration, Cookie, SameSite};
use modkit::api::problem::ProblemResponse;
use serde_json::Value;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::api::rest::dto::{CallbackQuery, SessionDto, SignOutResp, TouchJobReq, TouchJobResp};
use crate::api::rest::error::map_domain_error;
use crate::api::rest::extract::{cookie_value, AuthState, Session};
use crate::config::SessionConfig;
use crate::domain::authz::authorize;
use crate::domain::error::DomainError;
use crate::domain::jobs::JobActivity;
use crate::domain::resource::{missing_fields, Access, Operation, Resource};
use crate::domain::service::{Deleted, ResourceService};
use crate::domain::session::SignInError;

fn fail(e: DomainError, uri: &Uri) -> ProblemResponse {
    if e.is_client_error() {
        warn!(path = %uri.path(), "request rejected: {}", e);
    } else {
        error!(path = %uri.path(), "request failed: {}", e);
    }
    map_domain_error(&e, uri.path())
}

fn parse_id(raw: &str, field: &str) -> Result<Uuid, DomainError> {
    Uuid::parse_str(raw.trim())
        .map_err(|_| DomainError::validation(field, format!("'{raw}' is not a valid id")))
}

/// Empty body reads as `null`; anything else must be JSON.
fn parse_body(body: &Bytes) -> Result<Value, DomainError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    serde_json::from_slice(body)
        .map_err(|e| DomainError::validation("body", format!("malformed JSON: {e}")))
}

fn parent_filter<R: Resource>(uri: &Uri) -> Result<Option<Uuid>, DomainError> {
    let Query(params) = Query::<HashMap<String, String>>::try_from_uri(uri)
        .map_err(|e| DomainError::validation("query", e.body_text()))?;
    match R::PARENT_KEY.and_then(|key| params.get(key).map(|v| (key, v))) {
        Some((key, raw)) => parse_id(raw, key).map(Some),
        None => Ok(None),
    }
}

pub async fn list<R: Resource>(
    Extension(svc): Extension<Arc<ResourceService<R>>>,
    session: Session,
    uri: Uri,
) -> Result<Json<Vec<R::Model>>, ProblemResponse> {
    authorize(session.identity(), R::access(Operation::List), None).map_err(|e| fail(e, &uri))?;
    let parent = parent_filter::<R>(&uri).map_err(|e| fail(e, &uri))?;

    svc.list(parent).await.map(Json).map_err(|e| fail(e, &uri))
}

pub async fn get_one<R: Resource>(
    Extension(svc): Extension<Arc<ResourceService<R>>>,
    session: Session,
    Path(raw_id): Path<String>,
    uri: Uri,
) -> Result<Json<R::Model>, ProblemResponse> {
    let id = parse_id(&raw_id, "id");
    authorize(
        session.identity(),
        R::access(Operation::Get),
        id.as_ref().ok().copied(),
    )
    .map_err(|e| fail(e, &uri))?;
    let id = id.map_err(|e| fail(e, &uri))?;

    svc.get(id).await.map(Json).map_err(|e| fail(e, &uri))
}

pub async fn create<R: Resource>(
    Extension(svc): Extension<Arc<ResourceService<R>>>,
    session: Session,
    uri: Uri,
    body: Bytes,
) -> Result<(StatusCode, Json<R::Model>), ProblemResponse> {
    let actor = authorize(session.identity(), R::access(Operation::Create), None)
        .map_err(|e| fail(e, &uri))?;
    let body = parse_body(&body).map_err(|e| fail(e, &uri))?;

    let created = svc.create(body, actor).await.map_err(|e| fail(e, &uri))?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update<R: Resource>(
    Extension(svc): Extension<Arc<ResourceService<R>>>,
    session: Session,
    Path(raw_id): Path<String>,
    uri: Uri,
    body: Bytes,
) -> Result<Json<R::Model>, ProblemResponse> {
    let id = parse_id(&raw_id, "id");
    authorize(
        session.identity(),
        R::access(Operation::Update),
        id.as_ref().ok().copied(),
    )
    .map_err(|e| fail(e, &uri))?;
    let id = id.map_err(|e| fail(e, &uri))?;
    let body = parse_body(&body).map_err(|e| fail(e, &uri))?;

    svc.update(id, body).await.map(Json).map_err(|e| fail(e, &uri))
}

/// 204 when the row is gone; 200 with the record when it was disabled instead.
pub async fn delete<R: Resource>(
    Extension(svc): Extension<Arc<ResourceService<R>>>,
    session: Session,
    Path(raw_id): Path<String>,
    uri: Uri,
) -> Result<Response, ProblemResponse> {
    let id = parse_id(&raw_id, "id");
    authorize(
        session.identity(),
        R::access(Operation::Delete),
        id.as_ref().ok().copied(),
    )
    .map_err(|e| fail(e, &uri))?;
    let id = id.map_err(|e| fail(e, &uri))?;

    match svc.delete(id).await.map_err(|e| fail(e, &uri))? {
        Deleted::Removed => Ok(StatusCode::NO_CONTENT.into_response()),
        Deleted::Disabled(model) => Ok(Json(model).into_response()),
    }
}

/// Refresh a job's last-modified timestamp.
pub async fn touch_job(
    Extension(jobs): Extension<Arc<JobActivity>>,
    session: Session,
    uri: Uri,
    body: Bytes,
) -> Result<Json<TouchJobResp>, ProblemResponse> {
    authorize(session.identity(), Access::AnyRole, None)
        .map_err(|e| fail(e, &uri))?;

    let body = parse_body(&body).map_err(|e| fail(e, &uri))?;
    let missing = if body.is_object() {
        missing_fields(&body, &["jobId"])
    } else {
        vec!["jobId".to_string()]
    };
    if !missing.is_empty() {
        return Err(fail(DomainError::missing(missing), &uri));
    }
    let req: TouchJobReq = serde_json::from_value(body)
        .map_err(|_| fail(DomainError::validation("jobId", "must be a valid id"), &uri))?;

    let updated_at = jobs.touch(req.job_id).await.map_err(|e| fail(e, &uri))?;
    Ok(Json(TouchJobResp {
        success: true,
        updated_at,
    }))
}

fn session_cookie(cfg: &SessionConfig, name: &str, value: String) -> Cookie<'static> {
    Cookie::build((name.to_owned(), value))
        .http_only(true)
        .same_site(SameSite::Lax)
        .path("/")
        .secure(cfg.cookie_secure)
        .max_age(Duration::seconds(cfg.max_age_secs))
        .build()
}

fn removal_cookie(cfg: &SessionConfig, name: &str) -> Cookie<'static> {
    let mut c = session_cookie(cfg, name, String::new());
    c.make_removal();
    c
}

fn with_cookies(mut resp: Response, cookies: impl IntoIterator<Item = Cookie<'static>>) -> Response {
    for c in cookies {
        match HeaderValue::from_str(&c.to_string()) {
            Ok(v) => {
                resp.headers_mut().append(header::SET_COOKIE, v);
            }
            Err(_) => warn!(cookie = c.name(), "cookie value is not a valid header"),
        }
    }
    resp
}

fn cleared_session(cfg: &SessionConfig) -> [Cookie<'static>; 3] {
    [
        removal_cookie(cfg, &cfg.access_cookie),
        removal_cookie(cfg, &cfg.refresh_cookie),
        removal_cookie(cfg, &cfg.verifier_cookie),
    ]
}

/// OAuth-style callback: exchange the code, admit only registered active users.
pub async fn auth_callback(
    Extension(auth): Extension<Arc<AuthState>>,
    Query(query): Query<CallbackQuery>,
    headers: HeaderMap,
) -> Response {
    let cfg = &auth.cookies;
    let verifier = cookie_value(&headers, &cfg.verifier_cookie);

    match auth
        .sessions
        .complete_sign_in(query.code.as_deref(), verifier.as_deref())
        .await
    {
        Ok((session, identity)) => {
            info!(user_id = %identity.user_id, "session established");
            let mut cookies = vec![session_cookie(cfg, &cfg.access_cookie, session.access_token)];
            if let Some(refresh) = session.refresh_token {
                cookies.push(session_cookie(cfg, &cfg.refresh_cookie, refresh));
            }
            cookies.push(removal_cookie(cfg, &cfg.verifier_cookie));
            with_cookies(Redirect::to(&cfg.post_login_path).into_response(), cookies)
        }
        Err(e) => {
            let location = format!("{}?error={}", cfg.sign_in_path, e.as_str());
            let resp = Redirect::to(&location).into_response();
            if e == SignInError::AccessDenied {
                with_cookies(resp, cleared_session(cfg))
            } else {
                resp
            }
        }
    }
}

pub async fn sign_out(
    Extension(auth): Extension<Arc<AuthState>>,
    headers: HeaderMap,
    uri: Uri,
) -> Result<Response, ProblemResponse> {
    let cfg = &auth.cookies;
    let token = cookie_value(&headers, &cfg.access_cookie);
    auth.sessions
        .sign_out(token.as_deref())
        .await
        .map_err(|e| fail(e, &uri))?;

    Ok(with_cookies(
        Json(SignOutResp { success: true }).into_response(),
        cleared_session(cfg),
    ))
}

pub async fn current_session(session: Session, uri: Uri) -> Result<Json<SessionDto>, ProblemResponse> {
    session
        .0
        .map(|identity| Json(SessionDto::from(identity)))
        .ok_or_else(|| fail(DomainError::Unauthenticated, &uri))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_body_is_null_and_garbage_is_invalid() {
        assert_eq!(parse_body(&Bytes::from_static(b"  \n")).unwrap(), Value::Null);
        assert!(matches!(
            parse_body(&Bytes::from_static(b"{oops")),
            Err(DomainError::Validation { .. })
        ));
    }

    #[test]
    fn malformed_id_is_invalid_input() {
        assert!(parse_id("not-a-uuid", "id").is_err());
        let id = Uuid::new_v4();
        assert_eq!(parse_id(&id.to_string(), "id").unwrap(), id);
    }

    #[test]
    fn session_cookie_attributes() {
        let cfg = SessionConfig::default();
        let c = session_cookie(&cfg, "sd-access-token", "tok".into()).to_string();
        assert!(c.starts_with("sd-access-token=tok"));
        assert!(c.contains("HttpOnly"));
        assert!(c.contains("SameSite=Lax"));
        assert!(c.contains("Path=/"));
        assert!(c.contains("Secure"));

        let removal = removal_cookie(&cfg, "sd-access-token").to_string();
        assert!(removal.contains("Max-Age=0"));
    }
}
