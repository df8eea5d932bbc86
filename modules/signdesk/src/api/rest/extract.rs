use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts, HeaderMap};
use cookie::Cookie;
use modkit::api::problem::ProblemResponse;
use modkit::api::trace::{extract_trace_id, IntoProblemResponse};

use crate::api::rest::error::map_domain_error;
use crate::config::SessionConfig;
use crate::domain::identity::Identity;
use crate::domain::session::SessionService;

/// Shared by every route of the module: sign-in flow plus cookie settings.
pub struct AuthState {
    pub sessions: SessionService,
    pub cookies: SessionConfig,
}

/// Value of the first cookie named `name` across all `Cookie` headers.
pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(Result::ok)
        .find(|c| c.name() == name)
        .map(|c| c.value().to_owned())
}

/// The caller's identity, resolved from the session cookie on every request.
/// `None` means unauthenticated; the authorization gate decides what that allows.
#[derive(Debug, Clone)]
pub struct Session(pub Option<Identity>);

impl Session {
    pub fn identity(&self) -> Option<&Identity> {
        self.0.as_ref()
    }
}

impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = ProblemResponse;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Some(auth) = parts.extensions.get::<Arc<AuthState>>().cloned() else {
            let trace_id = extract_trace_id(&parts.headers);
            return Err(anyhow::anyhow!("auth state not installed on router")
                .into_problem_response(parts.uri.path(), trace_id));
        };

        let token = cookie_value(&parts.headers, &auth.cookies.access_cookie);
        auth.sessions
            .resolver()
            .resolve(token.as_deref())
            .await
            .map(Session)
            .map_err(|e| map_domain_error(&e, parts.uri.path()))
    }
}
