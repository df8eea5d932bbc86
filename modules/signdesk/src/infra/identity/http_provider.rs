use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use url::Url;

use crate::config::AuthConfig;
use crate::domain::identity::{IdentityProvider, ProviderError, ProviderSession, ProviderUser};

/// Client for a GoTrue-compatible auth API rooted at `base`
/// (e.g. `https://project.example.co/auth/v1`).
pub struct HttpIdentityProvider {
    client: Client,
    base: Url,
    api_key: Option<String>,
}

#[derive(Serialize)]
struct PkceGrant<'a> {
    auth_code: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    code_verifier: Option<&'a str>,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    user: UserResponse,
}

#[derive(Deserialize)]
struct UserResponse {
    email: String,
}

impl HttpIdentityProvider {
    pub fn new(base: Url, api_key: Option<String>, timeout: Duration) -> anyhow::Result<Self> {
        if base.cannot_be_a_base() {
            anyhow::bail!("identity provider URL cannot be a base: {base}");
        }
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base,
            api_key,
        })
    }

    pub fn from_config(cfg: &AuthConfig) -> anyhow::Result<Self> {
        let base = Url::parse(&cfg.provider_url)?;
        Self::new(
            base,
            Some(cfg.api_key.clone()).filter(|k| !k.is_empty()),
            Duration::from_secs(cfg.timeout_secs),
        )
    }

    fn endpoint(&self, segment: &str) -> Result<Url, ProviderError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| ProviderError::Unavailable("invalid provider base URL".into()))?
            .pop_if_empty()
            .push(segment);
        Ok(url)
    }

    fn with_key(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => req.header("apikey", key),
            None => req,
        }
    }
}

fn transport(e: reqwest::Error) -> ProviderError {
    ProviderError::Unavailable(e.to_string())
}

/// Server-side failures are outages; anything else the provider refused.
fn status_error(status: StatusCode) -> ProviderError {
    if status.is_server_error() {
        ProviderError::Unavailable(format!("HTTP {status}"))
    } else {
        ProviderError::Rejected {
            status: status.as_u16(),
        }
    }
}

fn ensure_success(resp: Response) -> Result<Response, ProviderError> {
    let status = resp.status();
    if status.is_success() {
        Ok(resp)
    } else {
        Err(status_error(status))
    }
}

#[async_trait]
impl IdentityProvider for HttpIdentityProvider {
    #[instrument(name = "signdesk.http.identity.exchange_code", skip_all, fields(base = %self.base))]
    async fn exchange_code(
        &self,
        code: &str,
        verifier: Option<&str>,
    ) -> Result<ProviderSession, ProviderError> {
        let mut url = self.endpoint("token")?;
        url.query_pairs_mut().append_pair("grant_type", "pkce");

        let resp = self
            .with_key(self.client.post(url))
            .json(&PkceGrant {
                auth_code: code,
                code_verifier: verifier,
            })
            .send()
            .await
            .map_err(transport)?;
        let body: TokenResponse = ensure_success(resp)?.json().await.map_err(transport)?;

        debug!("authorization code exchanged");
        Ok(ProviderSession {
            access_token: body.access_token,
            refresh_token: body.refresh_token,
            email: body.user.email,
        })
    }

    #[instrument(name = "signdesk.http.identity.user_for_token", skip_all, fields(base = %self.base))]
    async fn user_for_token(
        &self,
        access_token: &str,
    ) -> Result<Option<ProviderUser>, ProviderError> {
        let url = self.endpoint("user")?;
        let resp = self
            .with_key(self.client.get(url))
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(transport)?;

        if matches!(resp.status(), StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
            return Ok(None);
        }
        let body: UserResponse = ensure_success(resp)?.json().await.map_err(transport)?;
        Ok(Some(ProviderUser { email: body.email }))
    }

    /// An already-expired token (401) counts as signed out.
    #[instrument(name = "signdesk.http.identity.sign_out", skip_all, fields(base = %self.base))]
    async fn sign_out(&self, access_token: &str) -> Result<(), ProviderError> {
        let url = self.endpoint("logout")?;
        let resp = self
            .with_key(self.client.post(url))
            .header(header::AUTHORIZATION, format!("Bearer {access_token}"))
            .send()
            .await
            .map_err(transport)?;

        if resp.status() == StatusCode::UNAUTHORIZED {
            return Ok(());
        }
        ensure_success(resp).map(|_| ())
    }
}
