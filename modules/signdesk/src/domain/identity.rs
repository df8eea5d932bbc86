//! Identity resolution: a session token becomes a canonical user, or nothing.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, instrument};
use uuid::Uuid;

use crate::contract::model::{Role, User};
use crate::domain::error::DomainError;
use crate::domain::repo::UserDirectory;
use crate::domain::resources::normalize_email;

/// The caller as known to this server. Role is always read from the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: Uuid,
    pub email: String,
    pub role: Role,
    pub display_name: String,
}

impl From<&User> for Identity {
    fn from(u: &User) -> Self {
        Self {
            user_id: u.id,
            email: u.email.clone(),
            role: u.role,
            display_name: u.display_name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProviderSession {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProviderUser {
    pub email: String,
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("identity provider rejected the request (HTTP {status})")]
    Rejected { status: u16 },

    #[error("identity provider unavailable: {0}")]
    Unavailable(String),
}

/// Session-exchange interface of the hosted identity provider.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Trade a one-time authorization code (plus PKCE verifier) for a session.
    async fn exchange_code(
        &self,
        code: &str,
        verifier: Option<&str>,
    ) -> Result<ProviderSession, ProviderError>;

    /// `Ok(None)` when the provider does not accept the token.
    async fn user_for_token(&self, access_token: &str)
        -> Result<Option<ProviderUser>, ProviderError>;

    async fn sign_out(&self, access_token: &str) -> Result<(), ProviderError>;
}

#[derive(Clone)]
pub struct IdentityResolver {
    provider: Arc<dyn IdentityProvider>,
    users: Arc<dyn UserDirectory>,
}

impl IdentityResolver {
    pub fn new(provider: Arc<dyn IdentityProvider>, users: Arc<dyn UserDirectory>) -> Self {
        Self { provider, users }
    }

    /// `Ok(None)` means unauthenticated: no token, a token the provider
    /// rejects, an unknown email, or a disabled user.
    #[instrument(name = "signdesk.identity.resolve", skip_all)]
    pub async fn resolve(&self, access_token: Option<&str>) -> Result<Option<Identity>, DomainError> {
        let Some(token) = access_token.filter(|t| !t.is_empty()) else {
            return Ok(None);
        };

        let provider_user = match self.provider.user_for_token(token).await {
            Ok(Some(u)) => u,
            Ok(None) | Err(ProviderError::Rejected { .. }) => {
                debug!("session token not accepted by provider");
                return Ok(None);
            }
            Err(e) => {
                error!(error = %e, "identity provider lookup failed");
                return Err(DomainError::internal(e.to_string()));
            }
        };

        self.active_user(&provider_user.email).await
    }

    /// The active user registered under `email`, if any.
    pub async fn active_user(&self, email: &str) -> Result<Option<Identity>, DomainError> {
        let user = self
            .users
            .find_by_email(&normalize_email(email))
            .await
            .map_err(|e| {
                error!(error = %e, "user lookup by email failed");
                DomainError::internal(e.to_string())
            })?;

        match user {
            Some(u) if u.is_active() => Ok(Some(Identity::from(&u))),
            Some(_) => {
                debug!("user is disabled");
                Ok(None)
            }
            None => {
                debug!("no user registered for provider email");
                Ok(None)
            }
        }
    }
}
