//! Sign-in completion and sign-out against the identity provider.

use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::domain::error::DomainError;
use crate::domain::identity::{Identity, IdentityProvider, IdentityResolver, ProviderSession};
use crate::domain::repo::UserDirectory;

/// Why a callback did not produce a session. `as_str` is the `error` query value
/// on the sign-in redirect.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SignInError {
    #[error("authorization code missing")]
    MissingCode,
    #[error("code exchange failed")]
    ExchangeFailed,
    #[error("no active user for this account")]
    AccessDenied,
    #[error("user lookup failed")]
    ServerError,
}

impl SignInError {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignInError::MissingCode => "missing_code",
            SignInError::ExchangeFailed => "exchange_failed",
            SignInError::AccessDenied => "access_denied",
            SignInError::ServerError => "server_error",
        }
    }
}

#[derive(Clone)]
pub struct SessionService {
    provider: Arc<dyn IdentityProvider>,
    users: Arc<dyn UserDirectory>,
    resolver: IdentityResolver,
}

impl SessionService {
    pub fn new(provider: Arc<dyn IdentityProvider>, users: Arc<dyn UserDirectory>) -> Self {
        let resolver = IdentityResolver::new(provider.clone(), users.clone());
        Self {
            provider,
            users,
            resolver,
        }
    }

    #[instrument(name = "signdesk.session.complete_sign_in", skip_all)]
    pub async fn complete_sign_in(
        &self,
        code: Option<&str>,
        verifier: Option<&str>,
    ) -> Result<(ProviderSession, Identity), SignInError> {
        let code = code
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .ok_or(SignInError::MissingCode)?;

        let session = self
            .provider
            .exchange_code(code, verifier)
            .await
            .map_err(|e| {
                warn!(error = %e, "authorization code exchange failed");
                SignInError::ExchangeFailed
            })?;

        let identity = match self.resolver.active_user(&session.email).await {
            Ok(Some(identity)) => identity,
            Ok(None) => {
                if let Err(e) = self.provider.sign_out(&session.access_token).await {
                    warn!(error = %e, "provider sign-out after denied sign-in failed");
                }
                info!("sign-in denied: no active user for provider account");
                return Err(SignInError::AccessDenied);
            }
            Err(_) => return Err(SignInError::ServerError),
        };

        if let Err(e) = self.users.touch_last_active(identity.user_id, Utc::now()).await {
            warn!(user_id = %identity.user_id, error = %e, "failed to record last activity");
        }

        info!(user_id = %identity.user_id, "user signed in");
        Ok((session, identity))
    }

    /// Invalidates the provider session when a token is present.
    #[instrument(name = "signdesk.session.sign_out", skip_all)]
    pub async fn sign_out(&self, access_token: Option<&str>) -> Result<(), DomainError> {
        let Some(token) = access_token.filter(|t| !t.is_empty()) else {
            return Ok(());
        };
        self.provider.sign_out(token).await.map_err(|e| {
            tracing::error!(error = %e, "provider sign-out failed");
            DomainError::internal(e.to_string())
        })
    }

    pub fn resolver(&self) -> &IdentityResolver {
        &self.resolver
    }
}
