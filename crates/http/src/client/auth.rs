//! Session client: sign-in, sign-up, refresh and sign-out against the backend

use super::{
    ApiGateway, AuthEndpoints, BackendClient, ClientError, IdentityClaims, SessionConfig,
    SessionError, TokenStore, decode_claims,
};
use crate::types::{LoginRequest, RegisterRequest, RegisterResponse, TokenResponse};
use reqwest::{Method, StatusCode};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

const UNREACHABLE: &str = "Unable to reach the server. Please try again.";
const UNREADABLE_TOKEN: &str = "The server returned an unusable session token";

/// Result of exchanging the durable session cookie for an access token
///
/// Both failure variants mean "treat the user as anonymous"; the split only
/// exists for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// A new access token was issued and stored
    Refreshed(String),
    /// The backend has no session for us (no cookie, expired or revoked)
    NoSession,
    /// The exchange failed for another reason (network, 5xx, bad body)
    TransientFailure(String),
}

impl RefreshOutcome {
    #[must_use]
    pub fn into_token(self) -> Option<String> {
        match self {
            Self::Refreshed(token) => Some(token),
            Self::NoSession | Self::TransientFailure(_) => None,
        }
    }
}

/// Issues auth calls against the backend and keeps the [`TokenStore`] current
///
/// Cheap to clone; clones share the transport and the token store.
#[derive(Clone)]
pub struct SessionClient {
    transport: BackendClient,
    endpoints: Arc<AuthEndpoints>,
    tokens: TokenStore,
}

impl SessionClient {
    /// Create a client with a fresh, empty token store
    pub fn new(config: &SessionConfig) -> Result<Self, ClientError> {
        Self::with_token_store(config, TokenStore::new())
    }

    /// Create a client around an existing token store
    pub fn with_token_store(config: &SessionConfig, tokens: TokenStore) -> Result<Self, ClientError> {
        Ok(Self {
            transport: BackendClient::new(config)?,
            endpoints: Arc::new(config.endpoints.clone()),
            tokens,
        })
    }

    #[must_use]
    pub fn builder() -> SessionClientBuilder {
        SessionClientBuilder::default()
    }

    #[must_use]
    pub fn token_store(&self) -> &TokenStore {
        &self.tokens
    }

    /// Current access token, if signed in
    #[must_use]
    pub fn access_token(&self) -> Option<String> {
        self.tokens.get()
    }

    #[must_use]
    pub fn transport(&self) -> &BackendClient {
        &self.transport
    }

    /// Gateway for authenticated API calls that refreshes through this client
    #[must_use]
    pub fn gateway(&self) -> ApiGateway {
        ApiGateway::new(self.clone())
    }

    /// Exchange credentials for an access token and return the decoded identity
    #[instrument(name = "sign_in", skip_all)]
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<IdentityClaims, SessionError> {
        let request = self
            .transport
            .request(Method::POST, &self.endpoints.login, None)
            .json(&LoginRequest {
                email: email.to_string(),
                password: password.to_string(),
            });

        let response = self.transport.send(request).await.map_err(|e| {
            warn!("Login request failed: {}", e);
            SessionError::authentication(None, UNREACHABLE)
        })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            debug!(status = status.as_u16(), "Login rejected");
            return Err(SessionError::authentication(Some(status.as_u16()), message));
        }

        let body: TokenResponse = response.json().await.map_err(|e| {
            warn!("Login response could not be read: {}", e);
            SessionError::authentication(Some(status.as_u16()), UNREADABLE_TOKEN)
        })?;

        // The store keeps whatever token backs the current identity
        let Some(identity) = decode_claims(&body.token) else {
            warn!("Login returned a token without readable claims");
            return Err(SessionError::authentication(
                Some(status.as_u16()),
                UNREADABLE_TOKEN,
            ));
        };

        self.tokens.set(Some(body.token));
        info!(user_id = %identity.id, "Signed in");
        Ok(identity)
    }

    /// Register an account, then sign in with the same credentials
    #[instrument(name = "sign_up", skip_all)]
    pub async fn sign_up(
        &self,
        email: &str,
        name: &str,
        password: &str,
    ) -> Result<IdentityClaims, SessionError> {
        let request = self
            .transport
            .request(Method::POST, &self.endpoints.register, None)
            .json(&RegisterRequest {
                email: email.to_string(),
                name: name.to_string(),
                password: password.to_string(),
            });

        let response = self.transport.send(request).await.map_err(|e| {
            warn!("Registration request failed: {}", e);
            SessionError::registration(None, UNREACHABLE)
        })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            debug!(status = status.as_u16(), "Registration rejected");
            return Err(SessionError::registration(Some(status.as_u16()), message));
        }

        match response.json::<RegisterResponse>().await {
            Ok(account) => info!(user_id = %account.id, "Account registered"),
            Err(e) => debug!("Registration response body ignored: {}", e),
        }

        self.sign_in(email, password).await
    }

    /// Exchange the durable session cookie for a new access token
    ///
    /// The token store is updated on success and cleared otherwise.
    #[instrument(name = "refresh", skip_all)]
    pub async fn try_refresh(&self) -> RefreshOutcome {
        let request = self
            .transport
            .request(Method::POST, &self.endpoints.refresh, None);

        let outcome = match self.transport.send(request).await {
            Err(e) => RefreshOutcome::TransientFailure(e.to_string()),
            Ok(response) => match response.status() {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => RefreshOutcome::NoSession,
                status if !status.is_success() => {
                    RefreshOutcome::TransientFailure(format!("refresh returned {status}"))
                }
                _ => match response.json::<TokenResponse>().await {
                    Ok(body) if !body.token.is_empty() => RefreshOutcome::Refreshed(body.token),
                    Ok(_) => RefreshOutcome::TransientFailure("refresh returned an empty token".into()),
                    Err(e) => RefreshOutcome::TransientFailure(e.to_string()),
                },
            },
        };

        match &outcome {
            RefreshOutcome::Refreshed(token) => {
                debug!("Access token refreshed");
                self.tokens.set(Some(token.clone()));
            }
            RefreshOutcome::NoSession => {
                debug!("No session to refresh");
                self.tokens.clear();
            }
            RefreshOutcome::TransientFailure(reason) => {
                debug!("Refresh failed: {}", reason);
                self.tokens.clear();
            }
        }

        outcome
    }

    /// Like [`try_refresh`](Self::try_refresh), collapsed to the new token or `None`
    pub async fn refresh(&self) -> Option<String> {
        self.try_refresh().await.into_token()
    }

    /// Refresh and decode, yielding the identity behind the session cookie if any
    pub async fn current_identity(&self) -> Option<IdentityClaims> {
        self.refresh().await.as_deref().and_then(decode_claims)
    }

    /// Tell the backend to end the session, then clear the local token
    ///
    /// The backend call is best-effort. The token store is empty afterwards on
    /// every path, including when this future is dropped mid-flight.
    #[instrument(name = "sign_out", skip_all)]
    pub async fn sign_out(&self) {
        let _clear = self.tokens.clear_on_drop();

        let request = self
            .transport
            .request(Method::POST, &self.endpoints.logout, None);

        match self.transport.send(request).await {
            Ok(response) if response.status().is_success() => info!("Signed out"),
            Ok(response) => warn!(
                status = response.status().as_u16(),
                "Logout rejected by backend, clearing local session"
            ),
            Err(e) => warn!("Logout request failed, clearing local session: {}", e),
        }
    }
}

/// Builder for [`SessionClient`]
#[derive(Default)]
pub struct SessionClientBuilder {
    base_url: Option<String>,
    endpoints: Option<AuthEndpoints>,
    timeout: Option<Duration>,
    user_agent: Option<String>,
    tokens: Option<TokenStore>,
}

impl SessionClientBuilder {
    /// Set the backend origin
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Override the auth endpoint paths
    #[must_use]
    pub fn endpoints(mut self, endpoints: AuthEndpoints) -> Self {
        self.endpoints = Some(endpoints);
        self
    }

    /// Set the request timeout (ignored in the browser)
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the user agent
    #[must_use]
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Share an existing token store
    #[must_use]
    pub fn token_store(mut self, tokens: TokenStore) -> Self {
        self.tokens = Some(tokens);
        self
    }

    /// Build the client
    pub fn build(self) -> Result<SessionClient, ClientError> {
        let base_url = self
            .base_url
            .ok_or_else(|| ClientError::Configuration("base_url is required".into()))?;

        let mut config = SessionConfig::new(base_url);
        if let Some(endpoints) = self.endpoints {
            config.endpoints = endpoints;
        }
        if let Some(user_agent) = self.user_agent {
            config.user_agent = user_agent;
        }
        config.timeout_secs = self.timeout.map(|t| t.as_secs().max(1));

        SessionClient::with_token_store(&config, self.tokens.unwrap_or_default())
    }
}
