//! Placer backend client

pub mod auth;
pub mod claims;
pub mod config;
pub mod error;
pub mod gateway;
pub mod token_store;

pub use auth::{RefreshOutcome, SessionClient, SessionClientBuilder};
pub use claims::{IdentityClaims, decode_claims};
pub use config::{AuthEndpoints, SessionConfig};
pub use error::{ClientError, SessionError};
pub use gateway::ApiGateway;
pub use token_store::TokenStore;

use reqwest::{Client, ClientBuilder, header};

/// Low-level transport shared by the session client and the gateway
///
/// Every request it builds carries JSON content headers and the browser's
/// credentials, so the durable refresh cookie travels with each call. It never
/// retries and never looks at the token store on its own.
#[derive(Clone)]
pub struct BackendClient {
    client: Client,
    base_url: String,
}

impl BackendClient {
    /// Create a transport for the configured backend origin
    pub fn new(config: &SessionConfig) -> Result<Self, ClientError> {
        let base_url = config.normalized_base_url()?;

        #[cfg(not(target_arch = "wasm32"))]
        let client = {
            let mut builder = ClientBuilder::new()
                .user_agent(config.user_agent.as_str())
                .cookie_store(true);
            if let Some(timeout) = config.timeout() {
                builder = builder.timeout(timeout);
            }
            builder.build()?
        };

        // The browser owns the user agent and the cookie jar
        #[cfg(target_arch = "wasm32")]
        let client = ClientBuilder::new().build()?;

        Ok(Self { client, base_url })
    }

    /// Get the base URL
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build a request, attaching `bearer` as the `Authorization` credential when present
    pub fn request(
        &self,
        method: reqwest::Method,
        path: &str,
        bearer: Option<&str>,
    ) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self
            .client
            .request(method, url)
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::ACCEPT, "application/json");

        if let Some(token) = bearer {
            request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }

        #[cfg(target_arch = "wasm32")]
        {
            request = request.fetch_credentials_include();
        }

        request
    }

    /// Send a request, returning the response whatever its status
    pub async fn send(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, ClientError> {
        Ok(request.send().await?)
    }

    /// Turn a non-success response into a [`ClientError`], deserializing success bodies
    pub async fn read_json<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = response.status();

        if status.is_success() {
            Ok(response.json().await?)
        } else {
            let message = response.text().await.unwrap_or_else(|_| status.to_string());
            Err(ClientError::from_status(status, message))
        }
    }
}
