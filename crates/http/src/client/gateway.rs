//! Single choke point for authenticated API calls
//!
//! On a 401 the gateway refreshes once and, if that produced a token, replays
//! the request once with the new bearer credential. It never loops and never
//! retries on other statuses.

use super::{BackendClient, ClientError, SessionClient};
use reqwest::header::HeaderMap;
use reqwest::{Method, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

/// Authenticated request gateway
#[derive(Clone)]
pub struct ApiGateway {
    session: SessionClient,
}

impl ApiGateway {
    /// Create a gateway that refreshes through `session`
    #[must_use]
    pub fn new(session: SessionClient) -> Self {
        Self { session }
    }

    #[must_use]
    pub fn session(&self) -> &SessionClient {
        &self.session
    }

    /// Send a request with the current bearer token, recovering once from a 401
    ///
    /// The returned response is the caller's to classify: a 401 here means the
    /// refresh failed and the user is not authenticated.
    pub async fn request<B>(
        &self,
        path: &str,
        method: Method,
        body: Option<&B>,
    ) -> Result<Response, ClientError>
    where
        B: Serialize + ?Sized,
    {
        self.request_with_headers(path, method, body, HeaderMap::new())
            .await
    }

    /// [`request`](Self::request) with extra caller-supplied headers
    pub async fn request_with_headers<B>(
        &self,
        path: &str,
        method: Method,
        body: Option<&B>,
        headers: HeaderMap,
    ) -> Result<Response, ClientError>
    where
        B: Serialize + ?Sized,
    {
        let body = body.map(serde_json::to_vec).transpose()?;
        let transport = self.session.transport();

        let token = self.session.access_token();
        let first = build(transport, &method, path, token.as_deref(), &headers, body.as_deref());
        let response = transport.send(first).await?;

        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        debug!(path, "Request unauthorized, attempting refresh");
        let Some(token) = self.session.refresh().await else {
            debug!(path, "Refresh failed, returning original response");
            return Ok(response);
        };

        let retry = build(transport, &method, path, Some(&token), &headers, body.as_deref());
        transport.send(retry).await
    }

    /// Send a request and deserialize a success body, classifying failures
    pub async fn execute_json<T, B>(
        &self,
        path: &str,
        method: Method,
        body: Option<&B>,
    ) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let response = self.request(path, method, body).await?;
        BackendClient::read_json(response).await
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        self.execute_json(path, Method::GET, None::<&()>).await
    }

    pub async fn post<T, B>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.execute_json(path, Method::POST, Some(body)).await
    }

    pub async fn put<T, B>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.execute_json(path, Method::PUT, Some(body)).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        self.execute_json(path, Method::DELETE, None::<&()>).await
    }
}

fn build(
    transport: &BackendClient,
    method: &Method,
    path: &str,
    token: Option<&str>,
    headers: &HeaderMap,
    body: Option<&[u8]>,
) -> reqwest::RequestBuilder {
    let mut request = transport.request(method.clone(), path, token);

    for (name, value) in headers {
        request = request.header(name.clone(), value.clone());
    }

    if let Some(body) = body {
        request = request.body(body.to_vec());
    }

    request
}
