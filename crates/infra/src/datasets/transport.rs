//! Authenticated request wrapper with a single invalid-token retry

use datasync_domain::constants::{CSV_CONTENT_TYPE, INVALID_TOKEN_ERROR};
use datasync_domain::{AccessToken, Result, SyncError};
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;
use url::Url;

use super::auth::TokenManager;
use crate::errors::InfraError;
use crate::http::HttpClient;

/// Initial attempt plus one retry after an `invalid_token` rejection.
const MAX_ATTEMPTS: usize = 2;

/// Payload of an [`ApiRequest`].
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Empty,
    Json(Value),
    /// Sent as `text/csv`.
    Csv(String),
}

/// A request relative to the API base URI.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    body: RequestBody,
}

impl ApiRequest {
    /// Request for `path`, which is appended to the base URI.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self { method, path: path.into(), query: Vec::new(), body: RequestBody::Empty }
    }

    /// `GET path`.
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    /// `POST path`.
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    /// `PUT path`.
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    /// `DELETE path`.
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Add a query-string pair. Pairs are sent in insertion order.
    #[must_use]
    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    /// Attach a JSON body.
    ///
    /// # Errors
    /// `SyncError::Serialization` if `body` cannot be represented as JSON.
    pub fn json<T: Serialize>(mut self, body: &T) -> Result<Self> {
        self.body = RequestBody::Json(serde_json::to_value(body).map_err(InfraError::from)?);
        Ok(self)
    }

    /// Attach a CSV body sent as `text/csv`.
    #[must_use]
    pub fn csv(mut self, body: String) -> Self {
        self.body = RequestBody::Csv(body);
        self
    }

    pub const fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

/// Status and fully read body of a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

impl ApiResponse {
    /// Whether the status is 2xx.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Whether the server rejected the bearer token as invalid or expired.
    pub fn is_invalid_token(&self) -> bool {
        (400..500).contains(&self.status)
            && serde_json::from_str::<ErrorBody>(&self.body)
                .ok()
                .and_then(|body| body.error)
                .is_some_and(|error| error == INVALID_TOKEN_ERROR)
    }

    /// Decode the body as JSON.
    ///
    /// # Errors
    /// `SyncError::Serialization` on a body that does not match `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_str(&self.body).map_err(|e| InfraError::from(e).into())
    }

    fn into_error(self) -> SyncError {
        SyncError::Http { status: self.status, body: self.body }
    }
}

/// Sends [`ApiRequest`]s with a bearer token from the [`TokenManager`].
pub struct Transport {
    http: HttpClient,
    base: Url,
    tokens: TokenManager,
}

impl Transport {
    /// # Errors
    /// `SyncError::Config` if `base_uri` does not parse.
    pub fn new(http: HttpClient, base_uri: &str, tokens: TokenManager) -> Result<Self> {
        let base = Url::parse(base_uri.trim_end_matches('/')).map_err(InfraError::from)?;
        Ok(Self { http, base, tokens })
    }

    pub const fn tokens(&self) -> &TokenManager {
        &self.tokens
    }

    /// Send `request`, returning the response when it is 2xx.
    ///
    /// A 4xx carrying `{"error":"invalid_token"}` evicts the cached token and
    /// the request is sent once more with a fresh one.
    ///
    /// # Errors
    /// `SyncError::Http` for any other non-2xx response, including a second
    /// `invalid_token`; token and network failures as raised.
    pub fn call(&self, request: &ApiRequest) -> Result<ApiResponse> {
        let mut attempt = 1;
        loop {
            let token = self.tokens.access_token()?;
            let response = self.send_once(request, &token)?;

            if response.is_success() {
                return Ok(response);
            }
            if response.is_invalid_token() && attempt < MAX_ATTEMPTS {
                warn!(
                    method = %request.method,
                    path = %request.path,
                    attempt,
                    "access token rejected as invalid, retrying with a fresh token"
                );
                self.tokens.invalidate();
                attempt += 1;
                continue;
            }
            return Err(response.into_error());
        }
    }

    fn send_once(&self, request: &ApiRequest, token: &AccessToken) -> Result<ApiResponse> {
        let mut builder = self
            .http
            .request(request.method.clone(), self.url_for(request)?)
            .header(AUTHORIZATION, token.bearer())
            .header(ACCEPT, "application/json");

        builder = match &request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(body) => builder.json(body),
            RequestBody::Csv(body) => builder.header(CONTENT_TYPE, CSV_CONTENT_TYPE).body(body.clone()),
        };

        let response = self.http.send(builder)?;
        let status = response.status().as_u16();
        let body = response.text().map_err(InfraError::from)?;
        Ok(ApiResponse { status, body })
    }

    fn url_for(&self, request: &ApiRequest) -> Result<Url> {
        let mut url = Url::parse(&format!("{}{}", self.base.as_str().trim_end_matches('/'), request.path))
            .map_err(InfraError::from)?;
        if !request.query.is_empty() {
            url.query_pairs_mut().extend_pairs(request.query.iter());
        }
        Ok(url)
    }
}
