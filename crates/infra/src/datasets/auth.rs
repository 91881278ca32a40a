//! OAuth client-credentials token management

use std::sync::Arc;

use datasync_domain::constants::{OAUTH_GRANT_TYPE, OAUTH_SCOPE, OAUTH_TOKEN_PATH};
use datasync_domain::{AccessToken, DatasetsConfig, Result, SyncError};
use reqwest::Method;
use tracing::{debug, info, instrument};
use url::Url;

use super::cache::DatasetCache;
use crate::errors::InfraError;
use crate::http::HttpClient;

/// Obtains bearer tokens and keeps the current one in the shared cache.
///
/// There is no background refresh: a token is fetched when none is cached
/// or the cached one has expired, and dropped when the server reports it
/// invalid.
pub struct TokenManager {
    http: HttpClient,
    token_url: Url,
    client_id: String,
    secret: String,
    cache: Arc<DatasetCache>,
}

impl TokenManager {
    /// # Errors
    /// `SyncError::Config` if the token endpoint URI cannot be formed.
    pub fn new(http: HttpClient, config: &DatasetsConfig, cache: Arc<DatasetCache>) -> Result<Self> {
        let token_url = Url::parse(&format!("{}{OAUTH_TOKEN_PATH}", config.base()))
            .map_err(InfraError::from)?;

        Ok(Self {
            http,
            token_url,
            client_id: config.client_id.clone(),
            secret: config.secret.clone(),
            cache,
        })
    }

    /// The cached token, or a freshly issued one.
    ///
    /// # Errors
    /// `SyncError::Auth` when the credentials are rejected or the token
    /// response is malformed; `SyncError::Network` when the endpoint cannot
    /// be reached.
    pub fn access_token(&self) -> Result<Arc<AccessToken>> {
        self.cache.token(|| self.fetch())
    }

    /// Forget the cached token so the next call fetches a new one.
    pub fn invalidate(&self) {
        debug!("evicting cached access token");
        self.cache.invalidate_token();
    }

    #[instrument(skip(self), fields(client_id = %self.client_id))]
    fn fetch(&self) -> Result<AccessToken> {
        let request = self
            .http
            .request(Method::POST, self.token_url.clone())
            .basic_auth(&self.client_id, Some(&self.secret))
            .form(&[("grant_type", OAUTH_GRANT_TYPE), ("scope", OAUTH_SCOPE)]);

        let response = self.http.send(request)?;
        let status = response.status();
        let body = response.text().map_err(InfraError::from)?;

        if !status.is_success() {
            return Err(SyncError::Auth(format!(
                "token request rejected with HTTP {}: {body}",
                status.as_u16()
            )));
        }

        let token: AccessToken = serde_json::from_str(&body)
            .map_err(|e| SyncError::Auth(format!("malformed token response: {e}")))?;
        if token.access_token.trim().is_empty() {
            return Err(SyncError::Auth("token response carried an empty access_token".into()));
        }

        info!(expires_in = token.expires_in, "obtained access token");
        Ok(token)
    }
}
