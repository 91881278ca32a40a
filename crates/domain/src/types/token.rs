//! OAuth bearer token

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::TOKEN_EXPIRY_MARGIN_SECS;

/// A bearer token issued by the client-credentials exchange.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
    /// Lifetime in seconds as declared by the server.
    pub expires_in: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

impl AccessToken {
    /// How long the token may be served from cache: the declared lifetime
    /// minus a one second safety margin.
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.expires_in.saturating_sub(TOKEN_EXPIRY_MARGIN_SECS))
    }

    /// `Authorization` header value.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.access_token)
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("access_token", &"<redacted>")
            .field("expires_in", &self.expires_in)
            .field("token_type", &self.token_type)
            .field("scope", &self.scope)
            .finish()
    }
}
