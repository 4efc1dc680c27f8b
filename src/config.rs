//! Hub client configuration
//!
//! The hub endpoint and auth token come from the environment the build
//! system injects, overridable by explicit values from the CLI layer.

use std::env;

use url::Url;

/// Environment variable carrying the per-job artifact auth token.
pub const TOKEN_ENV: &str = "ARTIFACT_TOKEN";
/// Environment variable carrying the hub base URL.
pub const HUB_URL_ENV: &str = "ARTIFACT_HUB_URL";

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("artifact token not set; export {TOKEN_ENV}")]
    MissingToken,

    #[error("hub endpoint not set; export {HUB_URL_ENV}")]
    MissingEndpoint,

    #[error("hub endpoint {endpoint:?} is not a valid URL: {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    #[error("artifact token contains characters not allowed in a header value")]
    InvalidToken,
}

/// Validated hub connection settings.
#[derive(Debug, Clone)]
pub struct HubConfig {
    pub token: String,
    pub base_url: Url,
}

impl HubConfig {
    /// Build a config from explicit values, validating the endpoint.
    pub fn new(token: &str, endpoint: &str) -> Result<Self, ConfigError> {
        if token.is_empty() {
            return Err(ConfigError::MissingToken);
        }
        if endpoint.is_empty() {
            return Err(ConfigError::MissingEndpoint);
        }
        let base_url = Url::parse(endpoint).map_err(|e| ConfigError::InvalidEndpoint {
            endpoint: endpoint.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            token: token.to_string(),
            base_url,
        })
    }

    /// Build a config from the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let token = env::var(TOKEN_ENV).unwrap_or_default();
        let endpoint = env::var(HUB_URL_ENV).unwrap_or_default();
        Self::new(&token, &endpoint)
    }
}
