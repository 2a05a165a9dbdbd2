//! Credential and endpoint configuration.

use std::fmt;

use crate::error::{CloudflareError, Result};
use crate::utils::log_sanitizer::{MASK, mask_secret};

/// The only environment variable this crate reads.
pub const TOKEN_ENV_VAR: &str = "CLOUDFLARE_API_TOKEN";

/// Cloudflare API base. Never taken from caller input or the environment.
pub const CF_API_BASE: &str = "https://api.cloudflare.com/client/v4";

/// An API token that never prints itself.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Wrap a token, rejecting blank values.
    pub fn new(token: impl Into<String>) -> Result<Self> {
        let token = token.into();
        let token = token.trim();
        if token.is_empty() {
            return Err(CloudflareError::Configuration {
                detail: format!(
                    "{TOKEN_ENV_VAR} environment variable required. \
                     Create an API token at https://dash.cloudflare.com/profile/api-tokens"
                ),
            });
        }
        Ok(Self(token.to_string()))
    }

    pub(crate) fn expose(&self) -> &str {
        &self.0
    }

    /// Mask this credential wherever it occurs in `message`.
    pub fn scrub(&self, message: &str) -> String {
        mask_secret(message, &self.0)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Credential({MASK})")
    }
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(MASK)
    }
}

/// Process configuration: the credential plus the fixed endpoint.
#[derive(Debug, Clone)]
pub struct Config {
    credential: Credential,
}

impl Config {
    /// Load the token from [`TOKEN_ENV_VAR`].
    pub fn from_env() -> Result<Self> {
        let token = std::env::var(TOKEN_ENV_VAR).unwrap_or_default();
        let config = Self::from_token(token)?;
        log::info!("Configuration loaded successfully");
        Ok(config)
    }

    /// Build a configuration from an explicit token.
    pub fn from_token(token: impl Into<String>) -> Result<Self> {
        Ok(Self {
            credential: Credential::new(token)?,
        })
    }

    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    #[allow(clippy::unused_self)]
    pub fn api_base_url(&self) -> &'static str {
        CF_API_BASE
    }
}
