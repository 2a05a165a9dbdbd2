use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unified error type for every Cloudflare operation.
///
/// Messages carried by these variants have already been scrubbed of the API
/// token (see [`crate::utils::log_sanitizer`]), so the error can be shown to a
/// caller or written to a log as-is.
///
/// # Retryable Errors
///
/// - [`Transport`](Self::Transport): network failure, timeout, oversized or unparsable body
/// - [`RateLimited`](Self::RateLimited): HTTP 429, ideally after `retry_after` seconds
///
/// Nothing in this crate retries automatically; retrying is the caller's decision.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum CloudflareError {
    /// The API token is missing or empty. Fatal at startup.
    #[error("Configuration error: {detail}")]
    Configuration {
        /// What is missing.
        detail: String,
    },

    /// Caller input failed a format or shape check. Raised before any network call.
    #[error("Invalid {field}: {detail}")]
    Validation {
        /// Name of the offending field.
        field: String,
        /// What is wrong with it.
        detail: String,
    },

    /// The request never produced a usable response.
    ///
    /// `status` is `0` for timeouts, connection failures and oversized bodies,
    /// and the real HTTP status when the body was not valid JSON.
    #[error("Cloudflare API error (status {status}): {detail}")]
    Transport {
        /// HTTP status, or `0` when no response was obtained.
        status: u16,
        /// Error details.
        detail: String,
    },

    /// HTTP 401 / 403.
    #[error("Permission denied: {detail}")]
    PermissionDenied {
        /// The credential or scope that is required.
        detail: String,
    },

    /// HTTP 404.
    #[error("Resource not found: {detail}")]
    ResourceNotFound {
        /// Provider message with long identifiers truncated.
        detail: String,
    },

    /// HTTP 429.
    #[error("{}", rate_limited_message(*retry_after))]
    RateLimited {
        /// Suggested wait in seconds, if the API supplied one.
        retry_after: Option<u64>,
    },

    /// Any other non-success status.
    #[error("Cloudflare API error {code}: {message}")]
    Api {
        /// First error code from the response envelope.
        code: i64,
        /// First error message from the response envelope.
        message: String,
    },
}

fn rate_limited_message(retry_after: Option<u64>) -> String {
    match retry_after {
        Some(secs) => format!("Rate limited, retry after {secs} seconds"),
        None => "Rate limited, retry later".to_string(),
    }
}

impl CloudflareError {
    /// Shortcut for a [`Validation`](Self::Validation) error.
    pub fn validation(field: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            detail: detail.into(),
        }
    }

    /// Shortcut for a [`Transport`](Self::Transport) error.
    pub fn transport(status: u16, detail: impl Into<String>) -> Self {
        Self::Transport {
            status,
            detail: detail.into(),
        }
    }

    /// Whether the same request may succeed if sent again unchanged.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::RateLimited { .. })
    }

    /// Whether the error reflects caller input or account state rather than a
    /// malfunction. Used to pick `warn` over `error` when logging.
    #[must_use]
    pub fn is_expected(&self) -> bool {
        matches!(
            self,
            Self::Validation { .. } | Self::PermissionDenied { .. } | Self::ResourceNotFound { .. }
        )
    }
}

/// Convenience type alias for `Result<T, CloudflareError>`.
pub type Result<T> = std::result::Result<T, CloudflareError>;
