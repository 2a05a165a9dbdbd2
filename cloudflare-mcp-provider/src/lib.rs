//! # cloudflare-mcp-provider
//!
//! Validated, token-safe access to a fixed slice of the Cloudflare v4 API:
//! zones, DNS records, transform rulesets, page rules and cache purge.
//!
//! ## Layers
//!
//! | Layer | Module | Role |
//! |-------|--------|------|
//! | Validation | [`validation`], [`models`] | Reject malformed ids and bodies before any I/O |
//! | Configuration | [`Config`] | Load and guard the API token |
//! | Transport | [`CloudflareClient`] | Authenticated HTTPS, timeouts, size cap, error mapping |
//! | Services | [`services`] | One result shape per logical operation |
//!
//! ## Feature Flags
//!
//! - **`rustls`** *(default)*: Use rustls for TLS.
//! - **`native-tls`**: Use the platform's native TLS implementation.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use cloudflare_mcp_provider::{CloudflareClient, Config, Services};
//! use cloudflare_mcp_provider::services::ZoneQuery;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_env()?;
//!     let services = Services::new(Arc::new(CloudflareClient::new(config)));
//!
//!     let page = services.zones.list_zones(ZoneQuery::default()).await?;
//!     println!("{} zones", page.zones.len());
//!
//!     services.shutdown().await;
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Every operation returns [`Result<T, CloudflareError>`](CloudflareError).
//! Caller decisions that are not failures (an update with no fields, a zone
//! name that matches nothing, a purge with no selector) come back as
//! [`Outcome::Declined`] instead.
//!
//! - [`CloudflareError::Validation`]: bad input, no request was sent
//! - [`CloudflareError::PermissionDenied`]: HTTP 401 / 403
//! - [`CloudflareError::ResourceNotFound`]: HTTP 404
//! - [`CloudflareError::RateLimited`]: HTTP 429 (retryable)
//! - [`CloudflareError::Transport`]: timeout, network, oversize or non-JSON body (retryable)
//!
//! Nothing is retried automatically.

mod config;
mod error;
mod http_client;
pub mod models;
pub mod services;
mod traits;
mod types;
mod utils;
pub mod validation;

#[cfg(test)]
mod test_utils;

pub use config::{CF_API_BASE, Config, Credential, TOKEN_ENV_VAR};
pub use error::{CloudflareError, Result};
pub use http_client::{CloudflareClient, MAX_RESPONSE_SIZE, REQUEST_TIMEOUT_SECS};
pub use services::Services;
pub use traits::CloudflareApi;
pub use types::{
    ApiEnvelope, ApiMessage, ApiRequest, Deleted, HttpMethod, Outcome, PageRuleDetail,
    PageRuleList, Pagination, PurgeReceipt, QueryParams, RecordDetail, RecordPage, RulesetView,
    ZoneDetail, ZonePage,
};
pub use utils::log_sanitizer;
