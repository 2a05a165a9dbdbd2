//! Cloudflare HTTP transport
//!
//! One long-lived [`CloudflareClient`] per process. It owns the pooled
//! `reqwest::Client`, attaches the bearer token, enforces the timeout and the
//! response size ceiling, and classifies every failure into a
//! [`CloudflareError`].
//!
//! # design principles
//! - **Fixed endpoint** - the base URL is a constant, never caller input
//! - **Token only in a sensitive header** - never in the URL, never logged
//! - **Bounded reads** - oversized bodies are rejected before they are buffered

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue, RETRY_AFTER};
use reqwest::{Client, Method, Response};
use tokio::sync::Mutex;

use crate::config::{CF_API_BASE, Config, Credential};
use crate::error::{CloudflareError, Result};
use crate::traits::CloudflareApi;
use crate::types::{ApiEnvelope, ApiRequest, HttpMethod};
use crate::utils::log_sanitizer::{truncate_for_log, truncate_identifiers};

/// Total request timeout (seconds).
pub const REQUEST_TIMEOUT_SECS: u64 = 30;
/// Connection establishment timeout (seconds).
const CONNECT_TIMEOUT_SECS: u64 = 10;
/// Response body ceiling (10 MiB).
pub const MAX_RESPONSE_SIZE: usize = 10 * 1024 * 1024;

const USER_AGENT: &str = concat!("cloudflare-mcp/", env!("CARGO_PKG_VERSION"));

/// Shared Cloudflare API client.
///
/// Safe for concurrent use: the only mutable state is the lazily built
/// connection pool, which is cloned out (cheaply) for each request.
pub struct CloudflareClient {
    config: Config,
    base_url: String,
    https_only: bool,
    timeout: Duration,
    client: Mutex<Option<Client>>,
}

impl CloudflareClient {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            base_url: CF_API_BASE.to_string(),
            https_only: true,
            timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
            client: Mutex::new(None),
        }
    }

    /// Point the client at a local mock server.
    #[cfg(test)]
    pub(crate) fn with_base_url(config: Config, base_url: &str, timeout: Duration) -> Self {
        Self {
            config,
            base_url: base_url.trim_end_matches('/').to_string(),
            https_only: false,
            timeout,
            client: Mutex::new(None),
        }
    }

    fn build_client(&self) -> Result<Client> {
        let credential = self.config.credential();
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", credential.expose())).map_err(
            |_| CloudflareError::Configuration {
                detail: "API token contains characters not allowed in an HTTP header".to_string(),
            },
        )?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);

        Client::builder()
            .default_headers(headers)
            .user_agent(USER_AGENT)
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(self.timeout)
            .https_only(self.https_only)
            .build()
            .map_err(|e| {
                CloudflareError::transport(
                    0,
                    credential.scrub(&format!("Failed to create HTTP client: {e}")),
                )
            })
    }

    /// The pooled client, built on first use.
    async fn http(&self) -> Result<Client> {
        let mut slot = self.client.lock().await;
        if let Some(client) = slot.as_ref() {
            return Ok(client.clone());
        }
        let client = self.build_client()?;
        *slot = Some(client.clone());
        Ok(client)
    }

    /// Drop the pooled client. Returns `false` if it was already released.
    pub async fn release(&self) -> bool {
        let released = self.client.lock().await.take().is_some();
        if released {
            log::debug!("[cloudflare] HTTP client released");
        }
        released
    }

    fn request_error(&self, e: &reqwest::Error) -> CloudflareError {
        let detail = if e.is_timeout() {
            format!("Request timeout: {e}")
        } else {
            format!("Request failed: {e}")
        };
        let error = CloudflareError::transport(0, self.config.credential().scrub(&detail));
        log::warn!("[cloudflare] {error}");
        error
    }

    async fn read_body(&self, mut response: Response) -> Result<Vec<u8>> {
        if response
            .content_length()
            .is_some_and(|len| len > MAX_RESPONSE_SIZE as u64)
        {
            log::warn!("[cloudflare] Declared response size exceeds {MAX_RESPONSE_SIZE} bytes");
            return Err(CloudflareError::transport(0, "Response too large"));
        }

        let mut body = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| self.request_error(&e))?
        {
            if body.len() + chunk.len() > MAX_RESPONSE_SIZE {
                log::warn!("[cloudflare] Response body exceeds {MAX_RESPONSE_SIZE} bytes");
                return Err(CloudflareError::transport(0, "Response too large"));
            }
            body.extend_from_slice(&chunk);
        }
        Ok(body)
    }
}

fn to_reqwest_method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Patch => Method::PATCH,
        HttpMethod::Delete => Method::DELETE,
    }
}

/// Turn a status code and raw body into an envelope or a classified error.
///
/// Evaluation order: JSON parse, then 2xx, 401, 403, 404, 429, anything else.
/// Every message that may contain provider text is scrubbed of `credential`.
pub(crate) fn classify_response(
    status: u16,
    body: &[u8],
    header_retry_after: Option<u64>,
    credential: &Credential,
) -> Result<ApiEnvelope> {
    let envelope: ApiEnvelope = serde_json::from_slice(body).map_err(|e| {
        log::error!("[cloudflare] JSON parse failed (HTTP {status}): {e}");
        log::debug!(
            "[cloudflare] Raw response: {}",
            truncate_for_log(&credential.scrub(&String::from_utf8_lossy(body)))
        );
        CloudflareError::transport(
            status,
            credential.scrub(&format!("Invalid JSON response: {e}")),
        )
    })?;

    if (200..300).contains(&status) {
        return Ok(envelope);
    }

    let (code, message) = envelope.first_error();
    let message = credential.scrub(&message);

    let error = match status {
        401 => CloudflareError::PermissionDenied {
            detail: "Valid API token required".to_string(),
        },
        403 => CloudflareError::PermissionDenied {
            detail: "Required permission scope not granted to this API token".to_string(),
        },
        404 => CloudflareError::ResourceNotFound {
            detail: truncate_identifiers(&message),
        },
        429 => CloudflareError::RateLimited {
            retry_after: envelope.retry_after_hint().or(header_retry_after),
        },
        _ => CloudflareError::Api { code, message },
    };

    if error.is_expected() {
        log::warn!("[cloudflare] HTTP {status}: {error}");
    } else {
        log::error!("[cloudflare] HTTP {status}: {error}");
    }
    Err(error)
}

#[async_trait]
impl CloudflareApi for CloudflareClient {
    async fn send(&self, request: ApiRequest) -> Result<ApiEnvelope> {
        let client = self.http().await?;
        let url = format!("{}{}", self.base_url, request.path);
        log::debug!("[cloudflare] {} {}", request.method, request.path);

        let mut builder = client.request(to_reqwest_method(request.method), &url);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| self.request_error(&e))?;

        let status = response.status().as_u16();
        log::debug!("[cloudflare] Response Status: {status}");

        let header_retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok());

        let body = self.read_body(response).await?;
        classify_response(status, &body, header_retry_after, self.config.credential())
    }

    async fn close(&self) {
        self.release().await;
    }
}
