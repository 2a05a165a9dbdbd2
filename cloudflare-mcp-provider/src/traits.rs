use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;
use crate::types::{ApiEnvelope, ApiRequest, HttpMethod};

/// Transport seam between the services and the network.
///
/// Implementors perform exactly one request per call and either return the
/// parsed envelope of a successful response or a classified
/// [`CloudflareError`](crate::CloudflareError). The verb methods are thin
/// wrappers over [`send`](Self::send).
#[async_trait]
pub trait CloudflareApi: Send + Sync {
    /// Perform one request against the fixed API base.
    async fn send(&self, request: ApiRequest) -> Result<ApiEnvelope>;

    /// GET `path` with query parameters.
    async fn get(&self, path: &str, query: Vec<(String, String)>) -> Result<ApiEnvelope> {
        self.send(ApiRequest::new(HttpMethod::Get, path).with_query(query))
            .await
    }

    /// POST a JSON body to `path`.
    async fn post(&self, path: &str, body: Value) -> Result<ApiEnvelope> {
        self.send(ApiRequest::new(HttpMethod::Post, path).with_body(body))
            .await
    }

    /// PUT (replace) a JSON body at `path`.
    async fn put(&self, path: &str, body: Value) -> Result<ApiEnvelope> {
        self.send(ApiRequest::new(HttpMethod::Put, path).with_body(body))
            .await
    }

    /// PATCH a JSON body at `path`.
    async fn patch(&self, path: &str, body: Value) -> Result<ApiEnvelope> {
        self.send(ApiRequest::new(HttpMethod::Patch, path).with_body(body))
            .await
    }

    /// DELETE `path`.
    async fn delete(&self, path: &str) -> Result<ApiEnvelope> {
        self.send(ApiRequest::new(HttpMethod::Delete, path)).await
    }

    /// Release pooled connections. The next request reconnects.
    async fn close(&self) {}
}
