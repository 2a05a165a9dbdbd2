use super::*;

use async_trait::async_trait;
use cloudflare_mcp_provider::{ApiEnvelope, ApiRequest, CloudflareApi, HttpMethod};
use serde_json::Value;
use tokio::sync::Mutex;

pub const ZONE_ID: &str = "a1b2c3d4e5f6a1b2c3d4e5f6a1b2c3d4";
pub const RECORD_ID: &str = "0123456789abcdef0123456789abcdef";
pub const RULE_ID: &str = "fedcba9876543210fedcba9876543210";
pub const RULESET_ID: &str = "ffffffffffffffffffffffffffffffff";

type Route = (HttpMethod, String, cloudflare_mcp_provider::Result<ApiEnvelope>);

/// Records every request and answers from registered `(method, path)` routes.
/// Unrouted requests get a successful envelope with a `null` result.
#[derive(Default)]
pub struct MockCloudflareApi {
    routes: Mutex<Vec<Route>>,
    calls: Mutex<Vec<ApiRequest>>,
    closed: Mutex<u32>,
}

impl MockCloudflareApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub async fn on(&self, method: HttpMethod, path: &str, result: Value) {
        self.fail(method, path, Ok(ApiEnvelope::ok(result))).await;
    }

    pub async fn fail(
        &self,
        method: HttpMethod,
        path: &str,
        response: cloudflare_mcp_provider::Result<ApiEnvelope>,
    ) {
        self.routes
            .lock()
            .await
            .push((method, path.to_string(), response));
    }

    pub async fn calls(&self) -> Vec<ApiRequest> {
        self.calls.lock().await.clone()
    }

    pub async fn last_call(&self) -> ApiRequest {
        self.calls.lock().await.last().cloned().unwrap()
    }

    pub async fn call_count(&self) -> usize {
        self.calls.lock().await.len()
    }

    pub async fn close_count(&self) -> u32 {
        *self.closed.lock().await
    }
}

#[async_trait]
impl CloudflareApi for MockCloudflareApi {
    async fn send(&self, request: ApiRequest) -> cloudflare_mcp_provider::Result<ApiEnvelope> {
        let response = self
            .routes
            .lock()
            .await
            .iter()
            .rev()
            .find(|(method, path, _)| *method == request.method && *path == request.path)
            .map_or_else(|| Ok(ApiEnvelope::ok(Value::Null)), |(_, _, r)| r.clone());
        self.calls.lock().await.push(request);
        response
    }

    async fn close(&self) {
        *self.closed.lock().await += 1;
    }
}

pub fn build_server(api: &Arc<MockCloudflareApi>) -> CloudflareMcp {
    CloudflareMcp::new(Arc::new(Services::new(api.clone())))
}

/// Text payload of the first content item.
pub fn result_text(result: &CallToolResult) -> String {
    result
        .content
        .first()
        .and_then(|c| c.raw.as_text())
        .map(|t| t.text.clone())
        .unwrap()
}

pub fn result_json(result: &CallToolResult) -> Value {
    serde_json::from_str(&result_text(result)).unwrap()
}
