//! Recording transport fake for service tests.

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;

use crate::error::Result;
use crate::traits::CloudflareApi;
use crate::types::{ApiEnvelope, ApiRequest, HttpMethod};

pub const ZONE_ID: &str = "a1b2c3d4e5f6a1b2c3d4e5f6a1b2c3d4";
pub const RECORD_ID: &str = "0123456789abcdef0123456789abcdef";
pub const RULESET_ID: &str = "ffffffffffffffffffffffffffffffff";

type Route = (HttpMethod, String, Result<ApiEnvelope>);

/// Answers requests from registered `(method, path)` routes and records every
/// request it sees. Unrouted requests get an empty successful envelope.
#[derive(Default)]
pub struct MockApi {
    routes: Mutex<Vec<Route>>,
    calls: Mutex<Vec<ApiRequest>>,
    closed: Mutex<u32>,
}

impl MockApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Respond to `method path` with a successful envelope around `result`.
    pub async fn on(&self, method: HttpMethod, path: &str, result: Value) {
        self.respond(method, path, Ok(ApiEnvelope::ok(result))).await;
    }

    /// Respond to `method path` with a full envelope or an error.
    pub async fn respond(&self, method: HttpMethod, path: &str, response: Result<ApiEnvelope>) {
        self.routes
            .lock()
            .await
            .push((method, path.to_string(), response));
    }

    pub async fn calls(&self) -> Vec<ApiRequest> {
        self.calls.lock().await.clone()
    }

    pub async fn call_count(&self) -> usize {
        self.calls.lock().await.len()
    }

    pub async fn close_count(&self) -> u32 {
        *self.closed.lock().await
    }
}

#[async_trait]
impl CloudflareApi for MockApi {
    async fn send(&self, request: ApiRequest) -> Result<ApiEnvelope> {
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
