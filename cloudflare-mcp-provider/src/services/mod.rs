//! Resource operations.
//!
//! Each service composes input validation with one or more transport calls
//! and reshapes the envelope into a stable result. Identifiers are validated
//! before any path is built.

mod cache;
mod dns;
mod page_rules;
mod transform;
mod zones;

pub use cache::CacheService;
pub use dns::{DnsRecordQuery, DnsRecordService, MAX_RECORDS_PER_PAGE};
pub use page_rules::PageRuleService;
pub use transform::TransformRuleService;
pub use zones::{MAX_ZONES_PER_PAGE, ZoneQuery, ZoneService};

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::error::{CloudflareError, Result};
use crate::traits::CloudflareApi;

/// Message returned when an update carries no fields.
pub const NO_UPDATE_FIELDS: &str = "No fields provided for update";

/// Encode an already validated body.
fn wire_body<T: Serialize>(value: &T) -> Result<Value> {
    serde_json::to_value(value).map_err(|e| {
        log::error!("Failed to encode request body: {e}");
        CloudflareError::transport(0, "Failed to encode request body")
    })
}

/// Dependencies shared by every service.
pub struct ServiceContext {
    /// Transport to the Cloudflare API.
    pub api: Arc<dyn CloudflareApi>,
}

impl ServiceContext {
    #[must_use]
    pub fn new(api: Arc<dyn CloudflareApi>) -> Self {
        Self { api }
    }
}

/// All services over one shared transport.
pub struct Services {
    pub zones: ZoneService,
    pub dns: DnsRecordService,
    pub transform: TransformRuleService,
    pub page_rules: PageRuleService,
    pub cache: CacheService,
    ctx: Arc<ServiceContext>,
}

impl Services {
    #[must_use]
    pub fn new(api: Arc<dyn CloudflareApi>) -> Self {
        let ctx = Arc::new(ServiceContext::new(api));
        Self {
            zones: ZoneService::new(Arc::clone(&ctx)),
            dns: DnsRecordService::new(Arc::clone(&ctx)),
            transform: TransformRuleService::new(Arc::clone(&ctx)),
            page_rules: PageRuleService::new(Arc::clone(&ctx)),
            cache: CacheService::new(Arc::clone(&ctx)),
            ctx,
        }
    }

    /// Release the transport's pooled connections.
    pub async fn shutdown(&self) {
        self.ctx.api.close().await;
    }
}
