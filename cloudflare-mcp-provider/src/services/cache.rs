use std::sync::Arc;

use crate::error::Result;
use crate::models::{CachePurge, PurgeSelectors};
use crate::services::ServiceContext;
use crate::types::{Outcome, PurgeReceipt};
use crate::validation::ResourceId;

pub struct CacheService {
    ctx: Arc<ServiceContext>,
}

impl CacheService {
    #[must_use]
    pub fn new(ctx: Arc<ServiceContext>) -> Self {
        Self { ctx }
    }

    /// Purge cached content using the highest-precedence selector supplied.
    pub async fn purge(&self, zone_id: &str, selectors: PurgeSelectors) -> Result<Outcome<PurgeReceipt>> {
        let zone_id = ResourceId::zone(zone_id)?;
        let Some(purge) = selectors.into_purge() else {
            return Ok(Outcome::declined(
                "Must specify purge_everything, files, tags, hosts, or prefixes",
            ));
        };

        match &purge {
            CachePurge::Everything => log::info!("Purging all cached content in zone {zone_id}"),
            _ => log::info!("Purging selected cached content in zone {zone_id}"),
        }
        let envelope = self
            .ctx
            .api
            .post(&format!("/zones/{zone_id}/purge_cache"), purge.to_body())
            .await?;
        Ok(Outcome::Completed(PurgeReceipt {
            success: envelope.success,
            id: envelope.result_id(),
        }))
    }
}
