use std::sync::Arc;

use crate::error::Result;
use crate::models::{DnsRecordInput, DnsRecordPatch, DnsRecordType};
use crate::services::{NO_UPDATE_FIELDS, ServiceContext, wire_body};
use crate::types::{Deleted, Outcome, Pagination, QueryParams, RecordDetail, RecordPage};
use crate::validation::ResourceId;

/// Cloudflare's page size ceiling for `/dns_records`.
pub const MAX_RECORDS_PER_PAGE: u32 = 100;

/// Filters for record listing.
#[derive(Debug, Clone, Default)]
pub struct DnsRecordQuery {
    pub record_type: Option<String>,
    pub name: Option<String>,
    pub content: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

pub struct DnsRecordService {
    ctx: Arc<ServiceContext>,
}

fn records_path(zone_id: &ResourceId) -> String {
    format!("/zones/{zone_id}/dns_records")
}

fn record_path(zone_id: &ResourceId, record_id: &ResourceId) -> String {
    format!("/zones/{zone_id}/dns_records/{record_id}")
}

impl DnsRecordService {
    #[must_use]
    pub fn new(ctx: Arc<ServiceContext>) -> Self {
        Self { ctx }
    }

    pub async fn list_records(&self, zone_id: &str, query: DnsRecordQuery) -> Result<RecordPage> {
        let zone_id = ResourceId::zone(zone_id)?;
        let record_type = query
            .record_type
            .as_deref()
            .filter(|t| !t.is_empty())
            .map(str::parse::<DnsRecordType>)
            .transpose()?;
        let paging = Pagination::new(query.page, query.per_page, MAX_RECORDS_PER_PAGE);

        let params = QueryParams::new()
            .set("page", paging.page)
            .set("per_page", paging.per_page)
            .set_opt("type", record_type.map(DnsRecordType::as_str))
            .set_opt("name", query.name.as_deref())
            .set_opt("content", query.content.as_deref())
            .into_vec();

        let envelope = self.ctx.api.get(&records_path(&zone_id), params).await?;
        Ok(RecordPage {
            records: envelope.result_list(),
            result_info: envelope.result_info_or_empty(),
        })
    }

    pub async fn get_record(&self, zone_id: &str, record_id: &str) -> Result<RecordDetail> {
        let zone_id = ResourceId::zone(zone_id)?;
        let record_id = ResourceId::record(record_id)?;

        let envelope = self
            .ctx
            .api
            .get(&record_path(&zone_id, &record_id), Vec::new())
            .await?;
        Ok(RecordDetail {
            record: envelope.result_object(),
        })
    }

    pub async fn create_record(&self, zone_id: &str, input: DnsRecordInput) -> Result<RecordDetail> {
        let zone_id = ResourceId::zone(zone_id)?;
        let record = input.validate()?;
        let body = wire_body(&record)?;

        log::info!("Creating {} record in zone {zone_id}", record.record_type);
        let envelope = self.ctx.api.post(&records_path(&zone_id), body).await?;
        Ok(RecordDetail {
            record: envelope.result_object(),
        })
    }

    pub async fn update_record(
        &self,
        zone_id: &str,
        record_id: &str,
        patch: DnsRecordPatch,
    ) -> Result<Outcome<RecordDetail>> {
        let zone_id = ResourceId::zone(zone_id)?;
        let record_id = ResourceId::record(record_id)?;
        let changes = patch.validate()?;
        if changes.is_empty() {
            return Ok(Outcome::declined(NO_UPDATE_FIELDS));
        }
        let body = wire_body(&changes)?;

        log::info!("Updating record {record_id} in zone {zone_id}");
        let envelope = self
            .ctx
            .api
            .patch(&record_path(&zone_id, &record_id), body)
            .await?;
        Ok(Outcome::Completed(RecordDetail {
            record: envelope.result_object(),
        }))
    }

    pub async fn delete_record(&self, zone_id: &str, record_id: &str) -> Result<Deleted> {
        let zone_id = ResourceId::zone(zone_id)?;
        let record_id = ResourceId::record(record_id)?;

        log::info!("Deleting record {record_id} in zone {zone_id}");
        let envelope = self.ctx.api.delete(&record_path(&zone_id, &record_id)).await?;
        Ok(Deleted {
            deleted: true,
            id: envelope
                .result_id()
                .unwrap_or_else(|| record_id.as_str().to_string()),
        })
    }
}
