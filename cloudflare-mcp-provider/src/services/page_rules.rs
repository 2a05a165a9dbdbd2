use std::sync::Arc;

use crate::error::Result;
use crate::models::{PageRuleInput, PageRuleOrder, PageRulePatch, PageRuleStatus};
use crate::services::{NO_UPDATE_FIELDS, ServiceContext, wire_body};
use crate::types::{Deleted, Outcome, PageRuleDetail, PageRuleList, QueryParams};
use crate::validation::ResourceId;

pub struct PageRuleService {
    ctx: Arc<ServiceContext>,
}

impl PageRuleService {
    #[must_use]
    pub fn new(ctx: Arc<ServiceContext>) -> Self {
        Self { ctx }
    }

    pub async fn list_page_rules(
        &self,
        zone_id: &str,
        status: Option<&str>,
        order: Option<&str>,
    ) -> Result<PageRuleList> {
        let zone_id = ResourceId::zone(zone_id)?;
        let status = status
            .filter(|s| !s.is_empty())
            .map(str::parse::<PageRuleStatus>)
            .transpose()?;
        let order = order
            .filter(|o| !o.is_empty())
            .map(str::parse::<PageRuleOrder>)
            .transpose()?
            .unwrap_or_default();

        let params = QueryParams::new()
            .set("order", order.as_str())
            .set_opt("status", status.map(PageRuleStatus::as_str))
            .into_vec();
        let envelope = self
            .ctx
            .api
            .get(&format!("/zones/{zone_id}/pagerules"), params)
            .await?;
        Ok(PageRuleList {
            page_rules: envelope.result_list(),
        })
    }

    pub async fn create_page_rule(&self, zone_id: &str, input: PageRuleInput) -> Result<PageRuleDetail> {
        let zone_id = ResourceId::zone(zone_id)?;
        let body = wire_body(&input.validate()?)?;

        log::info!("Creating page rule in zone {zone_id}");
        let envelope = self
            .ctx
            .api
            .post(&format!("/zones/{zone_id}/pagerules"), body)
            .await?;
        Ok(PageRuleDetail {
            page_rule: envelope.result_object(),
        })
    }

    pub async fn update_page_rule(
        &self,
        zone_id: &str,
        rule_id: &str,
        patch: PageRulePatch,
    ) -> Result<Outcome<PageRuleDetail>> {
        let zone_id = ResourceId::zone(zone_id)?;
        let rule_id = ResourceId::rule(rule_id)?;
        let changes = patch.validate()?;
        if changes.is_empty() {
            return Ok(Outcome::declined(NO_UPDATE_FIELDS));
        }

        log::info!("Updating page rule {rule_id} in zone {zone_id}");
        let envelope = self
            .ctx
            .api
            .patch(
                &format!("/zones/{zone_id}/pagerules/{rule_id}"),
                wire_body(&changes)?,
            )
            .await?;
        Ok(Outcome::Completed(PageRuleDetail {
            page_rule: envelope.result_object(),
        }))
    }

    pub async fn delete_page_rule(&self, zone_id: &str, rule_id: &str) -> Result<Deleted> {
        let zone_id = ResourceId::zone(zone_id)?;
        let rule_id = ResourceId::rule(rule_id)?;

        log::info!("Deleting page rule {rule_id} in zone {zone_id}");
        let envelope = self
            .ctx
            .api
            .delete(&format!("/zones/{zone_id}/pagerules/{rule_id}"))
            .await?;
        Ok(Deleted {
            deleted: true,
            id: envelope
                .result_id()
                .unwrap_or_else(|| rule_id.as_str().to_string()),
        })
    }
}
