use std::sync::Arc;

use crate::error::Result;
use crate::services::ServiceContext;
use crate::types::{Outcome, Pagination, QueryParams, ZoneDetail, ZonePage};
use crate::utils::log_sanitizer::truncate_for_log;
use crate::validation::{ResourceId, check_len};

/// Cloudflare's page size ceiling for `/zones`.
pub const MAX_ZONES_PER_PAGE: u32 = 50;

/// Longest possible fully-qualified domain name.
const MAX_ZONE_NAME_LEN: usize = 253;

/// Filters for zone listing.
#[derive(Debug, Clone, Default)]
pub struct ZoneQuery {
    pub name: Option<String>,
    pub status: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

pub struct ZoneService {
    ctx: Arc<ServiceContext>,
}

impl ZoneService {
    #[must_use]
    pub fn new(ctx: Arc<ServiceContext>) -> Self {
        Self { ctx }
    }

    /// List zones visible to the token.
    pub async fn list_zones(&self, query: ZoneQuery) -> Result<ZonePage> {
        let paging = Pagination::new(query.page, query.per_page, MAX_ZONES_PER_PAGE);
        let params = QueryParams::new()
            .set("page", paging.page)
            .set("per_page", paging.per_page)
            .set_opt("name", query.name.as_deref())
            .set_opt("status", query.status.as_deref())
            .into_vec();

        let envelope = self.ctx.api.get("/zones", params).await?;
        Ok(ZonePage {
            zones: envelope.result_list(),
            result_info: envelope.result_info_or_empty(),
        })
    }

    /// Fetch one zone by id, or by name via a lookup. The id wins when both
    /// are supplied.
    pub async fn get_zone(
        &self,
        zone_id: Option<&str>,
        zone_name: Option<&str>,
    ) -> Result<Outcome<ZoneDetail>> {
        let zone_id = match (
            zone_id.filter(|s| !s.is_empty()),
            zone_name.filter(|s| !s.is_empty()),
        ) {
            (Some(id), _) => ResourceId::zone(id)?,
            (None, Some(name)) => match self.find_zone_id(name).await? {
                Some(id) => id,
                None => {
                    return Ok(Outcome::declined(format!(
                        "Zone not found: {}",
                        truncate_for_log(name)
                    )));
                }
            },
            (None, None) => {
                return Ok(Outcome::declined(
                    "Either zone_id or zone_name must be provided",
                ));
            }
        };

        let envelope = self.ctx.api.get(&format!("/zones/{zone_id}"), Vec::new()).await?;
        Ok(Outcome::Completed(ZoneDetail {
            zone: envelope.result_object(),
        }))
    }

    async fn find_zone_id(&self, name: &str) -> Result<Option<ResourceId>> {
        check_len("zone_name", name, 1, MAX_ZONE_NAME_LEN)?;
        let params = QueryParams::new().set("name", name).into_vec();
        let envelope = self.ctx.api.get("/zones", params).await?;

        let Some(first) = envelope.result_list().into_iter().next() else {
            log::debug!("Zone lookup by name returned no matches");
            return Ok(None);
        };
        let id = first
            .get("id")
            .and_then(serde_json::Value::as_str)
            .unwrap_or_default();
        ResourceId::zone(id).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CloudflareError;
    use crate::test_utils::{MockApi, ZONE_ID};
    use crate::types::{ApiEnvelope, HttpMethod};
    use serde_json::json;

    fn service(api: &Arc<MockApi>) -> ZoneService {
        ZoneService::new(Arc::new(ServiceContext::new(api.clone())))
    }

    fn query(calls: &[crate::types::ApiRequest], index: usize) -> Vec<(String, String)> {
        calls[index].query.clone()
    }

    #[tokio::test]
    async fn list_caps_page_size_and_forwards_filters() {
        let api = Arc::new(MockApi::new());
        api.respond(
            HttpMethod::Get,
            "/zones",
            Ok(ApiEnvelope {
                success: true,
                result: json!([{"id": ZONE_ID, "name": "example.com"}]),
                result_info: Some(json!({"page": 1, "total_count": 1})),
                ..ApiEnvelope::default()
            }),
        )
        .await;

        let page = service(&api)
            .list_zones(ZoneQuery {
                name: Some("example.com".to_string()),
                status: Some(String::new()),
                per_page: Some(500),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(page.zones.len(), 1);
        assert_eq!(page.result_info["total_count"], 1);
        let calls = api.calls().await;
        assert_eq!(
            query(&calls, 0),
            vec![
                ("page".to_string(), "1".to_string()),
                ("per_page".to_string(), "50".to_string()),
                ("name".to_string(), "example.com".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn list_defaults_missing_result_info_to_empty_object() {
        let api = Arc::new(MockApi::new());
        api.on(HttpMethod::Get, "/zones", json!([])).await;
        let page = service(&api).list_zones(ZoneQuery::default()).await.unwrap();
        assert!(page.zones.is_empty());
        assert_eq!(page.result_info, json!({}));
    }

    #[tokio::test]
    async fn get_by_id_validates_then_fetches() {
        let api = Arc::new(MockApi::new());
        api.on(HttpMethod::Get, &format!("/zones/{ZONE_ID}"), json!({"id": ZONE_ID}))
            .await;

        let outcome = service(&api).get_zone(Some(ZONE_ID), None).await.unwrap();
        assert_eq!(
            outcome,
            Outcome::Completed(ZoneDetail {
                zone: json!({"id": ZONE_ID})
            })
        );
    }

    #[tokio::test]
    async fn invalid_id_makes_no_network_call() {
        let api = Arc::new(MockApi::new());
        let err = service(&api).get_zone(Some("../../accounts"), None).await.unwrap_err();
        assert!(matches!(err, CloudflareError::Validation { .. }));
        assert_eq!(api.call_count().await, 0);
    }

    #[tokio::test]
    async fn get_by_name_looks_up_first_match() {
        let api = Arc::new(MockApi::new());
        api.on(HttpMethod::Get, "/zones", json!([{"id": ZONE_ID, "name": "example.com"}]))
            .await;
        api.on(HttpMethod::Get, &format!("/zones/{ZONE_ID}"), json!({"id": ZONE_ID, "status": "active"}))
            .await;

        let outcome = service(&api).get_zone(None, Some("example.com")).await.unwrap();
        assert!(!outcome.is_declined());
        let calls = api.calls().await;
        assert_eq!(calls.len(), 2);
        assert_eq!(query(&calls, 0), vec![("name".to_string(), "example.com".to_string())]);
        assert_eq!(calls[1].path, format!("/zones/{ZONE_ID}"));
    }

    #[tokio::test]
    async fn unknown_name_is_declined_not_raised() {
        let api = Arc::new(MockApi::new());
        api.on(HttpMethod::Get, "/zones", json!([])).await;

        let outcome = service(&api).get_zone(None, Some("missing.example")).await.unwrap();
        assert_eq!(outcome, Outcome::declined("Zone not found: missing.example"));
        assert_eq!(api.call_count().await, 1);
    }

    #[tokio::test]
    async fn neither_id_nor_name_is_declined() {
        let api = Arc::new(MockApi::new());
        let outcome = service(&api).get_zone(None, Some("")).await.unwrap();
        assert_eq!(
            outcome,
            Outcome::declined("Either zone_id or zone_name must be provided")
        );
        assert_eq!(api.call_count().await, 0);
    }

    #[tokio::test]
    async fn not_found_from_provider_propagates() {
        let api = Arc::new(MockApi::new());
        api.respond(
            HttpMethod::Get,
            &format!("/zones/{ZONE_ID}"),
            Err(CloudflareError::ResourceNotFound {
                detail: "Invalid zone identifier".to_string(),
            }),
        )
        .await;

        let err = service(&api).get_zone(Some(ZONE_ID), None).await.unwrap_err();
        assert!(matches!(err, CloudflareError::ResourceNotFound { .. }));
    }
}
