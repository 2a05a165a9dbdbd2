//! Transform rules, stored as one ruleset per (zone, phase).
//!
//! Cloudflare does not address rulesets by phase, so every operation starts
//! by listing the zone's rulesets and scanning for the phase. Writes then
//! either replace the found ruleset or create a new one. Writes to the same
//! (zone, phase) are serialized within this process; another process writing
//! the same phase concurrently can still create a duplicate ruleset.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{Value, json};
use tokio::sync::Mutex;

use crate::error::Result;
use crate::models::Phase;
use crate::services::{ServiceContext, wire_body};
use crate::types::{ApiEnvelope, RulesetView};
use crate::validation::{IdKind, ResourceId};

type WriteLock = Arc<Mutex<()>>;

pub struct TransformRuleService {
    ctx: Arc<ServiceContext>,
    write_locks: Mutex<HashMap<(ResourceId, Phase), WriteLock>>,
}

impl TransformRuleService {
    #[must_use]
    pub fn new(ctx: Arc<ServiceContext>) -> Self {
        Self {
            ctx,
            write_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Current rules for `phase`. A phase without a ruleset yields no id and
    /// no rules.
    pub async fn list_rules(&self, zone_id: &str, phase: Phase) -> Result<RulesetView> {
        let zone_id = ResourceId::zone(zone_id)?;

        let Some(ruleset_id) = self.find_ruleset(&zone_id, phase).await? else {
            return Ok(RulesetView {
                ruleset_id: None,
                phase,
                rules: Vec::new(),
            });
        };

        let envelope = self
            .ctx
            .api
            .get(&format!("/zones/{zone_id}/rulesets/{ruleset_id}"), Vec::new())
            .await?;
        Ok(view(phase, &envelope))
    }

    /// Replace every rule in `phase` with `rules`.
    pub async fn set_rules(&self, zone_id: &str, phase: Phase, rules: Vec<Value>) -> Result<RulesetView> {
        let zone_id = ResourceId::zone(zone_id)?;
        let rules = wire_body(&phase.parse_rules(rules)?)?;

        let lock = self.write_lock(&zone_id, phase).await;
        let result = {
            let _guard = lock.lock().await;
            self.replace_rules(&zone_id, phase, rules).await
        };
        self.release_write_lock(&zone_id, phase, lock).await;
        result
    }

    async fn replace_rules(
        &self,
        zone_id: &ResourceId,
        phase: Phase,
        rules: Value,
    ) -> Result<RulesetView> {
        let envelope = match self.find_ruleset(zone_id, phase).await? {
            Some(ruleset_id) => {
                log::info!("Replacing {phase} ruleset {ruleset_id} in zone {zone_id}");
                self.ctx
                    .api
                    .put(
                        &format!("/zones/{zone_id}/rulesets/{ruleset_id}"),
                        json!({ "rules": rules }),
                    )
                    .await?
            }
            None => {
                log::info!("Creating {phase} ruleset in zone {zone_id}");
                self.ctx
                    .api
                    .post(
                        &format!("/zones/{zone_id}/rulesets"),
                        json!({
                            "name": phase.managed_ruleset_name(),
                            "kind": "zone",
                            "phase": phase.as_str(),
                            "rules": rules,
                        }),
                    )
                    .await?
            }
        };
        Ok(view(phase, &envelope))
    }

    async fn write_lock(&self, zone_id: &ResourceId, phase: Phase) -> WriteLock {
        let mut locks = self.write_locks.lock().await;
        Arc::clone(locks.entry((zone_id.clone(), phase)).or_default())
    }

    /// Drop the map entry once no other writer holds or waits on `lock`.
    async fn release_write_lock(&self, zone_id: &ResourceId, phase: Phase, lock: WriteLock) {
        let mut locks = self.write_locks.lock().await;
        let key = (zone_id.clone(), phase);
        if locks.get(&key).is_some_and(|held| Arc::ptr_eq(held, &lock))
            && Arc::strong_count(&lock) == 2
        {
            locks.remove(&key);
        }
    }

    async fn find_ruleset(&self, zone_id: &ResourceId, phase: Phase) -> Result<Option<ResourceId>> {
        let envelope = self
            .ctx
            .api
            .get(&format!("/zones/{zone_id}/rulesets"), Vec::new())
            .await?;

        envelope
            .result_list()
            .iter()
            .find(|ruleset| ruleset.get("phase").and_then(Value::as_str) == Some(phase.as_str()))
            .map(|ruleset| {
                let id = ruleset.get("id").and_then(Value::as_str).unwrap_or_default();
                ResourceId::parse(IdKind::Ruleset, id)
            })
            .transpose()
    }
}

fn view(phase: Phase, envelope: &ApiEnvelope) -> RulesetView {
    RulesetView {
        ruleset_id: envelope.result_id(),
        phase,
        rules: envelope
            .result
            .get("rules")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CloudflareError;
    use crate::test_utils::{MockApi, RULESET_ID, ZONE_ID};
    use crate::types::HttpMethod;

    fn service(api: &Arc<MockApi>) -> TransformRuleService {
        TransformRuleService::new(Arc::new(ServiceContext::new(api.clone())))
    }

    fn rulesets_path() -> String {
        format!("/zones/{ZONE_ID}/rulesets")
    }

    fn header_rule() -> Value {
        json!({
            "expression": "true",
            "description": "Add security headers",
            "action_parameters": {
                "headers": {"X-Content-Type-Options": {"operation": "set", "value": "nosniff"}}
            }
        })
    }

    #[tokio::test]
    async fn list_without_ruleset_is_empty() {
        let api = Arc::new(MockApi::new());
        api.on(
            HttpMethod::Get,
            &rulesets_path(),
            json!([{"id": RULESET_ID, "phase": "http_request_firewall_custom"}]),
        )
        .await;

        let view = service(&api).list_rules(ZONE_ID, Phase::ResponseHeaders).await.unwrap();
        assert_eq!(view.ruleset_id, None);
        assert!(view.rules.is_empty());
        assert_eq!(
            serde_json::to_value(&view).unwrap(),
            json!({"ruleset_id": null, "phase": "http_response_headers_transform", "rules": []})
        );
        assert_eq!(api.call_count().await, 1);
    }

    #[tokio::test]
    async fn list_fetches_matching_ruleset_detail() {
        let api = Arc::new(MockApi::new());
        api.on(
            HttpMethod::Get,
            &rulesets_path(),
            json!([{"id": RULESET_ID, "phase": "http_request_transform"}]),
        )
        .await;
        api.on(
            HttpMethod::Get,
            &format!("{}/{RULESET_ID}", rulesets_path()),
            json!({"id": RULESET_ID, "rules": [{"id": "r1"}]}),
        )
        .await;

        let view = service(&api).list_rules(ZONE_ID, Phase::UrlRewrite).await.unwrap();
        assert_eq!(view.ruleset_id.as_deref(), Some(RULESET_ID));
        assert_eq!(view.rules, vec![json!({"id": "r1"})]);
    }

    #[tokio::test]
    async fn set_creates_managed_ruleset_when_missing() {
        let api = Arc::new(MockApi::new());
        api.on(HttpMethod::Get, &rulesets_path(), json!([])).await;
        api.on(HttpMethod::Post, &rulesets_path(), json!({"id": RULESET_ID, "rules": []}))
            .await;

        let view = service(&api)
            .set_rules(ZONE_ID, Phase::RequestHeaders, vec![header_rule()])
            .await
            .unwrap();
        assert_eq!(view.ruleset_id.as_deref(), Some(RULESET_ID));

        let calls = api.calls().await;
        let create = &calls[1];
        assert_eq!(create.method, HttpMethod::Post);
        let body = create.body.clone().unwrap();
        assert_eq!(body["name"], "MCP Managed http_request_late_transform");
        assert_eq!(body["kind"], "zone");
        assert_eq!(body["phase"], "http_request_late_transform");
        assert_eq!(body["rules"][0]["action"], "rewrite");
        assert_eq!(body["rules"][0]["enabled"], true);
    }

    #[tokio::test]
    async fn set_replaces_existing_ruleset() {
        let api = Arc::new(MockApi::new());
        api.on(
            HttpMethod::Get,
            &rulesets_path(),
            json!([{"id": RULESET_ID, "phase": "http_response_headers_transform"}]),
        )
        .await;

        service(&api)
            .set_rules(ZONE_ID, Phase::ResponseHeaders, vec![header_rule()])
            .await
            .unwrap();

        let calls = api.calls().await;
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1].method, HttpMethod::Put);
        assert_eq!(calls[1].path, format!("{}/{RULESET_ID}", rulesets_path()));
        let body = calls[1].body.clone().unwrap();
        assert!(body.get("phase").is_none());
        assert_eq!(body["rules"].as_array().map(Vec::len), Some(1));
    }

    #[tokio::test]
    async fn invalid_rules_make_no_network_call() {
        let api = Arc::new(MockApi::new());
        let err = service(&api)
            .set_rules(ZONE_ID, Phase::UrlRewrite, vec![header_rule()])
            .await
            .unwrap_err();
        assert!(matches!(err, CloudflareError::Validation { .. }));
        assert_eq!(api.call_count().await, 0);
    }

    #[tokio::test]
    async fn concurrent_writes_to_one_phase_are_serialized() {
        let api = Arc::new(MockApi::new());
        api.on(HttpMethod::Get, &rulesets_path(), json!([])).await;
        let service = Arc::new(service(&api));

        let a = {
            let service = Arc::clone(&service);
            tokio::spawn(async move {
                service
                    .set_rules(ZONE_ID, Phase::RequestHeaders, vec![header_rule()])
                    .await
            })
        };
        let b = {
            let service = Arc::clone(&service);
            tokio::spawn(async move {
                service
                    .set_rules(ZONE_ID, Phase::RequestHeaders, vec![header_rule()])
                    .await
            })
        };
        a.await.unwrap().unwrap();
        b.await.unwrap().unwrap();

        // list, write, list, write: never two lists back to back
        let methods: Vec<HttpMethod> = api.calls().await.iter().map(|c| c.method).collect();
        assert_eq!(
            methods,
            vec![HttpMethod::Get, HttpMethod::Post, HttpMethod::Get, HttpMethod::Post]
        );
    }

    #[tokio::test]
    async fn write_lock_entries_are_released() {
        let api = Arc::new(MockApi::new());
        api.on(HttpMethod::Get, &rulesets_path(), json!([])).await;
        let service = service(&api);

        service
            .set_rules(ZONE_ID, Phase::RequestHeaders, vec![header_rule()])
            .await
            .unwrap();
        assert!(service.write_locks.lock().await.is_empty());

        api.respond(
            HttpMethod::Post,
            &rulesets_path(),
            Err(CloudflareError::transport(0, "Request timeout")),
        )
        .await;
        assert!(
            service
                .set_rules(ZONE_ID, Phase::RequestHeaders, vec![header_rule()])
                .await
                .is_err()
        );
        assert!(service.write_locks.lock().await.is_empty());
    }
}
