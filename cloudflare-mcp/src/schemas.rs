//! MCP tool parameter schemas
//!
//! Defines the input parameter structures for all MCP tools.
//! All structs derive `Debug`, `Deserialize`, and `JsonSchema` as required by rmcp,
//! and reject unknown fields.

use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::Value;

use cloudflare_mcp_provider::models::{
    DnsRecordInput, DnsRecordPatch, PageRuleInput, PageRulePatch, PurgeSelectors,
};
use cloudflare_mcp_provider::services::{DnsRecordQuery, ZoneQuery};

// ============ Zones ============

/// Parameters for `list_zones` tool.
#[derive(Debug, Default, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ListZonesParams {
    #[schemars(description = "Filter by zone name (domain)")]
    pub name: Option<String>,

    #[schemars(description = "Filter by status (active, pending, initializing, moved, deleted)")]
    pub status: Option<String>,

    #[schemars(description = "Page number (1-indexed, default: 1)")]
    pub page: Option<u32>,

    #[schemars(description = "Results per page, max 50 (default: 50)")]
    pub per_page: Option<u32>,
}

impl From<ListZonesParams> for ZoneQuery {
    fn from(params: ListZonesParams) -> Self {
        Self {
            name: params.name,
            status: params.status,
            page: params.page,
            per_page: params.per_page,
        }
    }
}

/// Parameters for `get_zone` tool.
#[derive(Debug, Default, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct GetZoneParams {
    #[schemars(description = "Zone ID (32-character hex string). Takes precedence over zone_name")]
    pub zone_id: Option<String>,

    #[schemars(description = "Zone name (domain like example.com)")]
    pub zone_name: Option<String>,
}

/// Parameters for tools scoped to a single zone.
#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ZoneParams {
    #[schemars(description = "Zone ID (32-character hex string)")]
    pub zone_id: String,
}

// ============ DNS records ============

/// Parameters for `list_dns_records` tool.
#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ListDnsRecordsParams {
    #[schemars(description = "Zone ID (32-character hex string)")]
    pub zone_id: String,

    #[serde(rename = "type")]
    #[schemars(description = "Filter by record type (A, AAAA, CNAME, MX, TXT, NS, SRV, CAA, PTR)")]
    pub record_type: Option<String>,

    #[schemars(description = "Filter by record name")]
    pub name: Option<String>,

    #[schemars(description = "Filter by record content")]
    pub content: Option<String>,

    #[schemars(description = "Page number (1-indexed, default: 1)")]
    pub page: Option<u32>,

    #[schemars(description = "Results per page, max 100 (default: 100)")]
    pub per_page: Option<u32>,
}

impl ListDnsRecordsParams {
    pub fn into_query(self) -> (String, DnsRecordQuery) {
        (
            self.zone_id,
            DnsRecordQuery {
                record_type: self.record_type,
                name: self.name,
                content: self.content,
                page: self.page,
                per_page: self.per_page,
            },
        )
    }
}

/// Parameters for `get_dns_record` and `delete_dns_record` tools.
#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct DnsRecordParams {
    #[schemars(description = "Zone ID (32-character hex string)")]
    pub zone_id: String,

    #[schemars(description = "DNS record ID (32-character hex string)")]
    pub record_id: String,
}

/// Parameters for `create_dns_record` tool.
#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateDnsRecordParams {
    #[schemars(description = "Zone ID (32-character hex string)")]
    pub zone_id: String,

    #[serde(rename = "type")]
    #[schemars(description = "Record type (A, AAAA, CNAME, MX, TXT, NS, SRV, CAA, PTR)")]
    pub record_type: String,

    #[schemars(description = "Record name (e.g. www, or @ for the zone apex)")]
    pub name: String,

    #[schemars(description = "Record content (e.g. an IP address)")]
    pub content: String,

    #[schemars(description = "TTL in seconds, 1 means automatic (default: 1)")]
    pub ttl: Option<i64>,

    #[schemars(description = "Proxy traffic through Cloudflare (default: false)")]
    pub proxied: Option<bool>,

    #[schemars(description = "Priority, required for MX and SRV (0-65535)")]
    pub priority: Option<i64>,

    #[schemars(description = "Optional comment (max 500 characters)")]
    pub comment: Option<String>,
}

impl CreateDnsRecordParams {
    pub fn into_input(self) -> (String, DnsRecordInput) {
        (
            self.zone_id,
            DnsRecordInput {
                record_type: self.record_type,
                name: self.name,
                content: self.content,
                ttl: self.ttl,
                proxied: self.proxied,
                priority: self.priority,
                comment: self.comment,
            },
        )
    }
}

/// Parameters for `update_dns_record` tool.
#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateDnsRecordParams {
    #[schemars(description = "Zone ID (32-character hex string)")]
    pub zone_id: String,

    #[schemars(description = "DNS record ID (32-character hex string)")]
    pub record_id: String,

    #[serde(rename = "type")]
    #[schemars(description = "New record type")]
    pub record_type: Option<String>,

    #[schemars(description = "New record name")]
    pub name: Option<String>,

    #[schemars(description = "New record content")]
    pub content: Option<String>,

    #[schemars(description = "New TTL in seconds")]
    pub ttl: Option<i64>,

    #[schemars(description = "New proxy setting")]
    pub proxied: Option<bool>,

    #[schemars(description = "New priority")]
    pub priority: Option<i64>,

    #[schemars(description = "New comment (empty string clears it)")]
    pub comment: Option<String>,
}

impl UpdateDnsRecordParams {
    pub fn into_patch(self) -> (String, String, DnsRecordPatch) {
        (
            self.zone_id,
            self.record_id,
            DnsRecordPatch {
                record_type: self.record_type,
                name: self.name,
                content: self.content,
                ttl: self.ttl,
                proxied: self.proxied,
                priority: self.priority,
                comment: self.comment,
            },
        )
    }
}

// ============ Transform rules ============

/// Parameters for the `set_*_rules` tools.
#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct SetRulesParams {
    #[schemars(description = "Zone ID (32-character hex string)")]
    pub zone_id: String,

    #[schemars(
        description = "Complete list of rules for the phase; replaces all existing rules. Each rule: \
                       {expression, description?, enabled?, action?: \"rewrite\", action_parameters}"
    )]
    pub rules: Vec<Value>,
}

// ============ Page rules ============

/// Parameters for `list_page_rules` tool.
#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ListPageRulesParams {
    #[schemars(description = "Zone ID (32-character hex string)")]
    pub zone_id: String,

    #[schemars(description = "Filter by status (active, disabled)")]
    pub status: Option<String>,

    #[schemars(description = "Sort order (status, priority; default: priority)")]
    pub order: Option<String>,
}

/// Parameters for `create_page_rule` tool.
#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct CreatePageRuleParams {
    #[schemars(description = "Zone ID (32-character hex string)")]
    pub zone_id: String,

    #[schemars(
        description = "URL pattern targets (1-10), e.g. \
                       [{\"target\": \"url\", \"constraint\": {\"operator\": \"matches\", \"value\": \"example.com/*\"}}]"
    )]
    pub targets: Vec<Value>,

    #[schemars(
        description = "Actions (1-20), e.g. [{\"id\": \"forwarding_url\", \"value\": {\"url\": \"https://example.org\", \"status_code\": 301}}]"
    )]
    pub actions: Vec<Value>,

    #[schemars(description = "Priority 1-1000, lower runs first (default: 1)")]
    pub priority: Option<i64>,

    #[schemars(description = "Rule status (active, disabled; default: active)")]
    pub status: Option<String>,
}

impl CreatePageRuleParams {
    pub fn into_input(self) -> (String, PageRuleInput) {
        (
            self.zone_id,
            PageRuleInput {
                targets: self.targets,
                actions: self.actions,
                priority: self.priority,
                status: self.status,
            },
        )
    }
}

/// Parameters for `update_page_rule` tool.
#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdatePageRuleParams {
    #[schemars(description = "Zone ID (32-character hex string)")]
    pub zone_id: String,

    #[schemars(description = "Page rule ID (32-character hex string)")]
    pub rule_id: String,

    #[schemars(description = "New URL pattern targets")]
    pub targets: Option<Vec<Value>>,

    #[schemars(description = "New actions")]
    pub actions: Option<Vec<Value>>,

    #[schemars(description = "New priority")]
    pub priority: Option<i64>,

    #[schemars(description = "New status (active, disabled)")]
    pub status: Option<String>,
}

impl UpdatePageRuleParams {
    pub fn into_patch(self) -> (String, String, PageRulePatch) {
        (
            self.zone_id,
            self.rule_id,
            PageRulePatch {
                targets: self.targets,
                actions: self.actions,
                priority: self.priority,
                status: self.status,
            },
        )
    }
}

/// Parameters for `delete_page_rule` tool.
#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct PageRuleParams {
    #[schemars(description = "Zone ID (32-character hex string)")]
    pub zone_id: String,

    #[schemars(description = "Page rule ID (32-character hex string)")]
    pub rule_id: String,
}

// ============ Cache ============

/// Parameters for `purge_cache` tool.
#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct PurgeCacheParams {
    #[schemars(description = "Zone ID (32-character hex string)")]
    pub zone_id: String,

    #[serde(default)]
    #[schemars(description = "Purge all cached content; overrides every other selector")]
    pub purge_everything: bool,

    #[schemars(description = "URLs to purge (first 30 are used)")]
    pub files: Option<Vec<String>>,

    #[schemars(description = "Cache tags to purge (first 30 are used)")]
    pub tags: Option<Vec<String>>,

    #[schemars(description = "Hostnames to purge (first 30 are used)")]
    pub hosts: Option<Vec<String>>,

    #[schemars(description = "URL prefixes to purge (first 30 are used)")]
    pub prefixes: Option<Vec<String>>,
}

impl PurgeCacheParams {
    pub fn into_selectors(self) -> (String, PurgeSelectors) {
        (
            self.zone_id,
            PurgeSelectors {
                purge_everything: self.purge_everything,
                files: self.files,
                tags: self.tags,
                hosts: self.hosts,
                prefixes: self.prefixes,
            },
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    use schemars::schema_for;
    use serde_json::json;

    #[test]
    fn list_zones_accepts_empty_object() {
        let params: ListZonesParams = serde_json::from_value(json!({})).unwrap();
        assert!(params.name.is_none());
        assert!(params.per_page.is_none());
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let result = serde_json::from_value::<ZoneParams>(json!({
            "zone_id": "a1b2c3d4e5f6a1b2c3d4e5f6a1b2c3d4",
            "base_url": "https://attacker.example"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn record_type_uses_type_key() {
        let params: CreateDnsRecordParams = serde_json::from_value(json!({
            "zone_id": "a1b2c3d4e5f6a1b2c3d4e5f6a1b2c3d4",
            "type": "a",
            "name": "www",
            "content": "192.168.1.1"
        }))
        .unwrap();
        let (zone_id, input) = params.into_input();
        assert_eq!(zone_id, "a1b2c3d4e5f6a1b2c3d4e5f6a1b2c3d4");
        assert_eq!(input.record_type, "a");
        assert!(input.ttl.is_none());
    }

    #[test]
    fn create_dns_record_missing_content_fails() {
        let result = serde_json::from_value::<CreateDnsRecordParams>(json!({
            "zone_id": "a1b2c3d4e5f6a1b2c3d4e5f6a1b2c3d4",
            "type": "A",
            "name": "www"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn purge_everything_defaults_to_false() {
        let params: PurgeCacheParams = serde_json::from_value(json!({
            "zone_id": "a1b2c3d4e5f6a1b2c3d4e5f6a1b2c3d4",
            "tags": ["static"]
        }))
        .unwrap();
        let (_, selectors) = params.into_selectors();
        assert!(!selectors.purge_everything);
        assert_eq!(selectors.tags, Some(vec!["static".to_string()]));
    }

    #[test]
    fn set_rules_requires_rules_array() {
        assert!(serde_json::from_value::<SetRulesParams>(json!({
            "zone_id": "a1b2c3d4e5f6a1b2c3d4e5f6a1b2c3d4"
        }))
        .is_err());
    }

    #[test]
    fn schemas_declare_required_fields() {
        let schema = serde_json::to_value(schema_for!(CreateDnsRecordParams)).unwrap();
        let required = schema["required"].as_array().unwrap();
        for field in ["zone_id", "type", "name", "content"] {
            assert!(required.iter().any(|v| v == field), "missing {field}");
        }
        assert!(!required.iter().any(|v| v == "ttl"));
    }
}
