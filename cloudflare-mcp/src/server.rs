//! MCP Server implementation for Cloudflare.
//!
//! Exposes 18 tools covering zones, DNS records, transform rules, page rules
//! and cache purge. Every handler delegates to [`Services`] and returns the
//! result as pretty-printed JSON text.

use std::future::Future;
use std::sync::Arc;

use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{
        CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
    },
    tool, tool_handler, tool_router,
};
use serde::Serialize;

use cloudflare_mcp_provider::models::Phase;
use cloudflare_mcp_provider::{CloudflareError, Services};

use crate::schemas::{
    CreateDnsRecordParams, CreatePageRuleParams, DnsRecordParams, GetZoneParams,
    ListDnsRecordsParams, ListPageRulesParams, ListZonesParams, PageRuleParams, PurgeCacheParams,
    SetRulesParams, UpdateDnsRecordParams, UpdatePageRuleParams, ZoneParams,
};

/// Sanitize error messages to prevent sensitive information leakage.
///
/// Logs the full error to stderr but returns a generic message to the client.
fn sanitize_internal_error(error: impl std::fmt::Display, context: &str) -> McpError {
    tracing::error!("{context} error: {error}");
    McpError::internal_error(
        format!("{context} failed - check server logs for details"),
        None,
    )
}

/// Translate a provider error into an MCP error.
///
/// Provider messages are already scrubbed of the API token, so they are passed
/// through along with the structured error as `data`.
fn map_cloudflare_error(context: &str, error: &CloudflareError) -> McpError {
    if error.is_expected() {
        tracing::warn!("{context} error: {error}");
    } else {
        tracing::error!("{context} error: {error}");
    }

    let data = serde_json::to_value(error).ok();
    match error {
        CloudflareError::Validation { .. } => McpError::invalid_params(error.to_string(), data),
        CloudflareError::ResourceNotFound { .. } => {
            McpError::resource_not_found(error.to_string(), data)
        }
        _ => McpError::internal_error(error.to_string(), data),
    }
}

/// Await a service call, map its error and serialize the result.
async fn run_tool<T: Serialize>(
    future: impl Future<Output = cloudflare_mcp_provider::Result<T>>,
    tool_name: &str,
) -> Result<CallToolResult, McpError> {
    let result = future
        .await
        .map_err(|e| map_cloudflare_error(tool_name, &e))?;

    let json = serde_json::to_string_pretty(&result)
        .map_err(|e| sanitize_internal_error(e, &format!("Serialize {tool_name} result")))?;

    Ok(CallToolResult::success(vec![Content::text(json)]))
}

/// MCP Server for Cloudflare.
///
/// Provides AI agents with validated access to one Cloudflare account
/// through the Model Context Protocol.
#[derive(Clone)]
pub struct CloudflareMcp {
    /// Resource services over one shared transport.
    services: Arc<Services>,
    /// Tool router generated by macro.
    tool_router: ToolRouter<Self>,
}

impl CloudflareMcp {
    /// Create a new MCP server instance.
    #[must_use]
    pub fn new(services: Arc<Services>) -> Self {
        Self {
            services,
            tool_router: Self::tool_router(),
        }
    }
}

#[tool_router]
impl CloudflareMcp {
    // ============ Zones ============

    #[tool(description = "List all Cloudflare zones accessible by the API token")]
    async fn list_zones(
        &self,
        Parameters(params): Parameters<ListZonesParams>,
    ) -> Result<CallToolResult, McpError> {
        run_tool(self.services.zones.list_zones(params.into()), "List zones").await
    }

    #[tool(description = "Get Cloudflare zone details by ID or name")]
    async fn get_zone(
        &self,
        Parameters(params): Parameters<GetZoneParams>,
    ) -> Result<CallToolResult, McpError> {
        run_tool(
            self.services
                .zones
                .get_zone(params.zone_id.as_deref(), params.zone_name.as_deref()),
            "Get zone",
        )
        .await
    }

    // ============ DNS records ============

    #[tool(description = "List DNS records for a zone with optional type, name and content filters")]
    async fn list_dns_records(
        &self,
        Parameters(params): Parameters<ListDnsRecordsParams>,
    ) -> Result<CallToolResult, McpError> {
        let (zone_id, query) = params.into_query();
        run_tool(
            self.services.dns.list_records(&zone_id, query),
            "List DNS records",
        )
        .await
    }

    #[tool(description = "Get a single DNS record by ID")]
    async fn get_dns_record(
        &self,
        Parameters(params): Parameters<DnsRecordParams>,
    ) -> Result<CallToolResult, McpError> {
        run_tool(
            self.services
                .dns
                .get_record(&params.zone_id, &params.record_id),
            "Get DNS record",
        )
        .await
    }

    #[tool(description = "Create a DNS record (A, AAAA, CNAME, MX, TXT, NS, SRV, CAA, PTR)")]
    async fn create_dns_record(
        &self,
        Parameters(params): Parameters<CreateDnsRecordParams>,
    ) -> Result<CallToolResult, McpError> {
        let (zone_id, input) = params.into_input();
        run_tool(
            self.services.dns.create_record(&zone_id, input),
            "Create DNS record",
        )
        .await
    }

    #[tool(description = "Update a DNS record; only the supplied fields are changed")]
    async fn update_dns_record(
        &self,
        Parameters(params): Parameters<UpdateDnsRecordParams>,
    ) -> Result<CallToolResult, McpError> {
        let (zone_id, record_id, patch) = params.into_patch();
        run_tool(
            self.services.dns.update_record(&zone_id, &record_id, patch),
            "Update DNS record",
        )
        .await
    }

    #[tool(description = "Delete a DNS record")]
    async fn delete_dns_record(
        &self,
        Parameters(params): Parameters<DnsRecordParams>,
    ) -> Result<CallToolResult, McpError> {
        run_tool(
            self.services
                .dns
                .delete_record(&params.zone_id, &params.record_id),
            "Delete DNS record",
        )
        .await
    }

    // ============ Transform rules ============

    #[tool(description = "List request header modification rules for a zone")]
    async fn list_request_header_rules(
        &self,
        Parameters(params): Parameters<ZoneParams>,
    ) -> Result<CallToolResult, McpError> {
        self.list_phase(&params.zone_id, Phase::RequestHeaders).await
    }

    #[tool(description = "Set request header modification rules (replaces all existing rules)")]
    async fn set_request_header_rules(
        &self,
        Parameters(params): Parameters<SetRulesParams>,
    ) -> Result<CallToolResult, McpError> {
        self.set_phase(params, Phase::RequestHeaders).await
    }

    #[tool(description = "List response header modification rules for a zone")]
    async fn list_response_header_rules(
        &self,
        Parameters(params): Parameters<ZoneParams>,
    ) -> Result<CallToolResult, McpError> {
        self.list_phase(&params.zone_id, Phase::ResponseHeaders).await
    }

    #[tool(description = "Set response header modification rules (replaces all existing rules)")]
    async fn set_response_header_rules(
        &self,
        Parameters(params): Parameters<SetRulesParams>,
    ) -> Result<CallToolResult, McpError> {
        self.set_phase(params, Phase::ResponseHeaders).await
    }

    #[tool(description = "List URL rewrite rules for a zone")]
    async fn list_url_rewrite_rules(
        &self,
        Parameters(params): Parameters<ZoneParams>,
    ) -> Result<CallToolResult, McpError> {
        self.list_phase(&params.zone_id, Phase::UrlRewrite).await
    }

    #[tool(description = "Set URL rewrite rules (replaces all existing rules)")]
    async fn set_url_rewrite_rules(
        &self,
        Parameters(params): Parameters<SetRulesParams>,
    ) -> Result<CallToolResult, McpError> {
        self.set_phase(params, Phase::UrlRewrite).await
    }

    // ============ Page rules ============

    #[tool(description = "List page rules for a zone")]
    async fn list_page_rules(
        &self,
        Parameters(params): Parameters<ListPageRulesParams>,
    ) -> Result<CallToolResult, McpError> {
        run_tool(
            self.services.page_rules.list_page_rules(
                &params.zone_id,
                params.status.as_deref(),
                params.order.as_deref(),
            ),
            "List page rules",
        )
        .await
    }

    #[tool(description = "Create a page rule from URL targets and actions")]
    async fn create_page_rule(
        &self,
        Parameters(params): Parameters<CreatePageRuleParams>,
    ) -> Result<CallToolResult, McpError> {
        let (zone_id, input) = params.into_input();
        run_tool(
            self.services.page_rules.create_page_rule(&zone_id, input),
            "Create page rule",
        )
        .await
    }

    #[tool(description = "Update a page rule; only the supplied fields are changed")]
    async fn update_page_rule(
        &self,
        Parameters(params): Parameters<UpdatePageRuleParams>,
    ) -> Result<CallToolResult, McpError> {
        let (zone_id, rule_id, patch) = params.into_patch();
        run_tool(
            self.services
                .page_rules
                .update_page_rule(&zone_id, &rule_id, patch),
            "Update page rule",
        )
        .await
    }

    #[tool(description = "Delete a page rule")]
    async fn delete_page_rule(
        &self,
        Parameters(params): Parameters<PageRuleParams>,
    ) -> Result<CallToolResult, McpError> {
        run_tool(
            self.services
                .page_rules
                .delete_page_rule(&params.zone_id, &params.rule_id),
            "Delete page rule",
        )
        .await
    }

    // ============ Cache ============

    #[tool(
        description = "Purge cached content from Cloudflare's edge (everything, or by files, tags, hosts or prefixes)"
    )]
    async fn purge_cache(
        &self,
        Parameters(params): Parameters<PurgeCacheParams>,
    ) -> Result<CallToolResult, McpError> {
        let (zone_id, selectors) = params.into_selectors();
        run_tool(
            self.services.cache.purge(&zone_id, selectors),
            "Purge cache",
        )
        .await
    }
}

impl CloudflareMcp {
    async fn list_phase(&self, zone_id: &str, phase: Phase) -> Result<CallToolResult, McpError> {
        run_tool(
            self.services.transform.list_rules(zone_id, phase),
            &format!("List {phase} rules"),
        )
        .await
    }

    async fn set_phase(
        &self,
        params: SetRulesParams,
        phase: Phase,
    ) -> Result<CallToolResult, McpError> {
        run_tool(
            self.services
                .transform
                .set_rules(&params.zone_id, phase, params.rules),
            &format!("Set {phase} rules"),
        )
        .await
    }
}

#[tool_handler]
impl ServerHandler for CloudflareMcp {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(
                "Cloudflare MCP Server - Manage zones, DNS records, transform rules, page rules \
                 and cache for the account behind CLOUDFLARE_API_TOKEN. \
                 Use list_zones or get_zone to find a zone_id first; every other tool is scoped to one zone. \
                 The set_*_rules tools replace the whole rule list for their phase, so list the current \
                 rules before changing them. Identifiers are 32-character lowercase hex strings."
                    .into(),
            ),
        }
    }
}

#[cfg(test)]
#[path = "test_mocks.rs"]
#[allow(clippy::unwrap_used, clippy::panic)]
pub(crate) mod test_mocks;

#[cfg(test)]
#[path = "server_tests.rs"]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests;

#[cfg(test)]
#[path = "client_integration_tests.rs"]
#[allow(clippy::unwrap_used, clippy::panic)]
mod client_integration_tests;
