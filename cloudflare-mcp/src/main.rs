//! MCP Server entry point for Cloudflare.
//!
//! Reads the API token from `CLOUDFLARE_API_TOKEN` and serves the tools over
//! stdio. Logs go to stderr because stdout carries the protocol.

mod schemas;
mod server;

use std::process::ExitCode;
use std::sync::Arc;

use cloudflare_mcp_provider::{CloudflareClient, Config, Services};
use rmcp::ServiceExt;
use server::CloudflareMcp;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize tracing to stderr (MCP uses stdout for protocol)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .without_time()
                .with_ansi(false),
        )
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    tracing::info!("Starting Cloudflare MCP Server");

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{e}");
            return ExitCode::FAILURE;
        }
    };
    tracing::info!("Using Cloudflare API at {}", config.api_base_url());

    let services = Arc::new(Services::new(Arc::new(CloudflareClient::new(config))));
    let mcp_server = CloudflareMcp::new(Arc::clone(&services));

    tracing::info!("Starting MCP server on stdio transport");
    let service = match mcp_server.serve(rmcp::transport::stdio()).await {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("Failed to start MCP server: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let exit = match service.waiting().await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("MCP server error: {}", e);
            ExitCode::FAILURE
        }
    };

    services.shutdown().await;
    tracing::info!("Cloudflare MCP Server stopped");
    exit
}
