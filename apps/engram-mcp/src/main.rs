//! # Engram MCP Server
//!
//! Entry point for the MCP (Model Context Protocol) memory server.
//!
//! Reads configuration from environment variables:
//! - `MEMORY_FILE_PATH` — path of the memory file (default: `memory.jsonl`)
//!
//! Communicates with AI clients (Claude, GPT) via MCP over stdio, operating
//! directly on the memory file through the embedded engine.

mod server;

use engram_core::{MemoryStore, primitives::DEFAULT_MEMORY_FILE};
use rmcp::{ServiceExt, transport::stdio};
use server::EngramMcp;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logging to stderr only — stdout is reserved for MCP stdio transport.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let path =
        std::env::var("MEMORY_FILE_PATH").unwrap_or_else(|_| DEFAULT_MEMORY_FILE.to_string());

    tracing::info!("Engram MCP server starting, memory file: {}", path);

    let store = MemoryStore::new(path);
    let mcp = EngramMcp::new(store);

    let service = mcp.serve(stdio()).await.inspect_err(|e| {
        tracing::error!("MCP serve error: {:?}", e);
    })?;

    service.waiting().await?;
    Ok(())
}
