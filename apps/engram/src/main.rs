//! # Engram - Persistent Knowledge-Graph Memory
//!
//! The main binary for the Engram flat-file memory engine.
//!
//! This application provides:
//! - CLI interface for memory operations
//! - Human-readable and JSON output modes
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────┐
//! │                 apps/engram (THE BINARY)               │
//! │                                                        │
//! │              ┌─────────────┐                           │
//! │              │   CLI       │                           │
//! │              │  (clap)     │                           │
//! │              └──────┬──────┘                           │
//! │                     │                                  │
//! │                     ▼                                  │
//! │             ┌───────────────┐      ┌────────────────┐  │
//! │             │  engram-core  │ ───► │ memory.jsonl   │  │
//! │             │  (THE LOGIC)  │      │ (flat records) │  │
//! │             └───────────────┘      └────────────────┘  │
//! └────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Memory statistics
//! engram status
//!
//! # Retrieval (reinforces matched entities)
//! engram search "coffee"
//! engram open Alice Bob
//!
//! # Maintenance
//! engram prune --threshold 2
//! engram review --file transcript.txt
//! ```

use clap::Parser;
use engram::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

fn main() {
    // Initialize tracing — ENGRAM_LOG_FORMAT=json enables machine-parseable output.
    let log_format = std::env::var("ENGRAM_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "engram=info".into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }

    // Parse CLI arguments
    let cli = cli::Cli::parse();

    // Display startup banner
    if !cli.quiet && !cli.json_mode {
        print_banner();
    }

    // Execute command
    if let Err(e) = cli::execute(cli) {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Print the Engram startup banner.
fn print_banner() {
    println!(
        r#"
  ███████╗███╗   ██╗ ██████╗ ██████╗  █████╗ ███╗   ███╗
  ██╔════╝████╗  ██║██╔════╝ ██╔══██╗██╔══██╗████╗ ████║
  █████╗  ██╔██╗ ██║██║  ███╗██████╔╝███████║██╔████╔██║
  ██╔══╝  ██║╚██╗██║██║   ██║██╔══██╗██╔══██║██║╚██╔╝██║
  ███████╗██║ ╚████║╚██████╔╝██║  ██║██║  ██║██║ ╚═╝ ██║
  ╚══════╝╚═╝  ╚═══╝ ╚═════╝ ╚═╝  ╚═╝╚═╝  ╚═╝╚═╝     ╚═╝

  Persistent Memory v{}

  Flat-file • Deterministic • Self-describing
"#,
        env!("CARGO_PKG_VERSION")
    );
}
