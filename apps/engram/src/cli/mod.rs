//! # Engram CLI Module
//!
//! This module implements the CLI interface for Engram.
//!
//! ## Available Commands
//!
//! - `status` - Show memory file statistics
//! - `show` - Print the full knowledge graph
//! - `search` - Search entities by substring (reinforces matches)
//! - `open` - Retrieve entities by exact name (reinforces matches)
//! - `prune` - Remove entities below a relevance threshold
//! - `review` - Extract entities and relations from a conversation

mod commands;

use clap::{Parser, Subcommand};
use engram_core::EngramError;
use engram_core::primitives::DEFAULT_MEMORY_FILE;
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// Engram - Persistent Knowledge-Graph Memory
///
/// A flat-file memory engine for AI agents. Entities, relations and
/// observations live in one self-describing line-record file.
#[derive(Parser, Debug)]
#[command(name = "engram")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to the memory file
    #[arg(short = 'f', long, global = true, default_value = DEFAULT_MEMORY_FILE)]
    pub file: PathBuf,

    /// Output in JSON format (for programmatic access)
    #[arg(long = "json", global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show memory file statistics
    Status,

    /// Print the full knowledge graph
    Show,

    /// Search entities by case-insensitive substring
    Search {
        /// Substring matched against names, types and observations
        query: String,
    },

    /// Retrieve specific entities by exact name
    Open {
        /// Entity names to retrieve
        names: Vec<String>,
    },

    /// Remove entities whose weight is strictly below a threshold
    Prune {
        /// Weight threshold
        #[arg(short, long)]
        threshold: i64,
    },

    /// Extract entities and relations from a conversation transcript
    Review {
        /// Path to a transcript file
        #[arg(short = 'F', long, conflicts_with = "text")]
        file: Option<PathBuf>,

        /// Transcript text given inline
        #[arg(short, long)]
        text: Option<String>,
    },
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub fn execute(cli: Cli) -> Result<(), EngramError> {
    let json_mode = cli.json_mode;

    match cli.command {
        Some(Commands::Status) => cmd_status(&cli.file, json_mode),
        Some(Commands::Show) => cmd_show(&cli.file, json_mode),
        Some(Commands::Search { query }) => cmd_search(&cli.file, json_mode, &query),
        Some(Commands::Open { names }) => cmd_open(&cli.file, json_mode, &names),
        Some(Commands::Prune { threshold }) => cmd_prune(&cli.file, json_mode, threshold),
        Some(Commands::Review { file, text }) => cmd_review(&cli.file, json_mode, file, text),
        None => {
            // No subcommand - show status by default
            cmd_status(&cli.file, json_mode)
        }
    }
}
