//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.

use engram_core::{
    EngramError, Entity, KeywordExtractor, KnowledgeGraph, MemoryStore, review_conversation,
};
use std::path::{Path, PathBuf};

// =============================================================================
// FILE SIZE LIMITS
// =============================================================================

/// Maximum transcript size for review (10 MB).
///
/// This prevents memory exhaustion from accidental large files.
const MAX_REVIEW_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Validate file size before reading.
fn validate_file_size(path: &Path, max_size: u64) -> Result<(), EngramError> {
    let metadata = std::fs::metadata(path)
        .map_err(|e| EngramError::Io(format!("Cannot read file metadata: {e}")))?;

    if metadata.len() > max_size {
        return Err(EngramError::Io(format!(
            "File size {} bytes exceeds maximum allowed {} bytes",
            metadata.len(),
            max_size
        )));
    }
    Ok(())
}

// =============================================================================
// STATUS COMMAND
// =============================================================================

/// Show memory file statistics.
pub fn cmd_status(memory_path: &PathBuf, json_mode: bool) -> Result<(), EngramError> {
    let store = MemoryStore::new(memory_path);
    let graph = store.load();

    let total_weight = graph
        .entities
        .iter()
        .fold(0u64, |acc, e| acc.saturating_add(e.weight));

    if json_mode {
        let output = serde_json::json!({
            "file": memory_path.to_string_lossy(),
            "entity_count": graph.entities.len(),
            "relation_count": graph.relations.len(),
            "total_weight": total_weight,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&output).unwrap_or_default()
        );
        return Ok(());
    }

    println!("Engram Memory Status");
    println!("====================");
    println!("File:     {memory_path:?}");
    println!();
    println!("Entities:     {}", graph.entities.len());
    println!("Relations:    {}", graph.relations.len());
    println!("Total weight: {total_weight}");

    Ok(())
}

// =============================================================================
// SHOW COMMAND
// =============================================================================

/// Print the full knowledge graph.
pub fn cmd_show(memory_path: &PathBuf, json_mode: bool) -> Result<(), EngramError> {
    let store = MemoryStore::new(memory_path);
    let graph = store.load();

    if json_mode {
        println!(
            "{}",
            serde_json::to_string_pretty(&graph).unwrap_or_default()
        );
        return Ok(());
    }

    print_graph(&graph);
    Ok(())
}

// =============================================================================
// SEARCH COMMAND
// =============================================================================

/// Search entities by case-insensitive substring.
pub fn cmd_search(memory_path: &PathBuf, json_mode: bool, query: &str) -> Result<(), EngramError> {
    let store = MemoryStore::new(memory_path);
    let entities = store.search_nodes(query)?;

    if json_mode {
        let output = serde_json::json!({
            "query": query,
            "count": entities.len(),
            "entities": entities,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&output).unwrap_or_default()
        );
        return Ok(());
    }

    if entities.is_empty() {
        println!("No entities matched '{query}'");
        return Ok(());
    }

    println!("Matched {} entities:", entities.len());
    for entity in &entities {
        print_entity(entity);
    }
    Ok(())
}

// =============================================================================
// OPEN COMMAND
// =============================================================================

/// Retrieve specific entities by exact name.
pub fn cmd_open(memory_path: &PathBuf, json_mode: bool, names: &[String]) -> Result<(), EngramError> {
    let store = MemoryStore::new(memory_path);
    let entities = store.open_nodes(names)?;

    if json_mode {
        let output = serde_json::json!({
            "requested": names.len(),
            "count": entities.len(),
            "entities": entities,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&output).unwrap_or_default()
        );
        return Ok(());
    }

    if entities.is_empty() {
        println!("No entities found");
        return Ok(());
    }

    println!("Found {} of {} requested entities:", entities.len(), names.len());
    for entity in &entities {
        print_entity(entity);
    }
    Ok(())
}

// =============================================================================
// PRUNE COMMAND
// =============================================================================

/// Remove entities whose weight is strictly below a threshold.
pub fn cmd_prune(
    memory_path: &PathBuf,
    json_mode: bool,
    threshold: i64,
) -> Result<(), EngramError> {
    let store = MemoryStore::new(memory_path);
    let pruned = store.prune_entities(threshold)?;

    if json_mode {
        let output = serde_json::json!({
            "threshold": threshold,
            "count": pruned.len(),
            "pruned_entities": pruned,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&output).unwrap_or_default()
        );
        return Ok(());
    }

    if pruned.is_empty() {
        println!("No entities below weight {threshold}");
        return Ok(());
    }

    println!("Pruned {} entities:", pruned.len());
    for name in &pruned {
        println!("  {name}");
    }
    Ok(())
}

// =============================================================================
// REVIEW COMMAND
// =============================================================================

/// Extract entities and relations from a conversation transcript.
pub fn cmd_review(
    memory_path: &PathBuf,
    json_mode: bool,
    file: Option<PathBuf>,
    text: Option<String>,
) -> Result<(), EngramError> {
    let conversation = match (file, text) {
        (Some(path), _) => {
            validate_file_size(&path, MAX_REVIEW_FILE_SIZE)?;
            std::fs::read_to_string(&path)
                .map_err(|e| EngramError::Io(format!("Cannot read transcript: {e}")))?
        }
        (None, Some(text)) => text,
        (None, None) => {
            return Err(EngramError::InvalidArgument {
                operation: "review".to_string(),
                message: "Provide a transcript with --file or --text".to_string(),
            });
        }
    };

    let store = MemoryStore::new(memory_path);
    let outcome = review_conversation(&store, &KeywordExtractor, &conversation)?;

    if json_mode {
        println!(
            "{}",
            serde_json::to_string_pretty(&outcome).unwrap_or_default()
        );
        return Ok(());
    }

    println!("{}", outcome.summary);
    if !outcome.entities_created.is_empty() {
        println!();
        println!("New entities:");
        for name in &outcome.entities_created {
            println!("  {name}");
        }
    }
    if !outcome.relations_created.is_empty() {
        println!();
        println!("New relations:");
        for relation in &outcome.relations_created {
            println!(
                "  {} --[{}]--> {}",
                relation.from, relation.relation_type, relation.to
            );
        }
    }
    Ok(())
}

// =============================================================================
// OUTPUT HELPERS
// =============================================================================

/// Print one entity in the indented text format.
fn print_entity(entity: &Entity) {
    println!(
        "  {} ({}, weight {})",
        entity.name, entity.entity_type, entity.weight
    );
    for observation in &entity.observations {
        println!("    - {observation}");
    }
}

/// Print the whole graph in the text format.
fn print_graph(graph: &KnowledgeGraph) {
    println!("Entities ({}):", graph.entities.len());
    for entity in &graph.entities {
        print_entity(entity);
    }
    println!();
    println!("Relations ({}):", graph.relations.len());
    for relation in &graph.relations {
        println!(
            "  {} --[{}]--> {}",
            relation.from, relation.relation_type, relation.to
        );
    }
}
