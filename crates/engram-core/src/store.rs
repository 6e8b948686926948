//! # Graph Store
//!
//! The load-modify-save persistence engine for the Engram memory graph.
//!
//! Every public operation is one complete cycle: read the whole backing
//! file, apply one mutation or query in memory, and (if anything changed)
//! rewrite the file whole. There is no cache across calls - the file is
//! the single source of truth, so edits made between calls are always
//! picked up.
//!
//! Failure discipline:
//! - READ faults fail soft: a missing file is an empty graph, and a file
//!   with any malformed record loads as empty (logged at `warn`), never
//!   as a partial graph.
//! - WRITE faults fail hard: masking them would risk silent data loss.
//!
//! The store provides no internal locking. The caller must serialize
//! operations (the MCP stdio transport processes one request to
//! completion before the next begins).

use crate::codec::{Record, decode_record, encode_record};
use crate::{Entity, EngramError, KnowledgeGraph, ObservationRef, Relation};
use std::collections::BTreeSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

// =============================================================================
// MEMORY STORE
// =============================================================================

/// A knowledge-graph store backed by one flat record file.
///
/// Constructed with an explicit storage path (no ambient global state),
/// so isolated instances can run side by side in tests.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    path: PathBuf,
}

impl MemoryStore {
    /// Create a store backed by the given file path.
    ///
    /// The file does not need to exist yet; it is created on first save.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The backing file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    // =========================================================================
    // LOAD / SAVE
    // =========================================================================

    /// Load the full graph from the backing file.
    ///
    /// A missing file is an empty graph, not an error. An unreadable file
    /// or any malformed record makes the WHOLE load fail soft to an empty
    /// graph - availability over partial-data risk.
    #[must_use]
    pub fn load(&self) -> KnowledgeGraph {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return KnowledgeGraph::new(),
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "could not read memory file; loading empty graph"
                );
                return KnowledgeGraph::new();
            }
        };

        let mut graph = KnowledgeGraph::new();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match decode_record(line) {
                Ok(Record::Entity(entity)) => graph.entities.push(entity),
                Ok(Record::Relation(relation)) => graph.relations.push(relation),
                Err(e) => {
                    tracing::warn!(
                        path = %self.path.display(),
                        error = %e,
                        "malformed record in memory file; loading empty graph"
                    );
                    return KnowledgeGraph::new();
                }
            }
        }
        graph
    }

    /// Write the full graph to the backing file: all entities in storage
    /// order, then all relations, one record per line.
    ///
    /// Missing parent directories are created. The content is written to a
    /// sibling temp file and renamed into place, so a load racing against
    /// this save never observes a partially written file.
    pub fn save(&self, graph: &KnowledgeGraph) -> Result<(), EngramError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .map_err(|e| EngramError::Io(format!("create {}: {e}", parent.display())))?;
        }

        let mut contents = String::new();
        for entity in &graph.entities {
            contents.push_str(&encode_record(&Record::Entity(entity.clone()))?);
            contents.push('\n');
        }
        for relation in &graph.relations {
            contents.push_str(&encode_record(&Record::Relation(relation.clone()))?);
            contents.push('\n');
        }

        let tmp = self.path.with_extension("jsonl.tmp");
        fs::write(&tmp, contents)
            .map_err(|e| EngramError::Io(format!("write {}: {e}", tmp.display())))?;
        fs::rename(&tmp, &self.path)
            .map_err(|e| EngramError::Io(format!("rename to {}: {e}", self.path.display())))?;
        Ok(())
    }

    // =========================================================================
    // ENTITY OPERATIONS
    // =========================================================================

    /// Append entities whose names are not already taken.
    ///
    /// Duplicates - against the stored graph or against earlier entries in
    /// this same batch - are silently skipped; first-seen values win and
    /// existing entities are never overwritten or merged. Returns how many
    /// were actually added.
    pub fn create_entities(&self, entities: Vec<Entity>) -> Result<usize, EngramError> {
        let mut graph = self.load();
        let mut taken: BTreeSet<String> = graph.entities.iter().map(|e| e.name.clone()).collect();

        let mut added = 0;
        for entity in entities {
            if taken.insert(entity.name.clone()) {
                graph.entities.push(entity);
                added += 1;
            }
        }

        self.save(&graph)?;
        Ok(added)
    }

    /// Remove every named entity, then every relation whose `from` or `to`
    /// is in the set (cascade).
    pub fn delete_entities(&self, names: &[String]) -> Result<(), EngramError> {
        let mut graph = self.load();
        let doomed: BTreeSet<&str> = names.iter().map(String::as_str).collect();
        remove_entities(&mut graph, &doomed);
        self.save(&graph)
    }

    /// Append observations to existing entities.
    ///
    /// Per item: the entity must exist and the observation must be
    /// non-empty and not already present on that entity; anything else is
    /// a silent per-item skip, never a failure of the whole batch. Saves
    /// only if something changed. Returns how many were added.
    pub fn add_observations(&self, items: &[ObservationRef]) -> Result<usize, EngramError> {
        let mut graph = self.load();

        let mut added = 0;
        for item in items {
            if item.observation.is_empty() {
                continue;
            }
            if let Some(entity) = graph.entity_mut(&item.entity_name)
                && !entity.observations.contains(&item.observation)
            {
                entity.observations.push(item.observation.clone());
                added += 1;
            }
        }

        if added > 0 {
            self.save(&graph)?;
        }
        Ok(added)
    }

    /// Remove exact observation strings from entities.
    ///
    /// Each observation occurs at most once per entity by invariant, so at
    /// most one occurrence is removed per item. Unknown entities or absent
    /// observations are silent per-item no-ops.
    pub fn delete_observations(&self, items: &[ObservationRef]) -> Result<(), EngramError> {
        let mut graph = self.load();

        for item in items {
            if let Some(entity) = graph.entity_mut(&item.entity_name)
                && let Some(pos) = entity.observations.iter().position(|o| *o == item.observation)
            {
                entity.observations.remove(pos);
            }
        }

        self.save(&graph)
    }

    // =========================================================================
    // RELATION OPERATIONS
    // =========================================================================

    /// Append relations whose `(from, to, relationType)` triple is not
    /// already taken, with the same intra-batch duplicate suppression as
    /// `create_entities`. Returns how many were actually added.
    pub fn create_relations(&self, relations: Vec<Relation>) -> Result<usize, EngramError> {
        let mut graph = self.load();
        let mut taken: BTreeSet<(String, String, String)> = graph
            .relations
            .iter()
            .map(|r| {
                (
                    r.from.clone(),
                    r.to.clone(),
                    r.relation_type.clone(),
                )
            })
            .collect();

        let mut added = 0;
        for relation in relations {
            let key = (
                relation.from.clone(),
                relation.to.clone(),
                relation.relation_type.clone(),
            );
            if taken.insert(key) {
                graph.relations.push(relation);
                added += 1;
            }
        }

        self.save(&graph)?;
        Ok(added)
    }

    /// Remove every relation exactly matching any of the given triples.
    pub fn delete_relations(&self, relations: &[Relation]) -> Result<(), EngramError> {
        let mut graph = self.load();
        let doomed: BTreeSet<(&str, &str, &str)> = relations.iter().map(Relation::key).collect();
        graph.relations.retain(|r| !doomed.contains(&r.key()));
        self.save(&graph)
    }

    // =========================================================================
    // QUERY OPERATIONS (with relevance side effect)
    // =========================================================================

    /// Pure load; no mutation, no save.
    #[must_use]
    pub fn read_graph(&self) -> KnowledgeGraph {
        self.load()
    }

    /// Case-insensitive substring search against entity name, type, or any
    /// observation.
    ///
    /// Every match has its weight incremented by 1 as a side effect of
    /// being retrieved; the graph is saved iff at least one entity
    /// matched. Results are in storage order, not relevance order.
    pub fn search_nodes(&self, query: &str) -> Result<Vec<Entity>, EngramError> {
        let mut graph = self.load();
        let query = query.to_lowercase();

        let mut matches = Vec::new();
        for entity in &mut graph.entities {
            if entity.matches_lowercase(&query) {
                entity.touch();
                matches.push(entity.clone());
            }
        }

        if !matches.is_empty() {
            self.save(&graph)?;
        }
        Ok(matches)
    }

    /// Exact-name lookup, in request order, skipping names not found.
    ///
    /// Each hit has its weight incremented by 1; saves iff any hit.
    pub fn open_nodes(&self, names: &[String]) -> Result<Vec<Entity>, EngramError> {
        let mut graph = self.load();

        let mut found = Vec::new();
        for name in names {
            if let Some(entity) = graph.entity_mut(name) {
                entity.touch();
                found.push(entity.clone());
            }
        }

        if !found.is_empty() {
            self.save(&graph)?;
        }
        Ok(found)
    }

    /// Increment weight by 1 for every existing name in the list.
    ///
    /// Duplicate names in the input each count: requesting the same name
    /// twice increments it twice. Saves iff at least one name existed.
    pub fn increment_weights(&self, names: &[String]) -> Result<(), EngramError> {
        let mut graph = self.load();

        let mut touched = false;
        for name in names {
            if let Some(entity) = graph.entity_mut(name) {
                entity.touch();
                touched = true;
            }
        }

        if touched {
            self.save(&graph)?;
        }
        Ok(())
    }

    // =========================================================================
    // PRUNING
    // =========================================================================

    /// Cascade-delete every entity whose weight is strictly below
    /// `threshold`, and return the pruned names.
    ///
    /// Entities exactly at the threshold survive. Weight is never
    /// negative, so `threshold <= 0` legally prunes nothing.
    pub fn prune_entities(&self, threshold: i64) -> Result<Vec<String>, EngramError> {
        // Negative or zero threshold cannot be exceeded by any weight.
        let Ok(threshold) = u64::try_from(threshold) else {
            return Ok(Vec::new());
        };

        let mut graph = self.load();
        let pruned: Vec<String> = graph
            .entities
            .iter()
            .filter(|e| e.weight < threshold)
            .map(|e| e.name.clone())
            .collect();

        if pruned.is_empty() {
            return Ok(pruned);
        }

        let doomed: BTreeSet<&str> = pruned.iter().map(String::as_str).collect();
        remove_entities(&mut graph, &doomed);
        self.save(&graph)?;
        Ok(pruned)
    }
}

// =============================================================================
// REMOVAL HELPER
// =============================================================================

/// Remove the named entities and cascade-delete every relation touching
/// them. Shared by `delete_entities` and `prune_entities` so both enforce
/// the identical cascade contract. The relation filter sees the original
/// name set, never a partially applied one.
fn remove_entities(graph: &mut KnowledgeGraph, names: &BTreeSet<&str>) {
    graph.entities.retain(|e| !names.contains(e.name.as_str()));
    graph
        .relations
        .retain(|r| !names.contains(r.from.as_str()) && !names.contains(r.to.as_str()));
}

// =============================================================================
// TESTS
// =============================================================================
