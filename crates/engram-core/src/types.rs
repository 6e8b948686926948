//! # Core Type Definitions
//!
//! This module contains the data model for the Engram memory graph:
//! - Named nodes (`Entity`)
//! - Directed typed edges (`Relation`)
//! - The unit of persistence (`KnowledgeGraph`)
//! - Error types (`EngramError`)
//!
//! Wire field names are camelCase (`entityType`, `relationType`) to match
//! the flat record format; Rust fields stay snake_case.

use serde::{Deserialize, Serialize};
use thiserror::Error;

// =============================================================================
// ENTITY
// =============================================================================

/// A named node in the memory graph.
///
/// Invariants maintained by the store:
/// - `name` is unique across the graph
/// - `observations` preserves insertion order and holds no duplicates
/// - `weight` never decreases except by deleting the entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
    /// Unique identifier within the graph.
    pub name: String,
    /// Free-form classifier (e.g. "person", "organization").
    pub entity_type: String,
    /// Ordered free-text observations attached to this entity.
    #[serde(default)]
    pub observations: Vec<String>,
    /// Relevance counter, incremented each time the entity is retrieved.
    /// Absent on old records; defaults to 0.
    #[serde(default)]
    pub weight: u64,
}

impl Entity {
    /// Create a new entity with no observations and weight 0.
    #[must_use]
    pub fn new(name: impl Into<String>, entity_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entity_type: entity_type.into(),
            observations: Vec::new(),
            weight: 0,
        }
    }

    /// Increment the relevance weight by 1 using saturating arithmetic.
    /// This is the ONLY allowed in-place mutation of weight.
    pub fn touch(&mut self) {
        self.weight = self.weight.saturating_add(1);
    }

    /// Case-insensitive substring match against name, type, or any
    /// observation. `query` must already be lowercased by the caller.
    #[must_use]
    pub fn matches_lowercase(&self, query: &str) -> bool {
        self.name.to_lowercase().contains(query)
            || self.entity_type.to_lowercase().contains(query)
            || self
                .observations
                .iter()
                .any(|obs| obs.to_lowercase().contains(query))
    }
}

// =============================================================================
// RELATION
// =============================================================================

/// A directed, typed edge between two entities identified by name.
///
/// Uniqueness is keyed on the full `(from, to, relation_type)` triple.
/// Endpoints are not validated at creation time; cascade delete restores
/// referential integrity whenever an endpoint entity is removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relation {
    /// Name of the source entity.
    pub from: String,
    /// Name of the target entity.
    pub to: String,
    /// Free-form edge classifier (e.g. "works_at", "mentioned_with").
    pub relation_type: String,
}

impl Relation {
    /// Create a new relation.
    #[must_use]
    pub fn new(
        from: impl Into<String>,
        to: impl Into<String>,
        relation_type: impl Into<String>,
    ) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            relation_type: relation_type.into(),
        }
    }

    /// The identity triple used for deduplication and exact deletion.
    #[must_use]
    pub fn key(&self) -> (&str, &str, &str) {
        (&self.from, &self.to, &self.relation_type)
    }
}

/// One (entity, observation) pair, as used by the batch observation
/// operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObservationRef {
    /// Name of the entity the observation belongs to.
    pub entity_name: String,
    /// The exact observation text.
    pub observation: String,
}

impl ObservationRef {
    /// Create a new observation reference.
    #[must_use]
    pub fn new(entity_name: impl Into<String>, observation: impl Into<String>) -> Self {
        Self {
            entity_name: entity_name.into(),
            observation: observation.into(),
        }
    }
}

// =============================================================================
// KNOWLEDGE GRAPH
// =============================================================================

/// The full graph snapshot: all entities followed by all relations.
///
/// This is the unit of persistence. It has no identity beyond the backing
/// file: every operation materializes it fresh, mutates it in memory, and
/// writes it back whole. Collection order is storage order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct KnowledgeGraph {
    pub entities: Vec<Entity>,
    pub relations: Vec<Relation>,
}

impl KnowledgeGraph {
    /// Create a new empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Check whether an entity with the given name exists.
    #[must_use]
    pub fn contains_entity(&self, name: &str) -> bool {
        self.entities.iter().any(|e| e.name == name)
    }

    /// Mutable lookup by entity name.
    pub fn entity_mut(&mut self, name: &str) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|e| e.name == name)
    }

    /// Check whether a relation with the identical triple exists.
    #[must_use]
    pub fn contains_relation(&self, relation: &Relation) -> bool {
        self.relations.iter().any(|r| r.key() == relation.key())
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur in the Engram engine.
///
/// Storage READ failures never surface here: the store downgrades them to
/// an empty graph (availability over partial data). Storage WRITE failures
/// always do, because masking them risks silent data loss.
#[derive(Debug, Error)]
pub enum EngramError {
    /// An I/O fault while writing the memory file.
    #[error("I/O error: {0}")]
    Io(String),

    /// A record could not be encoded or decoded.
    #[error("Codec error: {0}")]
    Codec(String),

    /// A request payload was missing a required field or malformed.
    #[error("Invalid argument for {operation}: {message}")]
    InvalidArgument { operation: String, message: String },
}

// =============================================================================
// TESTS
// =============================================================================
