//! # Property-Based Tests
//!
//! Invariant verification for the graph store using proptest.
//!
//! Covered properties:
//! - Persistence round-trip: `load(save(g)) == g`, field for field
//! - Create deduplication is idempotent with first-seen values
//! - Cascade integrity: no relation survives a deleted endpoint
//! - Prune removes exactly the entities strictly below the threshold

use engram_core::{Entity, KnowledgeGraph, MemoryStore, Relation};
use proptest::collection::vec;
use proptest::prelude::*;
use std::collections::BTreeSet;
use tempfile::TempDir;

// =============================================================================
// GENERATORS
// =============================================================================

/// Short printable names; a narrow alphabet forces name collisions.
fn name_strategy() -> impl Strategy<Value = String> {
    "[a-e]{1,3}"
}

fn entity_strategy() -> impl Strategy<Value = Entity> {
    (
        name_strategy(),
        "[a-z]{1,8}",
        vec("[ -~]{0,20}", 0..4),
        0u64..100,
    )
        .prop_map(|(name, entity_type, observations, weight)| {
            // The store enforces unique observations per entity; keep the
            // generated graphs inside that invariant.
            let mut seen = BTreeSet::new();
            let observations = observations
                .into_iter()
                .filter(|o| seen.insert(o.clone()))
                .collect();
            Entity {
                name,
                entity_type,
                observations,
                weight,
            }
        })
}

fn relation_strategy() -> impl Strategy<Value = Relation> {
    (name_strategy(), name_strategy(), "[a-z_]{1,10}").prop_map(|(from, to, relation_type)| {
        Relation {
            from,
            to,
            relation_type,
        }
    })
}

/// A graph that satisfies the store's steady-state invariants: unique
/// entity names, unique relation triples.
fn graph_strategy() -> impl Strategy<Value = KnowledgeGraph> {
    (
        vec(entity_strategy(), 0..12),
        vec(relation_strategy(), 0..12),
    )
        .prop_map(|(entities, relations)| {
            let mut names = BTreeSet::new();
            let entities: Vec<Entity> = entities
                .into_iter()
                .filter(|e| names.insert(e.name.clone()))
                .collect();
            let mut keys = BTreeSet::new();
            let relations = relations
                .into_iter()
                .filter(|r| {
                    keys.insert((r.from.clone(), r.to.clone(), r.relation_type.clone()))
                })
                .collect();
            KnowledgeGraph {
                entities,
                relations,
            }
        })
}

fn temp_store() -> (TempDir, MemoryStore) {
    let dir = TempDir::new().expect("tempdir");
    let store = MemoryStore::new(dir.path().join("memory.jsonl"));
    (dir, store)
}

// =============================================================================
// PROPERTY TESTS
// =============================================================================

proptest! {
    /// Saving and reloading any graph preserves it exactly, weights and
    /// record order included.
    #[test]
    fn save_load_roundtrip(graph in graph_strategy()) {
        let (_dir, store) = temp_store();

        store.save(&graph).expect("save");
        let loaded = store.load();

        prop_assert_eq!(loaded, graph);
    }

    /// Creating the same batch twice stores each name exactly once, with
    /// its first-seen field values.
    #[test]
    fn create_entities_dedup_idempotent(entities in vec(entity_strategy(), 0..10)) {
        let (_dir, store) = temp_store();

        store.create_entities(entities.clone()).expect("create");
        store.create_entities(entities.clone()).expect("create");

        let graph = store.load();
        let stored_names: Vec<&String> = graph.entities.iter().map(|e| &e.name).collect();
        let unique: BTreeSet<&String> = stored_names.iter().copied().collect();
        prop_assert_eq!(stored_names.len(), unique.len());

        // First-seen values win.
        for stored in &graph.entities {
            let first = entities.iter().find(|e| e.name == stored.name);
            prop_assert_eq!(first, Some(stored));
        }
    }

    /// After deleting a set of entities, no relation references any of
    /// them on either side.
    #[test]
    fn cascade_leaves_no_dangling_relations(
        graph in graph_strategy(),
        doomed in vec(name_strategy(), 0..6),
    ) {
        let (_dir, store) = temp_store();
        store.save(&graph).expect("save");

        store.delete_entities(&doomed).expect("delete");

        let doomed: BTreeSet<String> = doomed.into_iter().collect();
        let after = store.load();
        prop_assert!(after.entities.iter().all(|e| !doomed.contains(&e.name)));
        prop_assert!(
            after
                .relations
                .iter()
                .all(|r| !doomed.contains(&r.from) && !doomed.contains(&r.to))
        );
    }

    /// Prune removes exactly the entities with weight strictly below the
    /// threshold; a non-positive threshold removes nothing.
    #[test]
    fn prune_is_exact(graph in graph_strategy(), threshold in -5i64..50) {
        let (_dir, store) = temp_store();
        store.save(&graph).expect("save");

        let pruned = store.prune_entities(threshold).expect("prune");
        let pruned: BTreeSet<String> = pruned.into_iter().collect();

        let expected: BTreeSet<String> = graph
            .entities
            .iter()
            .filter(|e| i64::try_from(e.weight).map(|w| w < threshold).unwrap_or(false))
            .map(|e| e.name.clone())
            .collect();
        prop_assert_eq!(&pruned, &expected);

        if threshold <= 0 {
            prop_assert!(pruned.is_empty());
        }

        let after = store.load();
        prop_assert!(after.entities.iter().all(|e| !pruned.contains(&e.name)));
    }

    /// Search increments weight by exactly 1 for every match and leaves
    /// every non-match untouched.
    #[test]
    fn search_increments_matches_only(graph in graph_strategy(), query in "[a-e]{1,2}") {
        let (_dir, store) = temp_store();
        store.save(&graph).expect("save");

        let results = store.search_nodes(&query).expect("search");
        let hit_names: BTreeSet<&String> = results.iter().map(|e| &e.name).collect();

        let after = store.load();
        for (before, now) in graph.entities.iter().zip(after.entities.iter()) {
            prop_assert_eq!(&before.name, &now.name);
            if hit_names.contains(&now.name) {
                prop_assert_eq!(now.weight, before.weight.saturating_add(1));
            } else {
                prop_assert_eq!(now.weight, before.weight);
            }
        }
    }
}
