//! # Text Extractor
//!
//! Best-effort extraction of candidate entities and `mentioned_with`
//! relations from free-form conversation text.
//!
//! This is a heuristic scan, not a semantic parser: capitalized word
//! pairs are taken as probable person names, and a fixed keyword
//! vocabulary marks location / organization / concept candidates. The
//! caps (10 person matches, 5 relations, one candidate per keyword) keep
//! a single noisy conversation from flooding the graph.
//!
//! Extraction is a pluggable seam: `CandidateExtractor` maps text to
//! candidates, so a more rigorous extractor can replace
//! `KeywordExtractor` without touching the store. Persistence stays in
//! `review_conversation`, which delegates everything to `MemoryStore`.

use crate::primitives::{
    CONCEPT_KEYWORDS, LOCATION_KEYWORDS, MAX_PERSON_MATCHES, MAX_REVIEW_RELATIONS,
    MAX_SNIPPET_CHARS, MENTIONED_WITH, ORGANIZATION_KEYWORDS, SNIPPET_WINDOW_WORDS,
};
use crate::store::MemoryStore;
use crate::{Entity, EngramError, Relation};
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::OnceLock;

/// Two consecutive capitalized words, the probable-person-name pattern.
const PERSON_PATTERN: &str = r"\b[A-Z][a-z]+\s+[A-Z][a-z]+\b";

fn person_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(PERSON_PATTERN).ok()).as_ref()
}

// =============================================================================
// EXTRACTION SEAM
// =============================================================================

/// Candidate entities recognized in one block of text.
#[derive(Debug, Clone, Default)]
pub struct Candidates {
    /// Candidate entities, deduplicated by name, in recognition order,
    /// each with weight seeded to 1.
    pub entities: Vec<Entity>,
    /// Every name recognized as mentioned, including names that turn out
    /// to already exist in the store. Deterministically ordered.
    pub mentioned: BTreeSet<String>,
}

/// Maps unstructured text to candidate entities.
///
/// Implementations must be pure text scans with no store access; the
/// review path owns persistence.
pub trait CandidateExtractor {
    /// Extract candidate entities from a block of text.
    fn extract(&self, text: &str) -> Candidates;
}

// =============================================================================
// KEYWORD EXTRACTOR
// =============================================================================

/// The default heuristic extractor.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordExtractor;

impl KeywordExtractor {
    /// Candidate entity classes and their marker vocabularies.
    const KEYWORD_CLASSES: &'static [(&'static str, &'static [&'static str])] = &[
        ("location", LOCATION_KEYWORDS),
        ("organization", ORGANIZATION_KEYWORDS),
        ("concept", CONCEPT_KEYWORDS),
    ];
}

impl CandidateExtractor for KeywordExtractor {
    fn extract(&self, text: &str) -> Candidates {
        let mut raw: Vec<Entity> = Vec::new();
        let mut mentioned = BTreeSet::new();

        // Probable person names: first MAX_PERSON_MATCHES capitalized pairs.
        if let Some(re) = person_regex() {
            for m in re.find_iter(text).take(MAX_PERSON_MATCHES) {
                let name = m.as_str().trim().to_string();
                let mut entity = Entity::new(name.clone(), "person");
                entity.observations.push("mentioned in conversation".to_string());
                entity.weight = 1;
                raw.push(entity);
                mentioned.insert(name);
            }
        }

        // Keyword classes: at most one candidate per keyword, named after
        // the keyword itself, with a context snippet from the first line
        // containing it.
        let text_lower = text.to_lowercase();
        for &(class, keywords) in Self::KEYWORD_CLASSES {
            for &keyword in keywords {
                if !text_lower.contains(keyword) {
                    continue;
                }
                let Some(snippet) = context_snippet(text, keyword) else {
                    continue;
                };
                let name = format!("{keyword} from conversation");
                let mut entity = Entity::new(name.clone(), class);
                entity.observations.push(snippet);
                entity.weight = 1;
                raw.push(entity);
                mentioned.insert(name);
            }
        }

        // Deduplicate by name within this single extraction call.
        let mut seen = BTreeSet::new();
        let entities = raw
            .into_iter()
            .filter(|e| seen.insert(e.name.clone()))
            .collect();

        Candidates { entities, mentioned }
    }
}

/// Extract a fixed-size word window around the first occurrence of
/// `keyword` (case-insensitive) in the first line containing it,
/// truncated to `MAX_SNIPPET_CHARS` characters.
fn context_snippet(text: &str, keyword: &str) -> Option<String> {
    let line = text
        .lines()
        .find(|line| line.to_lowercase().contains(keyword))?;

    let words: Vec<&str> = line.split_whitespace().collect();
    let hit = words
        .iter()
        .position(|word| word.to_lowercase().contains(keyword))?;

    let start = hit.saturating_sub(SNIPPET_WINDOW_WORDS);
    let end = (hit + SNIPPET_WINDOW_WORDS + 1).min(words.len());
    let context = words[start..end].join(" ");

    Some(context.trim().chars().take(MAX_SNIPPET_CHARS).collect())
}

// =============================================================================
// REVIEW
// =============================================================================

/// Structured summary of one conversation review.
#[derive(Debug, Clone, Serialize)]
pub struct ReviewOutcome {
    /// Names of the candidate entities submitted for creation.
    pub entities_created: Vec<String>,
    /// The `mentioned_with` relations actually persisted (capped).
    pub relations_created: Vec<Relation>,
    /// Every name recognized as mentioned, created or pre-existing.
    pub entities_mentioned: Vec<String>,
    /// Human-readable count summary.
    pub summary: String,
}

/// Scan `conversation`, persist the candidates through the store, and
/// bump relevance for everything mentioned.
///
/// Persistence goes through the store's normal create paths, so names
/// already present are silently skipped there. Candidates of *different*
/// types are paired into `mentioned_with` relations (outer loop in
/// creation order, inner loop over later candidates), capped at
/// `MAX_REVIEW_RELATIONS`. Finally every mentioned name gets a weight
/// increment, whether it was just created or already known.
///
/// This is best-effort enrichment: store faults surface as `Err` for the
/// transport layer to report, never as a crash.
pub fn review_conversation<E: CandidateExtractor>(
    store: &MemoryStore,
    extractor: &E,
    conversation: &str,
) -> Result<ReviewOutcome, EngramError> {
    let candidates = extractor.extract(conversation);

    let entities_created: Vec<String> = candidates
        .entities
        .iter()
        .map(|e| e.name.clone())
        .collect();
    if !candidates.entities.is_empty() {
        store.create_entities(candidates.entities.clone())?;
    }

    let mut relations = Vec::new();
    for (i, first) in candidates.entities.iter().enumerate() {
        for second in candidates.entities.iter().skip(i + 1) {
            // Same-type pairs carry no signal worth an edge.
            if first.entity_type != second.entity_type {
                relations.push(Relation::new(&first.name, &second.name, MENTIONED_WITH));
            }
        }
    }
    relations.truncate(MAX_REVIEW_RELATIONS);
    if !relations.is_empty() {
        store.create_relations(relations.clone())?;
    }

    let entities_mentioned: Vec<String> = candidates.mentioned.iter().cloned().collect();
    if !entities_mentioned.is_empty() {
        store.increment_weights(&entities_mentioned)?;
    }

    let summary = format!(
        "Extracted {} entities, {} relations, and incremented weights for {} mentioned entities",
        entities_created.len(),
        relations.len(),
        entities_mentioned.len()
    );

    Ok(ReviewOutcome {
        entities_created,
        relations_created: relations,
        entities_mentioned,
        summary,
    })
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store() -> (TempDir, MemoryStore) {
        let dir = TempDir::new().expect("tempdir");
        let store = MemoryStore::new(dir.path().join("memory.jsonl"));
        (dir, store)
    }

    #[test]
    fn extracts_person_names() {
        let candidates = KeywordExtractor.extract("John Smith talked to Mary Jones today.");

        let names: Vec<&str> = candidates.entities.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["John Smith", "Mary Jones"]);
        assert!(candidates.entities.iter().all(|e| e.entity_type == "person"));
        assert!(candidates.entities.iter().all(|e| e.weight == 1));
        assert!(candidates.mentioned.contains("John Smith"));
    }

    #[test]
    fn person_matches_are_capped() {
        let text = "Alice Smith Bob Jones Carol White Dave Black Erin Green \
                    Frank Brown Grace Stone Henry Field Irene Marsh Jack Rivers \
                    Karen Woods Liam Banks";
        let candidates = KeywordExtractor.extract(text);

        let persons = candidates
            .entities
            .iter()
            .filter(|e| e.entity_type == "person")
            .count();
        assert_eq!(persons, MAX_PERSON_MATCHES);
    }

    #[test]
    fn keyword_yields_one_candidate_with_context_snippet() {
        let text = "we met at the main office yesterday\nthe office was crowded";
        let candidates = KeywordExtractor.extract(text);

        assert_eq!(candidates.entities.len(), 1);
        let entity = &candidates.entities[0];
        assert_eq!(entity.name, "office from conversation");
        assert_eq!(entity.entity_type, "location");
        // Window of two words on each side, from the FIRST matching line.
        assert_eq!(entity.observations, vec!["the main office yesterday"]);
    }

    #[test]
    fn snippet_is_truncated_to_limit() {
        let long_word = "x".repeat(80);
        let text = format!("{long_word} {long_word} office {long_word} {long_word}");
        let candidates = KeywordExtractor.extract(&text);

        assert_eq!(candidates.entities.len(), 1);
        assert_eq!(
            candidates.entities[0].observations[0].chars().count(),
            MAX_SNIPPET_CHARS
        );
    }

    #[test]
    fn candidates_are_deduplicated_by_name() {
        let candidates = KeywordExtractor.extract("John Smith met John Smith.");

        assert_eq!(candidates.entities.len(), 1);
        assert_eq!(candidates.mentioned.len(), 1);
    }

    #[test]
    fn review_persists_candidates_and_relations() {
        let (_dir, store) = store();
        let outcome = review_conversation(
            &store,
            &KeywordExtractor,
            "John Smith booked a room for the team meeting.",
        )
        .expect("review");

        // person + location(room) + organization(team) + concept(meeting)
        assert_eq!(outcome.entities_created.len(), 4);
        // All pairs differ in type here: 3 + 2 + 1 = 6, capped to 5.
        assert_eq!(outcome.relations_created.len(), MAX_REVIEW_RELATIONS);
        assert!(
            outcome
                .relations_created
                .iter()
                .all(|r| r.relation_type == MENTIONED_WITH)
        );

        let graph = store.read_graph();
        assert_eq!(graph.entities.len(), 4);
        assert_eq!(graph.relations.len(), MAX_REVIEW_RELATIONS);
        // Seeded to 1 at creation, then bumped once as "mentioned".
        assert!(graph.entities.iter().all(|e| e.weight == 2));
    }

    #[test]
    fn review_same_type_candidates_get_no_relations() {
        let (_dir, store) = store();
        let outcome = review_conversation(
            &store,
            &KeywordExtractor,
            "John Smith and Mary Jones spoke.",
        )
        .expect("review");

        assert_eq!(outcome.entities_created.len(), 2);
        assert!(outcome.relations_created.is_empty());
        assert!(store.read_graph().relations.is_empty());
    }

    #[test]
    fn review_bumps_existing_entities_without_overwriting() {
        let (_dir, store) = store();
        let mut existing = Entity::new("John Smith", "person");
        existing.observations.push("known engineer".to_string());
        existing.weight = 7;
        store.create_entities(vec![existing]).expect("create");

        let outcome =
            review_conversation(&store, &KeywordExtractor, "John Smith called again.")
                .expect("review");

        assert_eq!(outcome.entities_mentioned, vec!["John Smith".to_string()]);

        let graph = store.read_graph();
        assert_eq!(graph.entities.len(), 1);
        // Existing entity kept its fields; only the weight moved.
        assert_eq!(graph.entities[0].observations, vec!["known engineer"]);
        assert_eq!(graph.entities[0].weight, 8);
    }

    #[test]
    fn review_of_empty_text_is_a_no_op() {
        let (_dir, store) = store();
        let outcome = review_conversation(&store, &KeywordExtractor, "").expect("review");

        assert!(outcome.entities_created.is_empty());
        assert!(outcome.relations_created.is_empty());
        assert!(outcome.entities_mentioned.is_empty());
        assert!(store.read_graph().entities.is_empty());
    }
}
