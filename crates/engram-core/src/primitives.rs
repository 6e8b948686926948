//! # Innate Primitives
//!
//! Hardcoded runtime constants for the Engram engine.
//!
//! The extraction caps are ad hoc limits that bound how much one noisy
//! conversation can inflate the graph; they are not derived from anything
//! principled.

/// Default memory file, used when no path is configured.
pub const DEFAULT_MEMORY_FILE: &str = "memory.jsonl";

/// Relation type synthesized between candidates extracted from the same
/// conversation.
pub const MENTIONED_WITH: &str = "mentioned_with";

// =============================================================================
// EXTRACTION LIMITS
// =============================================================================

/// Maximum number of person-name matches taken from one conversation.
pub const MAX_PERSON_MATCHES: usize = 10;

/// Maximum number of `mentioned_with` relations persisted per review call.
pub const MAX_REVIEW_RELATIONS: usize = 5;

/// Maximum length, in characters, of a context snippet stored as an
/// observation on a keyword-derived candidate.
pub const MAX_SNIPPET_CHARS: usize = 100;

/// Number of words kept on each side of a matched keyword when building
/// its context snippet.
pub const SNIPPET_WINDOW_WORDS: usize = 2;

// =============================================================================
// KEYWORD VOCABULARIES
// =============================================================================

/// Keywords that mark a location candidate.
pub const LOCATION_KEYWORDS: &[&str] = &["office", "building", "city", "street", "room", "floor"];

/// Keywords that mark an organization candidate.
pub const ORGANIZATION_KEYWORDS: &[&str] = &[
    "company",
    "corporation",
    "inc",
    "ltd",
    "organization",
    "team",
    "department",
];

/// Keywords that mark a concept candidate.
pub const CONCEPT_KEYWORDS: &[&str] = &[
    "project", "meeting", "task", "goal", "plan", "idea", "problem",
];
