//! # engram-core
//!
//! The persistent knowledge-graph memory engine for Engram - THE LOGIC.
//!
//! This crate maintains a small graph of named entities and typed
//! relations in one flat, human-readable record file, exposed through a
//! fixed set of operations (create, delete, search, annotate, prune).
//!
//! ## Architectural Constraints
//!
//! - Every public operation is one complete load -> mutate -> save cycle;
//!   there is no in-memory state shared across calls, so the backing file
//!   is always the single source of truth.
//! - Storage read failures fail soft (empty graph); write failures fail
//!   hard (never mask data-loss risk).
//! - No internal locking: the caller serializes operations.
//! - Synchronous and network-free; the apps own async and transports.

// =============================================================================
// MODULES
// =============================================================================

pub mod codec;
pub mod extractor;
pub mod primitives;
pub mod store;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types
// =============================================================================

pub use types::{Entity, EngramError, KnowledgeGraph, ObservationRef, Relation};

// =============================================================================
// RE-EXPORTS: Engine
// =============================================================================

pub use codec::{Record, decode_record, encode_record};
pub use extractor::{
    CandidateExtractor, Candidates, KeywordExtractor, ReviewOutcome, review_conversation,
};
pub use store::MemoryStore;
