//! # Record Codec
//!
//! Bijective mapping between one `Entity` or `Relation` and one
//! self-describing JSON record. Each record carries a `type` discriminator
//! so a single flat file can hold both kinds, one record per line.
//!
//! Decoding is tolerant of unknown extra fields and of absent optional
//! fields (`weight` -> 0, `observations` -> empty). A line that does not
//! parse as a tagged record at all is a codec error; deciding what that
//! means for the file as a whole is the store's job, not the codec's.
//!
//! This module is a pure transformation - no file I/O.

use crate::{Entity, EngramError, Relation};
use serde::{Deserialize, Serialize};

// =============================================================================
// RECORD
// =============================================================================

/// One self-describing record: an entity or a relation, discriminated by
/// the `type` field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Record {
    Entity(Entity),
    Relation(Relation),
}

// =============================================================================
// ENCODE / DECODE
// =============================================================================

/// Encode one record as a single line of JSON (no trailing newline).
pub fn encode_record(record: &Record) -> Result<String, EngramError> {
    serde_json::to_string(record).map_err(|e| EngramError::Codec(e.to_string()))
}

/// Decode one line into a record.
pub fn decode_record(line: &str) -> Result<Record, EngramError> {
    serde_json::from_str(line).map_err(|e| EngramError::Codec(e.to_string()))
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_record_roundtrip() {
        let mut entity = Entity::new("Alice", "person");
        entity.observations.push("engineer".to_string());
        entity.weight = 3;

        let line = encode_record(&Record::Entity(entity.clone())).expect("encode");
        let decoded = decode_record(&line).expect("decode");

        assert_eq!(decoded, Record::Entity(entity));
    }

    #[test]
    fn relation_record_roundtrip() {
        let relation = Relation::new("Alice", "TechCorp", "works_at");

        let line = encode_record(&Record::Relation(relation.clone())).expect("encode");
        let decoded = decode_record(&line).expect("decode");

        assert_eq!(decoded, Record::Relation(relation));
    }

    #[test]
    fn encoded_entity_uses_wire_field_names() {
        let line = encode_record(&Record::Entity(Entity::new("Alice", "person"))).expect("encode");

        assert!(line.contains("\"type\":\"entity\""));
        assert!(line.contains("\"entityType\":\"person\""));
    }

    #[test]
    fn missing_weight_defaults_to_zero() {
        let line = r#"{"type":"entity","name":"Alice","entityType":"person","observations":[]}"#;
        let decoded = decode_record(line).expect("decode");

        assert!(matches!(decoded, Record::Entity(e) if e.weight == 0));
    }

    #[test]
    fn missing_observations_default_to_empty() {
        let line = r#"{"type":"entity","name":"Alice","entityType":"person"}"#;
        let decoded = decode_record(line).expect("decode");

        assert!(matches!(decoded, Record::Entity(e) if e.observations.is_empty()));
    }

    #[test]
    fn unknown_extra_fields_are_tolerated() {
        let line = r#"{"type":"relation","from":"A","to":"B","relationType":"knows","extra":1}"#;
        let decoded = decode_record(line).expect("decode");

        assert_eq!(decoded, Record::Relation(Relation::new("A", "B", "knows")));
    }

    #[test]
    fn malformed_line_is_rejected() {
        assert!(decode_record("not json at all").is_err());
        assert!(decode_record(r#"{"type":"widget","name":"x"}"#).is_err());
        assert!(decode_record(r#"{"name":"Alice","entityType":"person"}"#).is_err());
    }
}
