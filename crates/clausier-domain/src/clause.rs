//! Clause module - the structured output of an extraction run

use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Document-scoped clause identifier.
///
/// Assigned as a monotonically increasing counter (starting at 1) only
/// after all chunks have been assembled, so identifiers are stable within a
/// document and follow the final clause ordering. Renders as `clause_001`
/// style strings on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClauseId(u32);

impl ClauseId {
    /// Create a ClauseId from a 1-based counter value.
    pub fn from_number(n: u32) -> Self {
        Self(n)
    }

    /// The 1-based counter value.
    pub fn number(&self) -> u32 {
        self.0
    }

    /// Parse from the wire form (`clause_007`).
    pub fn parse(s: &str) -> Result<Self, String> {
        let digits = s
            .strip_prefix("clause_")
            .ok_or_else(|| format!("Invalid clause id: {}", s))?;
        digits
            .parse::<u32>()
            .map(Self)
            .map_err(|e| format!("Invalid clause id {}: {}", s, e))
    }
}

impl fmt::Display for ClauseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "clause_{:03}", self.0)
    }
}

impl Serialize for ClauseId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ClauseId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        ClauseId::parse(&s).map_err(de::Error::custom)
    }
}

/// One identified contractual provision, anchored to absolute character
/// offsets in the source document.
///
/// Invariant: `0 <= start_position <= end_position <= document text length`.
/// A clause whose content could not be located verbatim in its chunk carries
/// a zero-length anchor (`start_position == end_position`) at the chunk
/// start rather than being discarded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clause {
    /// Document-scoped identifier
    pub clause_id: ClauseId,

    /// Title or heading of the clause (may be empty)
    pub title: String,

    /// Full text content of the clause
    pub content: String,

    /// Type of clause (e.g. termination, payment, confidentiality)
    pub clause_type: String,

    /// Page number where the clause appears, if the model reported one
    pub page_number: Option<u32>,

    /// Absolute character offset where the clause starts
    pub start_position: usize,

    /// Absolute character offset one past where the clause ends
    pub end_position: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clause_id_display() {
        assert_eq!(ClauseId::from_number(1).to_string(), "clause_001");
        assert_eq!(ClauseId::from_number(42).to_string(), "clause_042");
        assert_eq!(ClauseId::from_number(1234).to_string(), "clause_1234");
    }

    #[test]
    fn test_clause_id_parse_round_trip() {
        let id = ClauseId::from_number(7);
        assert_eq!(ClauseId::parse(&id.to_string()).unwrap(), id);
        assert!(ClauseId::parse("section_007").is_err());
        assert!(ClauseId::parse("clause_abc").is_err());
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn clause_id_round_trips(n in 1u32..1_000_000) {
                let id = ClauseId::from_number(n);
                prop_assert_eq!(ClauseId::parse(&id.to_string()).unwrap(), id);
            }
        }
    }

    #[test]
    fn test_clause_serializes_id_as_string() {
        let clause = Clause {
            clause_id: ClauseId::from_number(3),
            title: "Termination".to_string(),
            content: "Either party may terminate.".to_string(),
            clause_type: "termination".to_string(),
            page_number: Some(2),
            start_position: 100,
            end_position: 127,
        };
        let json = serde_json::to_value(&clause).unwrap();
        assert_eq!(json["clause_id"], "clause_003");
        assert_eq!(json["page_number"], 2);

        let back: Clause = serde_json::from_value(json).unwrap();
        assert_eq!(back, clause);
    }
}
