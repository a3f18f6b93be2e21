// wcf-core/src/domain/schema/schema.rs

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// A named, versioned handle to a JSON-Schema document.
///
/// Identity is `(name, version)` only — the backing document is resolved lazily
/// through the [`SchemaRegistry`](super::SchemaRegistry) and is not part of
/// equality, hashing, or serialisation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Schema {
    pub name: String,
    pub version: String,
}

impl Schema {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }

    /// Parses the canonical `"<name>/<version>"` form used in runbook documents.
    pub fn parse(reference: &str) -> Option<Self> {
        let (name, version) = reference.split_once('/')?;
        if name.is_empty() || version.is_empty() {
            return None;
        }
        Some(Self::new(name, version))
    }
}

impl PartialEq for Schema {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.version == other.version
    }
}

impl Eq for Schema {}

impl Hash for Schema {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.version.hash(state);
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.name, self.version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn equality_is_reflexive_symmetric_and_transitive() {
        let a = Schema::new("standard_input", "1.0.0");
        let b = Schema::new("standard_input", "1.0.0");
        let c = Schema::new("standard_input", "1.0.0");

        assert_eq!(a, a);
        assert_eq!(a, b);
        assert_eq!(b, a);
        assert_eq!(b, c);
        assert_eq!(a, c);
    }

    #[test]
    fn distinct_version_is_not_equal() {
        let a = Schema::new("standard_input", "1.0.0");
        let b = Schema::new("standard_input", "2.0.0");
        assert_ne!(a, b);
    }

    #[test]
    fn usable_as_map_key() {
        let mut set = HashSet::new();
        set.insert(Schema::new("a", "1.0.0"));
        set.insert(Schema::new("a", "1.0.0"));
        set.insert(Schema::new("a", "2.0.0"));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn round_trips_through_serialisation() {
        let schema = Schema::new("personal_data_finding", "1.2.0");
        let json = serde_json::to_string(&schema).expect("serialise");
        let back: Schema = serde_json::from_str(&json).expect("deserialise");
        assert_eq!(schema, back);
    }

    #[test]
    fn parses_canonical_reference() {
        let schema = Schema::parse("standard_input/1.0.0").expect("parses");
        assert_eq!(schema.name, "standard_input");
        assert_eq!(schema.version, "1.0.0");
    }

    #[test]
    fn rejects_malformed_reference() {
        assert!(Schema::parse("standard_input").is_none());
        assert!(Schema::parse("/1.0.0").is_none());
        assert!(Schema::parse("standard_input/").is_none());
    }

    #[test]
    fn display_round_trips_canonical_form() {
        let schema = Schema::new("standard_input", "1.0.0");
        assert_eq!(schema.to_string(), "standard_input/1.0.0");
        assert_eq!(Schema::parse(&schema.to_string()).unwrap(), schema);
    }
}
