//! Structural paths used in validation diagnostics.
//!
//! Paths read like `rules.film_former_part.materials.root[0].uuids` so a
//! user can locate the offending entry in a large nested document.

use std::fmt;

/// A dotted path into a rules document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldPath(String);

impl FieldPath {
    /// Path starting at the document root.
    pub fn root() -> Self {
        Self("rules".to_string())
    }

    /// Append a field segment.
    pub fn field(&self, name: &str) -> Self {
        Self(format!("{}.{}", self.0, name))
    }

    /// Append an index segment.
    pub fn index(&self, i: usize) -> Self {
        Self(format!("{}[{}]", self.0, i))
    }

    /// Path of entry `i` in a material list located at `self`.
    pub fn entry(&self, i: usize) -> Self {
        self.field("root").index(i)
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<FieldPath> for String {
    fn from(path: FieldPath) -> Self {
        path.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_segments() {
        let path = FieldPath::root()
            .field("pigment_part")
            .index(1)
            .field("materials")
            .index(0)
            .field("items")
            .entry(2)
            .field("ratios");

        assert_eq!(
            path.to_string(),
            "rules.pigment_part[1].materials[0].items.root[2].ratios"
        );
    }
}
